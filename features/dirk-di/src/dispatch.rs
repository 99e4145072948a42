use std::{
    collections::{HashMap, HashSet},
    fmt::{Debug, Display},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError,
    },
};

use crate::{
    container::{Container, Subcomponent},
    errors::{BuildError, InjectError, RequireError, ScopeError},
    resolver::{Dependencies, Resolver},
    single_instance::SingleInstanceFactory,
    types::{DependencyInfo, Injectable, TypeInfo},
};

/// Identifies one logical screen or session, allocated by [DispatchingInjector::open_session]
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SessionId(u64);
impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// An object whose dependencies are filled in by a [DispatchingInjector]
///
/// The injector routes on [InjectionTarget::token], which defaults to the
/// concrete type, so callers only need a `&mut dyn InjectionTarget`.
pub trait InjectionTarget: 'static {
    fn token(&self) -> TypeInfo {
        TypeInfo::of::<Self>()
    }

    /// Session the target belongs to, targets of one session share a child container
    fn session(&self) -> SessionId;

    /// Everything `inject_members` will read
    fn dependencies(&self) -> Vec<DependencyInfo>;

    fn inject_members(&mut self, members: Members<'_>) -> Result<(), InjectError>;
}

/// What an injection target receives: its resolved dependencies and its session's container
pub struct Members<'a> {
    dependencies: &'a Dependencies,
    container: &'a Container,
}
impl<'a> Members<'a> {
    pub fn require<T: Injectable>(&self) -> Result<Arc<T>, RequireError> {
        self.dependencies.require::<T>()
    }

    pub fn resolve<R: Resolver>(&self) -> Result<R, RequireError> {
        self.dependencies.resolve::<R>()
    }

    pub fn dependencies(&self) -> &'a Dependencies {
        self.dependencies
    }

    pub fn container(&self) -> &'a Container {
        self.container
    }

    pub fn single_instance_factory(&self) -> SingleInstanceFactory {
        self.container.single_instance_factory()
    }
}

/// Creates the child container a target is injected from
pub trait ChildContainerFactory: Send + Sync {
    fn create(&self, parent: &Container) -> Result<Container, ScopeError>;
}
impl ChildContainerFactory for Subcomponent {
    fn create(&self, parent: &Container) -> Result<Container, ScopeError> {
        parent.child(self)
    }
}
/// Any function creating a child from the parent can be used as a factory
impl<Fun> ChildContainerFactory for Fun
where
    Fun: Fn(&Container) -> Result<Container, ScopeError> + Send + Sync,
{
    fn create(&self, parent: &Container) -> Result<Container, ScopeError> {
        self(parent)
    }
}

/// Routes injection requests to the child container registered for the target's type
pub struct DispatchingInjector {
    root: Container,
    entries: HashMap<TypeInfo, Arc<dyn ChildContainerFactory>>,
    next_session: AtomicU64,
    sessions: Mutex<Sessions>,
}
/// Only open sessions are tracked, ids are never reused so any other id has ended
#[derive(Default)]
struct Sessions {
    containers: HashMap<(TypeInfo, SessionId), Container>,
    open: HashSet<SessionId>,
}
impl Debug for DispatchingInjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchingInjector")
            .field("root", &self.root)
            .field("targets", &self.targets())
            .finish()
    }
}

impl DispatchingInjector {
    pub fn new(root: Container) -> Self {
        Self {
            root,
            entries: HashMap::new(),
            next_session: AtomicU64::new(1),
            sessions: Mutex::new(Sessions::default()),
        }
    }

    /// Adds a dispatch entry, only possible while the injector is exclusively owned
    pub fn register(
        &mut self,
        token: TypeInfo,
        factory: impl ChildContainerFactory + 'static,
    ) -> Result<(), BuildError> {
        if self.entries.contains_key(&token) {
            return Err(BuildError::DuplicateTarget(token));
        }
        self.entries.insert(token, Arc::new(factory));
        Ok(())
    }

    pub fn root(&self) -> &Container {
        &self.root
    }

    /// Registered target tokens, sorted by type name
    pub fn targets(&self) -> Vec<TypeInfo> {
        let mut targets: Vec<_> = self.entries.keys().copied().collect();
        targets.sort_by_key(|target| target.type_name);
        targets
    }

    pub fn open_session(&self) -> SessionId {
        let session = SessionId(self.next_session.fetch_add(1, Ordering::Relaxed));
        self.lock_sessions().open.insert(session);
        tracing::debug!("Opened {session}");
        session
    }

    /// Sessions opened and not yet ended, in opening order
    pub fn open_sessions(&self) -> Vec<SessionId> {
        let mut open: Vec<_> = self.lock_sessions().open.iter().copied().collect();
        open.sort();
        open
    }

    /// Fills every declared dependency of `target` from its session's child container
    ///
    /// The child container is created on the first injection of a target type
    /// within a session and reused afterwards.
    pub fn inject(&self, target: &mut dyn InjectionTarget) -> Result<(), InjectError> {
        let token = target.token();
        let Some(factory) = self.entries.get(&token) else {
            tracing::error!("No injector registered for {token}");
            return Err(InjectError::UnknownTarget(token));
        };

        let container = self.session_container(token, target.session(), factory.as_ref())?;
        let dependencies = container.resolve_all(&target.dependencies())?;

        tracing::debug!(
            "Injecting {} dependencies into {token} from scope {}",
            dependencies.len(),
            container.scope().id()
        );
        target.inject_members(Members {
            dependencies: &dependencies,
            container: &container,
        })
    }

    /// Child container a target type uses within `session`, if one was created
    pub fn container_for(&self, token: TypeInfo, session: SessionId) -> Option<Container> {
        self.lock_sessions()
            .containers
            .get(&(token, session))
            .cloned()
    }

    /// Destroys every child container of `session`, ending it is idempotent
    pub fn end_session(&self, session: SessionId) {
        let ended: Vec<Container> = {
            let mut sessions = self.lock_sessions();
            if !sessions.open.remove(&session) {
                return;
            }
            let keys: Vec<_> = sessions
                .containers
                .keys()
                .filter(|(_, owner)| *owner == session)
                .copied()
                .collect();
            keys.iter()
                .filter_map(|key| sessions.containers.remove(key))
                .collect()
        };

        for container in &ended {
            container.destroy();
        }
        tracing::debug!("Ended {session}, destroyed {} child containers", ended.len());
    }

    fn session_container(
        &self,
        token: TypeInfo,
        session: SessionId,
        factory: &dyn ChildContainerFactory,
    ) -> Result<Container, InjectError> {
        {
            let sessions = self.lock_sessions();
            if !sessions.open.contains(&session) {
                return Err(InjectError::SessionEnded(session));
            }
            if let Some(existing) = sessions.containers.get(&(token, session)) {
                return Ok(existing.clone());
            }
        }

        // The factory may call back into this injector, it runs without the lock
        let container = factory.create(&self.root)?;

        let mut sessions = self.lock_sessions();
        if !sessions.open.contains(&session) {
            drop(sessions);
            container.destroy();
            return Err(InjectError::SessionEnded(session));
        }
        let existing = sessions.containers.get(&(token, session)).cloned();
        if let Some(existing) = existing {
            drop(sessions);
            tracing::trace!("{token} in {session} was created concurrently, dropping duplicate");
            container.destroy();
            return Ok(existing);
        }

        tracing::debug!(
            "Created child container for {token} in {session} with scope {}",
            container.scope().id()
        );
        sessions
            .containers
            .insert((token, session), container.clone());
        Ok(container)
    }

    fn lock_sessions(&self) -> std::sync::MutexGuard<'_, Sessions> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
