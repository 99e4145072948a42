//! Scope instances and their lifecycle

use std::{
    collections::HashMap,
    fmt::{Debug, Display},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError, RwLock,
    },
};

use crate::{
    errors::{ResolveError, ScopeError},
    types::{Instance, Key, Scope},
};

/// Process unique id of a scope instance
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScopeId(u64);
impl Display for ScopeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A live instantiation of a [Scope], owning the cache of values bound to it
#[derive(Clone)]
pub struct ScopeInstance(Arc<ScopeInstanceInner>);
struct ScopeInstanceInner {
    id: ScopeId,
    scope: Scope,
    parent: Option<ScopeInstance>,
    state: RwLock<ScopeState>,
    /// One lock per key, held while checking, building and publishing a value
    construction_locks: Mutex<HashMap<Key, Arc<Mutex<()>>>>,
}
#[derive(Default)]
struct ScopeState {
    destroyed: bool,
    cache: HashMap<Key, Instance>,
}
impl Debug for ScopeInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.0.state.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("ScopeInstance")
            .field("id", &self.0.id)
            .field("scope", &self.0.scope)
            .field("destroyed", &state.destroyed)
            .field("cached", &state.cache.len())
            .finish()
    }
}

impl ScopeInstance {
    fn new(id: ScopeId, scope: Scope, parent: Option<ScopeInstance>) -> Self {
        Self(Arc::new(ScopeInstanceInner {
            id,
            scope,
            parent,
            state: RwLock::new(ScopeState::default()),
            construction_locks: Mutex::new(HashMap::new()),
        }))
    }

    pub fn id(&self) -> ScopeId {
        self.0.id
    }

    pub fn scope(&self) -> Scope {
        self.0.scope
    }

    pub fn parent(&self) -> Option<&ScopeInstance> {
        self.0.parent.as_ref()
    }

    pub fn is_destroyed(&self) -> bool {
        self.0
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .destroyed
    }

    /// True if both handles refer to the same scope instance
    pub fn same_as(&self, other: &ScopeInstance) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// True if `ancestor` is this instance or one of its parents
    pub fn descends_from(&self, ancestor: &ScopeInstance) -> bool {
        let mut current = Some(self);
        while let Some(instance) = current {
            if instance.same_as(ancestor) {
                return true;
            }
            current = instance.parent();
        }
        false
    }

    /// The instance owning values of `scope`: this one or the closest ancestor carrying the tag
    pub fn owner_of(&self, scope: Scope) -> Option<&ScopeInstance> {
        let mut current = Some(self);
        while let Some(instance) = current {
            if instance.scope() == scope {
                return Some(instance);
            }
            current = instance.parent();
        }
        None
    }

    pub fn cached_len(&self) -> usize {
        self.0
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .cache
            .len()
    }

    /// Fails if this instance has been destroyed, `key` is only used for the error
    pub(crate) fn ensure_alive(&self, key: &Key) -> Result<(), ResolveError> {
        match self.is_destroyed() {
            true => Err(self.destroyed_error(key)),
            false => Ok(()),
        }
    }

    pub(crate) fn cached(&self, key: &Key) -> Result<Option<Instance>, ResolveError> {
        let state = self.0.state.read().unwrap_or_else(PoisonError::into_inner);
        if state.destroyed {
            return Err(self.destroyed_error(key));
        }
        Ok(state.cache.get(key).cloned())
    }

    pub(crate) fn store(&self, key: Key, instance: Instance) -> Result<(), ResolveError> {
        let mut state = self.0.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.destroyed {
            return Err(self.destroyed_error(&key));
        }
        state.cache.insert(key, instance);
        Ok(())
    }

    pub(crate) fn construction_lock(&self, key: &Key) -> Arc<Mutex<()>> {
        self.0
            .construction_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(*key)
            .or_default()
            .clone()
    }

    /// Clears the cache and marks the instance dead, returns false if it already was
    fn invalidate(&self) -> bool {
        let mut state = self.0.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.destroyed {
            return false;
        }
        state.destroyed = true;
        state.cache.clear();
        drop(state);

        self.0
            .construction_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        true
    }

    fn destroyed_error(&self, key: &Key) -> ResolveError {
        ResolveError::ScopeDestroyed {
            key: *key,
            scope: self.0.id,
        }
    }
}

/// Creates and destroys scope instances
///
/// Owns the root instance, which lives as long as the manager, and tracks every
/// live child so teardown can cascade to descendants.
pub struct ScopeManager {
    root: ScopeInstance,
    next_id: AtomicU64,
    live: RwLock<HashMap<ScopeId, ScopeInstance>>,
}
impl Debug for ScopeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeManager")
            .field("root", &self.root)
            .field("live", &self.live_scopes().len())
            .finish()
    }
}
impl Default for ScopeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeManager {
    pub fn new() -> Self {
        Self {
            root: ScopeInstance::new(ScopeId(0), Scope::Root, None),
            next_id: AtomicU64::new(1),
            live: RwLock::new(HashMap::new()),
        }
    }

    /// The single persistent scope instance
    pub fn root(&self) -> &ScopeInstance {
        &self.root
    }

    /// Creates a new instance of `scope` below `parent`
    pub fn create_child_scope(
        &self,
        parent: &ScopeInstance,
        scope: Scope,
    ) -> Result<ScopeInstance, ScopeError> {
        if scope == Scope::Root {
            return Err(ScopeError::RootTag);
        }
        if parent.is_destroyed() {
            return Err(ScopeError::ParentDestroyed(parent.id()));
        }

        let id = ScopeId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let child = ScopeInstance::new(id, scope, Some(parent.clone()));
        self.live
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, child.clone());

        tracing::debug!("Created scope {scope} {id} below {}", parent.id());
        Ok(child)
    }

    /// Destroys `instance` and every live descendant
    ///
    /// Destroying an already destroyed instance is a no-op, the root can not be destroyed.
    pub fn destroy(&self, instance: &ScopeInstance) {
        if instance.same_as(&self.root) {
            tracing::warn!("Refusing to destroy the root scope");
            return;
        }

        let doomed: Vec<ScopeInstance> = {
            let mut live = self.live.write().unwrap_or_else(PoisonError::into_inner);
            let ids: Vec<ScopeId> = live
                .values()
                .filter(|candidate| candidate.descends_from(instance))
                .map(ScopeInstance::id)
                .collect();
            ids.into_iter().filter_map(|id| live.remove(&id)).collect()
        };

        // Instances unknown to this manager are still invalidated
        if !instance.invalidate() {
            tracing::trace!("Scope {} was already destroyed", instance.id());
        } else {
            tracing::debug!("Destroyed scope {} {}", instance.scope(), instance.id());
        }

        for descendant in doomed.iter().filter(|d| !d.same_as(instance)) {
            if descendant.invalidate() {
                tracing::debug!(
                    "Destroyed scope {} {} with its ancestor {}",
                    descendant.scope(),
                    descendant.id(),
                    instance.id()
                );
            }
        }
    }

    /// Ids of all live child scopes
    pub fn live_scopes(&self) -> Vec<ScopeId> {
        let mut ids: Vec<ScopeId> = self
            .live
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        ids.sort();
        ids
    }
}
