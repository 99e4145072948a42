//! Sample graph shared by the integration tests

#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use dirk_di::{
    Component, ContainerBuilder, DependencyInfo, InjectError, InjectionTarget, Key, Members,
    Module, Scope, SessionId, SubcomponentBuilder,
};

pub const PER_SCREEN: Scope = Scope::named("PerScreen");

#[derive(Debug)]
pub struct NameProvider(pub String);

#[derive(Debug)]
pub struct Formatter(pub String);

#[derive(Debug)]
pub struct ViewModel {
    pub name: String,
}

/// Counts provider invocations per binding
#[derive(Default)]
pub struct Calls {
    pub name: AtomicUsize,
    pub formatter: AtomicUsize,
    pub view_model: AtomicUsize,
}
impl Calls {
    pub fn name(&self) -> usize {
        self.name.load(Ordering::SeqCst)
    }

    pub fn formatter(&self) -> usize {
        self.formatter.load(Ordering::SeqCst)
    }

    pub fn view_model(&self) -> usize {
        self.view_model.load(Ordering::SeqCst)
    }
}

pub fn app_module(calls: Arc<Calls>) -> Module {
    Module::new().provide(Scope::Root, move |()| {
        calls.name.fetch_add(1, Ordering::SeqCst);
        NameProvider("Dagger Test!".to_string())
    })
}

pub fn screen_module(calls: Arc<Calls>) -> Module {
    let formatter_calls = calls.clone();
    Module::new()
        .provide(PER_SCREEN, move |(name,): (Arc<NameProvider>,)| {
            formatter_calls.formatter.fetch_add(1, Ordering::SeqCst);
            Formatter(format!("{} {}s", 4, name.0))
        })
        .provide(PER_SCREEN, move |(name,): (Arc<NameProvider>,)| {
            calls.view_model.fetch_add(1, Ordering::SeqCst);
            ViewModel {
                name: name.0.clone(),
            }
        })
}

pub fn sample_component(calls: &Arc<Calls>) -> Component {
    ContainerBuilder::new()
        .install(app_module(calls.clone()))
        .subcomponent::<MainTarget>(
            SubcomponentBuilder::new(PER_SCREEN)
                .install(screen_module(calls.clone()))
                .single_instance::<ViewModel>(),
        )
        .build()
        .expect("sample graph is valid")
}

/// Declares `Formatter` and `ViewModel` as its dependencies
pub struct MainTarget {
    pub session: SessionId,
    pub formatter: Option<Arc<Formatter>>,
    pub view_model: Option<Arc<ViewModel>>,
}
impl MainTarget {
    pub fn new(session: SessionId) -> Self {
        Self {
            session,
            formatter: None,
            view_model: None,
        }
    }
}
impl InjectionTarget for MainTarget {
    fn session(&self) -> SessionId {
        self.session
    }

    fn dependencies(&self) -> Vec<DependencyInfo> {
        vec![
            DependencyInfo::required(Key::of::<Formatter>()),
            DependencyInfo::required(Key::of::<ViewModel>()),
        ]
    }

    fn inject_members(&mut self, members: Members<'_>) -> Result<(), InjectError> {
        self.formatter = Some(members.require::<Formatter>()?);
        self.view_model = Some(members.require::<ViewModel>()?);
        Ok(())
    }
}
