use std::{any::type_name, sync::Arc};

use dirk_config::Config;
use dirk_di::{
    DependencyInfo, DispatchingInjector, InjectError, Injectable, InjectionTarget, Key, Members,
    Module, Scope, SessionId, SingleInstanceFactory, SubcomponentBuilder,
};

use crate::{
    app::{MainScreenConfig, SharedNameService},
    errors::SampleError,
};

/// One instance per shown main screen
pub const PER_SCREEN: Scope = Scope::named("PerScreen");

pub struct StringFormatter {
    name_service: SharedNameService,
    count: u32,
}
impl StringFormatter {
    pub fn formatted_name(&self) -> String {
        format!("{} {}s", self.count, self.name_service.name())
    }
}

pub struct MainViewModel {
    name_service: SharedNameService,
}
impl MainViewModel {
    pub fn name(&self) -> &str {
        self.name_service.name()
    }
}

/// Hands out the view models of one screen, each lives as long as the screen's scope
#[derive(Debug, Clone)]
pub struct ViewModelProvider {
    factory: SingleInstanceFactory,
}
impl ViewModelProvider {
    pub fn new(factory: SingleInstanceFactory) -> Self {
        Self { factory }
    }

    pub fn get<VM: Injectable>(&self) -> Result<Arc<VM>, SampleError> {
        self.factory.get::<VM>().map_err(|e| match e {
            InjectError::UnsupportedKey(_) => SampleError::UnknownViewModel(type_name::<VM>()),
            other => other.into(),
        })
    }
}

pub fn main_module() -> Module {
    Module::new()
        .provide(
            PER_SCREEN,
            |(name_service, config): (SharedNameService, Config<MainScreenConfig>)| {
                StringFormatter {
                    name_service,
                    count: config.formatter_count,
                }
            },
        )
        .provide(PER_SCREEN, |(name_service,): (SharedNameService,)| {
            MainViewModel { name_service }
        })
}

pub fn subcomponent() -> SubcomponentBuilder {
    SubcomponentBuilder::new(PER_SCREEN)
        .install(main_module())
        .single_instance::<MainViewModel>()
}

/// Text the main screen shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainScreenText {
    pub formatted_name: String,
    pub view_model_name: String,
}

/// The main screen: gets its formatter injected and its view model from the provider
pub struct MainScreen {
    session: SessionId,
    formatter: Option<Arc<StringFormatter>>,
    view_models: Option<ViewModelProvider>,
    view_model: Option<Arc<MainViewModel>>,
}

impl MainScreen {
    pub fn new(session: SessionId) -> Self {
        Self {
            session,
            formatter: None,
            view_models: None,
            view_model: None,
        }
    }

    /// Injects the screen and reads its view model, producing the text it shows
    pub fn create(&mut self, injector: &DispatchingInjector) -> Result<MainScreenText, SampleError> {
        injector.inject(self)?;

        let formatter = self
            .formatter
            .clone()
            .ok_or(SampleError::NotInjected(type_name::<Self>()))?;
        let view_model = self
            .view_models
            .as_ref()
            .ok_or(SampleError::NotInjected(type_name::<Self>()))?
            .get::<MainViewModel>()?;
        self.view_model = Some(view_model.clone());

        Ok(MainScreenText {
            formatted_name: formatter.formatted_name(),
            view_model_name: view_model.name().to_string(),
        })
    }

    pub fn view_models(&self) -> Option<&ViewModelProvider> {
        self.view_models.as_ref()
    }

    pub fn view_model(&self) -> Option<&Arc<MainViewModel>> {
        self.view_model.as_ref()
    }

    pub fn formatter(&self) -> Option<&Arc<StringFormatter>> {
        self.formatter.as_ref()
    }
}

impl InjectionTarget for MainScreen {
    fn session(&self) -> SessionId {
        self.session
    }

    fn dependencies(&self) -> Vec<DependencyInfo> {
        vec![DependencyInfo::required(Key::of::<StringFormatter>())]
    }

    fn inject_members(&mut self, members: Members<'_>) -> Result<(), InjectError> {
        self.formatter = Some(members.require::<StringFormatter>()?);
        self.view_models = Some(ViewModelProvider::new(members.single_instance_factory()));
        Ok(())
    }
}
