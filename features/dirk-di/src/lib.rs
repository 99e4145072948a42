//! Dirk DI is a hierarchical dependency injection container.
//!
//! Bindings are registered explicitly while the graph is built, every binding
//! declares the scope its value lives in. Values bound to `Scope::Root` are
//! built once per process, values bound to a named scope once per instance of
//! that scope, e.g. once per screen.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use dirk_di::{ContainerBuilder, InjectError, InjectionTarget, Members, Module, Scope,
//!     SessionId, SubcomponentBuilder, DependencyInfo, Key};
//!
//! const PER_SCREEN: Scope = Scope::named("PerScreen");
//!
//! struct Greeting(String);
//!
//! struct Screen {
//!     session: SessionId,
//!     greeting: Option<Arc<Greeting>>,
//! }
//! impl InjectionTarget for Screen {
//!     fn session(&self) -> SessionId {
//!         self.session
//!     }
//!
//!     fn dependencies(&self) -> Vec<DependencyInfo> {
//!         vec![DependencyInfo::required(Key::of::<Greeting>())]
//!     }
//!
//!     fn inject_members(&mut self, members: Members<'_>) -> Result<(), InjectError> {
//!         self.greeting = Some(members.require::<Greeting>()?);
//!         Ok(())
//!     }
//! }
//!
//! let component = ContainerBuilder::new()
//!     .install(Module::new().add_instance(String::from("dirk")))
//!     .subcomponent::<Screen>(SubcomponentBuilder::new(PER_SCREEN).install(
//!         Module::new().provide(PER_SCREEN, |(name,): (Arc<String>,)| {
//!             Greeting(format!("Hello {name}"))
//!         }),
//!     ))
//!     .build()
//!     .unwrap();
//!
//! let mut screen = Screen {
//!     session: component.injector().open_session(),
//!     greeting: None,
//! };
//! component.injector().inject(&mut screen).unwrap();
//!
//! assert_eq!(screen.greeting.unwrap().0, "Hello dirk");
//! ```
//!
//! Dirk DI consists of the following components:
//!
//! 1. Registry - bindings by key, chained to the parent component's registry
//! 2. Scope - scope instances owning the caches, created and destroyed explicitly
//! 3. Graph - resolution of a key against a scope instance, with cycle detection
//! 4. Dispatch - routing from a target's type to the child container it is injected from
//! 5. Single Instance - one value per key for the lifetime of a scope
//! 6. Builder - explicit graph construction and validation

pub mod builder;
pub mod container;
pub mod dependency_graph;
pub mod dispatch;
pub mod errors;
pub mod factories;
pub mod graph;
pub mod registry;
pub mod resolver;
pub mod scope;
pub mod single_instance;
pub mod types;

pub use builder::{Component, ContainerBuilder, Module, SubcomponentBuilder};
pub use container::{Container, Subcomponent};
pub use dependency_graph::{DependencyGraphError, DependencyGraphErrors};
pub use dispatch::{ChildContainerFactory, DispatchingInjector, InjectionTarget, Members, SessionId};
pub use errors::{BuildError, InjectError, RequireError, ResolveError, ScopeError};
pub use factories::{InstanceFactory, Provider};
pub use graph::GraphResolver;
pub use registry::{Binding, BindingRegistry};
pub use resolver::{Dependencies, Resolver};
pub use scope::{ScopeId, ScopeInstance, ScopeManager};
pub use single_instance::SingleInstanceFactory;
pub use types::{DependencyInfo, DynError, Injectable, Instance, Key, Scope, TypeInfo};
