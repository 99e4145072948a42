//! Graph resolution against hand-built registries

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Barrier,
    },
    thread,
    time::Duration,
};

use dirk_di::{
    BindingRegistry, BuildError, ContainerBuilder, DependencyGraphError, DependencyInfo,
    Dependencies, DynError, GraphResolver, Instance, Key, Module, Provider, ResolveError, Scope,
    ScopeManager,
};
use rstest::*;

struct A;
struct B;
struct C;
struct Missing;

const SCREEN: Scope = Scope::named("Screen");

/// Provider building `value()` and counting its calls
fn counted<T: Send + Sync + 'static>(value: fn() -> T, calls: &Arc<AtomicUsize>) -> Provider {
    let calls = calls.clone();
    Arc::new(move |_: &Dependencies| -> Result<Instance, DynError> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(Instance::new(value()))
    })
}

fn required(keys: &[Key]) -> Vec<DependencyInfo> {
    keys.iter().copied().map(DependencyInfo::required).collect()
}

#[rstest]
fn cycle_fails_before_any_provider_runs() {
    // Arrange
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = BindingRegistry::root();
    registry
        .register(Key::of::<A>(), Scope::Root, required(&[Key::of::<B>()]), counted(|| A, &calls))
        .unwrap();
    registry
        .register(Key::of::<B>(), Scope::Root, required(&[Key::of::<A>()]), counted(|| B, &calls))
        .unwrap();
    let scopes = ScopeManager::new();

    // Act
    let result = GraphResolver::new(&registry).resolve(&Key::of::<A>(), scopes.root());

    // Assert
    let Err(ResolveError::CyclicDependency { chain }) = result else {
        panic!("expected a cycle");
    };
    assert_eq!(chain, vec![Key::of::<A>(), Key::of::<B>(), Key::of::<A>()]);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[rstest]
fn builder_rejects_cycles_up_front() {
    let result = ContainerBuilder::new()
        .install(
            Module::new()
                .provide(Scope::Root, |(_,): (Arc<B>,)| A)
                .provide(Scope::Root, |(_,): (Arc<A>,)| B),
        )
        .build();

    let Err(BuildError::DependencyGraph(errors)) = result else {
        panic!("expected graph errors");
    };
    assert!(matches!(
        errors.errors.as_slice(),
        [DependencyGraphError::CircularDependency { .. }]
    ));
}

#[rstest]
fn builder_rejects_duplicate_bindings() {
    let result = ContainerBuilder::new()
        .install(Module::new().add_instance(1_u32).add_instance(2_u32))
        .build();

    assert!(matches!(result, Err(BuildError::DuplicateBinding(key)) if key == Key::of::<u32>()));
}

#[rstest]
fn missing_binding_leaves_no_partial_state() {
    // Arrange
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = BindingRegistry::root();
    registry
        .register(
            Key::of::<A>(),
            Scope::Root,
            required(&[Key::of::<C>(), Key::of::<Missing>()]),
            counted(|| A, &calls),
        )
        .unwrap();
    registry
        .register(Key::of::<C>(), Scope::Root, vec![], counted(|| C, &calls))
        .unwrap();
    let scopes = ScopeManager::new();

    // Act
    let result = GraphResolver::new(&registry).resolve(&Key::of::<A>(), scopes.root());

    // Assert
    assert!(matches!(
        result,
        Err(ResolveError::MissingBinding { key, required_by: Some(by) })
            if key == Key::of::<Missing>() && by == Key::of::<A>()
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(scopes.root().cached_len(), 0);
}

#[rstest]
fn unregistered_key_fails() {
    let registry = BindingRegistry::root();
    let scopes = ScopeManager::new();

    let result = GraphResolver::new(&registry).resolve(&Key::of::<Missing>(), scopes.root());

    assert!(matches!(
        result,
        Err(ResolveError::MissingBinding { required_by: None, .. })
    ));
}

#[rstest]
fn child_binding_without_child_scope_fails() {
    // Arrange
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = BindingRegistry::root();
    registry
        .register(Key::of::<A>(), SCREEN, vec![], counted(|| A, &calls))
        .unwrap();
    let scopes = ScopeManager::new();

    // Act
    let result = GraphResolver::new(&registry).resolve(&Key::of::<A>(), scopes.root());

    // Assert
    assert!(matches!(
        result,
        Err(ResolveError::MissingScope { scope, .. }) if scope == SCREEN
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[rstest]
fn root_value_requested_from_child_is_cached_in_root() {
    // Arrange
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = BindingRegistry::root();
    registry
        .register(Key::of::<A>(), Scope::Root, vec![], counted(|| A, &calls))
        .unwrap();
    let scopes = ScopeManager::new();
    let child = scopes.create_child_scope(scopes.root(), SCREEN).unwrap();

    // Act
    let from_child = GraphResolver::new(&registry)
        .resolve(&Key::of::<A>(), &child)
        .unwrap();
    scopes.destroy(&child);
    let from_root = GraphResolver::new(&registry)
        .resolve(&Key::of::<A>(), scopes.root())
        .unwrap();

    // Assert
    assert!(from_child.same_as(&from_root));
    assert_eq!(child.cached_len(), 0);
    assert_eq!(scopes.root().cached_len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[rstest]
fn failing_provider_is_surfaced_and_not_cached() {
    // Arrange
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    let component = ContainerBuilder::new()
        .install(Module::new().try_provide(Scope::Root, move |()| {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<A, _>("database offline")
        }))
        .build()
        .unwrap();

    // Act
    let first = component.container().require::<A>();
    let second = component.container().require::<A>();

    // Assert
    let Err(ResolveError::ProviderFailed { key, error }) = first else {
        panic!("expected provider failure");
    };
    assert_eq!(key, Key::of::<A>());
    assert_eq!(error.to_string(), "database offline");
    assert!(second.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[rstest]
fn optional_dependency_resolves_to_none() {
    let component = ContainerBuilder::new()
        .install(
            Module::new().provide(Scope::Root, |(missing,): (Option<Arc<Missing>>,)| {
                missing.is_none()
            }),
        )
        .build()
        .unwrap();

    let was_none = component.container().require::<bool>().unwrap();

    assert!(*was_none);
}

#[rstest]
fn qualified_keys_resolve_independently() {
    // Arrange
    let component = ContainerBuilder::new()
        .install(
            Module::new()
                .try_provide_key(Key::named::<String>("first"), Scope::Root, |()| {
                    Ok::<_, DynError>("one".to_string())
                })
                .try_provide_key(Key::named::<String>("second"), Scope::Root, |()| {
                    Ok::<_, DynError>("two".to_string())
                }),
        )
        .build()
        .unwrap();

    // Act
    let first = component
        .container()
        .require_key::<String>(&Key::named::<String>("first"))
        .unwrap();
    let second = component
        .container()
        .require_key::<String>(&Key::named::<String>("second"))
        .unwrap();

    // Assert
    assert_eq!(*first, "one");
    assert_eq!(*second, "two");
}

#[rstest]
fn concurrent_root_resolution_builds_once() {
    // Arrange
    const THREADS: usize = 8;
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let component = ContainerBuilder::new()
        .install(Module::new().provide(Scope::Root, move |()| {
            counter.fetch_add(1, Ordering::SeqCst);
            // Widen the window in which other threads pile up on the lock
            thread::sleep(Duration::from_millis(20));
            A
        }))
        .build()
        .unwrap();
    let container = component.container();
    let barrier = Barrier::new(THREADS);

    // Act
    let resolved: Vec<Arc<A>> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    container.require::<A>().unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // Assert
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(resolved.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}

#[rstest]
fn diamond_dependency_is_built_once() {
    // Arrange
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let component = ContainerBuilder::new()
        .install(
            Module::new()
                .provide(Scope::Root, move |()| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    C
                })
                .provide(Scope::Root, |(_,): (Arc<C>,)| A)
                .provide(Scope::Root, |(_,): (Arc<C>,)| B)
                .provide(Scope::Root, |(_, _): (Arc<A>, Arc<B>)| Missing),
        )
        .build()
        .unwrap();

    // Act
    let result = component.container().require::<Missing>();

    // Assert
    assert!(result.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
