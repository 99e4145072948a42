//! Scope bound caching across root and child scope instances

mod common;

use std::sync::Arc;

use common::{sample_component, Calls, Formatter, MainTarget, NameProvider, ViewModel};
use dirk_di::{ResolveError, Scope, TypeInfo};
use rstest::*;

#[fixture]
fn calls() -> Arc<Calls> {
    Arc::new(Calls::default())
}

#[rstest]
fn root_binding_is_shared_by_all_child_scopes(calls: Arc<Calls>) {
    // Arrange
    let component = sample_component(&calls);
    let injector = component.injector();
    let mut first = MainTarget::new(injector.open_session());
    let mut second = MainTarget::new(injector.open_session());
    injector.inject(&mut first).unwrap();
    injector.inject(&mut second).unwrap();
    let token = TypeInfo::of::<MainTarget>();
    let child_a = injector.container_for(token, first.session).unwrap();
    let child_b = injector.container_for(token, second.session).unwrap();

    // Act
    let from_a = child_a.require::<NameProvider>().unwrap();
    let from_b = child_b.require::<NameProvider>().unwrap();

    // Assert
    assert!(Arc::ptr_eq(&from_a, &from_b));
    assert_eq!(calls.name(), 1);
}

#[rstest]
fn child_binding_is_distinct_per_child_scope(calls: Arc<Calls>) {
    // Arrange
    let component = sample_component(&calls);
    let injector = component.injector();
    let mut first = MainTarget::new(injector.open_session());
    let mut second = MainTarget::new(injector.open_session());

    // Act
    injector.inject(&mut first).unwrap();
    injector.inject(&mut second).unwrap();

    // Assert
    let first_formatter = first.formatter.unwrap();
    let second_formatter = second.formatter.unwrap();
    assert!(!Arc::ptr_eq(&first_formatter, &second_formatter));
    assert_eq!(calls.formatter(), 2);
}

#[rstest]
fn destroying_one_child_keeps_the_other(calls: Arc<Calls>) {
    // Arrange
    let component = sample_component(&calls);
    let injector = component.injector();
    let mut first = MainTarget::new(injector.open_session());
    let mut second = MainTarget::new(injector.open_session());
    injector.inject(&mut first).unwrap();
    injector.inject(&mut second).unwrap();
    let token = TypeInfo::of::<MainTarget>();
    let child_b = injector.container_for(token, second.session).unwrap();

    // Act
    injector.end_session(first.session);

    // Assert
    let cached = child_b.require::<Formatter>().unwrap();
    assert!(Arc::ptr_eq(&cached, second.formatter.as_ref().unwrap()));
    assert_eq!(calls.formatter(), 2);
    assert!(injector.container_for(token, first.session).is_none());
}

#[rstest]
fn sample_scenario_builds_name_once(calls: Arc<Calls>) {
    // Arrange
    let component = sample_component(&calls);
    let injector = component.injector();
    let mut target = MainTarget::new(injector.open_session());

    // Act
    injector.inject(&mut target).unwrap();

    // Assert
    assert_eq!(target.formatter.unwrap().0, "4 Dagger Test!s");
    assert_eq!(target.view_model.unwrap().name, "Dagger Test!");
    assert_eq!(calls.name(), 1);
    assert_eq!(calls.formatter(), 1);
    assert_eq!(calls.view_model(), 1);
}

#[rstest]
fn new_session_rebuilds_screen_values_but_reuses_root(calls: Arc<Calls>) {
    // Arrange
    let component = sample_component(&calls);
    let injector = component.injector();
    let mut first = MainTarget::new(injector.open_session());
    injector.inject(&mut first).unwrap();
    let old_formatter = first.formatter.clone().unwrap();
    injector.end_session(first.session);

    // Act
    let mut second = MainTarget::new(injector.open_session());
    injector.inject(&mut second).unwrap();

    // Assert
    let new_formatter = second.formatter.unwrap();
    assert!(!Arc::ptr_eq(&old_formatter, &new_formatter));
    assert_eq!(new_formatter.0, "4 Dagger Test!s");
    assert_eq!(calls.formatter(), 2);
    assert_eq!(calls.name(), 1);
}

#[rstest]
fn destroyed_child_rejects_resolution(calls: Arc<Calls>) {
    // Arrange
    let component = sample_component(&calls);
    let injector = component.injector();
    let mut target = MainTarget::new(injector.open_session());
    injector.inject(&mut target).unwrap();
    let child = injector
        .container_for(TypeInfo::of::<MainTarget>(), target.session)
        .unwrap();

    // Act
    injector.end_session(target.session);
    let result = child.require::<ViewModel>();

    // Assert
    assert!(child.is_destroyed());
    assert!(matches!(
        result,
        Err(ResolveError::ScopeDestroyed { scope, .. }) if scope == child.scope().id()
    ));
}

#[rstest]
fn root_container_can_not_resolve_screen_bindings(calls: Arc<Calls>) {
    let component = sample_component(&calls);
    let token = TypeInfo::of::<MainTarget>();
    let mut target = MainTarget::new(component.injector().open_session());
    component.injector().inject(&mut target).unwrap();
    let child = component
        .injector()
        .container_for(token, target.session)
        .unwrap();

    // A screen binding resolved through the child registry, but from the root scope
    let result = child
        .resolver()
        .resolve(&dirk_di::Key::of::<Formatter>(), component.container().scope());

    assert!(matches!(
        result,
        Err(ResolveError::MissingScope { scope, .. }) if scope == Scope::named("PerScreen")
    ));
}
