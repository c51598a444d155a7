mod common;

use faas_cache_sim::container::{Container, ContainerId, ContainerState};
use faas_cache_sim::function::FunctionSpec;

#[test]
fn lifecycle_transitions() {
    let spec = FunctionSpec::new("A", 128, 10.0, 1.0);
    let mut container = Container::new(ContainerId(0), spec);
    assert_eq!(container.state, ContainerState::Cold);
    assert!(container.is_idle());

    container.prewarm();
    assert_eq!(container.state, ContainerState::Warm);
    assert!(container.is_idle());

    container.run();
    assert_eq!(container.state, ContainerState::Running);
    assert!(!container.is_idle());

    container.terminate();
    assert_eq!(container.state, ContainerState::Term);
    assert!(!container.is_idle());
}
