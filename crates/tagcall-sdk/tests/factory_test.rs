//! Factory registry behaviour, including the process-wide instance

use std::sync::Arc;
use std::thread;

use tagcall_sdk::{bind, Component, FactoryRegistry, Method, RegistryError};

fn counter_component() -> Component {
    let mut component = Component::new("Counter");
    component.add_method(
        Method::new("Next", "Следующий").with_handler(bind!(|n: i32| -> i32 { n + 1 })),
    );
    component
}

#[test]
fn test_names_in_registration_order() {
    let registry = FactoryRegistry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.class_names(), "");

    registry.register("Beta", || Component::new("Beta")).unwrap();
    registry.register("Alpha", || Component::new("Alpha")).unwrap();
    registry.register("Counter", counter_component).unwrap();

    assert_eq!(registry.len(), 3);
    assert_eq!(registry.class_names(), "Beta;Alpha;Counter");
}

#[test]
fn test_duplicate_registration_rejected() {
    let registry = FactoryRegistry::new();
    registry.register("Counter", counter_component).unwrap();
    assert_eq!(
        registry.register("Counter", || Component::new("Other")),
        Err(RegistryError::AlreadyRegistered("Counter".to_string()))
    );
    assert_eq!(registry.len(), 1);

    // the first constructor is kept
    let component = registry.create("Counter").unwrap();
    assert_eq!(component.find_method("Next"), Some(1));
}

#[test]
fn test_create_unknown_name() {
    let registry = FactoryRegistry::new();
    registry.register("Counter", counter_component).unwrap();
    assert!(registry.create("counter").is_none());
    assert!(!registry.contains("Missing"));
    assert!(registry.contains("Counter"));
}

#[test]
fn test_each_create_is_independent() {
    let registry = FactoryRegistry::new();
    registry.register("Counter", counter_component).unwrap();

    let first = registry.create("Counter").unwrap();
    let second = registry.create("Counter").unwrap();
    first.set_error("only the first");
    assert!(first.has_error());
    assert!(!second.has_error());
}

#[test]
fn test_constructor_may_use_registry() {
    let registry = Arc::new(FactoryRegistry::new());
    registry.register("Counter", counter_component).unwrap();
    let inner = Arc::clone(&registry);
    registry
        .register("Wrapper", move || {
            let mut component = inner.create("Counter").unwrap_or_else(|| Component::new("Empty"));
            if inner.contains("Wrapper") {
                component.add_method(Method::new("Wrapped", "Обернуто"));
            }
            component
        })
        .unwrap();

    let component = registry.create("Wrapper").unwrap();
    assert_eq!(component.extension_name(), "Counter");
    assert_eq!(component.find_method("Next"), Some(1));
    assert_eq!(component.find_method("Wrapped"), Some(2));
}

#[test]
fn test_global_registry_across_threads() {
    let registry = FactoryRegistry::global();
    registry
        .register("factory_test::Global", || Component::new("Global"))
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            thread::spawn(|| {
                let registry = FactoryRegistry::global();
                let component = registry.create("factory_test::Global").unwrap();
                assert_eq!(component.extension_name(), "Global");
                registry.class_names()
            })
        })
        .collect();

    for handle in handles {
        let names = handle.join().unwrap();
        assert!(names.split(';').any(|name| name == "factory_test::Global"));
    }
}

#[test]
fn test_concurrent_registration() {
    let registry = FactoryRegistry::new();
    thread::scope(|scope| {
        for i in 0..4 {
            let registry = &registry;
            scope.spawn(move || {
                for j in 0..10 {
                    let name = format!("C{}", i * 10 + j);
                    registry.register(name, || Component::new("C")).unwrap();
                }
            });
        }
    });
    assert_eq!(registry.len(), 40);
    // racing duplicates: exactly one wins
    let wins: usize = thread::scope(|scope| {
        let attempts: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| registry.register("Dup", || Component::new("Dup")).is_ok()))
            .collect();
        attempts.into_iter().map(|h| usize::from(h.join().unwrap())).sum()
    });
    assert_eq!(wins, 1);
}
