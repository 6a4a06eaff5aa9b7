//! Example tagcall components
//!
//! `Component1` exposes a single function, `Ping` (`Пинг`), that echoes its
//! wide-string argument back and remembers it. The read-only `LastPing`
//! (`ПоследнийПинг`) property returns the remembered message.
//!
//! ```ignore
//! let registry = FactoryRegistry::new();
//! tagcall_examples::register(&registry)?;
//! let mut component = registry.create("Component1").unwrap();
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use tagcall_sdk::{
    bind, Component, FactoryRegistry, Method, Property, RegistryError, WideString,
};

/// Name `Component1` registers under
pub const COMPONENT1: &str = "Component1";

/// Build a fresh `Component1`
pub fn component1() -> Component {
    let last_ping = Rc::new(RefCell::new(WideString::new()));
    let mut component = Component::new(COMPONENT1);

    let remembered = last_ping.clone();
    component.add_property(
        Property::new("LastPing", "ПоследнийПинг")
            .with_getter(move || remembered.borrow().clone()),
    );
    component.add_method(Method::new("Ping", "Пинг").with_handler(bind!(
        move |message: &[u16]| -> WideString {
            let message = WideString::from(message);
            *last_ping.borrow_mut() = message.clone();
            message
        }
    )));

    component
}

/// Register every example component
pub fn register(registry: &FactoryRegistry) -> Result<(), RegistryError> {
    registry.register(COMPONENT1, component1)?;
    tracing::debug!(classes = %registry.class_names(), "example components registered");
    Ok(())
}
