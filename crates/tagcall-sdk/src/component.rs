//! Component surface
//!
//! A [`Component`] owns an ordered list of methods and properties and answers
//! the host's ordinal-based calls against raw [`TaggedValue`] slots. It is
//! the failure boundary: conversion errors, handler errors and handler panics
//! are all caught here, recorded into a sticky last-error message, and
//! reported to the host as a plain `false`.
//!
//! Every component starts with three built-in entries:
//!
//! | Kind | Name | Alias |
//! |---|---|---|
//! | property (read-only, boolean) | `HasError` | `ЕстьОшибка` |
//! | property (read-only, wide string) | `ErrorMessage` | `ОписаниеОшибки` |
//! | method (procedure, no params) | `ClearError` | `ОчиститьОшибку` |

use std::any::Any;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::accessor::Accessor;
use crate::allocator::Allocator;
use crate::binder::Binder;
use crate::error::{CallError, CallResult};
use crate::method::Method;
use crate::property::Property;
use crate::signature::{ReturnKind, Signature};
use crate::value::TaggedValue;
use crate::wide::WideString;

/// Native API version reported to the host
pub const API_VERSION: i32 = 2100;

/// Host-facing component: ordered methods and properties plus the error
/// channel.
pub struct Component {
    name: String,
    methods: Vec<Method>,
    properties: Vec<Property>,
    last_error: Rc<RefCell<String>>,
    allocator: Option<Rc<dyn Allocator>>,
}

impl Component {
    /// Create a component with the built-in error entries registered
    pub fn new(name: impl Into<String>) -> Self {
        let last_error = Rc::new(RefCell::new(String::new()));
        let mut component = Component {
            name: name.into(),
            methods: Vec::new(),
            properties: Vec::new(),
            last_error: last_error.clone(),
            allocator: None,
        };

        let state = last_error.clone();
        component.add_property(
            Property::new("HasError", "ЕстьОшибка").with_getter(move || !state.borrow().is_empty()),
        );
        let state = last_error.clone();
        component.add_property(
            Property::new("ErrorMessage", "ОписаниеОшибки")
                .with_getter(move || WideString::from(state.borrow().as_str())),
        );
        let clear = Binder::new(
            Signature::new(ReturnKind::Procedure, Vec::new()),
            move |_ret, _params| {
                last_error.borrow_mut().clear();
                Ok(())
            },
        );
        component.add_method(Method::new("ClearError", "ОчиститьОшибку").with_handler(clear));

        component
    }

    /// Name the component registers its extension under
    pub fn extension_name(&self) -> &str {
        &self.name
    }

    pub fn set_allocator(&mut self, allocator: Rc<dyn Allocator>) {
        self.allocator = Some(allocator);
    }

    pub fn allocator(&self) -> Option<&dyn Allocator> {
        self.allocator.as_deref()
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Append a method; returns its ordinal
    pub fn add_method(&mut self, method: Method) -> usize {
        self.methods.push(method);
        self.methods.len() - 1
    }

    /// Append a property; returns its ordinal
    pub fn add_property(&mut self, property: Property) -> usize {
        self.properties.push(property);
        self.properties.len() - 1
    }

    // ========================================================================
    // Error channel
    // ========================================================================

    pub fn has_error(&self) -> bool {
        !self.last_error.borrow().is_empty()
    }

    pub fn error_message(&self) -> String {
        self.last_error.borrow().clone()
    }

    pub fn clear_error(&self) {
        self.last_error.borrow_mut().clear();
    }

    /// Record a failure; replaces any earlier message
    pub fn set_error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(component = %self.name, error = %message, "component error recorded");
        *self.last_error.borrow_mut() = message;
    }

    fn settle(&self, operation: &str, result: CallResult<bool>) -> bool {
        match result {
            Ok(done) => done,
            Err(err) => {
                tracing::debug!(component = %self.name, operation, "call failed");
                self.set_error(err.to_string());
                false
            }
        }
    }

    // ========================================================================
    // Properties
    // ========================================================================

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Ordinal of the first property whose name or alias equals `name`
    pub fn find_property(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.names().matches(name))
    }

    pub fn property_name(&self, index: usize, alias: bool) -> Option<&str> {
        self.properties.get(index).map(|p| p.names().get(alias))
    }

    pub fn is_property_readable(&self, index: usize) -> bool {
        self.properties.get(index).is_some_and(Property::is_readable)
    }

    pub fn is_property_writable(&self, index: usize) -> bool {
        self.properties.get(index).is_some_and(Property::is_writable)
    }

    /// Read property `index` into `slot`
    pub fn get_property(&mut self, index: usize, slot: &mut TaggedValue) -> bool {
        let allocator = self.allocator.clone();
        let Some(property) = self.properties.get_mut(index) else {
            return false;
        };
        tracing::debug!(component = %self.name, property = property.names().name(), "get_property");
        let mut slot = Accessor::new(slot, allocator.as_deref());
        let result = guarded(|| property.call_getter(&mut slot));
        self.settle("get_property", result)
    }

    /// Write `slot` to property `index`
    pub fn set_property(&mut self, index: usize, slot: &mut TaggedValue) -> bool {
        let Some(property) = self.properties.get_mut(index) else {
            return false;
        };
        tracing::debug!(component = %self.name, property = property.names().name(), "set_property");
        let mut slot = Accessor::new(slot, None);
        let result = guarded(|| property.call_setter(&mut slot));
        self.settle("set_property", result)
    }

    // ========================================================================
    // Methods
    // ========================================================================

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    /// Ordinal of the first method whose name or alias equals `name`
    pub fn find_method(&self, name: &str) -> Option<usize> {
        self.methods.iter().position(|m| m.names().matches(name))
    }

    pub fn method_name(&self, index: usize, alias: bool) -> Option<&str> {
        self.methods.get(index).map(|m| m.names().get(alias))
    }

    /// Declared arity of method `index`, zero when out of range
    pub fn param_count(&self, index: usize) -> usize {
        self.methods.get(index).map_or(0, Method::param_count)
    }

    pub fn has_return_value(&self, index: usize) -> bool {
        self.methods.get(index).is_some_and(Method::is_function)
    }

    /// Write the default of parameter `param` of method `index` into `slot`
    pub fn param_default(&self, index: usize, param: usize, slot: &mut TaggedValue) -> bool {
        let allocator = self.allocator.clone();
        let Some(method) = self.methods.get(index) else {
            return false;
        };
        let mut slot = Accessor::new(slot, allocator.as_deref());
        let result = guarded(|| method.default_value(param, &mut slot));
        self.settle("param_default", result)
    }

    /// Call a procedure. Functions are rejected.
    pub fn call_as_procedure(&mut self, index: usize, params: &mut [TaggedValue]) -> bool {
        let allocator = self.allocator.clone();
        let Some(method) = self.methods.get_mut(index) else {
            return false;
        };
        if method.is_function() {
            return false;
        }
        tracing::debug!(component = %self.name, method = method.names().name(), "call_as_procedure");
        let mut params = Accessor::wrap_all(params, allocator.as_deref());
        let result = guarded(|| method.invoke(None, &mut params));
        self.settle("call_as_procedure", result)
    }

    /// Call a function, writing its result into `ret`. Procedures are
    /// rejected.
    pub fn call_as_function(
        &mut self,
        index: usize,
        ret: &mut TaggedValue,
        params: &mut [TaggedValue],
    ) -> bool {
        let allocator = self.allocator.clone();
        let Some(method) = self.methods.get_mut(index) else {
            return false;
        };
        if !method.is_function() {
            return false;
        }
        tracing::debug!(component = %self.name, method = method.names().name(), "call_as_function");
        let mut ret = Accessor::new(ret, allocator.as_deref());
        let mut params = Accessor::wrap_all(params, allocator.as_deref());
        let result = guarded(|| method.invoke(Some(&mut ret), &mut params));
        self.settle("call_as_function", result)
    }
}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name)
            .field("methods", &self.methods)
            .field("properties", &self.properties)
            .field("last_error", &self.last_error.borrow())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Panic boundary
// ============================================================================

fn guarded<F>(call: F) -> CallResult<bool>
where
    F: FnOnce() -> CallResult<bool>,
{
    panic::catch_unwind(AssertUnwindSafe(call))
        .unwrap_or_else(|payload| Err(CallError::HandlerFailure(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
