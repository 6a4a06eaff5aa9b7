//! End-to-end tests for Component1 through the factory registry

use std::alloc::Layout;
use std::cell::RefCell;
use std::ptr::NonNull;
use std::rc::Rc;

use tagcall_sdk::{Allocator, FactoryRegistry, TaggedValue, VarType};

/// Allocator that frees everything it handed out when dropped
#[derive(Default)]
struct TestAllocator {
    blocks: RefCell<Vec<(NonNull<u8>, Layout)>>,
}

impl Allocator for TestAllocator {
    fn alloc(&self, size: usize) -> Option<NonNull<u8>> {
        let layout = Layout::from_size_align(size.max(1), 8).ok()?;
        let ptr = NonNull::new(unsafe { std::alloc::alloc(layout) })?;
        self.blocks.borrow_mut().push((ptr, layout));
        Some(ptr)
    }
}

impl Drop for TestAllocator {
    fn drop(&mut self) {
        for (ptr, layout) in self.blocks.borrow_mut().drain(..) {
            unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) };
        }
    }
}

fn registry() -> FactoryRegistry {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let registry = FactoryRegistry::new();
    tagcall_examples::register(&registry).unwrap();
    registry
}

#[test]
fn test_registered_names() {
    let registry = registry();
    assert_eq!(registry.class_names(), "Component1");
    assert!(tagcall_examples::register(&registry).is_err());
}

#[test]
fn test_ping_echoes_wide_string() {
    let registry = registry();
    let mut component = registry.create("Component1").unwrap();
    component.set_allocator(Rc::new(TestAllocator::default()));

    let ping = component.find_method("Пинг").unwrap();
    assert_eq!(component.find_method("Ping"), Some(ping));
    assert!(component.has_return_value(ping));
    assert_eq!(component.param_count(ping), 1);

    let mut text: Vec<u16> = "Test".encode_utf16().collect();
    let mut params = [unsafe { TaggedValue::from_wide_raw(text.as_mut_ptr(), 4) }];
    let mut ret = TaggedValue::empty();

    assert!(component.call_as_function(ping, &mut ret, &mut params));
    assert_eq!(ret.var_type(), Some(VarType::Pwstr));
    assert_eq!(ret.wide_units(), Some(text.as_slice()));
    assert_ne!(ret.buffer_ptr(), text.as_ptr() as *const u8);
    assert!(!component.has_error());
}

#[test]
fn test_ping_as_procedure_is_rejected() {
    let mut component = registry().create("Component1").unwrap();
    let ping = component.find_method("Ping").unwrap();
    let mut params = [TaggedValue::empty()];
    assert!(!component.call_as_procedure(ping, &mut params));
    assert!(!component.has_error());
}

#[test]
fn test_ping_with_wrong_type_sets_error() {
    let mut component = registry().create("Component1").unwrap();
    component.set_allocator(Rc::new(TestAllocator::default()));
    let ping = component.find_method("Ping").unwrap();

    let mut params = [TaggedValue::i32(5)];
    let mut ret = TaggedValue::empty();
    assert!(!component.call_as_function(ping, &mut ret, &mut params));
    assert!(ret.is_empty());
    assert!(component.has_error());
    assert!(component.error_message().contains("wide string"));
}

#[test]
fn test_last_ping_property() {
    let mut component = registry().create("Component1").unwrap();
    component.set_allocator(Rc::new(TestAllocator::default()));
    let last_ping = component.find_property("LastPing").unwrap();
    assert_eq!(component.find_property("ПоследнийПинг"), Some(last_ping));
    assert!(component.is_property_readable(last_ping));
    assert!(!component.is_property_writable(last_ping));

    let mut slot = TaggedValue::empty();
    assert!(component.get_property(last_ping, &mut slot));
    assert_eq!(slot.var_type(), Some(VarType::Pwstr));
    assert_eq!(slot.wide_units(), Some(&[][..]));

    let ping = component.find_method("Ping").unwrap();
    let mut text: Vec<u16> = "Hello".encode_utf16().collect();
    let mut params = [unsafe { TaggedValue::from_wide_raw(text.as_mut_ptr(), 5) }];
    let mut ret = TaggedValue::empty();
    assert!(component.call_as_function(ping, &mut ret, &mut params));

    let mut slot = TaggedValue::empty();
    assert!(component.get_property(last_ping, &mut slot));
    assert_eq!(slot.wide_units(), Some(text.as_slice()));

    let mut value = TaggedValue::i32(1);
    assert!(!component.set_property(last_ping, &mut value));
    assert!(!component.has_error());
}
