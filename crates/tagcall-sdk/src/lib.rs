//! Tagcall SDK - tagged-value marshaling and dispatch for native add-in components
//!
//! The host talks to a component only through ordinals and [`TaggedValue`]
//! slots. This crate turns those slots into typed Rust arguments, calls the
//! registered handler, and writes results and in/out parameters back.
//!
//! # Example
//!
//! ```ignore
//! use tagcall_sdk::{bind, handler, Component, Method, WideString};
//!
//! #[handler]
//! fn swap_and_increment(flag: &mut bool, count: &mut i32) {
//!     *flag = !*flag;
//!     *count += 1;
//! }
//!
//! let mut component = Component::new("Demo");
//! component.add_method(
//!     Method::new("Swap", "Поменять").with_handler(swap_and_increment_handler()),
//! );
//! component.add_method(
//!     Method::new("Echo", "Эхо").with_handler(bind!(|s: WideString| -> WideString { s })),
//! );
//! ```

// Generated code refers to `::tagcall_sdk`, including inside this crate
extern crate self as tagcall_sdk;

pub mod accessor;
pub mod allocator;
pub mod binder;
pub mod calendar;
pub mod component;
pub mod convert;
pub mod error;
pub mod factory;
pub mod method;
pub mod names;
pub mod property;
pub mod signature;
pub mod value;
pub mod wide;

pub use accessor::Accessor;
pub use allocator::Allocator;
pub use binder::Binder;
pub use component::{Component, API_VERSION};
pub use convert::{DefaultValue, FromTagged, IntoTagged, NativeKind, NativeType};
pub use error::{CallError, CallResult, RegistryError};
pub use factory::FactoryRegistry;
pub use method::Method;
pub use names::Names;
pub use property::Property;
pub use signature::{ParamSpec, PassMode, ReturnKind, Returns, Signature};
pub use value::{FloatTag, IntTag, TaggedValue, Tm, VarType};
pub use wide::WideString;

#[cfg(feature = "macros")]
pub use tagcall_native::{bind, handler};
