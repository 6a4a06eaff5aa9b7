// tagcall-native: signature introspection macros for tagcall handlers
//
// Provides proc-macros that derive a handler's signature at build time and
// generate the argument binding code:
// - #[handler] - Wraps a free function
// - bind! - Wraps a closure with annotated parameters
//
// Example:
// ```
// use tagcall_sdk::{bind, handler};
//
// #[handler]
// fn add(a: i32, b: i32) -> i32 {
//     a + b
// }
//
// let add = add_handler();
// let echo = bind!(|s: WideString| -> WideString { s });
// ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, ExprClosure, ItemFn};

mod bind;
mod handler;
mod params;

/// Marks a free function as a tagcall handler.
///
/// Generates a sibling constructor `<name>_handler() -> tagcall_sdk::Binder`
/// that:
/// - Records the handler's signature (arity, native types, return kind)
/// - Reads each parameter with its declared native type
/// - Calls the function
/// - Stages the return value and every `&mut` parameter, then writes them
///   back together
///
/// Parameter types decide how a parameter is passed: `T` and `&T` are
/// in-only, `&str`, `&[u8]` and `&[u16]` are borrowed views, `&mut T` is
/// in/out. `self` receivers are rejected.
///
/// # Example
///
/// ```ignore
/// #[handler]
/// fn swap_and_increment(flag: &mut bool, count: &mut i32) {
///     *flag = !*flag;
///     *count += 1;
/// }
///
/// let method = Method::new("Swap", "Поменять").with_handler(swap_and_increment_handler());
/// ```
#[proc_macro_attribute]
pub fn handler(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    handler::expand_handler(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Builds a `tagcall_sdk::Binder` from a closure.
///
/// Every parameter needs a type annotation; the same passing rules as
/// `#[handler]` apply. Without a `-> R` annotation the closure is a
/// procedure.
///
/// # Example
///
/// ```ignore
/// let state = Rc::new(RefCell::new(WideString::new()));
/// let last = state.clone();
/// let ping = bind!(move |s: WideString| -> WideString {
///     *last.borrow_mut() = s.clone();
///     s
/// });
/// ```
#[proc_macro]
pub fn bind(input: TokenStream) -> TokenStream {
    let closure = parse_macro_input!(input as ExprClosure);
    bind::expand_bind(closure)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
