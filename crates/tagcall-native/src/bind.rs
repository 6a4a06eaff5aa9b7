// bind! proc-macro implementation
//
// Turns a closure with fully annotated parameters into a
// `tagcall_sdk::Binder`. Closures are how bound methods are expressed: the
// closure captures the receiver (usually an `Rc<RefCell<_>>`).

use proc_macro2::TokenStream;
use quote::quote;
use syn::{ExprClosure, Pat, Result};

use crate::handler::return_type;
use crate::params;

/// Expands `bind!(|a: T, b: &mut U| -> R { ... })`.
///
/// A missing return annotation makes the closure a procedure; the generated
/// code binds its result to `()` so a value-returning body is rejected.
pub fn expand_bind(closure: ExprClosure) -> Result<TokenStream> {
    if let Some(asyncness) = &closure.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "async closures cannot be used as handlers",
        ));
    }

    let mut shapes = Vec::with_capacity(closure.inputs.len());
    for input in &closure.inputs {
        let Pat::Type(pat_type) = input else {
            return Err(syn::Error::new_spanned(
                input,
                "handler closure parameters need a type annotation, e.g. `|s: WideString|`",
            ));
        };
        if !matches!(&*pat_type.pat, Pat::Ident(_) | Pat::Wild(_)) {
            return Err(syn::Error::new_spanned(
                &pat_type.pat,
                "Only simple identifiers are supported as arguments",
            ));
        }
        shapes.push(params::classify(&pat_type.ty)?);
    }

    let ret = return_type(&closure.output);
    let binder = params::binder(&shapes, &ret, quote! { __handler });

    Ok(quote! {
        {
            #[allow(unused_mut)]
            let mut __handler = #closure;
            #binder
        }
    })
}
