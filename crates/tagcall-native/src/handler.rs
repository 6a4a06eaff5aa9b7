// #[handler] proc-macro implementation
//
// Keeps the annotated free function and emits a sibling `<name>_handler()`
// constructor returning a `tagcall_sdk::Binder` for it.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{FnArg, ItemFn, Pat, Result, ReturnType, Type};

use crate::params;

/// Expands the #[handler] attribute macro.
///
/// Example expansion:
/// ```ignore
/// // Input:
/// #[handler]
/// fn bump(count: &mut i32) {
///     *count += 1;
/// }
///
/// // Output:
/// fn bump(count: &mut i32) {
///     *count += 1;
/// }
///
/// fn bump_handler() -> ::tagcall_sdk::Binder {
///     ::tagcall_sdk::Binder::new(signature, move |__ret, __params| {
///         let mut __arg0: i32 = __params[0usize].read()?;
///         let __result: () = bump(&mut __arg0);
///         // stage return value and __arg0, then commit both
///     })
/// }
/// ```
pub fn expand_handler(func: ItemFn) -> Result<TokenStream> {
    let sig = &func.sig;
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "async functions cannot be used as handlers",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "generic functions cannot be used as handlers",
        ));
    }
    if let Some(variadic) = &sig.variadic {
        return Err(syn::Error::new_spanned(variadic, "variadic functions are not supported"));
    }

    let mut shapes = Vec::new();
    for arg in &sig.inputs {
        match arg {
            FnArg::Typed(pat_type) => {
                if !matches!(&*pat_type.pat, Pat::Ident(_) | Pat::Wild(_)) {
                    return Err(syn::Error::new_spanned(
                        &pat_type.pat,
                        "Only simple identifiers are supported as arguments",
                    ));
                }
                shapes.push(params::classify(&pat_type.ty)?);
            }
            FnArg::Receiver(_) => {
                return Err(syn::Error::new_spanned(
                    arg,
                    "Methods (self) are not supported in #[handler]; capture the receiver in a bind! closure",
                ));
            }
        }
    }

    let ret = return_type(&sig.output);
    let func_name = &sig.ident;
    let vis = &func.vis;
    let ctor_name = format_ident!("{}_handler", func_name);
    let binder = params::binder(&shapes, &ret, quote! { #func_name });
    let doc = format!("Binder for [`{}`]", func_name);

    Ok(quote! {
        #func

        #[doc = #doc]
        #vis fn #ctor_name() -> ::tagcall_sdk::Binder {
            #binder
        }
    })
}

/// Declared return type, `()` when omitted
pub fn return_type(output: &ReturnType) -> Type {
    match output {
        ReturnType::Default => syn::parse_quote!(()),
        ReturnType::Type(_, ty) => (**ty).clone(),
    }
}
