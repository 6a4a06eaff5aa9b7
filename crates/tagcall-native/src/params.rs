// Parameter classification and thunk generation shared by #[handler] and bind!
//
// Every handler parameter is classified by its declared type:
//
//   T          owned, read and passed by value
//   &T         read owned, passed by shared reference
//   &str       borrowed view into the host buffer (also &[u8], &[u16])
//   &mut T     in/out: read, passed by mutable reference, written back

use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::{Error, Ident, Result, Type};

/// How a parameter is read and passed
#[derive(Debug, Clone)]
pub enum Shape {
    /// `T`
    Owned(Type),
    /// `&T` with sized `T`; holds `T`
    Shared(Type),
    /// `&str` or `&[_]`; holds the unsized referent
    View(Type),
    /// `&mut T`; holds `T`
    InOut(Type),
}

impl Shape {
    /// Type whose `NativeKind` describes the parameter
    fn kind_type(&self) -> &Type {
        match self {
            Shape::Owned(ty) | Shape::Shared(ty) | Shape::View(ty) | Shape::InOut(ty) => ty,
        }
    }

    fn is_in_out(&self) -> bool {
        matches!(self, Shape::InOut(_))
    }
}

/// Classify a declared parameter type.
pub fn classify(ty: &Type) -> Result<Shape> {
    match ty {
        Type::Paren(inner) => classify(&inner.elem),
        Type::Group(inner) => classify(&inner.elem),
        Type::ImplTrait(_) => Err(Error::new_spanned(
            ty,
            "`impl Trait` parameters are not supported; use a concrete native type",
        )),
        Type::Reference(reference) => {
            let referent = (*reference.elem).clone();
            let view = is_unsized_view(&referent);
            match (reference.mutability.is_some(), view) {
                (true, true) => Err(Error::new_spanned(
                    ty,
                    "in/out parameters need an owned type; use `&mut String`, `&mut WideString` or `&mut Vec<u8>`",
                )),
                (true, false) => Ok(Shape::InOut(referent)),
                (false, true) => Ok(Shape::View(referent)),
                (false, false) => Ok(Shape::Shared(referent)),
            }
        }
        _ => Ok(Shape::Owned(ty.clone())),
    }
}

fn is_unsized_view(ty: &Type) -> bool {
    match ty {
        Type::Slice(_) => true,
        Type::Path(path) => path.qself.is_none() && path.path.is_ident("str"),
        _ => false,
    }
}

/// Generate the `Signature` expression for a handler
pub fn signature(shapes: &[Shape], ret: &Type) -> TokenStream {
    let specs = shapes.iter().map(|shape| {
        let ty = shape.kind_type();
        let kind = quote! { <#ty as ::tagcall_sdk::NativeKind>::KIND };
        if shape.is_in_out() {
            quote! { ::tagcall_sdk::ParamSpec::in_out(#kind) }
        } else {
            quote! { ::tagcall_sdk::ParamSpec::input(#kind) }
        }
    });

    quote! {
        ::tagcall_sdk::Signature::new(
            <#ret as ::tagcall_sdk::Returns>::KIND,
            ::std::vec![#(#specs),*],
        )
    }
}

/// Generate a `Binder` that reads every parameter, calls `callee`, then
/// stages and commits the return value and in/out parameters.
pub fn binder(shapes: &[Shape], ret: &Type, callee: TokenStream) -> TokenStream {
    let signature = signature(shapes, ret);
    let vars: Vec<Ident> = (0..shapes.len())
        .map(|i| format_ident!("__arg{}", i, span = Span::mixed_site()))
        .collect();
    let staged: Vec<Ident> = (0..shapes.len())
        .map(|i| format_ident!("__staged{}", i, span = Span::mixed_site()))
        .collect();

    let reads = shapes.iter().zip(&vars).enumerate().map(|(i, (shape, var))| match shape {
        Shape::Owned(ty) | Shape::Shared(ty) => quote! {
            let #var: #ty = __params[#i].read()?;
        },
        Shape::View(ty) => quote! {
            let #var: &#ty = __params[#i].read()?;
        },
        Shape::InOut(ty) => quote! {
            let mut #var: #ty = __params[#i].read()?;
        },
    });

    let args = shapes.iter().zip(&vars).map(|(shape, var)| match shape {
        Shape::Owned(_) | Shape::View(_) => quote! { #var },
        Shape::Shared(_) => quote! { &#var },
        Shape::InOut(_) => quote! { &mut #var },
    });

    let mut stages = Vec::new();
    let mut commits = Vec::new();
    for (i, shape) in shapes.iter().enumerate() {
        if shape.is_in_out() {
            let (var, out) = (&vars[i], &staged[i]);
            stages.push(quote! { let #out = __params[#i].stage(&#var)?; });
            commits.push(quote! { __params[#i].commit(#out); });
        }
    }

    quote! {
        ::tagcall_sdk::Binder::new(#signature, move |__ret, __params| {
            #(#reads)*
            let __result: #ret = #callee(#(#args),*);
            let __staged_ret = ::tagcall_sdk::Returns::stage_return(__result, __ret.as_deref())?;
            #(#stages)*
            ::tagcall_sdk::signature::commit_return(__ret, __staged_ret);
            #(#commits)*
            ::std::result::Result::Ok(())
        })
    }
}
