//! Properties exposed to the host

use crate::accessor::Accessor;
use crate::binder::Binder;
use crate::convert::{FromTagged, NativeKind};
use crate::error::CallResult;
use crate::names::Names;
use crate::signature::{commit_return, ParamSpec, ReturnKind, Returns, Signature};

/// A named property with an optional getter and setter.
///
/// Getters take no arguments and return a value; setters take one value
/// and return nothing. Either rule broken is a compile error.
#[derive(Debug)]
pub struct Property {
    names: Names,
    getter: Option<Binder>,
    setter: Option<Binder>,
}

impl Property {
    pub fn new(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Property {
            names: Names::new(name, alias),
            getter: None,
            setter: None,
        }
    }

    /// Attach a getter
    pub fn with_getter<F, R>(mut self, mut getter: F) -> Self
    where
        F: FnMut() -> R + 'static,
        R: Returns,
    {
        const {
            assert!(
                matches!(R::KIND, ReturnKind::Function),
                "property getter must return a value"
            )
        };
        let signature = Signature::new(ReturnKind::Function, Vec::new());
        self.getter = Some(Binder::new(signature, move |ret, _params| {
            let staged = getter().stage_return(ret.as_deref())?;
            commit_return(ret, staged);
            Ok(())
        }));
        self
    }

    /// Attach a setter
    pub fn with_setter<F, T, R>(mut self, mut setter: F) -> Self
    where
        F: FnMut(T) -> R + 'static,
        T: for<'v> FromTagged<'v> + NativeKind,
        R: Returns,
    {
        const {
            assert!(
                matches!(R::KIND, ReturnKind::Procedure),
                "property setter must not return a value"
            )
        };
        let signature = Signature::new(ReturnKind::Procedure, vec![ParamSpec::input(T::KIND)]);
        self.setter = Some(Binder::new(signature, move |_ret, params| {
            let value: T = params[0].read()?;
            setter(value).stage_return(None)?;
            Ok(())
        }));
        self
    }

    pub fn names(&self) -> &Names {
        &self.names
    }

    pub fn is_readable(&self) -> bool {
        self.getter.is_some()
    }

    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    /// Read the property into `slot`. `Ok(false)` if there is no getter.
    pub fn call_getter(&mut self, slot: &mut Accessor<'_>) -> CallResult<bool> {
        match self.getter.as_mut() {
            Some(getter) => getter.bind_and_call(Some(slot), &mut []),
            None => Ok(false),
        }
    }

    /// Write `value` to the property. `Ok(false)` if there is no setter.
    pub fn call_setter(&mut self, value: &mut Accessor<'_>) -> CallResult<bool> {
        match self.setter.as_mut() {
            Some(setter) => setter.bind_and_call(None, std::slice::from_mut(value)),
            None => Ok(false),
        }
    }
}
