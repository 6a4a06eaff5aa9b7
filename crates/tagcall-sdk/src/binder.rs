//! Argument binding
//!
//! A [`Binder`] couples a handler's [`Signature`] with a type-erased thunk
//! that reads the parameters, invokes the handler and stages its outputs.
//! Thunks are normally generated by the `#[handler]` attribute or the
//! `bind!` macro; they follow one protocol:
//!
//! 1. read every parameter with its declared native type (`?` on mismatch)
//! 2. invoke the handler
//! 3. stage the return value and every in/out parameter
//! 4. commit all staged values
//!
//! Nothing is written until every output converted successfully.

use crate::accessor::Accessor;
use crate::error::{CallError, CallResult};
use crate::signature::Signature;

/// Type-erased handler invocation
pub type Thunk = Box<dyn FnMut(Option<&mut Accessor<'_>>, &mut [Accessor<'_>]) -> CallResult<()>>;

/// A handler bound to its signature.
pub struct Binder {
    signature: Signature,
    thunk: Thunk,
}

impl Binder {
    /// Bind a thunk to its signature.
    ///
    /// The thunk may assume `params.len() == signature.arity()`.
    pub fn new<F>(signature: Signature, thunk: F) -> Self
    where
        F: FnMut(Option<&mut Accessor<'_>>, &mut [Accessor<'_>]) -> CallResult<()> + 'static,
    {
        Binder {
            signature,
            thunk: Box::new(thunk),
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Convert, invoke, and write back.
    ///
    /// Fails with `ArityMismatch` before touching any slot when the host
    /// supplied the wrong number of parameters. A function called without a
    /// return slot still runs; its value is dropped.
    pub fn bind_and_call(
        &mut self,
        return_slot: Option<&mut Accessor<'_>>,
        params: &mut [Accessor<'_>],
    ) -> CallResult<bool> {
        let expected = self.signature.arity();
        if params.len() != expected {
            return Err(CallError::ArityMismatch {
                expected,
                got: params.len(),
            });
        }

        if self.signature.is_function() && return_slot.is_none() {
            tracing::trace!("no return slot, result will be discarded");
        }

        (self.thunk)(return_slot, params)?;
        Ok(true)
    }
}

impl std::fmt::Debug for Binder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binder")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}
