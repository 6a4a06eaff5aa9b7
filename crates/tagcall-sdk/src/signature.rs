//! Handler signature descriptors
//!
//! A [`Signature`] is computed once when a handler is bound, from the
//! handler's static parameter and return types (see the `#[handler]` and
//! `bind!` macros). It never changes afterwards.

use std::time::SystemTime;

use crate::accessor::Accessor;
use crate::error::{CallError, CallResult};
use crate::convert::NativeType;
use crate::value::{Tm, TaggedValue};
use crate::wide::WideString;

/// Whether a handler produces a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnKind {
    /// No return value
    Procedure,
    /// Returns a value into the host's return slot
    Function,
}

/// How a parameter is passed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassMode {
    /// Read before the call, never written back
    In,
    /// Read before the call and written back after it
    InOut,
}

/// One parameter of a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamSpec {
    pub kind: NativeType,
    pub mode: PassMode,
}

impl ParamSpec {
    /// In-only parameter
    pub const fn input(kind: NativeType) -> Self {
        ParamSpec {
            kind,
            mode: PassMode::In,
        }
    }

    /// In/out parameter
    pub const fn in_out(kind: NativeType) -> Self {
        ParamSpec {
            kind,
            mode: PassMode::InOut,
        }
    }
}

/// Static metadata about a handler
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    returns: ReturnKind,
    params: Vec<ParamSpec>,
}

impl Signature {
    pub fn new(returns: ReturnKind, params: Vec<ParamSpec>) -> Self {
        Signature { returns, params }
    }

    /// Number of parameters
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn returns(&self) -> ReturnKind {
        self.returns
    }

    pub fn is_function(&self) -> bool {
        self.returns == ReturnKind::Function
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Number of in/out parameters
    pub fn in_out_count(&self) -> usize {
        self.params
            .iter()
            .filter(|p| p.mode == PassMode::InOut)
            .count()
    }
}

// ============================================================================
// Return values
// ============================================================================

/// Handler return type.
///
/// `()` makes a procedure. Native values make a function. `Result<T, E>`
/// has the kind of `T`; its `Err` becomes a `HandlerFailure` carrying the
/// error's display text.
pub trait Returns {
    /// Procedure or function
    const KIND: ReturnKind;

    /// Stage the value for the return slot.
    ///
    /// Returns `Ok(None)` for procedures and when there is no slot to write.
    fn stage_return(self, slot: Option<&Accessor<'_>>) -> CallResult<Option<TaggedValue>>;
}

impl Returns for () {
    const KIND: ReturnKind = ReturnKind::Procedure;

    fn stage_return(self, _: Option<&Accessor<'_>>) -> CallResult<Option<TaggedValue>> {
        Ok(None)
    }
}

macro_rules! returns_value {
    ($($ty:ty),* $(,)?) => {
        $(impl Returns for $ty {
            const KIND: ReturnKind = ReturnKind::Function;

            fn stage_return(self, slot: Option<&Accessor<'_>>) -> CallResult<Option<TaggedValue>> {
                slot.map(|slot| slot.stage(&self)).transpose()
            }
        })*
    };
}

returns_value!(bool, i32, f64, Tm, SystemTime, String, WideString, Vec<u8>);

impl<T: Returns, E: std::fmt::Display> Returns for Result<T, E> {
    const KIND: ReturnKind = T::KIND;

    fn stage_return(self, slot: Option<&Accessor<'_>>) -> CallResult<Option<TaggedValue>> {
        self.map_err(CallError::handler)?.stage_return(slot)
    }
}

/// Assign a staged return value to the host's return slot, if both exist
pub fn commit_return(slot: Option<&mut Accessor<'_>>, staged: Option<TaggedValue>) {
    if let (Some(slot), Some(value)) = (slot, staged) {
        slot.commit(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_kinds() {
        assert_eq!(<() as Returns>::KIND, ReturnKind::Procedure);
        assert_eq!(<i32 as Returns>::KIND, ReturnKind::Function);
        assert_eq!(<Result<(), String> as Returns>::KIND, ReturnKind::Procedure);
        assert_eq!(<Result<WideString, String> as Returns>::KIND, ReturnKind::Function);
    }

    #[test]
    fn test_err_becomes_handler_failure() {
        let r: Result<i32, &str> = Err("boom");
        assert!(matches!(
            r.stage_return(None),
            Err(CallError::HandlerFailure(msg)) if msg == "boom"
        ));
    }

    #[test]
    fn test_value_without_slot_is_discarded() {
        assert!(matches!(String::from("x").stage_return(None), Ok(None)));
    }

    #[test]
    fn test_in_out_count() {
        let sig = Signature::new(
            ReturnKind::Procedure,
            vec![
                ParamSpec::in_out(NativeType::Bool),
                ParamSpec::input(NativeType::Int),
                ParamSpec::in_out(NativeType::Blob),
            ],
        );
        assert_eq!(sig.arity(), 3);
        assert_eq!(sig.in_out_count(), 2);
        assert!(!sig.is_function());
    }
}
