//! Error types for conversion and dispatch

use crate::convert::NativeType;

/// Result type for conversion and dispatch calls
pub type CallResult<T> = Result<T, CallError>;

/// Failures raised while marshaling values or dispatching a call.
///
/// The first three variants come from the conversion/binding layer and are
/// a closed set. Only `HandlerFailure` carries an arbitrary message: it is
/// whatever the wrapped business logic reported.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CallError {
    /// Requested native type cannot be produced from the slot's current tag
    #[error("Type conversion error: expected {expected}, found {found}")]
    TypeMismatch {
        /// Native type the caller asked for
        expected: NativeType,
        /// Name of the tag found in the slot
        found: &'static str,
    },

    /// Supplied parameter count differs from the handler's arity
    #[error("Invalid number of params: expected {expected}, got {got}")]
    ArityMismatch {
        /// Declared arity
        expected: usize,
        /// Number of parameters supplied by the host
        got: usize,
    },

    /// Output buffer could not be obtained from the host allocator
    #[error("Memory allocation of {size} bytes failed")]
    AllocationFailure {
        /// Requested byte count
        size: usize,
    },

    /// The handler itself reported an error
    #[error("{0}")]
    HandlerFailure(String),
}

impl CallError {
    /// Build a `HandlerFailure` from anything printable
    pub fn handler(message: impl ToString) -> Self {
        CallError::HandlerFailure(message.to_string())
    }
}

/// Factory registry errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A constructor is already registered under this name
    #[error("Component '{0}' is already registered")]
    AlreadyRegistered(String),
}
