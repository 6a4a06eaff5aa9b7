//! Conversions between tagged slots and native Rust types
//!
//! Reading goes through [`FromTagged`], which checks the slot's tag against
//! the native type's accepted set before touching the payload. Writing goes
//! through [`IntoTagged`], which builds a detached [`TaggedValue`] (allocating
//! string and blob buffers through the host allocator) that the caller then
//! assigns to the slot in one step.
//!
//! | Native type | Rust types | Accepted tags | Written as |
//! |---|---|---|---|
//! | boolean | `bool` | Bool | Bool |
//! | integer | `i32` | I2, I4, Error, Ui1, R4, R8 | I4 |
//! | float | `f64` | I2, I4, Error, Ui1, R4, R8 | R8 |
//! | timestamp | `Tm` | Tm, Date | Tm |
//! | instant | `SystemTime` | Tm, Date | Tm |
//! | narrow string | `String`, `&str` | Pstr | Pstr |
//! | wide string | `WideString`, `&[u16]` | Pwstr | Pwstr |
//! | blob | `Vec<u8>`, `&[u8]` | Blob | Blob |

use std::fmt;
use std::ptr::NonNull;
use std::time::SystemTime;

use crate::allocator::{alloc_for, Allocator};
use crate::calendar;
use crate::error::{CallError, CallResult};
use crate::value::{Tm, TaggedValue, VarType};
use crate::wide::WideString;

// ============================================================================
// Native type classification
// ============================================================================

/// Native type a handler parameter or return value converts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    /// `bool`
    Bool,
    /// `i32`
    Int,
    /// `f64`
    Float,
    /// Broken-down calendar time (`Tm`)
    Timestamp,
    /// Absolute point in time (`SystemTime`)
    Instant,
    /// UTF-8 narrow string
    NarrowString,
    /// UTF-16 wide string
    WideString,
    /// Opaque byte blob
    Blob,
}

impl NativeType {
    /// Check whether a slot carrying `tag` can be read as this type
    pub const fn accepts(self, tag: VarType) -> bool {
        match self {
            NativeType::Bool => matches!(tag, VarType::Bool),
            NativeType::Int | NativeType::Float => {
                tag.is_integer() || matches!(tag, VarType::R4 | VarType::R8)
            }
            NativeType::Timestamp | NativeType::Instant => {
                matches!(tag, VarType::Tm | VarType::Date)
            }
            NativeType::NarrowString => matches!(tag, VarType::Pstr),
            NativeType::WideString => matches!(tag, VarType::Pwstr),
            NativeType::Blob => matches!(tag, VarType::Blob),
        }
    }

    /// Human-readable type name
    pub const fn name(self) -> &'static str {
        match self {
            NativeType::Bool => "boolean",
            NativeType::Int => "integer",
            NativeType::Float => "float",
            NativeType::Timestamp => "timestamp",
            NativeType::Instant => "instant",
            NativeType::NarrowString => "narrow string",
            NativeType::WideString => "wide string",
            NativeType::Blob => "blob",
        }
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static native type of a Rust type usable as a handler parameter.
pub trait NativeKind {
    /// Native type this Rust type converts to
    const KIND: NativeType;
}

macro_rules! native_kind {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(impl NativeKind for $ty {
            const KIND: NativeType = NativeType::$kind;
        })*
    };
}

native_kind! {
    bool => Bool,
    i32 => Int,
    f64 => Float,
    Tm => Timestamp,
    SystemTime => Instant,
    String => NarrowString,
    str => NarrowString,
    WideString => WideString,
    [u16] => WideString,
    Vec<u8> => Blob,
    [u8] => Blob,
}

impl<T: NativeKind + ?Sized> NativeKind for &T {
    const KIND: NativeType = T::KIND;
}

// ============================================================================
// Reading
// ============================================================================

/// Convert a tagged slot into a native value.
///
/// Implementations fail with `TypeMismatch` when the slot's tag is not in
/// the accepted set and never modify the slot. Borrowing implementations
/// (`&str`, `&[u16]`, `&[u8]`) return views into the host buffer.
pub trait FromTagged<'v>: Sized {
    /// Read the slot
    fn from_tagged(value: &'v TaggedValue) -> CallResult<Self>;
}

fn mismatch(expected: NativeType, value: &TaggedValue) -> CallError {
    CallError::TypeMismatch {
        expected,
        found: value.tag_name(),
    }
}

impl<'v> FromTagged<'v> for bool {
    fn from_tagged(value: &'v TaggedValue) -> CallResult<Self> {
        value.bool_field().ok_or_else(|| mismatch(NativeType::Bool, value))
    }
}

impl<'v> FromTagged<'v> for i32 {
    fn from_tagged(value: &'v TaggedValue) -> CallResult<Self> {
        match value.var_type() {
            Some(tag) if tag.is_integer() => value.int_field(),
            Some(VarType::R4 | VarType::R8) => value.float_field().map(|f| f as i32),
            _ => None,
        }
        .ok_or_else(|| mismatch(NativeType::Int, value))
    }
}

impl<'v> FromTagged<'v> for f64 {
    fn from_tagged(value: &'v TaggedValue) -> CallResult<Self> {
        match value.var_type() {
            Some(tag) if tag.is_integer() => value.int_field().map(f64::from),
            Some(VarType::R4 | VarType::R8) => value.float_field(),
            _ => None,
        }
        .ok_or_else(|| mismatch(NativeType::Float, value))
    }
}

fn read_tm(value: &TaggedValue) -> Option<Tm> {
    match value.var_type()? {
        VarType::Tm => value.tm_field(),
        VarType::Date => value.float_field().map(calendar::decompose),
        _ => None,
    }
}

impl<'v> FromTagged<'v> for Tm {
    fn from_tagged(value: &'v TaggedValue) -> CallResult<Self> {
        read_tm(value).ok_or_else(|| mismatch(NativeType::Timestamp, value))
    }
}

impl<'v> FromTagged<'v> for SystemTime {
    fn from_tagged(value: &'v TaggedValue) -> CallResult<Self> {
        read_tm(value)
            .map(|tm| calendar::local_instant(&tm))
            .ok_or_else(|| mismatch(NativeType::Instant, value))
    }
}

impl<'v> FromTagged<'v> for &'v str {
    fn from_tagged(value: &'v TaggedValue) -> CallResult<Self> {
        value
            .narrow_bytes()
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .ok_or_else(|| mismatch(NativeType::NarrowString, value))
    }
}

impl<'v> FromTagged<'v> for String {
    fn from_tagged(value: &'v TaggedValue) -> CallResult<Self> {
        <&str>::from_tagged(value).map(str::to_owned)
    }
}

impl<'v> FromTagged<'v> for &'v [u16] {
    fn from_tagged(value: &'v TaggedValue) -> CallResult<Self> {
        value
            .wide_units()
            .ok_or_else(|| mismatch(NativeType::WideString, value))
    }
}

impl<'v> FromTagged<'v> for WideString {
    fn from_tagged(value: &'v TaggedValue) -> CallResult<Self> {
        <&[u16]>::from_tagged(value).map(WideString::from)
    }
}

impl<'v> FromTagged<'v> for &'v [u8] {
    fn from_tagged(value: &'v TaggedValue) -> CallResult<Self> {
        value
            .blob_bytes()
            .ok_or_else(|| mismatch(NativeType::Blob, value))
    }
}

impl<'v> FromTagged<'v> for Vec<u8> {
    fn from_tagged(value: &'v TaggedValue) -> CallResult<Self> {
        <&[u8]>::from_tagged(value).map(<[u8]>::to_vec)
    }
}

// ============================================================================
// Writing
// ============================================================================

/// Convert a native value into a detached tagged slot.
///
/// Scalars never touch the allocator. Strings and blobs allocate their
/// buffer through `allocator`; strings get one zero terminator element
/// beyond the recorded length, blobs none.
pub trait IntoTagged {
    /// Build the slot contents
    fn into_tagged(&self, allocator: Option<&dyn Allocator>) -> CallResult<TaggedValue>;
}

impl<T: IntoTagged + ?Sized> IntoTagged for &T {
    fn into_tagged(&self, allocator: Option<&dyn Allocator>) -> CallResult<TaggedValue> {
        (**self).into_tagged(allocator)
    }
}

impl IntoTagged for bool {
    fn into_tagged(&self, _: Option<&dyn Allocator>) -> CallResult<TaggedValue> {
        Ok(TaggedValue::bool(*self))
    }
}

impl IntoTagged for i32 {
    fn into_tagged(&self, _: Option<&dyn Allocator>) -> CallResult<TaggedValue> {
        Ok(TaggedValue::i32(*self))
    }
}

impl IntoTagged for f64 {
    fn into_tagged(&self, _: Option<&dyn Allocator>) -> CallResult<TaggedValue> {
        Ok(TaggedValue::f64(*self))
    }
}

impl IntoTagged for Tm {
    fn into_tagged(&self, _: Option<&dyn Allocator>) -> CallResult<TaggedValue> {
        Ok(TaggedValue::tm(*self))
    }
}

impl IntoTagged for SystemTime {
    fn into_tagged(&self, _: Option<&dyn Allocator>) -> CallResult<TaggedValue> {
        calendar::local_tm(*self)
            .map(TaggedValue::tm)
            .ok_or(CallError::TypeMismatch {
                expected: NativeType::Instant,
                found: "instant outside the calendar range",
            })
    }
}

/// Copy `src` into a fresh host buffer, optionally followed by a zero element.
fn copy_out<T: Copy + Default>(
    allocator: Option<&dyn Allocator>,
    src: &[T],
    terminated: bool,
) -> CallResult<(NonNull<T>, u32)> {
    let count = src.len() + usize::from(terminated);
    let size = count * std::mem::size_of::<T>();
    let len = u32::try_from(src.len()).map_err(|_| CallError::AllocationFailure { size })?;
    let ptr = alloc_for::<T>(allocator, size)?;
    // SAFETY: the allocator returned `size` writable bytes aligned for T
    unsafe {
        std::ptr::copy_nonoverlapping(src.as_ptr(), ptr.as_ptr(), src.len());
        if terminated {
            ptr.as_ptr().add(src.len()).write(T::default());
        }
    }
    Ok((ptr, len))
}

impl IntoTagged for str {
    fn into_tagged(&self, allocator: Option<&dyn Allocator>) -> CallResult<TaggedValue> {
        let (ptr, len) = copy_out(allocator, self.as_bytes(), true)?;
        Ok(TaggedValue::from_allocated_bytes(VarType::Pstr, ptr, len))
    }
}

impl IntoTagged for String {
    fn into_tagged(&self, allocator: Option<&dyn Allocator>) -> CallResult<TaggedValue> {
        self.as_str().into_tagged(allocator)
    }
}

impl IntoTagged for [u16] {
    fn into_tagged(&self, allocator: Option<&dyn Allocator>) -> CallResult<TaggedValue> {
        let (ptr, len) = copy_out(allocator, self, true)?;
        Ok(TaggedValue::from_allocated_wide(ptr, len))
    }
}

impl IntoTagged for WideString {
    fn into_tagged(&self, allocator: Option<&dyn Allocator>) -> CallResult<TaggedValue> {
        self.as_units().into_tagged(allocator)
    }
}

impl IntoTagged for [u8] {
    fn into_tagged(&self, allocator: Option<&dyn Allocator>) -> CallResult<TaggedValue> {
        let (ptr, len) = copy_out(allocator, self, false)?;
        Ok(TaggedValue::from_allocated_bytes(VarType::Blob, ptr, len))
    }
}

impl IntoTagged for Vec<u8> {
    fn into_tagged(&self, allocator: Option<&dyn Allocator>) -> CallResult<TaggedValue> {
        self.as_slice().into_tagged(allocator)
    }
}

// ============================================================================
// Boxed default values
// ============================================================================

/// A native value of any supported type, stored as a parameter default.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Bool(bool),
    Int(i32),
    Float(f64),
    Timestamp(Tm),
    Instant(SystemTime),
    NarrowString(String),
    WideString(WideString),
    Blob(Vec<u8>),
}

impl DefaultValue {
    /// Native type of the stored value
    pub fn kind(&self) -> NativeType {
        match self {
            DefaultValue::Bool(_) => NativeType::Bool,
            DefaultValue::Int(_) => NativeType::Int,
            DefaultValue::Float(_) => NativeType::Float,
            DefaultValue::Timestamp(_) => NativeType::Timestamp,
            DefaultValue::Instant(_) => NativeType::Instant,
            DefaultValue::NarrowString(_) => NativeType::NarrowString,
            DefaultValue::WideString(_) => NativeType::WideString,
            DefaultValue::Blob(_) => NativeType::Blob,
        }
    }
}

impl IntoTagged for DefaultValue {
    fn into_tagged(&self, allocator: Option<&dyn Allocator>) -> CallResult<TaggedValue> {
        match self {
            DefaultValue::Bool(v) => v.into_tagged(allocator),
            DefaultValue::Int(v) => v.into_tagged(allocator),
            DefaultValue::Float(v) => v.into_tagged(allocator),
            DefaultValue::Timestamp(v) => v.into_tagged(allocator),
            DefaultValue::Instant(v) => v.into_tagged(allocator),
            DefaultValue::NarrowString(v) => v.into_tagged(allocator),
            DefaultValue::WideString(v) => v.into_tagged(allocator),
            DefaultValue::Blob(v) => v.into_tagged(allocator),
        }
    }
}

macro_rules! default_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for DefaultValue {
            fn from(v: $ty) -> Self {
                DefaultValue::$variant(v.into())
            }
        })*
    };
}

default_from! {
    bool => Bool,
    i32 => Int,
    f64 => Float,
    Tm => Timestamp,
    SystemTime => Instant,
    String => NarrowString,
    &str => NarrowString,
    WideString => WideString,
    Vec<u8> => Blob,
    &[u8] => Blob,
}
