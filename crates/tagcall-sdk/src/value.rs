//! TaggedValue: the host's single-slot variant cell
//!
//! A `TaggedValue` is owned by the host and handed to the component by
//! mutable reference. It carries a raw type tag plus a payload union. The
//! conversion layer treats it as a dumb memory cell: it never frees string or
//! blob buffers referenced from a slot, and every typed accessor checks the
//! tag before touching the union.
//!
//! # Tags
//!
//! ```text
//! Empty=0  Null=1  I2=2  I4=3  R4=4  R8=5  Date=6  Tm=7  Pstr=8
//! Interface=9  Error=10  Bool=11  Variant=12  I1=13  Ui1=14  Ui2=15
//! Ui4=16  I8=17  Ui8=18  Int=19  Uint=20  Hresult=21  Pwstr=22  Blob=23
//! Clsid=24
//! ```
//!
//! Integer-like tags (I2, I4, Error, Ui1) keep their value in the 32-bit
//! integer member; float-like tags (R4, R8, Date) in the 64-bit float member.

use std::fmt;
use std::ptr::NonNull;

// ============================================================================
// Variant type tags
// ============================================================================

/// Host variant type tag.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarType {
    Empty = 0,
    Null = 1,
    I2 = 2,
    I4 = 3,
    R4 = 4,
    R8 = 5,
    Date = 6,
    Tm = 7,
    Pstr = 8,
    Interface = 9,
    Error = 10,
    Bool = 11,
    Variant = 12,
    I1 = 13,
    Ui1 = 14,
    Ui2 = 15,
    Ui4 = 16,
    I8 = 17,
    Ui8 = 18,
    Int = 19,
    Uint = 20,
    Hresult = 21,
    Pwstr = 22,
    Blob = 23,
    Clsid = 24,
}

impl VarType {
    const ALL: [VarType; 25] = [
        VarType::Empty,
        VarType::Null,
        VarType::I2,
        VarType::I4,
        VarType::R4,
        VarType::R8,
        VarType::Date,
        VarType::Tm,
        VarType::Pstr,
        VarType::Interface,
        VarType::Error,
        VarType::Bool,
        VarType::Variant,
        VarType::I1,
        VarType::Ui1,
        VarType::Ui2,
        VarType::Ui4,
        VarType::I8,
        VarType::Ui8,
        VarType::Int,
        VarType::Uint,
        VarType::Hresult,
        VarType::Pwstr,
        VarType::Blob,
        VarType::Clsid,
    ];

    /// Decode a raw tag. Returns `None` for values outside the enumeration.
    pub fn from_raw(raw: u16) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    /// Raw tag value
    pub const fn raw(self) -> u16 {
        self as u16
    }

    /// Short tag name used in diagnostics
    pub const fn name(self) -> &'static str {
        match self {
            VarType::Empty => "EMPTY",
            VarType::Null => "NULL",
            VarType::I2 => "I2",
            VarType::I4 => "I4",
            VarType::R4 => "R4",
            VarType::R8 => "R8",
            VarType::Date => "DATE",
            VarType::Tm => "TM",
            VarType::Pstr => "PSTR",
            VarType::Interface => "INTERFACE",
            VarType::Error => "ERROR",
            VarType::Bool => "BOOL",
            VarType::Variant => "VARIANT",
            VarType::I1 => "I1",
            VarType::Ui1 => "UI1",
            VarType::Ui2 => "UI2",
            VarType::Ui4 => "UI4",
            VarType::I8 => "I8",
            VarType::Ui8 => "UI8",
            VarType::Int => "INT",
            VarType::Uint => "UINT",
            VarType::Hresult => "HRESULT",
            VarType::Pwstr => "PWSTR",
            VarType::Blob => "BLOB",
            VarType::Clsid => "CLSID",
        }
    }

    /// Tags stored in the 32-bit integer member
    pub const fn is_integer(self) -> bool {
        matches!(self, VarType::I2 | VarType::I4 | VarType::Error | VarType::Ui1)
    }

    /// Tags stored in the 64-bit float member
    pub const fn is_float(self) -> bool {
        matches!(self, VarType::R4 | VarType::R8 | VarType::Date)
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tags whose value lives in the 32-bit integer member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntTag {
    I2,
    I4,
    Error,
    Ui1,
}

impl IntTag {
    pub const fn var_type(self) -> VarType {
        match self {
            IntTag::I2 => VarType::I2,
            IntTag::I4 => VarType::I4,
            IntTag::Error => VarType::Error,
            IntTag::Ui1 => VarType::Ui1,
        }
    }
}

/// Tags whose value lives in the 64-bit float member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatTag {
    R4,
    R8,
    Date,
}

impl FloatTag {
    pub const fn var_type(self) -> VarType {
        match self {
            FloatTag::R4 => VarType::R4,
            FloatTag::R8 => VarType::R8,
            FloatTag::Date => VarType::Date,
        }
    }
}

impl From<IntTag> for VarType {
    fn from(tag: IntTag) -> Self {
        tag.var_type()
    }
}

impl From<FloatTag> for VarType {
    fn from(tag: FloatTag) -> Self {
        tag.var_type()
    }
}

impl fmt::Display for IntTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.var_type().name())
    }
}

impl fmt::Display for FloatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.var_type().name())
    }
}

// ============================================================================
// Broken-down calendar time
// ============================================================================

/// Broken-down calendar time, field-compatible with C `struct tm`.
///
/// `year` counts from 1900 and `mon` from 0, as in C.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Tm {
    pub sec: i32,
    pub min: i32,
    pub hour: i32,
    pub mday: i32,
    pub mon: i32,
    pub year: i32,
    pub wday: i32,
    pub yday: i32,
    pub isdst: i32,
}

impl Tm {
    /// Build from a calendar date (`month` 1-12) and wall-clock time.
    /// Weekday, day-of-year and DST fields are left zero.
    pub const fn from_ymd_hms(year: i32, month: i32, day: i32, hour: i32, min: i32, sec: i32) -> Self {
        Tm {
            sec,
            min,
            hour,
            mday: day,
            mon: month - 1,
            year: year - 1900,
            wday: 0,
            yday: 0,
            isdst: 0,
        }
    }

    /// Full calendar year
    pub const fn full_year(&self) -> i32 {
        self.year + 1900
    }

    /// Month in 1-12
    pub const fn month(&self) -> i32 {
        self.mon + 1
    }
}

// ============================================================================
// Payload
// ============================================================================

#[repr(C)]
#[derive(Clone, Copy)]
struct RawBuf<T> {
    ptr: *mut T,
    len: u32,
}

#[repr(C)]
#[derive(Clone, Copy)]
union Payload {
    boolean: bool,
    int: i32,
    float: f64,
    tm: Tm,
    bytes: RawBuf<u8>,
    wide: RawBuf<u16>,
}

// ============================================================================
// TaggedValue
// ============================================================================

/// Host-owned variant slot.
///
/// Every safe constructor keeps tag and payload in agreement. The `unsafe`
/// buffer constructors exist for hosts (and tests) that place their own
/// buffers in a slot.
#[repr(C)]
pub struct TaggedValue {
    payload: Payload,
    tag: u16,
}

impl TaggedValue {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Empty slot
    pub const fn empty() -> Self {
        TaggedValue {
            payload: Payload { float: 0.0 },
            tag: VarType::Empty as u16,
        }
    }

    /// Boolean slot
    pub const fn bool(value: bool) -> Self {
        TaggedValue {
            payload: Payload { boolean: value },
            tag: VarType::Bool as u16,
        }
    }

    /// 32-bit integer slot (I4)
    pub const fn i32(value: i32) -> Self {
        Self::int_with_tag(IntTag::I4, value)
    }

    /// Integer slot under one of the integer-like tags (I2, I4, Error, Ui1).
    pub const fn int_with_tag(tag: IntTag, value: i32) -> Self {
        TaggedValue {
            payload: Payload { int: value },
            tag: tag.var_type() as u16,
        }
    }

    /// 64-bit float slot (R8)
    pub const fn f64(value: f64) -> Self {
        Self::float_with_tag(FloatTag::R8, value)
    }

    /// Float slot under one of the float-like tags (R4, R8, Date).
    pub const fn float_with_tag(tag: FloatTag, value: f64) -> Self {
        TaggedValue {
            payload: Payload { float: value },
            tag: tag.var_type() as u16,
        }
    }

    /// Numeric date slot: whole seconds since 0001-01-01T00:00:00
    pub const fn date(seconds: f64) -> Self {
        Self::float_with_tag(FloatTag::Date, seconds)
    }

    /// Broken-down timestamp slot
    pub const fn tm(value: Tm) -> Self {
        TaggedValue {
            payload: Payload { tm: value },
            tag: VarType::Tm as u16,
        }
    }

    /// Narrow string slot referencing a host buffer.
    ///
    /// # Safety
    /// `ptr` must be valid for reads of `len` bytes for as long as the slot
    /// is read, or null with `len == 0`.
    pub const unsafe fn from_narrow_raw(ptr: *mut u8, len: u32) -> Self {
        TaggedValue {
            payload: Payload {
                bytes: RawBuf { ptr, len },
            },
            tag: VarType::Pstr as u16,
        }
    }

    /// Wide string slot referencing a host buffer of UTF-16 code units.
    ///
    /// # Safety
    /// `ptr` must be aligned and valid for reads of `len` code units for as
    /// long as the slot is read, or null with `len == 0`.
    pub const unsafe fn from_wide_raw(ptr: *mut u16, len: u32) -> Self {
        TaggedValue {
            payload: Payload {
                wide: RawBuf { ptr, len },
            },
            tag: VarType::Pwstr as u16,
        }
    }

    /// Blob slot referencing a host buffer.
    ///
    /// # Safety
    /// Same contract as [`TaggedValue::from_narrow_raw`].
    pub const unsafe fn from_blob_raw(ptr: *mut u8, len: u32) -> Self {
        TaggedValue {
            payload: Payload {
                bytes: RawBuf { ptr, len },
            },
            tag: VarType::Blob as u16,
        }
    }

    /// Slot over a freshly allocated narrow string or blob buffer
    pub(crate) fn from_allocated_bytes(tag: VarType, ptr: NonNull<u8>, len: u32) -> Self {
        debug_assert!(matches!(tag, VarType::Pstr | VarType::Blob));
        TaggedValue {
            payload: Payload {
                bytes: RawBuf {
                    ptr: ptr.as_ptr(),
                    len,
                },
            },
            tag: tag as u16,
        }
    }

    /// Slot over a freshly allocated wide string buffer
    pub(crate) fn from_allocated_wide(ptr: NonNull<u16>, len: u32) -> Self {
        TaggedValue {
            payload: Payload {
                wide: RawBuf {
                    ptr: ptr.as_ptr(),
                    len,
                },
            },
            tag: VarType::Pwstr as u16,
        }
    }

    // ========================================================================
    // Tag access
    // ========================================================================

    /// Raw tag as stored by the host
    pub const fn raw_tag(&self) -> u16 {
        self.tag
    }

    /// Decoded tag, `None` for values outside [`VarType`]
    pub fn var_type(&self) -> Option<VarType> {
        VarType::from_raw(self.tag)
    }

    /// Tag name for diagnostics
    pub fn tag_name(&self) -> &'static str {
        self.var_type().map(VarType::name).unwrap_or("UNKNOWN")
    }

    /// Check if the slot is empty
    pub const fn is_empty(&self) -> bool {
        self.tag == VarType::Empty as u16
    }

    /// Overwrite the raw tag without touching the payload.
    ///
    /// # Safety
    /// The payload member selected by the new tag must be initialized.
    pub unsafe fn set_raw_tag(&mut self, raw: u16) {
        self.tag = raw;
    }

    /// Reset to the empty state
    pub fn reset(&mut self) {
        *self = TaggedValue::empty();
    }

    // ========================================================================
    // Typed field access
    // ========================================================================

    /// Boolean member, if the tag is Bool
    pub fn bool_field(&self) -> Option<bool> {
        match self.var_type()? {
            // SAFETY: Bool tag selects the boolean member
            VarType::Bool => Some(unsafe { self.payload.boolean }),
            _ => None,
        }
    }

    /// Integer member, if the tag is integer-like
    pub fn int_field(&self) -> Option<i32> {
        let tag = self.var_type()?;
        // SAFETY: integer-like tags select the int member
        tag.is_integer().then(|| unsafe { self.payload.int })
    }

    /// Float member, if the tag is float-like
    pub fn float_field(&self) -> Option<f64> {
        let tag = self.var_type()?;
        // SAFETY: float-like tags select the float member
        tag.is_float().then(|| unsafe { self.payload.float })
    }

    /// Timestamp member, if the tag is Tm
    pub fn tm_field(&self) -> Option<Tm> {
        match self.var_type()? {
            // SAFETY: Tm tag selects the tm member
            VarType::Tm => Some(unsafe { self.payload.tm }),
            _ => None,
        }
    }

    /// Narrow string bytes (without terminator), if the tag is Pstr
    pub fn narrow_bytes(&self) -> Option<&[u8]> {
        match self.var_type()? {
            // SAFETY: Pstr tag selects the bytes member
            VarType::Pstr => unsafe { byte_view(self.payload.bytes) },
            _ => None,
        }
    }

    /// Wide string code units (without terminator), if the tag is Pwstr
    pub fn wide_units(&self) -> Option<&[u16]> {
        match self.var_type()? {
            VarType::Pwstr => {
                // SAFETY: Pwstr tag selects the wide member
                let buf = unsafe { self.payload.wide };
                if buf.ptr.is_null() {
                    return (buf.len == 0).then_some(NO_UNITS);
                }
                // SAFETY: host guarantees `len` readable, aligned code units
                Some(unsafe { std::slice::from_raw_parts(buf.ptr, buf.len as usize) })
            }
            _ => None,
        }
    }

    /// Blob bytes, if the tag is Blob
    pub fn blob_bytes(&self) -> Option<&[u8]> {
        match self.var_type()? {
            // SAFETY: Blob tag selects the bytes member
            VarType::Blob => unsafe { byte_view(self.payload.bytes) },
            _ => None,
        }
    }

    /// Address of the string/blob buffer, null for every other tag
    pub fn buffer_ptr(&self) -> *const u8 {
        match self.var_type() {
            // SAFETY: tag selects the member read
            Some(VarType::Pstr | VarType::Blob) => unsafe { self.payload.bytes.ptr as *const u8 },
            Some(VarType::Pwstr) => unsafe { self.payload.wide.ptr as *const u8 },
            _ => std::ptr::null(),
        }
    }
}

const NO_BYTES: &[u8] = &[];
const NO_UNITS: &[u16] = &[];

/// # Safety
/// `buf` must be the active member and satisfy the host buffer contract.
unsafe fn byte_view<'a>(buf: RawBuf<u8>) -> Option<&'a [u8]> {
    if buf.ptr.is_null() {
        return (buf.len == 0).then_some(NO_BYTES);
    }
    Some(std::slice::from_raw_parts(buf.ptr, buf.len as usize))
}

impl Default for TaggedValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for TaggedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(tag) = self.var_type() else {
            return write!(f, "TaggedValue::Unknown(tag={})", self.tag);
        };
        match tag {
            VarType::Bool => write!(f, "TaggedValue::Bool({:?})", self.bool_field()),
            t if t.is_integer() => write!(f, "TaggedValue::{}({:?})", t, self.int_field()),
            t if t.is_float() => write!(f, "TaggedValue::{}({:?})", t, self.float_field()),
            VarType::Tm => write!(f, "TaggedValue::Tm({:?})", self.tm_field()),
            VarType::Pstr => write!(
                f,
                "TaggedValue::Pstr({:?})",
                self.narrow_bytes().map(String::from_utf8_lossy)
            ),
            VarType::Pwstr => write!(
                f,
                "TaggedValue::Pwstr({:?})",
                self.wide_units().map(String::from_utf16_lossy)
            ),
            VarType::Blob => write!(f, "TaggedValue::Blob({:?})", self.blob_bytes()),
            t => write!(f, "TaggedValue::{}", t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_roundtrip() {
        for raw in 0..25u16 {
            let tag = VarType::from_raw(raw).unwrap();
            assert_eq!(tag.raw(), raw);
        }
        assert_eq!(VarType::from_raw(25), None);
        assert_eq!(VarType::from_raw(u16::MAX), None);
    }

    #[test]
    fn test_scalar_fields_follow_tag() {
        let v = TaggedValue::bool(true);
        assert_eq!(v.bool_field(), Some(true));
        assert_eq!(v.int_field(), None);

        let v = TaggedValue::int_with_tag(IntTag::Ui1, 7);
        assert_eq!(v.int_field(), Some(7));
        assert_eq!(v.float_field(), None);

        let v = TaggedValue::date(1.0);
        assert_eq!(v.float_field(), Some(1.0));
        assert_eq!(v.tm_field(), None);
    }

    #[test]
    fn test_tagged_constructors_keep_tag_and_member_in_step() {
        for tag in [IntTag::I2, IntTag::I4, IntTag::Error, IntTag::Ui1] {
            let v = TaggedValue::int_with_tag(tag, 5);
            assert!(v.var_type().is_some_and(VarType::is_integer), "{tag}");
            assert_eq!(v.int_field(), Some(5));
            assert!(v.buffer_ptr().is_null());
            assert_eq!(v.wide_units(), None);
        }
        for tag in [FloatTag::R4, FloatTag::R8, FloatTag::Date] {
            let v = TaggedValue::float_with_tag(tag, 0.5);
            assert!(v.var_type().is_some_and(VarType::is_float), "{tag}");
            assert_eq!(v.float_field(), Some(0.5));
            assert!(v.buffer_ptr().is_null());
            assert_eq!(v.blob_bytes(), None);
        }
    }

    #[test]
    fn test_unknown_tag() {
        let mut v = TaggedValue::i32(1);
        unsafe { v.set_raw_tag(200) };
        assert_eq!(v.var_type(), None);
        assert_eq!(v.tag_name(), "UNKNOWN");
        assert_eq!(v.int_field(), None);
    }

    #[test]
    fn test_borrowed_buffers() {
        let mut text = *b"Test";
        let v = unsafe { TaggedValue::from_narrow_raw(text.as_mut_ptr(), 4) };
        assert_eq!(v.narrow_bytes(), Some(&b"Test"[..]));
        assert_eq!(v.blob_bytes(), None);
        assert_eq!(v.buffer_ptr(), text.as_ptr());

        let null = unsafe { TaggedValue::from_blob_raw(std::ptr::null_mut(), 0) };
        assert_eq!(null.blob_bytes(), Some(&[][..]));
    }

    #[test]
    fn test_reset() {
        let mut v = TaggedValue::f64(2.5);
        v.reset();
        assert!(v.is_empty());
        assert_eq!(v.float_field(), None);
    }

    #[test]
    fn test_debug_format() {
        let s = format!("{:?}", TaggedValue::i32(42));
        assert!(s.contains("42"));
    }
}
