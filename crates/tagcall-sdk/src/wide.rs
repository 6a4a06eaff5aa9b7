//! UTF-16 wide strings

use std::fmt;

/// Owned UTF-16 string as carried in `Pwstr` slots.
///
/// Stores code units without a terminator. Unpaired surrogates are kept
/// as-is; only [`WideString::to_string_lossy`] replaces them.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WideString(Vec<u16>);

impl WideString {
    /// Empty string
    pub const fn new() -> Self {
        WideString(Vec::new())
    }

    /// Wrap raw code units
    pub fn from_units(units: impl Into<Vec<u16>>) -> Self {
        WideString(units.into())
    }

    /// Code units, without terminator
    pub fn as_units(&self) -> &[u16] {
        &self.0
    }

    /// Length in code units
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the string has no code units
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode to UTF-8, replacing unpaired surrogates
    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(&self.0)
    }

    /// Consume into the code unit buffer
    pub fn into_units(self) -> Vec<u16> {
        self.0
    }
}

impl From<&str> for WideString {
    fn from(s: &str) -> Self {
        WideString(s.encode_utf16().collect())
    }
}

impl From<String> for WideString {
    fn from(s: String) -> Self {
        WideString::from(s.as_str())
    }
}

impl From<&[u16]> for WideString {
    fn from(units: &[u16]) -> Self {
        WideString(units.to_vec())
    }
}

impl From<Vec<u16>> for WideString {
    fn from(units: Vec<u16>) -> Self {
        WideString(units)
    }
}

impl TryFrom<WideString> for String {
    type Error = std::string::FromUtf16Error;

    fn try_from(w: WideString) -> Result<Self, Self::Error> {
        String::from_utf16(&w.0)
    }
}

impl PartialEq<str> for WideString {
    fn eq(&self, other: &str) -> bool {
        self.0.iter().copied().eq(other.encode_utf16())
    }
}

impl PartialEq<&str> for WideString {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl fmt::Debug for WideString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WideString({:?})", self.to_string_lossy())
    }
}

impl fmt::Display for WideString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_transcoding() {
        let w = WideString::from("Пинг");
        assert_eq!(w.len(), 4);
        assert_eq!(w, "Пинг");
        assert_eq!(String::try_from(w).unwrap(), "Пинг");
    }

    #[test]
    fn test_surrogate_pairs_count_two_units() {
        let w = WideString::from("a\u{1F600}");
        assert_eq!(w.len(), 3);
        assert_eq!(w.to_string_lossy(), "a\u{1F600}");
    }

    #[test]
    fn test_unpaired_surrogate() {
        let w = WideString::from_units(vec![0xD800]);
        assert!(String::try_from(w.clone()).is_err());
        assert_eq!(w.to_string_lossy(), "\u{FFFD}");
    }
}
