//! Primary name plus alias for registry entries

/// A (name, alias) pair. Lookup is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Names {
    name: String,
    alias: String,
}

impl Names {
    pub fn new(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Names {
            name: name.into(),
            alias: alias.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// The alias if `alias` is set, otherwise the primary name
    pub fn get(&self, alias: bool) -> &str {
        if alias {
            &self.alias
        } else {
            &self.name
        }
    }

    /// Exact match against either the primary name or the alias
    pub fn matches(&self, candidate: &str) -> bool {
        self.name == candidate || self.alias == candidate
    }
}
