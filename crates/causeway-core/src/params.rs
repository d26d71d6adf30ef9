//! Navigation parameters handed to a page when it is pushed.

use rustc_hash::FxHashMap;

/// Opaque key/value bag supplied by the caller of a navigation operation.
/// Owned exclusively by the [`crate::ViewRecord`] it was pushed with.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params {
    entries: FxHashMap<String, String>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, for call sites like
    /// `Params::new().with("id", "325")`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
