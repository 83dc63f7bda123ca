use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Flat set of named fields entered for one estimate.
///
/// Which of these end up in the feature row is decided by the
/// assembly profile; anything the profile does not mention is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawInput {
    #[serde(default)]
    pub numeric: BTreeMap<String, f64>,
    #[serde(default)]
    pub categorical: BTreeMap<String, String>,
    #[serde(default)]
    pub flags: BTreeMap<String, bool>,
}

impl RawInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn numeric(mut self, field: &str, value: f64) -> Self {
        self.numeric.insert(field.to_string(), value);
        self
    }

    pub fn category(mut self, field: &str, value: &str) -> Self {
        self.categorical.insert(field.to_string(), value.to_string());
        self
    }

    pub fn flag(mut self, field: &str, value: bool) -> Self {
        self.flags.insert(field.to_string(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty() && self.categorical.is_empty() && self.flags.is_empty()
    }
}
