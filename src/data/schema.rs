use std::collections::HashMap;

use crate::error::ArtifactError;

/// Ordered list of the columns the trained model expects.
///
/// Built once when the artifacts are loaded and never mutated afterwards.
/// Lookups go through two name->index maps, one exact and one lowercased,
/// so checking whether a column exists never scans the list.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    columns: Vec<String>,
    exact: HashMap<String, usize>,
    lowercase: HashMap<String, usize>,
}

impl FeatureSchema {
    pub fn new(columns: Vec<String>) -> Result<Self, ArtifactError> {
        if columns.is_empty() {
            return Err(ArtifactError::EmptySchema);
        }

        let mut exact = HashMap::with_capacity(columns.len());
        let mut lowercase = HashMap::with_capacity(columns.len());
        // first occurrence wins for duplicated names
        for (index, name) in columns.iter().enumerate() {
            exact.entry(name.clone()).or_insert(index);
            lowercase.entry(name.to_lowercase()).or_insert(index);
        }

        Ok(FeatureSchema {
            columns,
            exact,
            lowercase,
        })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(String::as_str)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.exact.get(name).copied()
    }

    pub fn position_ignore_case(&self, name: &str) -> Option<usize> {
        self.lowercase.get(&name.to_lowercase()).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.exact.contains_key(name)
    }
}
