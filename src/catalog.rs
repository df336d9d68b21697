use std::collections::BTreeMap;
use log::{info, warn};
use thiserror::Error;
use crate::model::CatalogEntry;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("no catalog entry is labelled `{0}`")]
    NotFound(String),
}

/// Immutable label -> token mapping.
///
/// Labels are kept in a `BTreeMap`, so the sorted label list is simply the key
/// order (case-sensitive, byte-wise). It is computed once on construction.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: BTreeMap<String, String>,
    labels: Vec<String>,
}

impl Catalog {
    /// Later entries replace earlier ones that share a label.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = CatalogEntry>,
    {
        let mut map = BTreeMap::new();
        for entry in entries {
            if let Some(previous) = map.insert(entry.label.clone(), entry.token.clone()) {
                warn!(
                    "Catalog: label '{}' defined twice, '{}' replaces '{}'",
                    entry.label, entry.token, previous
                );
            }
        }

        let catalog = Self {
            labels: map.keys().cloned().collect(),
            entries: map,
        };
        info!("Catalog: {} entries", catalog.len());
        catalog
    }

    pub fn all_labels(&self) -> &[String] {
        &self.labels
    }

    pub fn token_for(&self, label: &str) -> Result<&str, CatalogError> {
        self.entries
            .get(label)
            .map(String::as_str)
            .ok_or_else(|| CatalogError::NotFound(label.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        Catalog::from_entries([
            CatalogEntry::new("Notepad", "notepad"),
            CatalogEntry::new("Calculator", "calc"),
            CatalogEntry::new("Device Manager", "devmgmt.msc"),
        ])
    }

    #[test]
    fn labels_are_sorted_ascending() {
        let catalog = sample();
        assert_eq!(catalog.all_labels(), ["Calculator", "Device Manager", "Notepad"]);
    }

    #[test]
    fn labels_have_no_duplicates() {
        let catalog = Catalog::from_entries([
            CatalogEntry::new("Notepad", "notepad"),
            CatalogEntry::new("Notepad", "gedit"),
        ]);
        assert_eq!(catalog.all_labels(), ["Notepad"]);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn later_duplicate_wins() {
        let catalog = Catalog::from_entries([
            CatalogEntry::new("Editor", "notepad"),
            CatalogEntry::new("Editor", "gedit"),
        ]);
        assert_eq!(catalog.token_for("Editor"), Ok("gedit"));
    }

    #[test]
    fn token_lookup_is_exact() {
        let catalog = sample();
        assert_eq!(catalog.token_for("Calculator"), Ok("calc"));
        assert_eq!(
            catalog.token_for("calculator"),
            Err(CatalogError::NotFound("calculator".to_string()))
        );
    }

    #[test]
    fn empty_catalog_is_valid() {
        let catalog = Catalog::from_entries(Vec::new());
        assert!(catalog.is_empty());
        assert!(catalog.all_labels().is_empty());
    }
}
