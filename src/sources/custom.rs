use crate::config::StaticEntry;
use crate::model::CatalogEntry;
use crate::sources::Source;
use anyhow::Result;
use log::{debug, info};

/// Entries declared under `[[catalog.entries]]`.
pub struct CustomSource {
    items: Vec<StaticEntry>,
}

impl CustomSource {
    pub fn new(items: Vec<StaticEntry>) -> Self {
        Self { items }
    }
}

impl Source for CustomSource {
    fn scan(&self) -> Result<Vec<CatalogEntry>> {
        let mut entries = Vec::with_capacity(self.items.len());
        for item in &self.items {
            if item.label.trim().is_empty() || item.token.trim().is_empty() {
                debug!("Skipping custom entry with empty label or token: {:?}", item);
                continue;
            }
            entries.push(CatalogEntry::from(item.clone()));
        }
        info!("CustomSource: found {} entries", entries.len());
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_entries_are_skipped() {
        let source = CustomSource::new(vec![
            StaticEntry { label: "".to_string(), token: "calc".to_string() },
            StaticEntry { label: "Blank".to_string(), token: "  ".to_string() },
            StaticEntry { label: "Calculator".to_string(), token: "calc".to_string() },
        ]);
        assert_eq!(source.scan().unwrap(), [CatalogEntry::new("Calculator", "calc")]);
    }
}
