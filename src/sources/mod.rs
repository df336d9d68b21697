use crate::model::CatalogEntry;
use crate::config::CatalogConfig;
use anyhow::Result;
use log::{info, warn};

pub trait Source {
    fn scan(&self) -> Result<Vec<CatalogEntry>>;
}

pub mod builtin;
pub mod custom;

use builtin::BuiltinSource;
use custom::CustomSource;

/// Builtin entries first, then user entries, so user labels override builtin ones.
pub fn collect_entries(config: &CatalogConfig) -> Vec<CatalogEntry> {
    let mut sources: Vec<Box<dyn Source>> = Vec::new();
    if config.builtin {
        sources.push(Box::new(BuiltinSource));
    }
    sources.push(Box::new(CustomSource::new(config.entries.clone())));

    let mut entries = Vec::new();
    for source in &sources {
        match source.scan() {
            Ok(mut e) => entries.append(&mut e),
            Err(err) => warn!("Catalog source failed: {:#}", err),
        }
    }

    if !config.exclude.is_empty() {
        let before = entries.len();
        entries.retain(|e| !config.exclude.contains(&e.label));
        info!("Excluded {} entries", before - entries.len());
    }
    entries
}
