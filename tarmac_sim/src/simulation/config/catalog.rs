// tarmac_sim/src/simulation/config/catalog.rs

//! This module defines the `PresetCatalog`, the read-only set of named
//! vehicle, tire and suspension presets scenarios build on.

use figment::{
    providers::{Format, Toml},
    value::Value,
    Figment,
};
use std::{collections::HashMap, path::Path};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Every parsed preset, keyed by a namespace string built from its path
/// under the catalog root (e.g., `vehicles/sedan.toml` is "vehicles.sedan").
/// The value is the raw, parsed TOML data for that preset.
#[derive(Debug, Clone, Default)]
pub struct PresetCatalog(pub HashMap<String, Value>);

impl PresetCatalog {
    /// Walks `root`, parses every `.toml` file and returns the catalog.
    ///
    /// A missing directory yields an empty catalog. Files that fail to parse
    /// are logged and skipped; scenarios that reference them fail later with
    /// a "not found" error.
    pub fn load(root: &Path) -> Self {
        let mut catalog = Self::default();
        if !root.exists() {
            warn!(
                "Catalog directory not found at {:?}, no presets will be loaded.",
                root
            );
            return catalog;
        }

        info!("Loading preset catalog from: {:?}", root);

        for entry in WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| {
                !e.file_type().is_dir() && e.path().extension().is_some_and(|ext| ext == "toml")
            })
        {
            let path = entry.path();
            let Some(key) = preset_key(root, path) else {
                continue;
            };

            match Figment::new().merge(Toml::file(path)).extract::<Value>() {
                Ok(data) => {
                    debug!("Loaded catalog preset: '{}'", key);
                    catalog.0.insert(key, data);
                }
                Err(e) => {
                    error!("Failed to load catalog preset from {:?}: {}", path, e);
                }
            }
        }

        info!("Preset catalog ready with {} entries.", catalog.0.len());
        catalog
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Preset names in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.0.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

/// "vehicles/sedan.toml" under `root` becomes "vehicles.sedan".
fn preset_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    (!parts.is_empty()).then(|| parts.join("."))
}
