//! Operator-supplied produce catalog that extends the built-in knowledge tables.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::NutritionFeatures;
use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogNutrition {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub vitamins: Vec<String>,
}

impl From<&CatalogNutrition> for NutritionFeatures {
    fn from(n: &CatalogNutrition) -> Self {
        Self {
            calories: n.calories,
            protein: n.protein,
            carbs: n.carbs,
            fat: n.fat,
            vitamins: n.vitamins.iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    /// Northern-hemisphere month indices (0 = January).
    #[serde(default)]
    pub in_season: Vec<u8>,
    pub group: Option<String>,
    pub nutrition: Option<CatalogNutrition>,
    pub ripening: Option<String>,
}

impl CatalogEntry {
    /// Lowercased, trimmed name used for matching.
    #[must_use]
    pub fn key(&self) -> String {
        self.name.trim().to_lowercase()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProduceCatalog {
    #[serde(default)]
    pub produce: Vec<CatalogEntry>,
}

impl ProduceCatalog {
    /// Find the entry whose name matches `name`, comparing case-insensitively
    /// with substring containment in either direction.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&CatalogEntry> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.produce
            .iter()
            .find(|e| e.key() == needle)
            .or_else(|| {
                self.produce.iter().find(|e| {
                    let key = e.key();
                    needle.contains(&key) || key.contains(&needle)
                })
            })
    }

    /// Names of catalog entries assigned to `group` (case-insensitive).
    #[must_use]
    pub fn group_members(&self, group: &str) -> Vec<String> {
        let group = group.trim().to_lowercase();
        self.produce
            .iter()
            .filter(|e| {
                e.group
                    .as_deref()
                    .is_some_and(|g| g.trim().to_lowercase() == group)
            })
            .map(CatalogEntry::key)
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.produce.is_empty()
    }
}

/// Load and validate a produce catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<ProduceCatalog, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_catalog(&content)
}

/// Parse and validate catalog YAML.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_catalog(content: &str) -> Result<ProduceCatalog, ConfigError> {
    let catalog: ProduceCatalog = serde_yaml::from_str(content)?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

fn validate_catalog(catalog: &ProduceCatalog) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for entry in &catalog.produce {
        if entry.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "produce name must be non-empty".to_string(),
            ));
        }

        if !seen.insert(entry.key()) {
            return Err(ConfigError::Validation(format!(
                "duplicate produce name: '{}'",
                entry.name
            )));
        }

        if let Some(month) = entry.in_season.iter().find(|m| **m > 11) {
            return Err(ConfigError::Validation(format!(
                "produce '{}' has invalid month {month}; must be 0-11",
                entry.name
            )));
        }

        if let Some(n) = &entry.nutrition {
            let values = [n.calories, n.protein, n.carbs, n.fat];
            if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(ConfigError::Validation(format!(
                    "produce '{}' has negative or non-finite nutrient values",
                    entry.name
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
