//! Category lookups consumed by the passing processor and result exporters.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::time::serde_secs_opt;

/// Per-category start offsets and lap targets.
pub trait CategoryRegistry {
    fn lookup_category_start_offset(&self, category: &str) -> Option<TimeDelta>;

    fn lookup_category_target_laps(&self, category: &str) -> Option<u32>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default, with = "serde_secs_opt")]
    pub start_offset: Option<TimeDelta>,
    #[serde(default)]
    pub target_laps: Option<u32>,
}

/// In-memory registry loaded from the event file.
///
/// Lookups for unconfigured categories fall back to no offset / no target and
/// are logged once per category.
#[derive(Debug, Default)]
pub struct CategoryTable {
    categories: HashMap<String, CategoryInfo>,
    warned: WarnOnce,
}

/// Remembers which configuration gaps have already been logged.
#[derive(Debug, Default)]
pub(crate) struct WarnOnce(Mutex<HashSet<String>>);

impl WarnOnce {
    /// Returns true the first time `key` is seen.
    pub(crate) fn first(&self, key: &str) -> bool {
        let mut seen = self.0.lock().unwrap_or_else(|e| e.into_inner());
        seen.insert(key.to_string())
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl CategoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(categories: HashMap<String, CategoryInfo>) -> Self {
        Self {
            categories: categories
                .into_iter()
                .map(|(k, v)| (k.to_ascii_uppercase(), v))
                .collect(),
            warned: WarnOnce::default(),
        }
    }

    pub fn insert(&mut self, category: &str, info: CategoryInfo) {
        self.categories.insert(category.to_ascii_uppercase(), info);
    }

    pub fn get(&self, category: &str) -> Option<&CategoryInfo> {
        let info = self.categories.get(&category.to_ascii_uppercase());
        if info.is_none() && self.warned.first(category) {
            warn!("Category {} not configured, using defaults", category);
        }
        info
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CategoryInfo)> {
        self.categories.iter()
    }

    pub fn to_map(&self) -> HashMap<String, CategoryInfo> {
        self.categories.clone()
    }
}

impl Clone for CategoryTable {
    fn clone(&self) -> Self {
        Self::from_map(self.categories.clone())
    }
}

impl CategoryRegistry for CategoryTable {
    fn lookup_category_start_offset(&self, category: &str) -> Option<TimeDelta> {
        self.get(category).and_then(|c| c.start_offset)
    }

    fn lookup_category_target_laps(&self, category: &str) -> Option<u32> {
        self.get(category).and_then(|c| c.target_laps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut table = CategoryTable::new();
        table.insert(
            "u17",
            CategoryInfo {
                title: "Under 17".into(),
                start_offset: Some(TimeDelta::seconds(30)),
                target_laps: Some(3),
            },
        );
        assert_eq!(
            table.lookup_category_start_offset("U17"),
            Some(TimeDelta::seconds(30))
        );
        assert_eq!(table.lookup_category_target_laps("u17"), Some(3));
    }

    #[test]
    fn test_missing_category_defaults() {
        let table = CategoryTable::new();
        assert!(table.lookup_category_start_offset("ELITE").is_none());
        assert!(table.lookup_category_target_laps("ELITE").is_none());
        // second lookup is served without a second warning
        assert!(table.lookup_category_target_laps("ELITE").is_none());
        assert_eq!(table.warned.len(), 1);
    }
}
