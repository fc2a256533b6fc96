use std::collections::BTreeMap;

use super::config::ClassificationTables;
use super::normalize::NEUTRAL_SCORE;

/// Qualitative rating categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Location,
    Safety,
    Shape,
}

impl ClassificationTables {
    pub fn table(&self, category: Category) -> &BTreeMap<String, u8> {
        match category {
            Category::Location => &self.location,
            Category::Safety => &self.safety,
            Category::Shape => &self.shape,
        }
    }
}

/// Score a free-text label against its category table.
///
/// Matching is case-insensitive and exact after trimming. Unset or unknown
/// labels are neutral, never an error.
pub fn map_label(tables: &ClassificationTables, category: Category, label: Option<&str>) -> u8 {
    let Some(label) = label.map(str::trim).filter(|l| !l.is_empty()) else {
        return NEUTRAL_SCORE;
    };
    let key = label.to_lowercase();
    tables
        .table(category)
        .get(&key)
        .map(|score| (*score).min(10))
        .unwrap_or(NEUTRAL_SCORE)
}
