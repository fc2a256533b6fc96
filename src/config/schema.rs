use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::scoring::ScoringConfig;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Parcel data file (defaults to ~/.config/parcel-score/parcels.json)
    #[serde(default)]
    pub data_file: Option<PathBuf>,

    #[serde(default)]
    pub scoring: Option<ScoringConfig>,

    #[serde(default)]
    pub routing: Option<RoutingConfig>,
}

/// Travel lookup settings.
///
/// Example YAML:
/// ```yaml
/// routing:
///   api_key: "..."
///   profile: driving-car
///   delay: 300ms
///   retries: 2
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub profile: Option<String>,

    /// Pause between lookups, humantime format ("300ms", "1s")
    #[serde(default)]
    pub delay: Option<String>,

    /// Retries for transient lookup failures
    #[serde(default)]
    pub retries: Option<usize>,
}
