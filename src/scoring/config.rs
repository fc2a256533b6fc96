use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::parcel::Destination;

/// Evaluation criteria, in breakdown order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Price,
    Area,
    PricePerArea,
    Location,
    Safety,
    Shape,
    TravelOffice,
    TravelMarinaParents,
    TravelMarista,
}

impl Criterion {
    pub const ALL: [Criterion; 9] = [
        Criterion::Price,
        Criterion::Area,
        Criterion::PricePerArea,
        Criterion::Location,
        Criterion::Safety,
        Criterion::Shape,
        Criterion::TravelOffice,
        Criterion::TravelMarinaParents,
        Criterion::TravelMarista,
    ];

    pub fn travel(destination: Destination) -> Self {
        match destination {
            Destination::Office => Criterion::TravelOffice,
            Destination::MarinaParents => Criterion::TravelMarinaParents,
            Destination::Marista => Criterion::TravelMarista,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Criterion::Price => "Total price",
            Criterion::Area => "Area",
            Criterion::PricePerArea => "Price/m2",
            Criterion::Location => "Location",
            Criterion::Safety => "Safety",
            Criterion::Shape => "Shape",
            Criterion::TravelOffice => "Time to office",
            Criterion::TravelMarinaParents => "Time to Marina's parents",
            Criterion::TravelMarista => "Time to Marista",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Main scoring configuration.
///
/// Every constant the normalizers and the aggregator use lives here, so
/// alternate configurations can be scored side by side.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   weights:
///     price: 25
///     travel_office: 10
///   references:
///     travel: { optimal: 10, good: 20, poor: 35 }
///   classification:
///     safety:
///       boa: 10
///       perigoso: 1
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: Weights,

    #[serde(default)]
    pub references: References,

    #[serde(default)]
    pub classification: ClassificationTables,
}

/// Per-criterion weights. They conceptually sum to 100 but only their
/// ratio matters.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Weights {
    pub price: f64,
    pub area: f64,
    pub price_per_area: f64,
    pub location: f64,
    pub safety: f64,
    pub shape: f64,
    pub travel_office: f64,
    pub travel_marina_parents: f64,
    pub travel_marista: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            price: 20.0,
            area: 10.0,
            price_per_area: 20.0,
            location: 15.0,
            safety: 10.0,
            shape: 10.0,
            travel_office: 5.0,
            travel_marina_parents: 5.0,
            travel_marista: 5.0,
        }
    }
}

impl Weights {
    pub fn get(&self, criterion: Criterion) -> f64 {
        match criterion {
            Criterion::Price => self.price,
            Criterion::Area => self.area,
            Criterion::PricePerArea => self.price_per_area,
            Criterion::Location => self.location,
            Criterion::Safety => self.safety,
            Criterion::Shape => self.shape,
            Criterion::TravelOffice => self.travel_office,
            Criterion::TravelMarinaParents => self.travel_marina_parents,
            Criterion::TravelMarista => self.travel_marista,
        }
    }

    pub fn total(&self) -> f64 {
        Criterion::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

/// Lower-is-better bounds: at or below `min` scores 10, at or above `max` scores 0.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LinearBounds {
    pub min: f64,
    pub max: f64,
}

/// Area band. Anything within `[ideal - ideal_below, ideal + ideal_above]` scores 10.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AreaBounds {
    pub min: f64,
    pub ideal: f64,
    pub max: f64,
    #[serde(default = "default_ideal_below")]
    pub ideal_below: f64,
    #[serde(default = "default_ideal_above")]
    pub ideal_above: f64,
}

fn default_ideal_below() -> f64 {
    500.0
}

fn default_ideal_above() -> f64 {
    1000.0
}

/// Travel time step thresholds in minutes.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TravelThresholds {
    pub optimal: u32,
    pub good: u32,
    pub poor: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct References {
    pub price: LinearBounds,
    pub area: AreaBounds,
    pub price_per_area: LinearBounds,
    pub travel: TravelThresholds,
}

impl Default for References {
    fn default() -> Self {
        Self {
            price: LinearBounds {
                min: 990_000.0,
                max: 4_400_000.0,
            },
            area: AreaBounds {
                min: 1500.0,
                ideal: 3000.0,
                max: 10_000.0,
                ideal_below: default_ideal_below(),
                ideal_above: default_ideal_above(),
            },
            price_per_area: LinearBounds {
                min: 61.0,
                max: 1400.0,
            },
            travel: TravelThresholds {
                optimal: 15,
                good: 25,
                poor: 40,
            },
        }
    }
}

/// Label -> score tables for the qualitative ratings. Keys are lowercase.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ClassificationTables {
    pub location: BTreeMap<String, u8>,
    pub safety: BTreeMap<String, u8>,
    pub shape: BTreeMap<String, u8>,
}

fn table(entries: &[(&str, u8)]) -> BTreeMap<String, u8> {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

impl Default for ClassificationTables {
    fn default() -> Self {
        Self {
            location: table(&[
                ("otimo", 10),
                ("muito bom", 9),
                ("bom", 7),
                ("ok", 5),
                ("longe", 3),
                ("ruim", 2),
                ("alaga", 0),
            ]),
            safety: table(&[
                ("boa", 10),
                ("ok", 7),
                ("mais ou menos", 5),
                ("perigoso", 2),
                ("alaga", 0),
            ]),
            shape: table(&[
                ("otimo", 10),
                ("bom", 8),
                ("ok", 6),
                ("estreito em l", 4),
                ("bem estreito", 3),
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_100() {
        assert_eq!(Weights::default().total(), 100.0);
    }

    #[test]
    fn test_scoring_config_serde_roundtrip() {
        let config = ScoringConfig::default();
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: ScoringConfig = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_scoring_config_parse() {
        let yaml = r#"
weights:
  price: 40
references:
  travel: { optimal: 10, good: 20, poor: 30 }
"#;
        let config: ScoringConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.weights.price, 40.0);
        assert_eq!(config.weights.area, 10.0);
        assert_eq!(config.references.travel.optimal, 10);
        assert_eq!(config.references.price.min, 990_000.0);
        assert_eq!(config.classification, ClassificationTables::default());
    }

    #[test]
    fn test_area_tolerances_default_when_omitted() {
        let yaml = r#"
references:
  area: { min: 1000, ideal: 2000, max: 8000 }
"#;
        let config: ScoringConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.references.area.ideal_below, 500.0);
        assert_eq!(config.references.area.ideal_above, 1000.0);
    }

    #[test]
    fn test_empty_scoring_config_parse() {
        let config: ScoringConfig = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, ScoringConfig::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "weights:\n  elevation: 5\n";
        assert!(serde_saphyr::from_str::<ScoringConfig>(yaml).is_err());
    }

    #[test]
    fn test_criterion_travel_mapping() {
        for destination in Destination::ALL {
            let criterion = Criterion::travel(destination);
            assert!(Criterion::ALL.contains(&criterion));
        }
        assert_eq!(Criterion::travel(Destination::Office), Criterion::TravelOffice);
    }
}
