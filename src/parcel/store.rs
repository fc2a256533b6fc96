use anyhow::Result;
use std::collections::BTreeSet;

use super::coords::extract_coordinates;
use super::types::{Coordinates, Parcel};
use crate::scoring::{apply_score, ScoreResult, ScoringConfig};

/// Fallback location when a map link carries no coordinates (Curitiba centre).
pub const DEFAULT_COORDINATES: Coordinates = Coordinates {
    lat: -25.4284,
    lng: -49.2733,
};

/// Fields a caller may change on an existing parcel. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct ParcelPatch {
    pub neighborhood: Option<String>,
    pub maps_link: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub price: Option<f64>,
    pub area_m2: Option<f64>,
    pub location: Option<String>,
    pub safety: Option<String>,
    pub shape: Option<String>,
}

impl ParcelPatch {
    pub fn is_empty(&self) -> bool {
        self.neighborhood.is_none()
            && self.maps_link.is_none()
            && self.coordinates.is_none()
            && self.price.is_none()
            && self.area_m2.is_none()
            && self.location.is_none()
            && self.safety.is_none()
            && self.shape.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionStats {
    pub total: usize,
    pub mean_price_per_m2: f64,
    pub min_price: f64,
    pub max_price: f64,
}

/// In-memory parcel collection with id assignment and derived-field upkeep.
#[derive(Debug, Clone)]
pub struct ParcelStore {
    parcels: Vec<Parcel>,
    next_id: u64,
}

impl Default for ParcelStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ParcelStore {
    pub fn new(parcels: Vec<Parcel>) -> Self {
        let next_id = parcels.iter().map(|p| p.id).max().map_or(1, |max| max + 1);
        Self { parcels, next_id }
    }

    pub fn all(&self) -> &[Parcel] {
        &self.parcels
    }

    pub fn all_mut(&mut self) -> &mut [Parcel] {
        &mut self.parcels
    }

    pub fn into_parcels(self) -> Vec<Parcel> {
        self.parcels
    }

    pub fn get(&self, id: u64) -> Option<&Parcel> {
        self.parcels.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut Parcel> {
        self.parcels.iter_mut().find(|p| p.id == id)
    }

    /// Insert a new parcel, assigning its id. Returns the id.
    pub fn add(&mut self, mut parcel: Parcel) -> Result<u64> {
        parcel.id = self.next_id;
        parcel.recompute_price_per_m2();

        if parcel.coordinates.is_none() {
            if let Some(ref link) = parcel.maps_link {
                parcel.coordinates = Some(extract_coordinates(link).unwrap_or(DEFAULT_COORDINATES));
            }
        }

        parcel.validate()?;
        self.next_id += 1;
        let id = parcel.id;
        self.parcels.push(parcel);
        Ok(id)
    }

    /// Apply a patch to an existing parcel. Returns false when the id is unknown.
    pub fn update(&mut self, id: u64, patch: ParcelPatch) -> Result<bool> {
        let Some(existing) = self.get(id) else {
            return Ok(false);
        };

        let mut parcel = existing.clone();
        if let Some(neighborhood) = patch.neighborhood {
            parcel.neighborhood = Some(neighborhood);
        }
        if let Some(location) = patch.location {
            parcel.classification.location = Some(location);
        }
        if let Some(safety) = patch.safety {
            parcel.classification.safety = Some(safety);
        }
        if let Some(shape) = patch.shape {
            parcel.classification.shape = Some(shape);
        }
        if let Some(price) = patch.price {
            parcel.price = Some(price);
        }
        if let Some(area) = patch.area_m2 {
            parcel.area_m2 = Some(area);
        }
        parcel.recompute_price_per_m2();

        if let Some(coords) = patch.coordinates {
            parcel.coordinates = Some(coords);
        }
        if let Some(link) = patch.maps_link {
            if patch.coordinates.is_none() {
                if let Some(coords) = extract_coordinates(&link) {
                    parcel.coordinates = Some(coords);
                }
            }
            parcel.maps_link = Some(link);
        }

        parcel.validate()?;
        if let Some(slot) = self.get_mut(id) {
            *slot = parcel;
        }
        Ok(true)
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.parcels.len();
        self.parcels.retain(|p| p.id != id);
        self.parcels.len() != before
    }

    pub fn stats(&self) -> CollectionStats {
        if self.parcels.is_empty() {
            return CollectionStats {
                total: 0,
                mean_price_per_m2: 0.0,
                min_price: 0.0,
                max_price: 0.0,
            };
        }

        let per_m2: Vec<f64> = self.parcels.iter().filter_map(|p| p.price_per_m2).collect();
        let mean_price_per_m2 = if per_m2.is_empty() {
            0.0
        } else {
            (per_m2.iter().sum::<f64>() / per_m2.len() as f64).round()
        };

        let prices: Vec<f64> = self.parcels.iter().filter_map(|p| p.price).collect();
        let min_price = prices.iter().copied().reduce(f64::min).unwrap_or(0.0);
        let max_price = prices.iter().copied().reduce(f64::max).unwrap_or(0.0);

        CollectionStats {
            total: self.parcels.len(),
            mean_price_per_m2,
            min_price,
            max_price,
        }
    }

    /// Recompute and store the score of one parcel.
    pub fn rescore(&mut self, id: u64, config: &ScoringConfig) -> Option<ScoreResult> {
        self.get_mut(id).map(|parcel| apply_score(parcel, config))
    }

    /// Parcels whose neighborhood matches `name`, ignoring case and surrounding spaces.
    pub fn in_neighborhood(&self, name: &str) -> Vec<&Parcel> {
        let name = name.trim();
        self.parcels
            .iter()
            .filter(|p| {
                p.neighborhood
                    .as_deref()
                    .is_some_and(|n| n.trim().eq_ignore_ascii_case(name))
            })
            .collect()
    }

    /// Sorted, de-duplicated neighborhood names.
    pub fn neighborhoods(&self) -> Vec<String> {
        self.parcels
            .iter()
            .filter_map(|p| p.neighborhood.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
