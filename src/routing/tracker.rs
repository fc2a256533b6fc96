use super::cache::LookupCache;
use super::types::{LookupError, TravelLookup};
use crate::parcel::{Coordinates, Destination, Parcel, TravelTime};

/// Where a measurement came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Fresh,
    Cached,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub time: TravelTime,
    pub source: Source,
}

/// Wraps a lookup capability with per-run memoization and applies results
/// to parcels under the baseline rules of [`crate::parcel::TravelSlot`].
pub struct TravelTracker<L> {
    lookup: L,
    cache: LookupCache,
}

impl<L: TravelLookup> TravelTracker<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            cache: LookupCache::new(),
        }
    }

    pub fn cache(&self) -> &LookupCache {
        &self.cache
    }

    /// Travel time from `origin` to `destination`, served from cache when the
    /// same pair was already measured in this run. Failures are not cached.
    pub async fn lookup(
        &mut self,
        origin: Coordinates,
        destination: Destination,
    ) -> Result<Measurement, LookupError> {
        origin
            .validate()
            .map_err(|e| LookupError::InvalidOrigin(e.to_string()))?;

        if let Some(time) = self.cache.get(&origin, destination) {
            tracing::debug!(origin = %origin, destination = destination.key(), "cache hit");
            return Ok(Measurement {
                time,
                source: Source::Cached,
            });
        }

        let summary = self.lookup.route(origin, destination).await?;
        if !summary.duration_seconds.is_finite() || summary.duration_seconds < 0.0 {
            return Err(LookupError::Decode(format!(
                "invalid duration {}",
                summary.duration_seconds
            )));
        }

        let time = TravelTime::from_seconds(summary.duration_seconds);
        self.cache.insert(&origin, destination, time.clone());
        Ok(Measurement {
            time,
            source: Source::Fresh,
        })
    }

    /// Look up one destination for a parcel and record the outcome on it.
    ///
    /// Success updates `current` (and seeds `baseline` the first time).
    /// Failure only sets the slot's error marker; stored values stay intact.
    pub async fn measure(
        &mut self,
        parcel: &mut Parcel,
        destination: Destination,
    ) -> Result<Measurement, LookupError> {
        let result = match parcel.coordinates {
            Some(origin) => self.lookup(origin, destination).await,
            None => Err(LookupError::InvalidOrigin(
                "parcel has no coordinates".to_string(),
            )),
        };

        let id = parcel.id;
        let slot = parcel.travel.slot_mut(destination);
        match &result {
            Ok(measurement) => slot.record(measurement.time.clone()),
            Err(e) => {
                tracing::warn!(
                    parcel = id,
                    destination = destination.key(),
                    error = %e,
                    "travel time lookup failed"
                );
                slot.record_error(e.to_string());
            }
        }
        result
    }
}
