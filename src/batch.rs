use std::time::Duration;

use crate::parcel::{Destination, Parcel};
use crate::routing::{LookupError, Source, TravelLookup, TravelTracker};
use crate::scoring::{apply_score, ScoringConfig};

/// Default pause between consecutive travel lookups.
pub const DEFAULT_LOOKUP_DELAY: Duration = Duration::from_millis(300);

/// Score every parcel in place. Returns the number of parcels processed.
///
/// Deterministic: re-running on an unchanged collection yields identical scores.
pub fn score_all(parcels: &mut [Parcel], config: &ScoringConfig) -> usize {
    for parcel in parcels.iter_mut() {
        let result = apply_score(parcel, config);
        tracing::debug!(parcel = parcel.id, score = result.score, "scored parcel");
    }
    parcels.len()
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupFailure {
    pub parcel_id: u64,
    pub destination: Destination,
    pub message: String,
}

/// Outcome of one travel refresh run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshReport {
    pub parcels_visited: usize,
    pub skipped_without_coordinates: usize,
    pub measured: usize,
    pub cached: usize,
    pub failures: Vec<LookupFailure>,
    /// True when some parcel already had a baseline before this run, so the
    /// new values are being compared rather than seeding baselines.
    pub comparison_run: bool,
}

impl RefreshReport {
    pub fn attempted(&self) -> usize {
        self.measured + self.cached + self.failures.len()
    }

    /// Every attempted lookup failed.
    pub fn all_failed(&self) -> bool {
        self.attempted() > 0 && self.measured + self.cached == 0
    }
}

/// Refresh travel times for every parcel and destination, strictly one
/// lookup at a time with `delay` between calls that reach the lookup service.
///
/// A failed lookup is recorded on its slot and the run continues.
pub async fn refresh_travel_times<L: TravelLookup>(
    parcels: &mut [Parcel],
    tracker: &mut TravelTracker<L>,
    delay: Duration,
) -> RefreshReport {
    let mut report = RefreshReport {
        comparison_run: parcels
            .iter()
            .any(|p| Destination::ALL.iter().any(|d| p.travel.slot(*d).has_baseline())),
        ..Default::default()
    };

    let total = parcels.len();
    let mut pause_before_next = false;

    for (index, parcel) in parcels.iter_mut().enumerate() {
        if parcel.coordinates.is_none() {
            tracing::debug!(parcel = parcel.id, "skipping parcel without coordinates");
            report.skipped_without_coordinates += 1;
            continue;
        }
        report.parcels_visited += 1;

        for destination in Destination::ALL {
            if pause_before_next && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            tracing::debug!(
                parcel = parcel.id,
                destination = destination.key(),
                "lookup {}/{}",
                index + 1,
                total
            );

            match tracker.measure(parcel, destination).await {
                Ok(measurement) => match measurement.source {
                    Source::Fresh => {
                        report.measured += 1;
                        pause_before_next = true;
                    }
                    Source::Cached => {
                        report.cached += 1;
                        pause_before_next = false;
                    }
                },
                Err(e) => {
                    pause_before_next = !matches!(e, LookupError::InvalidOrigin(_));
                    report.failures.push(LookupFailure {
                        parcel_id: parcel.id,
                        destination,
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    tracing::info!(
        visited = report.parcels_visited,
        measured = report.measured,
        cached = report.cached,
        failed = report.failures.len(),
        "travel refresh finished"
    );

    report
}
