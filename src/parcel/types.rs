use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::scoring::Criterion;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Build a coordinate pair, rejecting non-finite or out-of-range values.
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        let coords = Self { lat, lng };
        coords.validate()?;
        Ok(coords)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            bail!("Coordinates must be finite numbers: {}, {}", self.lat, self.lng);
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            bail!("Latitude out of range: {}", self.lat);
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            bail!("Longitude out of range: {}", self.lng);
        }
        Ok(())
    }

    /// Stable textual form used as the origin half of a lookup cache key.
    pub fn cache_key(&self) -> String {
        format!("{:.6},{:.6}", self.lat, self.lng)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lng)
    }
}

/// Fixed reference locations travel time is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    Office,
    MarinaParents,
    Marista,
}

impl Destination {
    pub const ALL: [Destination; 3] = [
        Destination::Office,
        Destination::MarinaParents,
        Destination::Marista,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Destination::Office => "Office",
            Destination::MarinaParents => "Marina's parents",
            Destination::Marista => "Marista Sta Maria",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Destination::Office => "office",
            Destination::MarinaParents => "marina_parents",
            Destination::Marista => "marista",
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        match self {
            Destination::Office => Coordinates {
                lat: -25.4406,
                lng: -49.3419,
            },
            Destination::MarinaParents => Coordinates {
                lat: -25.4113657,
                lng: -49.2558675,
            },
            Destination::Marista => Coordinates {
                lat: -25.3897918,
                lng: -49.2683135,
            },
        }
    }

    /// Parse a destination key, accepting either the snake_case key or a
    /// case-insensitive display name.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        Destination::ALL
            .into_iter()
            .find(|d| d.key().eq_ignore_ascii_case(s) || d.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown destination '{}'. Expected one of: office, marina_parents, marista",
                    s
                )
            })
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One measured travel duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelTime {
    pub minutes: u32,
    pub text: String,
}

impl TravelTime {
    /// Derive whole minutes (rounded) and display text from a raw duration.
    ///
    /// The text truncates to whole minutes while `minutes` rounds, so a
    /// 59.5 minute trip reads "59 min" with `minutes == 60`.
    pub fn from_seconds(seconds: f64) -> Self {
        let seconds = seconds.max(0.0);
        Self {
            minutes: (seconds / 60.0).round() as u32,
            text: format_duration(seconds),
        }
    }
}

/// Format seconds as "<m> min" below an hour, "<h>h <m>min" otherwise.
pub fn format_duration(seconds: f64) -> String {
    let minutes = (seconds.max(0.0) / 60.0).floor() as u64;
    if minutes < 60 {
        format!("{} min", minutes)
    } else {
        format!("{}h {}min", minutes / 60, minutes % 60)
    }
}

/// Direction of travel-time drift relative to the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Worse,
    Better,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparison {
    /// current - baseline, in minutes
    pub delta: i64,
    pub trend: Trend,
}

/// Current and baseline travel data for one (parcel, destination) pair.
///
/// `baseline` is written once, by the first successful measurement, and is
/// only cleared by [`Parcel::reset_baselines`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TravelSlot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<TravelTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<TravelTime>,
    /// Message of the most recent failed lookup, cleared on the next success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl TravelSlot {
    /// Record a successful measurement. The baseline is frozen on first use.
    pub fn record(&mut self, time: TravelTime) {
        if self.baseline.is_none() {
            self.baseline = Some(time.clone());
        }
        self.current = Some(time);
        self.last_error = None;
    }

    /// Record a failed lookup without touching stored measurements.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    /// Minutes used for scoring: current, falling back to baseline.
    pub fn effective_minutes(&self) -> Option<u32> {
        self.current
            .as_ref()
            .or(self.baseline.as_ref())
            .map(|t| t.minutes)
    }

    /// Signed drift of current against baseline, when both are known.
    pub fn compare(&self) -> Option<Comparison> {
        let current = self.current.as_ref()?;
        let baseline = self.baseline.as_ref()?;
        let delta = current.minutes as i64 - baseline.minutes as i64;
        let trend = match delta {
            d if d > 0 => Trend::Worse,
            d if d < 0 => Trend::Better,
            _ => Trend::Unchanged,
        };
        Some(Comparison { delta, trend })
    }

    pub fn has_baseline(&self) -> bool {
        self.baseline.is_some()
    }
}

/// Travel data for every destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TravelTimes {
    #[serde(default)]
    pub office: TravelSlot,
    #[serde(default)]
    pub marina_parents: TravelSlot,
    #[serde(default)]
    pub marista: TravelSlot,
}

impl TravelTimes {
    pub fn slot(&self, destination: Destination) -> &TravelSlot {
        match destination {
            Destination::Office => &self.office,
            Destination::MarinaParents => &self.marina_parents,
            Destination::Marista => &self.marista,
        }
    }

    pub fn slot_mut(&mut self, destination: Destination) -> &mut TravelSlot {
        match destination {
            Destination::Office => &mut self.office,
            Destination::MarinaParents => &mut self.marina_parents,
            Destination::Marista => &mut self.marista,
        }
    }
}

/// Free-text qualitative ratings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
}

/// A land parcel under evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maps_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    /// Total asking price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_m2: Option<f64>,
    /// Derived: round(price / area_m2)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_m2: Option<f64>,
    #[serde(default)]
    pub classification: Classification,
    #[serde(default)]
    pub travel: TravelTimes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_scores: Option<BTreeMap<Criterion, u8>>,
}

impl Parcel {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn set_price(&mut self, price: Option<f64>) {
        self.price = price;
        self.recompute_price_per_m2();
    }

    pub fn set_area(&mut self, area_m2: Option<f64>) {
        self.area_m2 = area_m2;
        self.recompute_price_per_m2();
    }

    /// Keep `price_per_m2` consistent with `price` and `area_m2`.
    pub fn recompute_price_per_m2(&mut self) {
        self.price_per_m2 = match (self.price, self.area_m2) {
            (Some(price), Some(area)) if area > 0.0 => Some((price / area).round()),
            _ => None,
        };
    }

    /// Reject malformed numeric input before it reaches scoring.
    pub fn validate(&self) -> Result<()> {
        if let Some(price) = self.price {
            if !price.is_finite() || price < 0.0 {
                bail!("Parcel {}: price must be a non-negative number", self.id);
            }
        }
        if let Some(area) = self.area_m2 {
            if !area.is_finite() || area <= 0.0 {
                bail!("Parcel {}: area must be a positive number", self.id);
            }
        }
        if let Some(ref coords) = self.coordinates {
            coords
                .validate()
                .map_err(|e| anyhow::anyhow!("Parcel {}: {}", self.id, e))?;
        }
        Ok(())
    }

    /// Clear every baseline so the next successful lookups re-seed them.
    pub fn reset_baselines(&mut self) {
        for destination in Destination::ALL {
            self.travel.slot_mut(destination).baseline = None;
        }
    }

    pub fn label(&self) -> String {
        match self.neighborhood.as_deref() {
            Some(n) if !n.is_empty() => format!("#{} {}", self.id, n),
            _ => format!("#{}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(minutes: u32) -> TravelTime {
        TravelTime {
            minutes,
            text: format!("{} min", minutes),
        }
    }

    #[test]
    fn test_coordinates_reject_out_of_range() {
        assert!(Coordinates::new(-25.4, -49.3).is_ok());
        assert!(Coordinates::new(91.0, 0.0).is_err());
        assert!(Coordinates::new(0.0, -181.0).is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_cache_key_formats_six_decimals() {
        let coords = Coordinates::new(-25.4406, -49.3419).unwrap();
        assert_eq!(coords.cache_key(), "-25.440600,-49.341900");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0 min");
        assert_eq!(format_duration(59.0 * 60.0), "59 min");
        assert_eq!(format_duration(60.0 * 60.0), "1h 0min");
        assert_eq!(format_duration(95.0 * 60.0 + 30.0), "1h 35min");
    }

    #[test]
    fn test_travel_time_rounds_minutes() {
        let t = TravelTime::from_seconds(14.0 * 60.0 + 40.0);
        assert_eq!(t.minutes, 15);
        assert_eq!(t.text, "14 min");
    }

    #[test]
    fn test_first_record_sets_baseline() {
        let mut slot = TravelSlot::default();
        slot.record(time(20));
        assert_eq!(slot.current, Some(time(20)));
        assert_eq!(slot.baseline, Some(time(20)));
    }

    #[test]
    fn test_second_record_keeps_baseline() {
        let mut slot = TravelSlot::default();
        slot.record(time(20));
        slot.record(time(27));
        assert_eq!(slot.current, Some(time(27)));
        assert_eq!(slot.baseline, Some(time(20)));

        let cmp = slot.compare().unwrap();
        assert_eq!(cmp.delta, 7);
        assert_eq!(cmp.trend, Trend::Worse);
    }

    #[test]
    fn test_compare_better_and_unchanged() {
        let mut slot = TravelSlot::default();
        slot.record(time(30));
        slot.record(time(22));
        assert_eq!(
            slot.compare(),
            Some(Comparison {
                delta: -8,
                trend: Trend::Better
            })
        );

        slot.record(time(30));
        assert_eq!(slot.compare().unwrap().trend, Trend::Unchanged);
    }

    #[test]
    fn test_error_keeps_previous_values() {
        let mut slot = TravelSlot::default();
        slot.record(time(18));
        slot.record_error("Connection error");
        assert_eq!(slot.current, Some(time(18)));
        assert_eq!(slot.baseline, Some(time(18)));
        assert_eq!(slot.last_error.as_deref(), Some("Connection error"));

        slot.record(time(19));
        assert!(slot.last_error.is_none());
    }

    #[test]
    fn test_effective_minutes_falls_back_to_baseline() {
        let slot = TravelSlot {
            current: None,
            baseline: Some(time(12)),
            last_error: None,
        };
        assert_eq!(slot.effective_minutes(), Some(12));
        assert_eq!(TravelSlot::default().effective_minutes(), None);
    }

    #[test]
    fn test_price_per_m2_recomputed() {
        let mut parcel = Parcel::new(1);
        parcel.set_price(Some(1_000_000.0));
        assert!(parcel.price_per_m2.is_none());
        parcel.set_area(Some(3000.0));
        assert_eq!(parcel.price_per_m2, Some(333.0));
        parcel.set_price(Some(1_500_000.0));
        assert_eq!(parcel.price_per_m2, Some(500.0));
    }

    #[test]
    fn test_reset_baselines_clears_only_baselines() {
        let mut parcel = Parcel::new(1);
        parcel.travel.office.record(time(10));
        parcel.travel.marista.record(time(25));
        parcel.reset_baselines();
        assert!(parcel.travel.office.baseline.is_none());
        assert!(parcel.travel.marista.baseline.is_none());
        assert_eq!(parcel.travel.office.current, Some(time(10)));

        parcel.travel.office.record(time(14));
        assert_eq!(parcel.travel.office.baseline, Some(time(14)));
    }

    #[test]
    fn test_validate_rejects_bad_numbers() {
        let mut parcel = Parcel::new(3);
        parcel.area_m2 = Some(0.0);
        assert!(parcel.validate().is_err());

        parcel.area_m2 = Some(2000.0);
        parcel.price = Some(-1.0);
        assert!(parcel.validate().is_err());

        parcel.price = Some(1.0);
        assert!(parcel.validate().is_ok());
    }

    #[test]
    fn test_destination_parse() {
        assert_eq!(Destination::parse("office").unwrap(), Destination::Office);
        assert_eq!(Destination::parse("MARISTA").unwrap(), Destination::Marista);
        assert_eq!(
            Destination::parse("Marina's parents").unwrap(),
            Destination::MarinaParents
        );
        assert!(Destination::parse("beach").is_err());
    }
}
