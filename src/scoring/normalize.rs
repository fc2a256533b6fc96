//! Map raw parcel attributes onto 0-10 sub-scores.
//!
//! Absent values score a neutral 5 so missing data never drags a parcel down.

use super::config::{AreaBounds, LinearBounds, TravelThresholds};

pub const NEUTRAL_SCORE: u8 = 5;

/// Lower-is-better linear scale, used for total price and price per m2.
pub fn linear_inverse(value: Option<f64>, bounds: &LinearBounds) -> u8 {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return NEUTRAL_SCORE;
    };
    if value <= bounds.min {
        return 10;
    }
    if value >= bounds.max {
        return 0;
    }
    let span = bounds.max - bounds.min;
    clamp_score(10.0 * (1.0 - (value - bounds.min) / span))
}

/// Area scores best inside the ideal window and ramps off on either side.
pub fn area(value: Option<f64>, bounds: &AreaBounds) -> u8 {
    let Some(area) = value.filter(|v| v.is_finite()) else {
        return NEUTRAL_SCORE;
    };
    if area < bounds.min {
        return 3;
    }
    if area > bounds.max {
        return 5;
    }
    if area >= bounds.ideal - bounds.ideal_below && area <= bounds.ideal + bounds.ideal_above {
        return 10;
    }
    if area < bounds.ideal {
        let span = bounds.ideal - bounds.min;
        if span <= 0.0 {
            return 10;
        }
        clamp_score(3.0 + 7.0 * ((area - bounds.min) / span))
    } else {
        let span = bounds.max - bounds.ideal;
        if span <= 0.0 {
            return 10;
        }
        clamp_score(10.0 - 5.0 * ((area - bounds.ideal) / span))
    }
}

/// Step function over travel minutes. Missing or zero minutes are neutral.
pub fn travel_time(minutes: Option<u32>, thresholds: &TravelThresholds) -> u8 {
    match minutes {
        None | Some(0) => NEUTRAL_SCORE,
        Some(m) if m <= thresholds.optimal => 10,
        Some(m) if m <= thresholds.good => 7,
        Some(m) if m <= thresholds.poor => 4,
        Some(_) => 2,
    }
}

fn clamp_score(raw: f64) -> u8 {
    raw.round().clamp(0.0, 10.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::config::References;

    fn refs() -> References {
        References::default()
    }

    #[test]
    fn test_price_bounds() {
        let bounds = refs().price;
        assert_eq!(linear_inverse(Some(500_000.0), &bounds), 10);
        assert_eq!(linear_inverse(Some(990_000.0), &bounds), 10);
        assert_eq!(linear_inverse(Some(4_400_000.0), &bounds), 0);
        assert_eq!(linear_inverse(Some(9_000_000.0), &bounds), 0);
    }

    #[test]
    fn test_price_interpolates() {
        let bounds = refs().price;
        // Midpoint of 990k..4.4M is 2.695M -> 5
        assert_eq!(linear_inverse(Some(2_695_000.0), &bounds), 5);
        // 10 * (1 - 1010000/3410000) = 7.04 -> 7
        assert_eq!(linear_inverse(Some(2_000_000.0), &bounds), 7);
    }

    #[test]
    fn test_linear_inverse_monotonic_and_bounded() {
        let bounds = refs().price_per_area;
        let mut previous = u8::MAX;
        let mut value = 0.0;
        while value <= 1600.0 {
            let score = linear_inverse(Some(value), &bounds);
            assert!(score <= 10);
            assert!(score <= previous, "score rose at {}", value);
            previous = score;
            value += 7.0;
        }
    }

    #[test]
    fn test_linear_inverse_missing_is_neutral() {
        assert_eq!(linear_inverse(None, &refs().price), NEUTRAL_SCORE);
        assert_eq!(linear_inverse(Some(f64::NAN), &refs().price), NEUTRAL_SCORE);
    }

    #[test]
    fn test_area_fixed_regions() {
        let bounds = refs().area;
        assert_eq!(area(Some(1000.0), &bounds), 3);
        assert_eq!(area(Some(12_000.0), &bounds), 5);
        assert_eq!(area(Some(3000.0), &bounds), 10);
        assert_eq!(area(Some(2500.0), &bounds), 10);
        assert_eq!(area(Some(4000.0), &bounds), 10);
        assert_eq!(area(None, &bounds), NEUTRAL_SCORE);
    }

    #[test]
    fn test_area_ramps() {
        let bounds = refs().area;
        // 3 + 7 * (500/1500) = 5.33 -> 5
        assert_eq!(area(Some(2000.0), &bounds), 5);
        assert_eq!(area(Some(1500.0), &bounds), 3);
        // 10 - 5 * (4000/7000) = 7.14 -> 7
        assert_eq!(area(Some(7000.0), &bounds), 7);
        assert_eq!(area(Some(10_000.0), &bounds), 5);
    }

    #[test]
    fn test_area_monotonic_on_each_side_of_ideal() {
        let bounds = refs().area;
        let mut previous = 0;
        let mut value = bounds.min;
        while value <= bounds.ideal {
            let score = area(Some(value), &bounds);
            assert!(score >= previous, "score fell at {}", value);
            previous = score;
            value += 50.0;
        }

        let mut previous = 10;
        let mut value = bounds.ideal;
        while value <= bounds.max {
            let score = area(Some(value), &bounds);
            assert!(score <= previous, "score rose at {}", value);
            previous = score;
            value += 50.0;
        }
    }

    #[test]
    fn test_travel_steps() {
        let thresholds = refs().travel;
        assert_eq!(travel_time(Some(1), &thresholds), 10);
        assert_eq!(travel_time(Some(15), &thresholds), 10);
        assert_eq!(travel_time(Some(16), &thresholds), 7);
        assert_eq!(travel_time(Some(25), &thresholds), 7);
        assert_eq!(travel_time(Some(40), &thresholds), 4);
        assert_eq!(travel_time(Some(41), &thresholds), 2);
    }

    #[test]
    fn test_travel_missing_or_zero_is_neutral() {
        let thresholds = refs().travel;
        assert_eq!(travel_time(None, &thresholds), NEUTRAL_SCORE);
        assert_eq!(travel_time(Some(0), &thresholds), NEUTRAL_SCORE);
    }
}
