use std::collections::BTreeMap;

use super::aggregate::{aggregate, Contribution};
use super::classify::{map_label, Category};
use super::config::{Criterion, ScoringConfig};
use super::normalize;
use crate::parcel::{Destination, Parcel};

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub score: f64,
    /// True when at least one criterion had no data and scored neutral.
    pub incomplete: bool,
    pub sub_scores: BTreeMap<Criterion, u8>,
    pub breakdown: Vec<Contribution>,
}

/// Score one parcel. Pure: the same parcel and config always give the same result.
pub fn calculate_score(parcel: &Parcel, config: &ScoringConfig) -> ScoreResult {
    let refs = &config.references;
    let tables = &config.classification;
    let labels = &parcel.classification;

    let mut sub_scores = BTreeMap::new();
    sub_scores.insert(
        Criterion::Price,
        normalize::linear_inverse(parcel.price, &refs.price),
    );
    sub_scores.insert(Criterion::Area, normalize::area(parcel.area_m2, &refs.area));
    sub_scores.insert(
        Criterion::PricePerArea,
        normalize::linear_inverse(parcel.price_per_m2, &refs.price_per_area),
    );
    sub_scores.insert(
        Criterion::Location,
        map_label(tables, Category::Location, labels.location.as_deref()),
    );
    sub_scores.insert(
        Criterion::Safety,
        map_label(tables, Category::Safety, labels.safety.as_deref()),
    );
    sub_scores.insert(
        Criterion::Shape,
        map_label(tables, Category::Shape, labels.shape.as_deref()),
    );

    // Travel falls back to the baseline when no current measurement exists.
    // Whether that fallback should be permanent is still an open policy call.
    let mut travel_missing = false;
    for destination in Destination::ALL {
        let minutes = parcel.travel.slot(destination).effective_minutes();
        travel_missing |= minutes.unwrap_or(0) == 0;
        sub_scores.insert(
            Criterion::travel(destination),
            normalize::travel_time(minutes, &refs.travel),
        );
    }

    let incomplete = travel_missing
        || parcel.price.is_none()
        || parcel.area_m2.is_none()
        || parcel.price_per_m2.is_none()
        || labels.location.is_none()
        || labels.safety.is_none()
        || labels.shape.is_none();

    let result = aggregate(&sub_scores, &config.weights);

    ScoreResult {
        score: result.score,
        incomplete,
        sub_scores,
        breakdown: result.breakdown,
    }
}

/// Score a parcel and write the final score and sub-scores back onto it.
pub fn apply_score(parcel: &mut Parcel, config: &ScoringConfig) -> ScoreResult {
    let result = calculate_score(parcel, config);
    parcel.score = Some(result.score);
    parcel.sub_scores = Some(result.sub_scores.clone());
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parcel::{Classification, TravelSlot, TravelTime};

    fn time(minutes: u32) -> TravelTime {
        TravelTime {
            minutes,
            text: format!("{} min", minutes),
        }
    }

    fn sample_parcel() -> Parcel {
        let mut parcel = Parcel::new(1);
        parcel.set_price(Some(990_000.0));
        parcel.set_area(Some(3000.0));
        parcel.classification = Classification {
            location: Some("otimo".to_string()),
            safety: Some("boa".to_string()),
            shape: Some("otimo".to_string()),
        };
        for destination in Destination::ALL {
            parcel.travel.slot_mut(destination).record(time(10));
        }
        parcel
    }

    #[test]
    fn test_ideal_parcel_scores_ten() {
        let result = calculate_score(&sample_parcel(), &ScoringConfig::default());
        // price 990k -> 10, ppa 330 -> 8, everything else 10
        assert_eq!(result.sub_scores[&Criterion::PricePerArea], 8);
        // (100*100 - 2*20) / 100 = 9.6
        assert_eq!(result.score, 9.6);
        assert!(!result.incomplete);
    }

    #[test]
    fn test_empty_parcel_is_neutral() {
        let result = calculate_score(&Parcel::new(5), &ScoringConfig::default());
        assert!(result.sub_scores.values().all(|s| *s == 5));
        assert_eq!(result.score, 5.0);
        assert!(result.incomplete);
    }

    #[test]
    fn test_travel_uses_baseline_when_current_missing() {
        let mut parcel = sample_parcel();
        parcel.travel.office = TravelSlot {
            current: None,
            baseline: Some(time(45)),
            last_error: None,
        };
        let result = calculate_score(&parcel, &ScoringConfig::default());
        assert_eq!(result.sub_scores[&Criterion::TravelOffice], 2);
        assert!(!result.incomplete);
    }

    #[test]
    fn test_travel_prefers_current_over_baseline() {
        let mut parcel = sample_parcel();
        parcel.travel.marista.record(time(30));
        let result = calculate_score(&parcel, &ScoringConfig::default());
        // baseline stays 10 min, current 30 min -> 4
        assert_eq!(result.sub_scores[&Criterion::TravelMarista], 4);
    }

    #[test]
    fn test_flood_label_drags_location() {
        let mut parcel = sample_parcel();
        parcel.classification.location = Some("ALAGA".to_string());
        let result = calculate_score(&parcel, &ScoringConfig::default());
        assert_eq!(result.sub_scores[&Criterion::Location], 0);
        // 9.6 - 15 * 10 / 100 = 8.1
        assert_eq!(result.score, 8.1);
    }

    #[test]
    fn test_apply_score_writes_back() {
        let mut parcel = sample_parcel();
        let result = apply_score(&mut parcel, &ScoringConfig::default());
        assert_eq!(parcel.score, Some(result.score));
        assert_eq!(parcel.sub_scores.as_ref(), Some(&result.sub_scores));
        assert_eq!(parcel.sub_scores.unwrap().len(), 9);
    }

    #[test]
    fn test_alternate_config_changes_result() {
        let mut config = ScoringConfig::default();
        config.weights.price_per_area = 0.0;
        let result = calculate_score(&sample_parcel(), &config);
        assert_eq!(result.score, 10.0);
    }

    #[test]
    fn test_score_bounded() {
        let mut parcel = sample_parcel();
        parcel.set_price(Some(50_000_000.0));
        parcel.classification.safety = Some("perigoso".to_string());
        let result = calculate_score(&parcel, &ScoringConfig::default());
        assert!((0.0..=10.0).contains(&result.score));
        assert!(result.sub_scores.values().all(|s| *s <= 10));
    }
}
