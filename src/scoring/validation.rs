use super::config::{Criterion, LinearBounds, ScoringConfig};

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
///
/// A zero total weight is allowed; the aggregator scores it as 0.
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    // Weights
    let weight_keys = [
        "price",
        "area",
        "price_per_area",
        "location",
        "safety",
        "shape",
        "travel_office",
        "travel_marina_parents",
        "travel_marista",
    ];
    for (criterion, key) in Criterion::ALL.iter().zip(weight_keys) {
        let weight = config.weights.get(*criterion);
        if !weight.is_finite() || weight < 0.0 {
            errors.push(format!(
                "scoring.weights.{}: must be a non-negative number, got {}",
                key, weight
            ));
        }
    }

    // Linear bounds
    check_linear("scoring.references.price", &config.references.price, &mut errors);
    check_linear(
        "scoring.references.price_per_area",
        &config.references.price_per_area,
        &mut errors,
    );

    // Area band
    let area = &config.references.area;
    if !(area.min < area.ideal && area.ideal < area.max) {
        errors.push(format!(
            "scoring.references.area: expected min < ideal < max, got {} / {} / {}",
            area.min, area.ideal, area.max
        ));
    }
    if area.ideal_below < 0.0 || area.ideal_above < 0.0 {
        errors.push(
            "scoring.references.area: ideal_below and ideal_above must be non-negative"
                .to_string(),
        );
    }

    // Travel thresholds
    let travel = &config.references.travel;
    if !(travel.optimal <= travel.good && travel.good <= travel.poor) {
        errors.push(format!(
            "scoring.references.travel: expected optimal <= good <= poor, got {} / {} / {}",
            travel.optimal, travel.good, travel.poor
        ));
    }

    // Classification tables
    let tables = [
        ("location", &config.classification.location),
        ("safety", &config.classification.safety),
        ("shape", &config.classification.shape),
    ];
    for (name, table) in tables {
        for (label, score) in table {
            if label.trim().is_empty() {
                errors.push(format!("scoring.classification.{}: empty label", name));
            } else if *label != label.to_lowercase() {
                errors.push(format!(
                    "scoring.classification.{}.{}: labels must be lowercase",
                    name, label
                ));
            }
            if *score > 10 {
                errors.push(format!(
                    "scoring.classification.{}.{}: score must be 0-10, got {}",
                    name, label, score
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_linear(path: &str, bounds: &LinearBounds, errors: &mut Vec<String>) {
    if !bounds.min.is_finite() || !bounds.max.is_finite() || bounds.min >= bounds.max {
        errors.push(format!(
            "{}: expected min < max, got {} / {}",
            path, bounds.min, bounds.max
        ));
    }
}
