use std::collections::BTreeMap;

use super::config::{Criterion, Weights};

/// One line of the "why this score" explanation.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub criterion: Criterion,
    pub score: u8,
    pub weight: f64,
    /// Points this criterion adds to a 100-weight total: round(score * weight / 10) / 10
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub score: f64,
    pub breakdown: Vec<Contribution>,
}

/// Weighted mean of sub-scores, rounded to one decimal.
///
/// A zero total weight yields 0 instead of dividing by zero. The breakdown
/// is ordered by contribution, highest first; ties keep criterion order.
pub fn aggregate(sub_scores: &BTreeMap<Criterion, u8>, weights: &Weights) -> Aggregate {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    let mut breakdown = Vec::with_capacity(sub_scores.len());

    for (criterion, score) in sub_scores {
        let weight = weights.get(*criterion);
        weighted_sum += *score as f64 * weight;
        total_weight += weight;

        breakdown.push(Contribution {
            criterion: *criterion,
            score: *score,
            weight,
            contribution: (*score as f64 * weight / 10.0).round() / 10.0,
        });
    }

    let score = if total_weight > 0.0 {
        round1(weighted_sum / total_weight).clamp(0.0, 10.0)
    } else {
        0.0
    };

    breakdown.sort_by(|a, b| {
        b.contribution
            .partial_cmp(&a.contribution)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Aggregate { score, breakdown }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
