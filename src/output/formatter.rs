use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::batch::RefreshReport;
use crate::parcel::{CollectionStats, Destination, Parcel, TravelSlot};
use crate::scoring::{Contribution, ScoreResult};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Coarse quality band for a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Great,
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 7.0 {
            ScoreBand::Great
        } else if score >= 5.0 {
            ScoreBand::Good
        } else if score >= 3.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Great => "great",
            ScoreBand::Good => "good",
            ScoreBand::Fair => "fair",
            ScoreBand::Poor => "poor",
        }
    }
}

/// Travel time band, by minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelBadge {
    Fast,
    Moderate,
    Slow,
}

impl TravelBadge {
    pub fn from_minutes(minutes: u32) -> Self {
        if minutes <= 20 {
            TravelBadge::Fast
        } else if minutes <= 30 {
            TravelBadge::Moderate
        } else {
            TravelBadge::Slow
        }
    }
}

/// Format a score with one decimal, "-" when not scored yet.
/// If incomplete is true, appends asterisk to indicate neutral-filled criteria
pub fn format_score(score: Option<f64>, incomplete: bool) -> String {
    match score {
        None => "-".to_string(),
        Some(s) if incomplete => format!("{:.1}*", s),
        Some(s) => format!("{:.1}", s),
    }
}

fn paint_score(text: &str, score: Option<f64>) -> String {
    match score.map(ScoreBand::from_score) {
        Some(ScoreBand::Great) => text.green().bold().to_string(),
        Some(ScoreBand::Good) => text.cyan().bold().to_string(),
        Some(ScoreBand::Fair) => text.yellow().bold().to_string(),
        Some(ScoreBand::Poor) => text.red().bold().to_string(),
        None => text.dimmed().to_string(),
    }
}

fn paint_travel(text: &str, minutes: Option<u32>) -> String {
    match minutes.map(TravelBadge::from_minutes) {
        Some(TravelBadge::Fast) => text.green().to_string(),
        Some(TravelBadge::Moderate) => text.yellow().to_string(),
        Some(TravelBadge::Slow) => text.red().to_string(),
        None => text.dimmed().to_string(),
    }
}

/// Format a signed minute delta: "+3 min", "-2 min", "= min"
pub fn format_delta(delta: i64) -> String {
    if delta > 0 {
        format!("+{} min", delta)
    } else if delta < 0 {
        format!("{} min", delta)
    } else {
        "= min".to_string()
    }
}

/// Minutes that decide the badge of a travel cell: the baseline when a
/// drift is being shown, otherwise whatever value is displayed.
fn badge_minutes(slot: &TravelSlot) -> Option<u32> {
    match (&slot.current, &slot.baseline) {
        (Some(c), Some(b)) if c.minutes != b.minutes => Some(b.minutes),
        _ => slot.effective_minutes(),
    }
}

/// Text for one travel cell.
///
/// Shows the baseline with the signed drift when current and baseline
/// differ, otherwise the single known value. "!" marks a failed last lookup.
pub fn format_travel_cell(slot: &TravelSlot) -> String {
    let mut text = match (&slot.current, &slot.baseline) {
        (Some(c), Some(b)) if c.minutes != b.minutes => {
            format!("{} {}", b.text, format_delta(c.minutes as i64 - b.minutes as i64))
        }
        (Some(c), _) => c.text.clone(),
        (None, Some(b)) => b.text.clone(),
        (None, None) => "-".to_string(),
    };
    if slot.last_error.is_some() {
        text.push('!');
    }
    text
}

/// Format an amount as Brazilian reais with dot thousand separators
/// (990000 -> "R$ 990.000")
pub fn format_currency(value: f64) -> String {
    let rounded = value.round() as i64;
    format!("R$ {}", group_thousands(rounded))
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn format_area(area: Option<f64>) -> String {
    area.map(|a| format!("{} m²", group_thousands(a.round() as i64)))
        .unwrap_or_else(|| "-".to_string())
}

fn format_optional_currency(value: Option<f64>) -> String {
    value.map(format_currency).unwrap_or_else(|| "-".to_string())
}

/// A parcel with its calculated score for display
pub struct ScoredParcel<'a> {
    pub parcel: &'a Parcel,
    pub score: f64,
    pub incomplete: bool,
}

/// Order by score descending, ties by ascending id.
pub fn sort_scored(parcels: &mut [ScoredParcel]) {
    parcels.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.parcel.id.cmp(&b.parcel.id))
    });
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a label to fit available width, accounting for Unicode
fn truncate_label(label: &str, max_width: usize) -> String {
    let chars: Vec<char> = label.chars().collect();
    if chars.len() <= max_width {
        label.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - len))
    }
}

/// Format parcels as a scored table, in the order given.
/// Columns: index, score, label, price, area, then one travel cell per destination.
pub fn format_scored_table(parcels: &[ScoredParcel], use_colors: bool) -> String {
    if parcels.is_empty() {
        return "No parcels found.".to_string();
    }

    let score_width = 5;
    let price_width = 14;
    let area_width = 10;
    let travel_width = 16;
    let separator = "  ";

    let fixed_width = 4
        + score_width
        + price_width
        + area_width
        + (travel_width + 1) * Destination::ALL.len()
        + separator.len() * 4;
    let natural = parcels
        .iter()
        .map(|s| s.parcel.label().chars().count())
        .max()
        .unwrap_or(0);
    let label_width = match get_terminal_width() {
        Some(width) if width > fixed_width + 10 => natural.min(width - fixed_width),
        Some(_) => natural.min(20),
        None => natural,
    };

    parcels
        .iter()
        .enumerate()
        .map(|(idx, scored)| {
            let parcel = scored.parcel;
            let index_str = format!("{:>3}.", idx + 1);
            let score_str = format!(
                "{:>width$}",
                format_score(Some(scored.score), scored.incomplete),
                width = score_width
            );
            let label = pad(&truncate_label(&parcel.label(), label_width), label_width);
            let price = format!(
                "{:>width$}",
                format_optional_currency(parcel.price),
                width = price_width
            );
            let area = format!("{:>width$}", format_area(parcel.area_m2), width = area_width);

            let travel = Destination::ALL
                .iter()
                .map(|d| {
                    let slot = parcel.travel.slot(*d);
                    let cell = pad(&format_travel_cell(slot), travel_width);
                    if use_colors {
                        paint_travel(&cell, badge_minutes(slot))
                    } else {
                        cell
                    }
                })
                .collect::<Vec<_>>()
                .join(" ");

            if use_colors {
                format!(
                    "{} {}{}{}{}{}{}{}{}{}",
                    index_str.dimmed(),
                    paint_score(&score_str, Some(scored.score)),
                    separator,
                    label.bold(),
                    separator,
                    price,
                    separator,
                    area,
                    separator,
                    travel
                )
            } else {
                format!(
                    "{} {}{}{}{}{}{}{}{}{}",
                    index_str,
                    score_str,
                    separator,
                    label,
                    separator,
                    price,
                    separator,
                    area,
                    separator,
                    travel
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// "Why this score": one line per criterion, largest contribution first.
pub fn format_breakdown(breakdown: &[Contribution]) -> String {
    breakdown
        .iter()
        .map(|c| {
            format!(
                "    {:<26} {:>2}/10  weight {:>4}  {:>4.1}",
                c.criterion.label(),
                c.score,
                c.weight,
                c.contribution
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_travel_detail(slot: &TravelSlot) -> String {
    let mut text = match (&slot.current, &slot.baseline, slot.compare()) {
        (Some(c), Some(b), Some(cmp)) => {
            format!("{} (baseline {}, {})", c.text, b.text, format_delta(cmp.delta))
        }
        (Some(c), None, _) => c.text.clone(),
        (None, Some(b), _) => format!("{} (baseline)", b.text),
        _ => "not measured".to_string(),
    };
    if let Some(ref error) = slot.last_error {
        text.push_str(&format!(" [last lookup failed: {}]", error));
    }
    text
}

/// Format a single parcel with its score breakdown
pub fn format_parcel_detail(parcel: &Parcel, result: &ScoreResult, use_colors: bool) -> String {
    let band = ScoreBand::from_score(result.score);
    let score_str = format_score(Some(result.score), result.incomplete);
    let header = if use_colors {
        format!(
            "{}  score {} ({})",
            parcel.label().bold(),
            paint_score(&score_str, Some(result.score)),
            band.label()
        )
    } else {
        format!("{}  score {} ({})", parcel.label(), score_str, band.label())
    };

    let mut lines = vec![header];
    lines.push(format!(
        "  Price: {}   Area: {}   Price/m²: {}",
        format_optional_currency(parcel.price),
        format_area(parcel.area_m2),
        format_optional_currency(parcel.price_per_m2)
    ));
    let labels = &parcel.classification;
    lines.push(format!(
        "  Location: {}   Safety: {}   Shape: {}",
        labels.location.as_deref().unwrap_or("-"),
        labels.safety.as_deref().unwrap_or("-"),
        labels.shape.as_deref().unwrap_or("-")
    ));
    if let Some(ref coords) = parcel.coordinates {
        lines.push(format!("  Coordinates: {}", coords));
    }
    if let Some(ref link) = parcel.maps_link {
        if use_colors {
            lines.push(format!("  Link: {}", link.underline()));
        } else {
            lines.push(format!("  Link: {}", link));
        }
    }

    lines.push("  Travel:".to_string());
    for destination in Destination::ALL {
        lines.push(format!(
            "    {:<18} {}",
            format!("{}:", destination.name()),
            format_travel_detail(parcel.travel.slot(destination))
        ));
    }

    lines.push("  Why this score:".to_string());
    lines.push(format_breakdown(&result.breakdown));
    if result.incomplete {
        lines.push("  * some criteria had no data and scored neutral (5)".to_string());
    }

    lines.join("\n")
}

/// Summary of a travel refresh run
pub fn format_refresh_report(report: &RefreshReport) -> String {
    let mut lines = vec![format!(
        "Visited {} parcels ({} skipped without coordinates): {} measured, {} cached, {} failed",
        report.parcels_visited,
        report.skipped_without_coordinates,
        report.measured,
        report.cached,
        report.failures.len()
    )];

    if report.measured + report.cached > 0 {
        if report.comparison_run {
            lines.push("Compared against stored baselines.".to_string());
        } else {
            lines.push("Baselines recorded.".to_string());
        }
    }

    for failure in &report.failures {
        lines.push(format!(
            "  #{} -> {}: {}",
            failure.parcel_id,
            failure.destination.name(),
            failure.message
        ));
    }

    lines.join("\n")
}

pub fn format_stats(stats: &CollectionStats) -> String {
    if stats.total == 0 {
        return "No parcels found.".to_string();
    }
    format!(
        "Parcels: {}\nAverage price/m²: {}\nPrice range: {} - {}",
        stats.total,
        format_currency(stats.mean_price_per_m2),
        format_currency(stats.min_price),
        format_currency(stats.max_price)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::LookupFailure;
    use crate::parcel::TravelTime;
    use crate::scoring::{calculate_score, ScoringConfig};

    fn time(minutes: u32) -> TravelTime {
        TravelTime {
            minutes,
            text: format!("{} min", minutes),
        }
    }

    fn sample_parcel(id: u64, name: &str) -> Parcel {
        let mut parcel = Parcel::new(id);
        parcel.neighborhood = Some(name.to_string());
        parcel.set_price(Some(990_000.0));
        parcel.set_area(Some(2800.0));
        parcel
    }

    #[test]
    fn test_score_band() {
        assert_eq!(ScoreBand::from_score(7.0), ScoreBand::Great);
        assert_eq!(ScoreBand::from_score(6.9), ScoreBand::Good);
        assert_eq!(ScoreBand::from_score(5.0), ScoreBand::Good);
        assert_eq!(ScoreBand::from_score(3.0), ScoreBand::Fair);
        assert_eq!(ScoreBand::from_score(2.9), ScoreBand::Poor);
    }

    #[test]
    fn test_travel_badge() {
        assert_eq!(TravelBadge::from_minutes(20), TravelBadge::Fast);
        assert_eq!(TravelBadge::from_minutes(21), TravelBadge::Moderate);
        assert_eq!(TravelBadge::from_minutes(30), TravelBadge::Moderate);
        assert_eq!(TravelBadge::from_minutes(31), TravelBadge::Slow);
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(Some(7.6), false), "7.6");
        assert_eq!(format_score(Some(5.0), true), "5.0*");
        assert_eq!(format_score(None, false), "-");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(990_000.0), "R$ 990.000");
        assert_eq!(format_currency(4_400_000.0), "R$ 4.400.000");
        assert_eq!(format_currency(354.0), "R$ 354");
        assert_eq!(format_currency(0.0), "R$ 0");
        assert_eq!(format_currency(1000.4), "R$ 1.000");
    }

    #[test]
    fn test_format_delta() {
        assert_eq!(format_delta(3), "+3 min");
        assert_eq!(format_delta(-2), "-2 min");
        assert_eq!(format_delta(0), "= min");
    }

    #[test]
    fn test_travel_cell_empty() {
        assert_eq!(format_travel_cell(&TravelSlot::default()), "-");
    }

    #[test]
    fn test_travel_cell_single_value() {
        let mut slot = TravelSlot::default();
        slot.record(time(18));
        assert_eq!(format_travel_cell(&slot), "18 min");

        // Same value again: no drift shown
        slot.record(time(18));
        assert_eq!(format_travel_cell(&slot), "18 min");
    }

    #[test]
    fn test_travel_cell_drift() {
        let mut slot = TravelSlot::default();
        slot.record(time(18));
        slot.record(time(21));
        assert_eq!(format_travel_cell(&slot), "18 min +3 min");

        slot.record(time(16));
        assert_eq!(format_travel_cell(&slot), "18 min -2 min");
    }

    #[test]
    fn test_travel_cell_error_marker() {
        let mut slot = TravelSlot::default();
        slot.record(time(18));
        slot.record_error("route not found");
        assert_eq!(format_travel_cell(&slot), "18 min!");
    }

    #[test]
    fn test_travel_cell_baseline_only() {
        let slot = TravelSlot {
            current: None,
            baseline: Some(time(25)),
            last_error: None,
        };
        assert_eq!(format_travel_cell(&slot), "25 min");
        assert_eq!(badge_minutes(&slot), Some(25));
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("#1 Alaga", 20), "#1 Alaga");
        assert_eq!(truncate_label("#12 Santa Felicidade", 10), "#12 San...");
        assert_eq!(truncate_label("#1 Alaga", 3), "#1 ");
    }

    #[test]
    fn test_sort_scored_ties_by_id() {
        let a = sample_parcel(3, "A");
        let b = sample_parcel(1, "B");
        let c = sample_parcel(2, "C");
        let mut scored = vec![
            ScoredParcel {
                parcel: &a,
                score: 6.0,
                incomplete: false,
            },
            ScoredParcel {
                parcel: &b,
                score: 6.0,
                incomplete: false,
            },
            ScoredParcel {
                parcel: &c,
                score: 8.0,
                incomplete: false,
            },
        ];
        sort_scored(&mut scored);
        let ids: Vec<u64> = scored.iter().map(|s| s.parcel.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_format_scored_table_empty() {
        let scored: Vec<ScoredParcel> = vec![];
        assert_eq!(format_scored_table(&scored, false), "No parcels found.");
    }

    #[test]
    fn test_format_scored_table_rows() {
        let mut first = sample_parcel(1, "Alaga");
        first.travel.office.record(time(18));
        let second = sample_parcel(2, "Campo Comprido");

        let scored = vec![
            ScoredParcel {
                parcel: &first,
                score: 7.6,
                incomplete: false,
            },
            ScoredParcel {
                parcel: &second,
                score: 5.2,
                incomplete: true,
            },
        ];
        let result = format_scored_table(&scored, false);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  1."));
        assert!(lines[0].contains("7.6"));
        assert!(lines[0].contains("#1 Alaga"));
        assert!(lines[0].contains("R$ 990.000"));
        assert!(lines[0].contains("2.800 m²"));
        assert!(lines[0].contains("18 min"));
        assert!(lines[1].starts_with("  2."));
        assert!(lines[1].contains("5.2*"));
    }

    #[test]
    fn test_format_parcel_detail() {
        let mut parcel = sample_parcel(4, "Alaga");
        parcel.classification.location = Some("otimo".to_string());
        parcel.travel.office.record(time(15));
        parcel.travel.office.record(time(18));
        let result = calculate_score(&parcel, &ScoringConfig::default());

        let detail = format_parcel_detail(&parcel, &result, false);
        assert!(detail.starts_with("#4 Alaga"));
        assert!(detail.contains("Price: R$ 990.000"));
        assert!(detail.contains("Price/m²: R$ 354"));
        assert!(detail.contains("Location: otimo"));
        assert!(detail.contains("18 min (baseline 15 min, +3 min)"));
        assert!(detail.contains("Why this score:"));
        assert!(detail.contains("neutral"));
    }

    #[test]
    fn test_format_breakdown_lines() {
        let parcel = sample_parcel(1, "Alaga");
        let result = calculate_score(&parcel, &ScoringConfig::default());
        let text = format_breakdown(&result.breakdown);
        assert_eq!(text.lines().count(), result.breakdown.len());
    }

    #[test]
    fn test_format_refresh_report() {
        let report = RefreshReport {
            parcels_visited: 2,
            skipped_without_coordinates: 1,
            measured: 5,
            cached: 0,
            failures: vec![LookupFailure {
                parcel_id: 1,
                destination: Destination::Marista,
                message: "route not found".to_string(),
            }],
            comparison_run: false,
        };
        let text = format_refresh_report(&report);
        assert!(text.contains("Visited 2 parcels (1 skipped without coordinates)"));
        assert!(text.contains("5 measured, 0 cached, 1 failed"));
        assert!(text.contains("Baselines recorded."));
        assert!(text.contains("#1 -> Marista Sta Maria: route not found"));
    }

    #[test]
    fn test_format_stats() {
        let stats = CollectionStats {
            total: 2,
            mean_price_per_m2: 500.0,
            min_price: 990_000.0,
            max_price: 2_000_000.0,
        };
        let text = format_stats(&stats);
        assert!(text.contains("Parcels: 2"));
        assert!(text.contains("Average price/m²: R$ 500"));
        assert!(text.contains("R$ 990.000 - R$ 2.000.000"));
    }
}
