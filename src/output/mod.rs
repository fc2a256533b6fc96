pub mod formatter;

pub use formatter::{
    format_breakdown, format_currency, format_delta, format_parcel_detail, format_refresh_report,
    format_score, format_scored_table, format_stats, format_travel_cell, should_use_colors,
    sort_scored, ScoreBand, ScoredParcel, TravelBadge,
};
