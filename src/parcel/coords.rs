use regex::Regex;
use std::sync::OnceLock;

use super::types::Coordinates;

fn patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"@(-?\d+\.\d+),(-?\d+\.\d+)").expect("valid regex"),
            Regex::new(r"ll=(-?\d+\.\d+),(-?\d+\.\d+)").expect("valid regex"),
            Regex::new(r"place/(-?\d+\.\d+),(-?\d+\.\d+)").expect("valid regex"),
        ]
    })
}

/// Pull a coordinate pair out of a Google Maps link.
///
/// Recognised forms, first match wins: `@lat,lng`, `ll=lat,lng`, `place/lat,lng`.
pub fn extract_coordinates(link: &str) -> Option<Coordinates> {
    patterns().iter().find_map(|re| {
        let caps = re.captures(link)?;
        let lat: f64 = caps[1].parse().ok()?;
        let lng: f64 = caps[2].parse().ok()?;
        Coordinates::new(lat, lng).ok()
    })
}

/// Google Maps directions URL from a parcel to a destination.
pub fn directions_url(origin: &Coordinates, destination: &Coordinates) -> String {
    format!(
        "https://www.google.com/maps/dir/{},{}/{},{}",
        origin.lat, origin.lng, destination.lat, destination.lng
    )
}
