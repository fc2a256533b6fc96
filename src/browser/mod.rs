use anyhow::{Context, Result};

use crate::parcel::{directions_url, Destination, Parcel};

/// Open a URL in the user's default browser
///
/// # Errors
/// Returns error if browser cannot be opened (e.g., no browser available)
pub fn open_url(url: &str) -> Result<()> {
    webbrowser::open(url)
        .with_context(|| format!("Failed to open browser for URL: {}", url))?;
    Ok(())
}

/// Directions URL from a parcel to a destination.
///
/// # Errors
/// Returns error if the parcel has no coordinates
pub fn route_url(parcel: &Parcel, destination: Destination) -> Result<String> {
    let origin = parcel
        .coordinates
        .with_context(|| format!("Parcel {} has no coordinates", parcel.id))?;
    Ok(directions_url(&origin, &destination.coordinates()))
}
