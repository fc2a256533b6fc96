use async_trait::async_trait;

use crate::parcel::{Coordinates, Destination};

/// Raw result of a directions lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSummary {
    pub duration_seconds: f64,
    pub distance_meters: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LookupError {
    #[error("invalid origin coordinates: {0}")]
    InvalidOrigin(String),

    #[error("routing API error {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("route not found")]
    RouteNotFound,

    #[error("connection error: {0}")]
    Network(String),

    #[error("unreadable routing response: {0}")]
    Decode(String),

    #[error("no routing API key configured")]
    MissingApiKey,
}

impl LookupError {
    /// Failures worth retrying: network trouble, rate limiting, server errors.
    pub fn is_transient(&self) -> bool {
        match self {
            LookupError::Network(_) => true,
            LookupError::Upstream { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Travel-time lookup capability. The crate never routes by itself.
#[async_trait]
pub trait TravelLookup {
    async fn route(
        &self,
        origin: Coordinates,
        destination: Destination,
    ) -> Result<RouteSummary, LookupError>;
}
