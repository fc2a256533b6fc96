use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};

use super::types::{LookupError, RouteSummary, TravelLookup};
use crate::parcel::{Coordinates, Destination};

pub const DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org";
pub const DEFAULT_PROFILE: &str = "driving-car";

/// OpenRouteService directions client.
#[derive(Clone)]
pub struct OrsClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    profile: String,
    retries: usize,
}

impl OrsClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            profile: DEFAULT_PROFILE.to_string(),
            retries: 2,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    fn directions_url(&self, origin: &Coordinates, destination: &Coordinates) -> String {
        // ORS expects lng,lat ordering
        format!(
            "{}/v2/directions/{}?api_key={}&start={},{}&end={},{}",
            self.base_url,
            self.profile,
            self.api_key,
            origin.lng,
            origin.lat,
            destination.lng,
            destination.lat
        )
    }

    async fn fetch_once(&self, url: &str) -> Result<RouteSummary, LookupError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(LookupError::Upstream {
                status: status.as_u16(),
                message: extract_error_message(&body)
                    .unwrap_or_else(|| format!("API error: {}", status.as_u16())),
            });
        }

        parse_summary(&body)
    }
}

#[async_trait]
impl TravelLookup for OrsClient {
    async fn route(
        &self,
        origin: Coordinates,
        destination: Destination,
    ) -> Result<RouteSummary, LookupError> {
        if self.api_key.trim().is_empty() {
            return Err(LookupError::MissingApiKey);
        }
        origin
            .validate()
            .map_err(|e| LookupError::InvalidOrigin(e.to_string()))?;

        let url = self.directions_url(&origin, &destination.coordinates());
        tracing::debug!(
            origin = %origin,
            destination = destination.key(),
            profile = %self.profile,
            "requesting directions"
        );

        let retry_strategy = ExponentialBackoff::from_millis(200)
            .max_delay(Duration::from_secs(5))
            .take(self.retries);

        RetryIf::spawn(
            retry_strategy,
            || self.fetch_once(&url),
            |e: &LookupError| {
                let retry = e.is_transient();
                if retry {
                    tracing::debug!(error = %e, "retrying directions request");
                }
                retry
            },
        )
        .await
    }
}

#[derive(Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    features: Vec<Feature>,
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Deserialize)]
struct Feature {
    properties: Properties,
}

#[derive(Deserialize)]
struct Properties {
    summary: Summary,
}

#[derive(Deserialize)]
struct Route {
    summary: Summary,
}

#[derive(Deserialize)]
struct Summary {
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    distance: f64,
}

/// Read the route summary from either the GeoJSON (`features`) or the
/// plain JSON (`routes`) response shape.
fn parse_summary(body: &str) -> Result<RouteSummary, LookupError> {
    let parsed: DirectionsResponse =
        serde_json::from_str(body).map_err(|e| LookupError::Decode(e.to_string()))?;

    let summary = parsed
        .features
        .into_iter()
        .next()
        .map(|f| f.properties.summary)
        .or_else(|| parsed.routes.into_iter().next().map(|r| r.summary))
        .ok_or(LookupError::RouteNotFound)?;

    Ok(RouteSummary {
        duration_seconds: summary.duration,
        distance_meters: summary.distance,
    })
}

/// ORS reports errors as `{"error": {"message": ..}}` or `{"error": ".."}`.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    error
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| error.as_str())
        .map(str::to_string)
}
