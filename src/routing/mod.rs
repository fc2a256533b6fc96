pub mod cache;
pub mod client;
pub mod tracker;
pub mod types;

pub use cache::LookupCache;
pub use client::OrsClient;
pub use tracker::{Measurement, Source, TravelTracker};
pub use types::{LookupError, RouteSummary, TravelLookup};
