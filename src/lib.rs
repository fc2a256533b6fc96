pub mod batch;
pub mod browser;
pub mod config;
pub mod output;
pub mod parcel;
pub mod routing;
pub mod scoring;
