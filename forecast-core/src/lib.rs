//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - Configuration & API key loading
//! - The hourly timeline client (request building, HTTP call)
//! - Flattening of the nested `days[].hours[]` response into hourly records
//!
//! It is used by `forecast-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod flatten;
pub mod model;
pub mod sink;

pub use client::ForecastClient;
pub use config::ForecastConfig;
pub use credential::Credential;
pub use error::ForecastError;
pub use flatten::parse_response;
pub use model::{DateRange, ForecastEnd, ForecastRequest, ForecastResult, HourlyRecord};
pub use sink::{JsonFileSink, RecordSink};
