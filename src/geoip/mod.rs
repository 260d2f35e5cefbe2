//! Geolocation lookup over HTTP.
//!
//! This module queries an external geolocation service for addresses that have no
//! cached verdict, validates the response, and produces a [`GeoVerdict`].

mod extract;
mod lookup;
mod types;

// Re-export public API
pub use lookup::GeoLookupClient;
pub use types::{is_china_region, now_millis, GeoVerdict};
