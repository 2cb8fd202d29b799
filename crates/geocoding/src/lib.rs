//! Address geocoding for the obras map.
//!
//! Wraps a Nominatim-compatible search endpoint, scoped to Brazil, with a
//! small static table of city coordinates callers can fall back to.

pub mod fallback;
pub mod resolver;

pub use fallback::{CITY_COORDINATES, fallback_for};
pub use resolver::{
    AddressResolver, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, GeocodeError,
    GeocodeResult, GeocoderConfig, validate_address, with_country_qualifier,
};
