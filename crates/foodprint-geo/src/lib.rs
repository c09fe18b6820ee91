//! Location resolution and travel-distance estimation.
//!
//! Resolves consumer and source locations to coordinates (capital cache
//! first, then an external geocoder) and measures the distance between
//! them, preferring a routing service and falling back to haversine.

pub mod capitals;
pub mod client;
pub mod distance;
pub mod error;
pub mod geolocation;
pub mod haversine;
pub mod provider;
pub mod resolver;

mod retry;

pub use capitals::lookup_capital;
pub use client::{HttpGeoProvider, HttpSettings};
pub use distance::{DistanceEngine, DistanceEstimate, DistanceMethod, Origin, DEFAULT_DISTANCE_KM};
pub use error::{GeoError, GeolocationError};
pub use geolocation::{acquire_user_location, request_position, IpGeolocation, Position, PositionSource};
pub use haversine::{haversine_km, EARTH_RADIUS_KM};
pub use provider::GeoProvider;
pub use resolver::LocationResolver;
