//! Single-shot "where am I" requests.
//!
//! A position source answers once with a fix or a typed failure; it is never
//! a subscription. [`acquire_user_location`] wraps one request in a timeout
//! and falls back to manually entered details.

use std::time::Duration;

use async_trait::async_trait;
use foodprint_core::{Coordinates, UserLocation};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::client::{parse_base_url, HttpSettings};
use crate::error::{GeoError, GeolocationError};

/// A device- or network-backed position fix.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub coordinates: Coordinates,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl From<Position> for UserLocation {
    fn from(p: Position) -> Self {
        Self {
            city: p.city,
            country: p.country,
            latitude: Some(p.coordinates.lat),
            longitude: Some(p.coordinates.lng),
        }
    }
}

#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn current_position(&self) -> Result<Position, GeolocationError>;
}

/// Issue one position request, bounded by `timeout`.
///
/// # Errors
///
/// Returns the source's own [`GeolocationError`], or
/// [`GeolocationError::Timeout`] if no answer arrives in time.
pub async fn request_position(
    source: &dyn PositionSource,
    timeout: Duration,
) -> Result<Position, GeolocationError> {
    match tokio::time::timeout(timeout, source.current_position()).await {
        Ok(result) => result,
        Err(_) => Err(GeolocationError::Timeout {
            secs: timeout.as_secs(),
        }),
    }
}

/// Try live geolocation first, then the manually entered location.
///
/// # Errors
///
/// Returns [`GeoError::LocationUnavailable`] when the position request fails
/// and the manual entry is missing or empty.
pub async fn acquire_user_location(
    source: Option<&dyn PositionSource>,
    timeout: Duration,
    manual: Option<UserLocation>,
) -> Result<UserLocation, GeoError> {
    let mut failure = None;
    if let Some(source) = source {
        match request_position(source, timeout).await {
            Ok(position) => return Ok(position.into()),
            Err(e) => {
                tracing::warn!(error = %e, "geolocation failed, trying manual location");
                failure = Some(e);
            }
        }
    }

    match manual {
        Some(loc) if !loc.is_empty() => Ok(loc),
        _ => Err(GeoError::LocationUnavailable(match failure {
            Some(e) => format!("{e}; enter a city or country manually"),
            None => "no location provided; enter a city or country manually".to_string(),
        })),
    }
}

#[derive(Debug, Deserialize)]
struct IpLocationResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
    country_name: Option<String>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

/// IP-based geolocation (`GET /json/`), the command-line stand-in for a
/// browser position prompt.
pub struct IpGeolocation {
    client: Client,
    url: Url,
}

impl IpGeolocation {
    /// # Errors
    ///
    /// Returns [`GeoError`] if the client cannot be built or the URL is invalid.
    pub fn new(base_url: &str, settings: &HttpSettings) -> Result<Self, GeoError> {
        let client = settings.build_client()?;
        let url = parse_base_url(base_url)?
            .join("json/")
            .map_err(|e| GeoError::Provider(format!("invalid IP location URL: {e}")))?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl PositionSource for IpGeolocation {
    async fn current_position(&self) -> Result<Position, GeolocationError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| GeolocationError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
                return Err(GeolocationError::Denied)
            }
            s if !s.is_success() => {
                return Err(GeolocationError::Unavailable(format!("status {s}")))
            }
            _ => {}
        }

        let body: IpLocationResponse = response
            .json()
            .await
            .map_err(|e| GeolocationError::Unavailable(e.to_string()))?;

        if body.error {
            return Err(GeolocationError::Unavailable(
                body.reason.unwrap_or_else(|| "lookup failed".to_string()),
            ));
        }

        let (Some(lat), Some(lng)) = (body.latitude, body.longitude) else {
            return Err(GeolocationError::Unavailable(
                "response carried no coordinates".to_string(),
            ));
        };
        let coordinates = Coordinates::new(lat, lng)
            .map_err(|e| GeolocationError::Unavailable(e.to_string()))?;

        Ok(Position {
            coordinates,
            city: body.city,
            country: body.country_name,
        })
    }
}
