//! HTTP client for Nominatim-style geocoding and OSRM-style routing.

use std::time::Duration;

use async_trait::async_trait;
use foodprint_core::{AppConfig, Coordinates};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::GeoError;
use crate::provider::GeoProvider;
use crate::retry::retry_with_backoff;

/// Connection settings shared by the geo HTTP clients.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: "foodprint/0.1 (sustainability-estimator)".to_string(),
            max_retries: 2,
            backoff_base_ms: 500,
        }
    }
}

impl From<&AppConfig> for HttpSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        }
    }
}

impl HttpSettings {
    pub(crate) fn build_client(&self) -> Result<Client, GeoError> {
        Ok(Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(self.user_agent.clone())
            .build()?)
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeHit {
    lat: String,
    lon: String,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    /// Metres.
    distance: f64,
}

/// Geocoding + routing over HTTP.
///
/// Routing is optional: without a routing base URL, [`GeoProvider::route_distance`]
/// reports a provider error and callers fall back to haversine.
pub struct HttpGeoProvider {
    client: Client,
    geocoder_url: Url,
    routing_url: Option<Url>,
    settings: HttpSettings,
}

impl HttpGeoProvider {
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the `reqwest::Client` cannot be built, or
    /// [`GeoError::Provider`] if a base URL does not parse.
    pub fn new(
        geocoder_base_url: &str,
        routing_base_url: Option<&str>,
        settings: HttpSettings,
    ) -> Result<Self, GeoError> {
        let client = settings.build_client()?;
        let geocoder_url = parse_base_url(geocoder_base_url)?;
        let routing_url = routing_base_url.map(parse_base_url).transpose()?;
        Ok(Self {
            client,
            geocoder_url,
            routing_url,
            settings,
        })
    }

    fn search_url(&self, place: &str) -> Result<Url, GeoError> {
        let mut url = self
            .geocoder_url
            .join("search")
            .map_err(|e| GeoError::Provider(format!("invalid geocoder URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("q", place)
            .append_pair("format", "json")
            .append_pair("limit", "1");
        Ok(url)
    }

    fn route_url(
        base: &Url,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<Url, GeoError> {
        let path = format!(
            "route/v1/driving/{},{};{},{}",
            origin.lng, origin.lat, destination.lng, destination.lat
        );
        let mut url = base
            .join(&path)
            .map_err(|e| GeoError::Provider(format!("invalid routing URL: {e}")))?;
        url.query_pairs_mut().append_pair("overview", "false");
        Ok(url)
    }

    async fn get_json(&self, url: &Url) -> Result<serde_json::Value, GeoError> {
        retry_with_backoff(self.settings.max_retries, self.settings.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self.client.get(url.clone()).send().await?;
                let response = response.error_for_status()?;
                let body = response.text().await?;
                serde_json::from_str(&body).map_err(|e| GeoError::Deserialize {
                    context: url.to_string(),
                    source: e,
                })
            }
        })
        .await
    }
}

#[async_trait]
impl GeoProvider for HttpGeoProvider {
    async fn geocode(&self, place: &str) -> Result<Coordinates, GeoError> {
        let url = self.search_url(place)?;
        let body = self.get_json(&url).await?;
        let hits: Vec<GeocodeHit> =
            serde_json::from_value(body).map_err(|e| GeoError::Deserialize {
                context: format!("geocode({place})"),
                source: e,
            })?;

        let hit = hits
            .into_iter()
            .next()
            .ok_or_else(|| GeoError::NotFound(place.to_string()))?;

        let lat = hit.lat.parse::<f64>();
        let lng = hit.lon.parse::<f64>();
        match (lat, lng) {
            (Ok(lat), Ok(lng)) => Coordinates::new(lat, lng)
                .map_err(|e| GeoError::Provider(format!("geocode({place}): {e}"))),
            _ => Err(GeoError::Provider(format!(
                "geocode({place}): non-numeric coordinates '{}', '{}'",
                hit.lat, hit.lon
            ))),
        }
    }

    async fn route_distance(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<f64, GeoError> {
        let Some(base) = &self.routing_url else {
            return Err(GeoError::Provider("no routing service configured".to_string()));
        };
        let url = Self::route_url(base, origin, destination)?;
        let body = self.get_json(&url).await?;
        let parsed: RouteResponse =
            serde_json::from_value(body).map_err(|e| GeoError::Deserialize {
                context: "route".to_string(),
                source: e,
            })?;

        if parsed.code != "Ok" {
            return Err(GeoError::Provider(format!(
                "routing returned {}: {}",
                parsed.code,
                parsed.message.unwrap_or_default()
            )));
        }

        parsed
            .routes
            .first()
            .map(|r| r.distance / 1000.0)
            .filter(|km| km.is_finite() && *km >= 0.0)
            .ok_or_else(|| GeoError::Provider("routing returned no usable route".to_string()))
    }
}

/// Ensure the base URL ends with exactly one slash so `Url::join` appends
/// rather than replacing the last path segment.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, GeoError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised)
        .map_err(|e| GeoError::Provider(format!("invalid base URL '{base_url}': {e}")))
}
