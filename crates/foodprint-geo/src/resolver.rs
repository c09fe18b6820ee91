//! Turn user input into coordinates: direct coordinates, then the capital
//! cache, then the external geocoder.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use foodprint_core::{Coordinates, UserLocation};

use crate::capitals::lookup_capital;
use crate::error::GeoError;
use crate::provider::GeoProvider;

pub struct LocationResolver {
    provider: Option<Arc<dyn GeoProvider>>,
    /// Successful geocoder answers, keyed by normalized place text.
    geocoded: Mutex<HashMap<String, Coordinates>>,
}

impl LocationResolver {
    /// A resolver that only uses the built-in capital cache.
    #[must_use]
    pub fn offline() -> Self {
        Self {
            provider: None,
            geocoded: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_provider(provider: Arc<dyn GeoProvider>) -> Self {
        Self {
            provider: Some(provider),
            geocoded: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a consumer location.
    ///
    /// Coordinates, when both are present, are authoritative and skip
    /// geocoding entirely.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::LocationUnavailable`] when there are no usable
    /// coordinates and the place text cannot be resolved.
    pub async fn resolve(&self, location: &UserLocation) -> Result<Coordinates, GeoError> {
        if let Some(coords) = location.coordinates() {
            return Ok(coords);
        }
        match location.place_text() {
            Some(text) => self.resolve_place(&text).await,
            None => Err(GeoError::LocationUnavailable(
                "no coordinates and no city or country given".to_string(),
            )),
        }
    }

    /// Resolve a free-text place name.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::LocationUnavailable`] if the name is blank, misses
    /// the cache, and the geocoder is absent or cannot resolve it.
    pub async fn resolve_place(&self, place: &str) -> Result<Coordinates, GeoError> {
        let key = place.trim().to_lowercase();
        if key.is_empty() {
            return Err(GeoError::LocationUnavailable("empty place name".to_string()));
        }

        if let Some(coords) = lookup_capital(&key) {
            return Ok(coords);
        }

        if let Some(coords) = self.cached(&key) {
            return Ok(coords);
        }

        let Some(provider) = &self.provider else {
            return Err(GeoError::LocationUnavailable(format!(
                "'{place}' is not in the location cache and no geocoder is configured"
            )));
        };

        match provider.geocode(place.trim()).await {
            Ok(coords) => {
                if let Ok(mut map) = self.geocoded.lock() {
                    map.insert(key, coords);
                }
                Ok(coords)
            }
            Err(e) => {
                tracing::warn!(place, error = %e, "geocoding failed");
                Err(GeoError::LocationUnavailable(format!(
                    "could not resolve '{place}': {e}"
                )))
            }
        }
    }

    fn cached(&self, key: &str) -> Option<Coordinates> {
        self.geocoded.lock().ok()?.get(key).copied()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct CountingGeocoder {
        calls: AtomicU32,
    }

    #[async_trait]
    impl GeoProvider for CountingGeocoder {
        async fn geocode(&self, place: &str) -> Result<Coordinates, GeoError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if place.eq_ignore_ascii_case("Utrecht") {
                Ok(Coordinates { lat: 52.09, lng: 5.12 })
            } else {
                Err(GeoError::NotFound(place.to_string()))
            }
        }

        async fn route_distance(&self, _: Coordinates, _: Coordinates) -> Result<f64, GeoError> {
            Err(GeoError::Provider("unused".to_string()))
        }
    }

    #[tokio::test]
    async fn coordinates_skip_geocoding() {
        let geocoder = Arc::new(CountingGeocoder::default());
        let resolver = LocationResolver::with_provider(geocoder.clone());
        let loc = UserLocation {
            city: Some("Utrecht".to_string()),
            latitude: Some(1.0),
            longitude: Some(2.0),
            ..UserLocation::default()
        };
        let c = resolver.resolve(&loc).await.unwrap();
        assert_eq!(c, Coordinates { lat: 1.0, lng: 2.0 });
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cache_hit_skips_geocoding() {
        let geocoder = Arc::new(CountingGeocoder::default());
        let resolver = LocationResolver::with_provider(geocoder.clone());
        let loc = UserLocation::from_place(None, Some("Spain".to_string()));
        let c = resolver.resolve(&loc).await.unwrap();
        assert!((c.lat - 40.4168).abs() < 1e-9);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cache_miss_uses_geocoder_once() {
        let geocoder = Arc::new(CountingGeocoder::default());
        let resolver = LocationResolver::with_provider(geocoder.clone());
        let first = resolver.resolve_place("Utrecht").await.unwrap();
        let second = resolver.resolve_place("utrecht ").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn geocoder_failure_is_location_unavailable() {
        let resolver = LocationResolver::with_provider(Arc::new(CountingGeocoder::default()));
        let err = resolver.resolve_place("Atlantis").await.unwrap_err();
        assert!(matches!(err, GeoError::LocationUnavailable(_)));
    }

    #[tokio::test]
    async fn offline_resolver_misses_unknown_places() {
        let err = LocationResolver::offline()
            .resolve_place("Utrecht")
            .await
            .unwrap_err();
        assert!(matches!(err, GeoError::LocationUnavailable(_)));
    }

    #[tokio::test]
    async fn empty_location_is_unavailable() {
        let err = LocationResolver::offline()
            .resolve(&UserLocation::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GeoError::LocationUnavailable(_)));
    }
}
