use async_trait::async_trait;
use foodprint_core::Coordinates;

use crate::error::GeoError;

/// External geocoding and routing collaborator.
///
/// The resolver and distance engine work without one (static cache plus
/// haversine), so every implementation may fail freely.
#[async_trait]
pub trait GeoProvider: Send + Sync {
    /// Resolve a free-text place name to coordinates.
    async fn geocode(&self, place: &str) -> Result<Coordinates, GeoError>;

    /// Travel distance in kilometres along a real route.
    async fn route_distance(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<f64, GeoError>;
}
