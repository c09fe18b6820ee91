//! Source-to-consumer travel distance.
//!
//! Preference order: routing provider, haversine over resolved coordinates,
//! then a fixed default when the origin cannot be resolved at all. This path
//! never fails.

use std::sync::Arc;

use foodprint_core::Coordinates;
use serde::Serialize;

use crate::haversine::haversine_km;
use crate::provider::GeoProvider;
use crate::resolver::LocationResolver;

/// Distance assumed when the origin cannot be resolved.
pub const DEFAULT_DISTANCE_KM: u32 = 5000;

#[derive(Debug, Clone, Copy)]
pub enum Origin<'a> {
    Place(&'a str),
    Point(Coordinates),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMethod {
    Route,
    Haversine,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DistanceEstimate {
    pub km: u32,
    pub method: DistanceMethod,
}

pub struct DistanceEngine {
    resolver: Arc<LocationResolver>,
    router: Option<Arc<dyn GeoProvider>>,
}

impl DistanceEngine {
    #[must_use]
    pub fn new(resolver: Arc<LocationResolver>, router: Option<Arc<dyn GeoProvider>>) -> Self {
        Self { resolver, router }
    }

    #[must_use]
    pub fn resolver(&self) -> &Arc<LocationResolver> {
        &self.resolver
    }

    /// Whole kilometres from `origin` to `destination`, never negative.
    pub async fn distance(&self, origin: Origin<'_>, destination: Coordinates) -> DistanceEstimate {
        let origin = match origin {
            Origin::Point(c) => c,
            Origin::Place(place) => match self.resolver.resolve_place(place).await {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(
                        origin = place,
                        error = %e,
                        default_km = DEFAULT_DISTANCE_KM,
                        "origin unresolved, using default distance"
                    );
                    return DistanceEstimate {
                        km: DEFAULT_DISTANCE_KM,
                        method: DistanceMethod::Default,
                    };
                }
            },
        };

        if let Some(router) = &self.router {
            match router.route_distance(origin, destination).await {
                Ok(km) => {
                    return DistanceEstimate {
                        km: round_km(km),
                        method: DistanceMethod::Route,
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "routing unavailable, using haversine");
                }
            }
        }

        DistanceEstimate {
            km: round_km(haversine_km(origin, destination)),
            method: DistanceMethod::Haversine,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_km(km: f64) -> u32 {
    if km.is_finite() {
        km.max(0.0).round().min(f64::from(u32::MAX)) as u32
    } else {
        DEFAULT_DISTANCE_KM
    }
}
