//! Domain types shared by the pipeline stages and the front ends.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Build validated coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinates`] when `lat` is outside
    /// `[-90, 90]`, `lng` is outside `[-180, 180]`, or either is not finite.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoreError> {
        let coords = Self { lat, lng };
        if coords.is_valid() {
            Ok(coords)
        } else {
            Err(CoreError::InvalidCoordinates { lat, lng })
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hemisphere {
    Northern,
    Southern,
}

/// Where the consumer is, as captured from geolocation or the entry form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLocation {
    pub city: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl UserLocation {
    #[must_use]
    pub fn from_coordinates(coords: Coordinates) -> Self {
        Self {
            latitude: Some(coords.lat),
            longitude: Some(coords.lng),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_place(city: Option<String>, country: Option<String>) -> Self {
        Self {
            city,
            country,
            ..Self::default()
        }
    }

    /// Both coordinates, if present and in range.
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Coordinates::new(lat, lng).ok(),
            _ => None,
        }
    }

    /// `"city, country"` from whichever textual parts are non-blank.
    #[must_use]
    pub fn place_text(&self) -> Option<String> {
        let parts: Vec<&str> = [self.city.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }

    /// True when there is nothing to resolve: no usable coordinates and no place text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coordinates().is_none() && self.place_text().is_none()
    }

    /// Human-readable form shown next to results.
    #[must_use]
    pub fn display(&self) -> String {
        if let Some(text) = self.place_text() {
            return text;
        }
        match self.coordinates() {
            Some(c) => format!("{:.4}, {:.4}", c.lat, c.lng),
            None => "Unknown location".to_string(),
        }
    }
}

/// One form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProduceQuery {
    pub produce_name: String,
    pub source_location: String,
    #[serde(default)]
    pub user_location: UserLocation,
}

/// Per-100g nutrient profile used as a similarity vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionFeatures {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub vitamins: BTreeSet<String>,
}

impl NutritionFeatures {
    #[must_use]
    pub fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
            vitamins: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_vitamins(mut self, vitamins: &[&str]) -> Self {
        self.vitamins = vitamins.iter().map(|v| (*v).to_string()).collect();
        self
    }

    /// Feature vector scaled so each nutrient contributes on a comparable range.
    #[must_use]
    pub fn normalized_vector(&self) -> [f64; 4] {
        [
            self.calories / 100.0,
            self.protein / 10.0,
            self.carbs / 30.0,
            self.fat / 10.0,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeOption {
    pub name: String,
    pub co2_impact: f64,
    /// Percent of the original travel distance saved, `0..=100`.
    pub distance_reduction: u8,
    /// Never empty.
    pub benefits: Vec<String>,
    pub nutritional_similarity: Option<String>,
}

/// The complete result for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProduceInfo {
    pub name: String,
    pub source: String,
    pub co2_impact: f64,
    pub travel_distance: u32,
    pub ripening_method: Option<String>,
    pub in_season: bool,
    pub seasonal_alternatives: Vec<AlternativeOption>,
    pub local_alternatives: Vec<AlternativeOption>,
    pub user_location: String,
}
