//! Sustainability pipeline orchestration.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use foodprint_core::{load_catalog, AppConfig, ProduceCatalog, ProduceInfo, ProduceQuery};
use foodprint_geo::{
    DistanceEngine, DistanceMethod, GeoProvider, HttpGeoProvider, HttpSettings, LocationResolver,
    Origin,
};
use foodprint_inference::{ClassifierHandle, HuggingFaceLoader, InferenceConfig};
use serde::{Deserialize, Serialize};

use crate::alternatives::{split_alternatives, AlternativeRanker, RankRequest};
use crate::emissions::EmissionModel;
use crate::error::{PipelineError, PipelineWarning, Stage};
use crate::nutrition::NutritionIndex;
use crate::ripening::RipeningClassifier;
use crate::seasonality::{hemisphere_for, SeasonalityOracle};

/// Observable progress of one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Resolving,
    Calculating,
    Analyzing,
    Ranking,
    Done,
    Failed,
}

impl PipelineState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// A finished analysis and the failures recovered along the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub info: ProduceInfo,
    pub warnings: Vec<PipelineWarning>,
}

pub struct SustainabilityPipeline {
    resolver: Arc<LocationResolver>,
    distance: DistanceEngine,
    emissions: EmissionModel,
    seasonality: SeasonalityOracle,
    ripening: RipeningClassifier,
    ranker: AlternativeRanker,
    classifier: Arc<ClassifierHandle>,
}

/// Assembles a pipeline from injected collaborators.
///
/// Anything not supplied runs offline: capital cache + haversine for
/// locations, no classifier, built-in tables only.
#[derive(Default)]
pub struct PipelineBuilder {
    catalog: Option<ProduceCatalog>,
    geo: Option<Arc<dyn GeoProvider>>,
    classifier: Option<Arc<ClassifierHandle>>,
}

impl PipelineBuilder {
    #[must_use]
    pub fn catalog(mut self, catalog: ProduceCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Geocoder and router used when the capital cache misses.
    #[must_use]
    pub fn geo_provider(mut self, provider: Arc<dyn GeoProvider>) -> Self {
        self.geo = Some(provider);
        self
    }

    #[must_use]
    pub fn classifier(mut self, handle: Arc<ClassifierHandle>) -> Self {
        self.classifier = Some(handle);
        self
    }

    #[must_use]
    pub fn build(self) -> SustainabilityPipeline {
        let catalog = Arc::new(self.catalog.unwrap_or_default());
        let classifier = self
            .classifier
            .unwrap_or_else(|| Arc::new(ClassifierHandle::unavailable()));

        let resolver = Arc::new(match &self.geo {
            Some(provider) => LocationResolver::with_provider(Arc::clone(provider)),
            None => LocationResolver::offline(),
        });

        SustainabilityPipeline {
            distance: DistanceEngine::new(Arc::clone(&resolver), self.geo),
            resolver,
            emissions: EmissionModel,
            seasonality: SeasonalityOracle::new(Arc::clone(&catalog), Arc::clone(&classifier)),
            ripening: RipeningClassifier::new(Arc::clone(&catalog), Arc::clone(&classifier)),
            ranker: AlternativeRanker::new(NutritionIndex::new(catalog), Arc::clone(&classifier)),
            classifier,
        }
    }
}

impl SustainabilityPipeline {
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Build the production pipeline from application config.
    ///
    /// Offline mode skips every network collaborator. Otherwise the
    /// inference token is required up front.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] if the token is missing, the
    /// catalog file is invalid, or a provider URL does not parse.
    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        let catalog = match &config.catalog_path {
            Some(path) => {
                let catalog = load_catalog(path)
                    .map_err(|e| PipelineError::Configuration(e.to_string()))?;
                tracing::info!(
                    path = %path.display(),
                    entries = catalog.produce.len(),
                    "loaded produce catalog"
                );
                catalog
            }
            None => ProduceCatalog::default(),
        };

        if config.offline {
            tracing::info!("offline mode: static heuristics only");
            return Ok(Self::builder().catalog(catalog).build());
        }

        let token = config
            .inference_api_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                PipelineError::Configuration(
                    "HF_API_TOKEN is not set (set it, or enable FOODPRINT_OFFLINE)".to_string(),
                )
            })?;

        let loader = HuggingFaceLoader::new(InferenceConfig {
            base_url: config.inference_base_url.clone(),
            model: config.classifier_model.clone(),
            api_token: token,
            timeout_secs: config.request_timeout_secs,
            load_timeout_secs: config.model_load_timeout_secs,
        });

        let provider = HttpGeoProvider::new(
            &config.geocoder_base_url,
            config.routing_base_url.as_deref(),
            HttpSettings::from(config),
        )
        .map_err(|e| PipelineError::Configuration(e.to_string()))?;

        Ok(Self::builder()
            .catalog(catalog)
            .geo_provider(Arc::new(provider))
            .classifier(Arc::new(ClassifierHandle::new(Arc::new(loader))))
            .build())
    }

    #[must_use]
    pub fn classifier(&self) -> &Arc<ClassifierHandle> {
        &self.classifier
    }

    #[must_use]
    pub fn distance_engine(&self) -> &DistanceEngine {
        &self.distance
    }

    #[must_use]
    pub fn seasonality(&self) -> &SeasonalityOracle {
        &self.seasonality
    }

    /// Analyse `query` for the current month.
    ///
    /// # Errors
    ///
    /// See [`SustainabilityPipeline::run`].
    pub async fn analyze(&self, query: &ProduceQuery) -> Result<Analysis, PipelineError> {
        self.run(query, current_month(), |_| {}).await
    }

    /// Analyse `query` as if it were `month` (0 = January).
    ///
    /// # Errors
    ///
    /// See [`SustainabilityPipeline::run`].
    pub async fn analyze_in_month(
        &self,
        query: &ProduceQuery,
        month: u8,
    ) -> Result<Analysis, PipelineError> {
        self.run(query, month, |_| {}).await
    }

    /// Run every stage, reporting each state transition to `on_state`.
    ///
    /// 1. Resolve the consumer location (fatal if impossible).
    /// 2. Measure the distance from the source (defaults to 5000 km).
    /// 3. Estimate emissions, then seasonality and ripening concurrently.
    /// 4. Rank alternatives and split them for display.
    ///
    /// Ends in `Done` or `Failed`; no partial result is returned.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::LocationUnavailable`] if the consumer cannot be located.
    /// - [`PipelineError::Configuration`] if the classifier rejects the credential.
    /// - [`PipelineError::Failure`] for invalid input or an unusable estimate.
    pub async fn run<F>(
        &self,
        query: &ProduceQuery,
        month: u8,
        on_state: F,
    ) -> Result<Analysis, PipelineError>
    where
        F: Fn(PipelineState) + Send + Sync,
    {
        let result = self.execute(query, month % 12, &on_state).await;
        match &result {
            Ok(analysis) => {
                tracing::info!(
                    produce = %analysis.info.name,
                    km = analysis.info.travel_distance,
                    co2 = analysis.info.co2_impact,
                    warnings = analysis.warnings.len(),
                    "analysis complete"
                );
                on_state(PipelineState::Done);
            }
            Err(e) => {
                tracing::warn!(produce = %query.produce_name, error = %e, "analysis failed");
                on_state(PipelineState::Failed);
            }
        }
        result
    }

    async fn execute<F>(
        &self,
        query: &ProduceQuery,
        month: u8,
        on_state: &F,
    ) -> Result<Analysis, PipelineError>
    where
        F: Fn(PipelineState) + Send + Sync,
    {
        let produce = query.produce_name.trim();
        let source = query.source_location.trim();
        if produce.is_empty() {
            return Err(PipelineError::failure(
                Stage::Input,
                "produce name is required",
                query,
            ));
        }
        let mut warnings = Vec::new();

        on_state(PipelineState::Resolving);
        let destination = self
            .resolver
            .resolve(&query.user_location)
            .await
            .map_err(|e| PipelineError::LocationUnavailable(e.to_string()))?;

        on_state(PipelineState::Calculating);
        let estimate = self
            .distance
            .distance(Origin::Place(source), destination)
            .await;
        if estimate.method == DistanceMethod::Default {
            warnings.push(PipelineWarning::DefaultDistance {
                source: source.to_string(),
                km: estimate.km,
            });
        }
        let travel_distance = estimate.km;

        on_state(PipelineState::Analyzing);
        let co2_impact = self.emissions.estimate(f64::from(travel_distance), produce);
        if !co2_impact.is_finite() {
            return Err(PipelineError::failure(
                Stage::Emissions,
                "emission estimate is not a number",
                query,
            ));
        }

        let user_location = query.user_location.display();
        let hemisphere = hemisphere_for(&query.user_location);
        let (season, ripening) = tokio::join!(
            self.seasonality
                .is_in_season(produce, month, hemisphere, &user_location),
            self.ripening.classify(produce, source, travel_distance),
        );
        let season = season?;
        let ripening = ripening?;
        warnings.extend(season.warning);
        warnings.extend(ripening.warning);

        on_state(PipelineState::Ranking);
        let ranked = self
            .ranker
            .rank(&RankRequest {
                produce,
                co2_impact,
                travel_distance,
                source,
                user_location: &user_location,
            })
            .await?;
        warnings.extend(ranked.warning);
        let (seasonal_alternatives, local_alternatives) = split_alternatives(ranked.value);

        Ok(Analysis {
            info: ProduceInfo {
                name: produce.to_string(),
                source: source.to_string(),
                co2_impact,
                travel_distance,
                ripening_method: ripening.value,
                in_season: season.value,
                seasonal_alternatives,
                local_alternatives,
                user_location,
            },
            warnings,
        })
    }
}

/// Current month, 0 = January, in UTC.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn current_month() -> u8 {
    Utc::now().month0() as u8
}
