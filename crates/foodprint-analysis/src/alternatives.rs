//! Lower-impact substitutes, scored on nutrition, locality and emissions.

use std::collections::HashSet;
use std::sync::Arc;

use foodprint_core::AlternativeOption;
use foodprint_inference::ClassifierHandle;
use futures::future::join_all;

use crate::emissions::EmissionModel;
use crate::error::{Assessment, PipelineError, PipelineWarning, Stage};
use crate::nutrition::{cosine_similarity, NutritionIndex};
use crate::oracle::recover;

pub const MAX_ALTERNATIVES: usize = 6;
pub const MIN_ALTERNATIVES: usize = 3;
/// Candidates saving less than this share of the trip are dropped.
pub const MIN_DISTANCE_REDUCTION: u8 = 30;
/// Only the most similar candidates are sent to the classifier.
const PRESELECT: usize = 12;

const SIMILARITY_WEIGHT: f64 = 0.7;
const LOCALITY_WEIGHT: f64 = 0.2;
const ENVIRONMENT_WEIGHT: f64 = 0.1;
/// Share of the trip a fully local candidate avoids.
const LOCALITY_DISTANCE_CUT: f64 = 0.8;

const LOCAL_THRESHOLD: f64 = 0.5;
const SIMILAR_THRESHOLD: f64 = 0.8;

/// Distance assumed for generic local produce.
pub const LOCAL_FALLBACK_KM: u32 = 50;
pub const FALLBACK_NAME: &str = "Local seasonal produce";
const BACKFILL_NAMES: &[&str] = &[
    "Local seasonal vegetables",
    "Local seasonal fruit",
    "Farmers' market greens",
];

/// What the ranker needs to know about the analysed produce.
#[derive(Debug, Clone, Copy)]
pub struct RankRequest<'a> {
    pub produce: &'a str,
    pub co2_impact: f64,
    pub travel_distance: u32,
    pub source: &'a str,
    pub user_location: &'a str,
}

#[derive(Debug, Clone)]
struct Scored {
    option: AlternativeOption,
    similarity: f64,
    score: f64,
}

pub struct AlternativeRanker {
    nutrition: NutritionIndex,
    emissions: EmissionModel,
    classifier: Arc<ClassifierHandle>,
}

impl AlternativeRanker {
    #[must_use]
    pub fn new(nutrition: NutritionIndex, classifier: Arc<ClassifierHandle>) -> Self {
        Self {
            nutrition,
            emissions: EmissionModel,
            classifier,
        }
    }

    /// Ranked substitutes, at most [`MAX_ALTERNATIVES`], sorted by distance
    /// reduction (then similarity, then weighted score), every one with at
    /// least one benefit.
    ///
    /// Without a classifier this returns a single generic local entry.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] if the classifier rejects the
    /// credential.
    pub async fn rank(
        &self,
        request: &RankRequest<'_>,
    ) -> Result<Assessment<Vec<AlternativeOption>>, PipelineError> {
        let RankRequest {
            produce,
            travel_distance,
            user_location,
            ..
        } = *request;
        let classifier = match self.classifier.acquire().await {
            Ok(c) => c,
            Err(e) => {
                let warning = recover(Stage::Alternatives, e)?;
                return Ok(Assessment::with_warning(
                    vec![self.fallback(travel_distance, user_location)],
                    Some(warning),
                ));
            }
        };

        let query_vector = self.nutrition.features(produce).normalized_vector();
        let mut pool: Vec<(String, f64)> = self
            .nutrition
            .candidates(produce)
            .into_iter()
            .map(|name| {
                let v = self.nutrition.features(&name).normalized_vector();
                let similarity = cosine_similarity(&query_vector, &v);
                (name, similarity)
            })
            .collect();
        pool.sort_by(|a, b| b.1.total_cmp(&a.1));
        pool.truncate(PRESELECT);

        let classifier = &classifier;
        let answers = join_all(pool.iter().map(|(name, _)| {
            let prompt = format!("{name} is grown locally in {user_location}");
            async move { classifier.infer(&prompt).await }
        }))
        .await;

        let mut warning: Option<PipelineWarning> = None;
        let mut scored = Vec::with_capacity(pool.len());
        for ((name, similarity), answer) in pool.into_iter().zip(answers) {
            let locality = match answer {
                Ok(c) => c.yes_probability(),
                Err(e) => {
                    warning = Some(recover(Stage::Alternatives, e)?);
                    continue;
                }
            };
            scored.push(self.score_candidate(request, &name, similarity, locality));
        }

        if scored.is_empty() && warning.is_some() {
            tracing::warn!(produce, "every locality query failed, using generic fallback");
            return Ok(Assessment::with_warning(
                vec![self.fallback(travel_distance, user_location)],
                warning,
            ));
        }

        scored.retain(|s| s.option.distance_reduction >= MIN_DISTANCE_REDUCTION);
        if scored.len() < MIN_ALTERNATIVES {
            tracing::debug!(
                produce,
                kept = scored.len(),
                "too few strong alternatives, backfilling"
            );
            for name in BACKFILL_NAMES {
                if scored.len() >= MIN_ALTERNATIVES {
                    break;
                }
                scored.push(self.backfill(name, travel_distance, user_location));
            }
        }

        Ok(Assessment::with_warning(finalize(scored), warning))
    }

    fn score_candidate(
        &self,
        request: &RankRequest<'_>,
        name: &str,
        similarity: f64,
        locality: f64,
    ) -> Scored {
        let RankRequest {
            produce,
            co2_impact,
            travel_distance,
            source,
            user_location,
        } = *request;
        let estimated_km = f64::from(travel_distance) * (1.0 - locality * LOCALITY_DISTANCE_CUT);
        let co2 = self.emissions.estimate(estimated_km, name);
        let reduction = distance_reduction(travel_distance, estimated_km);
        let environment = environmental_score(co2, travel_distance);
        let score = SIMILARITY_WEIGHT * similarity
            + LOCALITY_WEIGHT * locality
            + ENVIRONMENT_WEIGHT * environment;

        let mut benefits = Vec::new();
        if reduction > 0 {
            benefits.push(format!("Reduces transport emissions by {reduction}%"));
        }
        if locality >= LOCAL_THRESHOLD {
            benefits.push(format!("Can be grown locally in {user_location}"));
        } else if reduction >= MIN_DISTANCE_REDUCTION && !source.trim().is_empty() {
            benefits.push(format!("Closer to you than {}", source.trim()));
        }
        if similarity >= SIMILAR_THRESHOLD {
            benefits.push(format!("Nutritionally similar to {}", produce.trim()));
        }
        if co2 < co2_impact {
            benefits.push(format!(
                "Lower carbon footprint: {co2:.2} vs {co2_impact:.2} kg CO2/kg"
            ));
        }
        if benefits.is_empty() {
            benefits.push(format!("Lower-impact alternative to {}", produce.trim()));
        }

        Scored {
            option: AlternativeOption {
                name: display_name(name),
                co2_impact: co2,
                distance_reduction: reduction,
                benefits,
                nutritional_similarity: Some(format!("{:.0}% similar", similarity * 100.0)),
            },
            similarity,
            score,
        }
    }

    fn backfill(&self, name: &str, travel_distance: u32, user_location: &str) -> Scored {
        let local_km = LOCAL_FALLBACK_KM.min(travel_distance);
        let reduction = distance_reduction(travel_distance, f64::from(local_km));
        let co2 = self.emissions.estimate(f64::from(local_km), name);

        let mut benefits = vec![format!(
            "Grown within about {LOCAL_FALLBACK_KM} km of {user_location}"
        )];
        if reduction > 0 {
            benefits.push(format!("Reduces transport emissions by {reduction}%"));
        }
        benefits.push("Picked closer to peak ripeness, with less cold storage".to_string());

        Scored {
            option: AlternativeOption {
                name: name.to_string(),
                co2_impact: co2,
                distance_reduction: reduction,
                benefits,
                nutritional_similarity: None,
            },
            similarity: 0.0,
            score: ENVIRONMENT_WEIGHT * environmental_score(co2, travel_distance),
        }
    }

    /// The single answer given when the classifier cannot be reached.
    #[must_use]
    pub fn fallback(&self, travel_distance: u32, user_location: &str) -> AlternativeOption {
        let local_km = LOCAL_FALLBACK_KM.min(travel_distance);
        AlternativeOption {
            name: FALLBACK_NAME.to_string(),
            co2_impact: self.emissions.estimate(f64::from(local_km), FALLBACK_NAME),
            distance_reduction: distance_reduction(travel_distance, f64::from(local_km)),
            benefits: vec![
                format!("Grown close to {user_location}, cutting transport distance"),
                "Harvested in season, with less cold storage and artificial ripening".to_string(),
            ],
            nutritional_similarity: None,
        }
    }
}

/// Deduplicate, sort and truncate.
fn finalize(mut scored: Vec<Scored>) -> Vec<AlternativeOption> {
    let mut seen = HashSet::new();
    scored.retain(|s| seen.insert(s.option.name.to_lowercase()));
    scored.sort_by(|a, b| {
        b.option
            .distance_reduction
            .cmp(&a.option.distance_reduction)
            .then_with(|| b.similarity.total_cmp(&a.similarity))
            .then_with(|| b.score.total_cmp(&a.score))
    });
    scored.truncate(MAX_ALTERNATIVES);
    scored.into_iter().map(|s| s.option).collect()
}

/// Percent of `travel_distance` saved by travelling `estimated_km` instead,
/// rounded and clamped to `0..=100`. Zero when there was no trip.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn distance_reduction(travel_distance: u32, estimated_km: f64) -> u8 {
    if travel_distance == 0 {
        return 0;
    }
    let travel = f64::from(travel_distance);
    let pct = ((travel - estimated_km) / travel * 100.0).round();
    if pct.is_finite() {
        pct.clamp(0.0, 100.0) as u8
    } else {
        0
    }
}

/// `1 - co2 / (travel * 0.001)`, clamped to `[0, 1]`; zero without a trip.
#[must_use]
pub fn environmental_score(co2: f64, travel_distance: u32) -> f64 {
    if travel_distance == 0 {
        return 0.0;
    }
    (1.0 - co2 / (f64::from(travel_distance) * 0.001)).clamp(0.0, 1.0)
}

/// Split a ranked list for display: the first half (rounded up) as seasonal
/// picks, the rest as local picks.
#[must_use]
pub fn split_alternatives(
    mut ranked: Vec<AlternativeOption>,
) -> (Vec<AlternativeOption>, Vec<AlternativeOption>) {
    let seasonal = ranked.len().div_ceil(2);
    let local = ranked.split_off(seasonal);
    (ranked, local)
}

fn display_name(name: &str) -> String {
    let mut chars = name.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use foodprint_inference::{Classification, Classifier, InferenceError};

    use super::*;

    /// Says yes to prompts about the listed produce, no to everything else.
    struct Locality {
        local: &'static [&'static str],
        calls: AtomicU32,
    }

    #[async_trait]
    impl Classifier for Locality {
        async fn infer(&self, prompt: &str) -> Result<Classification, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.local.iter().any(|p| prompt.starts_with(&format!("{p} is"))) {
                Ok(Classification::positive(0.95))
            } else {
                Ok(Classification::negative(0.9))
            }
        }
    }

    struct Failing(fn() -> InferenceError);

    #[async_trait]
    impl Classifier for Failing {
        async fn infer(&self, _prompt: &str) -> Result<Classification, InferenceError> {
            Err((self.0)())
        }
    }

    fn ranker_with(classifier: Arc<dyn Classifier>) -> AlternativeRanker {
        AlternativeRanker::new(
            NutritionIndex::default(),
            Arc::new(ClassifierHandle::ready(classifier)),
        )
    }

    fn locality(local: &'static [&'static str]) -> Arc<Locality> {
        Arc::new(Locality {
            local,
            calls: AtomicU32::new(0),
        })
    }

    fn request(
        produce: &'static str,
        co2_impact: f64,
        travel_distance: u32,
        user_location: &'static str,
    ) -> RankRequest<'static> {
        RankRequest {
            produce,
            co2_impact,
            travel_distance,
            source: "Mexico",
            user_location,
        }
    }

    fn assert_well_formed(options: &[AlternativeOption]) {
        assert!(options.len() <= MAX_ALTERNATIVES);
        for o in options {
            assert!(!o.benefits.is_empty(), "{} has no benefits", o.name);
            assert!(o.distance_reduction <= 100);
            assert!(o.co2_impact >= 0.0);
        }
        for pair in options.windows(2) {
            assert!(pair[0].distance_reduction >= pair[1].distance_reduction);
        }
    }

    #[tokio::test]
    async fn unavailable_classifier_returns_single_fallback() {
        let ranker = AlternativeRanker::new(
            NutritionIndex::default(),
            Arc::new(ClassifierHandle::unavailable()),
        );
        let ranked = ranker
            .rank(&request("avocado", 2.5, 9200, "Amsterdam"))
            .await
            .unwrap();
        assert_eq!(ranked.value.len(), 1);
        assert_eq!(ranked.value[0].name, FALLBACK_NAME);
        assert!(!ranked.value[0].benefits.is_empty());
        assert!(ranked.warning.is_some());
    }

    #[tokio::test]
    async fn local_candidates_rank_first_and_are_bounded() {
        let classifier = locality(&[
            "apple",
            "pear",
            "cherry",
            "plum",
            "peach",
            "watermelon",
            "strawberry",
            "blueberry",
            "olives",
        ]);
        let ranker = ranker_with(classifier.clone());
        let ranked = ranker
            .rank(&request("avocado", 2.5, 9200, "Amsterdam, Netherlands"))
            .await
            .unwrap();

        assert!(ranked.warning.is_none());
        assert_well_formed(&ranked.value);
        assert_eq!(ranked.value.len(), MAX_ALTERNATIVES);
        assert!(ranked.value.iter().all(|o| o.distance_reduction >= MIN_DISTANCE_REDUCTION));
        assert!(!ranked.value.iter().any(|o| o.name.eq_ignore_ascii_case("avocado")));
        assert!(ranked.value[0]
            .benefits
            .iter()
            .any(|b| b == "Can be grown locally in Amsterdam, Netherlands"));
        assert!(classifier.calls.load(Ordering::SeqCst) <= u32::try_from(PRESELECT).unwrap());
    }

    #[tokio::test]
    async fn weak_candidates_are_backfilled() {
        let ranker = ranker_with(locality(&["pear"]));
        let ranked = ranker.rank(&request("apple", 0.33, 1500, "Oslo")).await.unwrap();

        assert_well_formed(&ranked.value);
        assert_eq!(ranked.value.len(), MIN_ALTERNATIVES);
        assert!(ranked.value.iter().any(|o| o.name == "Pear"));
        let backfilled = ranked
            .value
            .iter()
            .filter(|o| o.nutritional_similarity.is_none())
            .count();
        assert_eq!(backfilled, 2);
    }

    #[tokio::test]
    async fn zero_distance_still_yields_benefits() {
        let ranker = ranker_with(locality(&[]));
        let ranked = ranker.rank(&request("apple", 0.1, 0, "Oslo")).await.unwrap();
        assert_well_formed(&ranked.value);
        assert!(ranked.value.iter().all(|o| o.distance_reduction == 0));
    }

    #[tokio::test]
    async fn all_locality_failures_fall_back() {
        let ranker = ranker_with(Arc::new(Failing(|| InferenceError::Api {
            status: 500,
            message: "boom".to_string(),
        })));
        let ranked = ranker.rank(&request("kiwi", 0.5, 3000, "Paris")).await.unwrap();
        assert_eq!(ranked.value.len(), 1);
        assert_eq!(ranked.value[0].name, FALLBACK_NAME);
        assert!(matches!(
            ranked.warning,
            Some(PipelineWarning::ModelUnavailable { stage: Stage::Alternatives, .. })
        ));
    }

    #[tokio::test]
    async fn rejected_credential_is_configuration_error() {
        let ranker = ranker_with(Arc::new(Failing(|| {
            InferenceError::Unauthorized("bad token".to_string())
        })));
        let err = ranker
            .rank(&request("kiwi", 0.5, 3000, "Paris"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }

    #[test]
    fn reduction_and_environment_scores_are_bounded() {
        assert_eq!(distance_reduction(0, 0.0), 0);
        assert_eq!(distance_reduction(1000, 280.0), 72);
        assert_eq!(distance_reduction(1000, 2000.0), 0);
        assert_eq!(distance_reduction(1000, -5.0), 100);
        assert!(environmental_score(0.5, 0).abs() < f64::EPSILON);
        assert!((environmental_score(0.5, 1000) - 0.5).abs() < 1e-12);
        assert!(environmental_score(5.0, 1000).abs() < f64::EPSILON);
    }

    #[test]
    fn split_gives_seasonal_the_larger_half() {
        let option = |n: &str| AlternativeOption {
            name: n.to_string(),
            co2_impact: 0.1,
            distance_reduction: 50,
            benefits: vec!["x".to_string()],
            nutritional_similarity: None,
        };
        let (seasonal, local) = split_alternatives(vec![option("a"), option("b"), option("c")]);
        assert_eq!(seasonal.len(), 2);
        assert_eq!(local.len(), 1);
        let (seasonal, local) = split_alternatives(vec![option("a")]);
        assert_eq!((seasonal.len(), local.len()), (1, 0));
    }

    #[test]
    fn display_names_are_capitalized() {
        assert_eq!(display_name("bell pepper"), "Bell pepper");
        assert_eq!(display_name(""), "");
    }

    fn scored(name: &str, reduction: u8, similarity: f64, score: f64) -> Scored {
        Scored {
            option: AlternativeOption {
                name: name.to_string(),
                co2_impact: 0.1,
                distance_reduction: reduction,
                benefits: vec!["Closer to you".to_string()],
                nutritional_similarity: None,
            },
            similarity,
            score,
        }
    }

    #[test]
    fn equal_reduction_ties_break_on_similarity() {
        let ranked = finalize(vec![
            scored("Carrot", 60, 0.40, 0.9),
            scored("Pear", 60, 0.95, 0.1),
            scored("Kale", 80, 0.10, 0.1),
        ]);
        let names: Vec<&str> = ranked.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["Kale", "Pear", "Carrot"]);
    }

    #[test]
    fn names_are_deduplicated_ignoring_case() {
        let ranked = finalize(vec![
            scored("Pear", 70, 0.9, 0.5),
            scored("PEAR", 90, 0.9, 0.5),
            scored("pear", 50, 0.9, 0.5),
            scored("Apple", 40, 0.8, 0.5),
        ]);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].name, "Pear");
        assert_eq!(ranked[0].distance_reduction, 70);
        assert_eq!(ranked[1].name, "Apple");
    }
}
