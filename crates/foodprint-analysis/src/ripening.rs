//! Was imported produce likely ripened artificially after harvest?

use std::sync::Arc;

use foodprint_core::ProduceCatalog;
use foodprint_inference::{Classification, ClassifierHandle};

use crate::error::{Assessment, PipelineError, PipelineWarning, Stage};
use crate::matching::{best_match, normalize};
use crate::oracle::{consult, Consultation};

/// Distance at which the artificial-ripening score gets its full boost.
pub const RIPENING_DISTANCE_SCALE_KM: f64 = 5000.0;
const DISTANCE_BOOST: f64 = 0.5;

pub const ETHYLENE_TREATMENT: &str = "Ethylene treatment";
pub const HARVESTED_GREEN: &str = "Harvested green + controlled ripening";

/// Climacteric produce routinely gassed after transport.
const ETHYLENE_GROUP: &[&str] = &["banana", "avocado", "mango", "papaya", "kiwi"];
/// Picked unripe and finished in ripening rooms.
const HARVESTED_GREEN_GROUP: &[&str] = &["tomato", "pepper", "eggplant"];

struct RipeningRule {
    produce: &'static str,
    /// (source country fragment, description)
    by_country: &'static [(&'static str, &'static str)],
    default: &'static str,
}

const RIPENING_TABLE: &[RipeningRule] = &[
    RipeningRule {
        produce: "banana",
        by_country: &[
            ("ecuador", "Shipped green, ethylene-ripened in destination ripening rooms"),
            ("costa rica", "Shipped green, ethylene-ripened in destination ripening rooms"),
            ("colombia", "Shipped green, ethylene-ripened in destination ripening rooms"),
        ],
        default: "Ethylene gas ripening after harvest",
    },
    RipeningRule {
        produce: "avocado",
        by_country: &[
            ("mexico", "Picked mature, ethylene-conditioned before retail"),
            ("peru", "Sea-freighted firm, ethylene-conditioned on arrival"),
            ("chile", "Sea-freighted firm, ethylene-conditioned on arrival"),
            ("kenya", "Sea-freighted firm, ethylene-conditioned on arrival"),
        ],
        default: "Ethylene-conditioned after harvest",
    },
    RipeningRule {
        produce: "tomato",
        by_country: &[
            ("netherlands", "Greenhouse-grown, ripened on the vine"),
            ("spain", "Harvested at breaker stage, ethylene-finished"),
            ("morocco", "Harvested at breaker stage, ethylene-finished in transit"),
            ("mexico", "Harvested green, ethylene-ripened before sale"),
        ],
        default: HARVESTED_GREEN,
    },
    RipeningRule {
        produce: "mango",
        by_country: &[
            ("india", "Often ripened with calcium carbide or ethylene"),
            ("peru", "Hot-water treated, ethylene-ripened at destination"),
            ("brazil", "Hot-water treated, ethylene-ripened at destination"),
        ],
        default: ETHYLENE_TREATMENT,
    },
    RipeningRule {
        produce: "kiwi",
        by_country: &[
            ("new zealand", "Harvested firm, controlled-atmosphere storage then ethylene"),
            ("italy", "Harvested firm, cold-stored and ethylene-triggered"),
        ],
        default: "Cold-stored, ethylene-triggered ripening",
    },
    RipeningRule {
        produce: "pear",
        by_country: &[],
        default: "Cold-conditioned, ripened after harvest",
    },
];

pub struct RipeningClassifier {
    catalog: Arc<ProduceCatalog>,
    classifier: Arc<ClassifierHandle>,
}

impl RipeningClassifier {
    #[must_use]
    pub fn new(catalog: Arc<ProduceCatalog>, classifier: Arc<ClassifierHandle>) -> Self {
        Self {
            catalog,
            classifier,
        }
    }

    /// Answer from the catalog, the ripening table or the group defaults.
    #[must_use]
    pub fn lookup(&self, produce: &str, source: &str) -> Option<String> {
        if let Some(ripening) = self.catalog.find(produce).and_then(|e| e.ripening.clone()) {
            return Some(ripening);
        }

        let key = best_match(produce, RIPENING_TABLE.iter().map(|r| r.produce));
        if let Some(rule) = RIPENING_TABLE.iter().find(|r| Some(r.produce) == key) {
            let source = normalize(source);
            let description = rule
                .by_country
                .iter()
                .find(|(country, _)| source.contains(country))
                .map_or(rule.default, |(_, d)| *d);
            return Some(description.to_string());
        }

        if best_match(produce, ETHYLENE_GROUP.iter().copied()).is_some() {
            return Some(ETHYLENE_TREATMENT.to_string());
        }
        if best_match(produce, HARVESTED_GREEN_GROUP.iter().copied()).is_some() {
            return Some(HARVESTED_GREEN.to_string());
        }
        None
    }

    /// `None` means natural or unknown ripening.
    ///
    /// Without a table answer, the classifier weighs "artificially ripened"
    /// against "naturally ripened", with the artificial side boosted by up
    /// to half again as travel distance approaches 5000 km.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] if the classifier rejects the
    /// credential.
    pub async fn classify(
        &self,
        produce: &str,
        source: &str,
        distance_km: u32,
    ) -> Result<Assessment<Option<String>>, PipelineError> {
        if let Some(description) = self.lookup(produce, source) {
            return Ok(Assessment::clean(Some(description)));
        }

        let produce = produce.trim();
        let source_text = source.trim();
        let artificial_prompt =
            format!("{produce} from {source_text} is artificially ripened after harvest");
        let natural_prompt =
            format!("{produce} from {source_text} is naturally ripened on the plant");

        let artificial = match self.ask(&artificial_prompt).await? {
            Ok(c) => c,
            Err(warning) => return Ok(Assessment::with_warning(None, Some(warning))),
        };
        let natural = match self.ask(&natural_prompt).await? {
            Ok(c) => c,
            Err(warning) => return Ok(Assessment::with_warning(None, Some(warning))),
        };

        let adjusted = adjusted_artificial_score(artificial.yes_probability(), distance_km);
        let natural_score = natural.yes_probability();
        tracing::debug!(
            produce,
            adjusted,
            natural = natural_score,
            "ripening inference"
        );

        let verdict = (adjusted > natural_score).then(|| {
            format!("Likely artificially ripened after transport from {source_text}")
        });
        Ok(Assessment::clean(verdict))
    }

    async fn ask(
        &self,
        prompt: &str,
    ) -> Result<Result<Classification, PipelineWarning>, PipelineError> {
        Ok(match consult(&self.classifier, Stage::Ripening, prompt).await? {
            Consultation::Answer(c) => Ok(c),
            Consultation::Unavailable(w) => Err(w),
        })
    }
}

/// Scale the raw artificial-ripening score by `1 + min(1, d / 5000) * 0.5`.
#[must_use]
pub fn adjusted_artificial_score(raw: f64, distance_km: u32) -> f64 {
    let factor = (f64::from(distance_km) / RIPENING_DISTANCE_SCALE_KM).min(1.0);
    raw * (1.0 + factor * DISTANCE_BOOST)
}
