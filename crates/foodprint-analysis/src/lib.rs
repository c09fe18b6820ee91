//! Produce sustainability analysis.
//!
//! Estimates transport emissions, seasonality and ripening for a produce
//! item relative to the consumer, and ranks lower-impact alternatives.
//! Static tables answer first; the classifier is a best-effort fallback and
//! every stage degrades to a heuristic when it is unavailable.

pub mod alternatives;
pub mod emissions;
pub mod error;
pub mod nutrition;
pub mod pipeline;
pub mod ripening;
pub mod seasonality;
pub mod session;

mod matching;
mod oracle;

pub use alternatives::{
    split_alternatives, AlternativeRanker, RankRequest, FALLBACK_NAME, MAX_ALTERNATIVES,
};
pub use emissions::{EmissionModel, TransportMode};
pub use error::{Assessment, PipelineError, PipelineWarning, Stage};
pub use nutrition::{cosine_similarity, NutritionIndex};
pub use pipeline::{
    current_month, Analysis, PipelineBuilder, PipelineState, SustainabilityPipeline,
};
pub use ripening::RipeningClassifier;
pub use seasonality::{hemisphere_for, hemisphere_for_place, month_name, SeasonalityOracle};
pub use session::AnalysisSession;
