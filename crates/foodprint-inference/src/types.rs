use serde::{Deserialize, Serialize};

/// Binary polarity returned by a sentiment-style classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    Positive,
    Negative,
}

/// The top label for one prompt and the model's confidence in it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: Label,
    /// Confidence in `label`, in `[0.0, 1.0]`.
    pub score: f64,
}

impl Classification {
    #[must_use]
    pub fn positive(score: f64) -> Self {
        Self {
            label: Label::Positive,
            score: score.clamp(0.0, 1.0),
        }
    }

    #[must_use]
    pub fn negative(score: f64) -> Self {
        Self {
            label: Label::Negative,
            score: score.clamp(0.0, 1.0),
        }
    }

    /// Probability mass on the "yes" side of the question.
    #[must_use]
    pub fn yes_probability(&self) -> f64 {
        match self.label {
            Label::Positive => self.score,
            Label::Negative => 1.0 - self.score,
        }
    }

    /// A confident "yes": positive label with confidence above `threshold`.
    #[must_use]
    pub fn is_confident_yes(&self, threshold: f64) -> bool {
        self.label == Label::Positive && self.score > threshold
    }
}

/// Settings for the Hugging Face inference client.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub base_url: String,
    pub model: String,
    pub api_token: String,
    pub timeout_secs: u64,
    /// How long the loader keeps polling a cold model before giving up.
    pub load_timeout_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_probability_inverts_negative() {
        assert!((Classification::negative(0.8).yes_probability() - 0.2).abs() < 1e-9);
        assert!((Classification::positive(0.8).yes_probability() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn confident_yes_requires_strictly_greater_score() {
        assert!(Classification::positive(0.71).is_confident_yes(0.7));
        assert!(!Classification::positive(0.7).is_confident_yes(0.7));
        assert!(!Classification::negative(0.99).is_confident_yes(0.7));
    }

    #[test]
    fn scores_are_clamped() {
        assert!((Classification::positive(1.5).score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn label_deserializes_uppercase() {
        let label: Label = serde_json::from_str("\"POSITIVE\"").unwrap();
        assert_eq!(label, Label::Positive);
    }
}
