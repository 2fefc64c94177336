mod action_items;
mod consensus;
mod engine;
mod hot_topics;
mod overview;
mod vibe_shift;

use crate::config::ConfigError;
use crate::transcript::{
    NormalizeError, OverallSentiment, ScoredLabel, SentimentSegment, Summary,
};
use serde::{Deserialize, Serialize};

pub use action_items::{
    extract_action_items, ActionItem, CommitmentKeywords, CommitmentLabels, CommitmentMatcher,
};
pub use consensus::{
    calculate_consensus, ConsensusLevel, ConsensusResult, IntentCategory, IntentClassifier,
    KeywordIntentClassifier, LabelMapClassifier, HIGH_CONSENSUS_RATIO, MODERATE_CONSENSUS_RATIO,
};
pub use engine::InsightEngine;
pub use hot_topics::{correlate_hot_topics, HotTopic};
pub use overview::{overall_sentiment, rank_top_topics, TOP_TOPIC_LIMIT};
pub use vibe_shift::{detect_vibe_shifts, ShiftDirection, VibeShiftEvent};

/// Slack applied to threshold comparisons so that values equal to a threshold on
/// paper still count after floating point subtraction.
pub const THRESHOLD_EPSILON: f64 = 1e-9;

/// Everything derived from one analysis run.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct InsightReport {
    pub summary: Summary,
    pub overall: OverallSentiment,
    pub vibe_shifts: Vec<VibeShiftEvent>,
    pub hot_topics: Vec<HotTopic>,
    pub top_topics: Vec<ScoredLabel>,
    pub consensus: ConsensusResult,
    pub action_items: Vec<ActionItem>,
    pub transcript_text: Option<String>,
    pub sentiment_segments: Vec<SentimentSegment>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("malformed input in {family}: {reason}")]
    MalformedInput { family: &'static str, reason: String },

    #[error("transcript has no sentiment segments")]
    EmptyTranscript,

    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),
}

impl From<NormalizeError> for EngineError {
    fn from(e: NormalizeError) -> Self {
        match e {
            NormalizeError::Malformed { family, reason } => Self::MalformedInput { family, reason },
            NormalizeError::EmptyTranscript => Self::EmptyTranscript,
        }
    }
}

/// Lowercased alphanumeric words of an open-vocabulary label.
pub(crate) fn label_words(label: &str) -> Vec<String> {
    label
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_words_splits_on_punctuation() {
        assert_eq!(
            label_words("Follow-up: SEND the deck!"),
            ["follow", "up", "send", "the", "deck"]
        );
        assert!(label_words("  --  ").is_empty());
    }

    #[test]
    fn normalize_errors_map_onto_engine_taxonomy() {
        assert_eq!(
            EngineError::from(NormalizeError::EmptyTranscript),
            EngineError::EmptyTranscript
        );
        let e = EngineError::from(NormalizeError::Malformed {
            family: "topics",
            reason: "bad".to_owned(),
        });
        assert!(matches!(e, EngineError::MalformedInput { family: "topics", .. }));
    }
}
