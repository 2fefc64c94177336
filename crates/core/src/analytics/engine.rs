use super::{
    calculate_consensus, correlate_hot_topics, detect_vibe_shifts, extract_action_items,
    overall_sentiment, rank_top_topics, CommitmentKeywords, CommitmentMatcher, EngineError,
    InsightReport, IntentClassifier, KeywordIntentClassifier, TOP_TOPIC_LIMIT,
};
use crate::config::AnalyticsConfig;
use crate::transcript::{normalize_json, normalize_value, Transcript};
use serde_json::Value;

const LOG_TARGET: &str = "analytics::engine";

/// Derives an [`InsightReport`] from a normalized transcript.
///
/// The engine holds only immutable configuration, so one instance can serve
/// concurrent requests from several threads.
#[derive(Clone, Debug)]
pub struct InsightEngine<C = KeywordIntentClassifier, M = CommitmentKeywords> {
    config: AnalyticsConfig,
    classifier: C,
    commitments: M,
}

impl InsightEngine {
    pub fn with_defaults(config: AnalyticsConfig) -> Self {
        Self::new(
            config,
            KeywordIntentClassifier::default(),
            CommitmentKeywords::default(),
        )
    }
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::with_defaults(AnalyticsConfig::default())
    }
}

impl<C, M> InsightEngine<C, M>
where
    C: IntentClassifier,
    M: CommitmentMatcher,
{
    pub fn new(config: AnalyticsConfig, classifier: C, commitments: M) -> Self {
        Self {
            config,
            classifier,
            commitments,
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn analyze(&self, transcript: &Transcript) -> InsightReport {
        let cfg = &self.config;
        let sentiment = transcript.sentiment();

        let vibe_shifts = detect_vibe_shifts(sentiment, cfg.shift_threshold);
        let hot_topics = correlate_hot_topics(
            transcript.topics(),
            sentiment,
            cfg.negative_threshold,
            cfg.topic_confidence_floor,
        );
        let consensus = calculate_consensus(
            transcript.intents(),
            &self.classifier,
            cfg.intent_confidence_floor,
        );
        let action_items = extract_action_items(
            transcript.intents(),
            &self.commitments,
            cfg.intent_confidence_floor,
        );

        tracing::info!(
            target: LOG_TARGET,
            segments = sentiment.len(),
            vibe_shifts = vibe_shifts.len(),
            hot_topics = hot_topics.len(),
            action_items = action_items.len(),
            consensus = %consensus.level,
            "analysis complete"
        );

        InsightReport {
            summary: transcript.summary().clone(),
            overall: overall_sentiment(transcript),
            vibe_shifts,
            hot_topics,
            top_topics: rank_top_topics(transcript.topics(), TOP_TOPIC_LIMIT),
            consensus,
            action_items,
            transcript_text: transcript.text().map(str::to_owned),
            sentiment_segments: sentiment.to_vec(),
        }
    }

    /// Normalizes raw provider output and analyzes it.
    pub fn analyze_value(&self, raw: &Value) -> Result<InsightReport, EngineError> {
        let transcript = normalize_value(raw)?;
        Ok(self.analyze(&transcript))
    }

    pub fn analyze_json(&self, raw: &str) -> Result<InsightReport, EngineError> {
        let transcript = normalize_json(raw)?;
        Ok(self.analyze(&transcript))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{CommitmentLabels, ConsensusLevel, IntentCategory, ShiftDirection};
    use crate::config::{ConfidenceFloor, NegativeThreshold, ShiftThreshold};
    use crate::transcript::{
        IntentSegment, ScoredLabel, SentimentLabel, SentimentSegment, Summary, TopicSegment,
        TranscriptSegment,
    };
    use std::sync::Arc;

    fn sample_transcript() -> Transcript {
        let sentiment = vec![
            SentimentSegment {
                segment: TranscriptSegment::new("Hello everyone, welcome to the meeting.", 0, 6),
                label: SentimentLabel::Positive,
                score: 0.6,
            },
            SentimentSegment {
                segment: TranscriptSegment::new("Let's discuss the project progress.", 7, 12),
                label: SentimentLabel::Neutral,
                score: 0.1,
            },
            SentimentSegment {
                segment: TranscriptSegment::new(
                    "The deadline was missed and the client is upset.",
                    13,
                    22,
                ),
                label: SentimentLabel::Negative,
                score: -0.7,
            },
            SentimentSegment {
                segment: TranscriptSegment::new("We need to fix this immediately.", 23, 29),
                label: SentimentLabel::Negative,
                score: -0.5,
            },
        ];
        Transcript::new(sentiment)
            .expect("non-empty")
            .with_summary(Summary::new("Team meeting about a missed deadline."))
            .with_topics(vec![TopicSegment {
                segment: TranscriptSegment::new(
                    "The deadline was missed and the client is upset.",
                    13,
                    22,
                ),
                topics: vec![ScoredLabel::new("Missed deadline", 0.85)],
            }])
            .with_intents(vec![
                IntentSegment {
                    segment: TranscriptSegment::new("We need to fix this immediately.", 23, 29),
                    intents: vec![ScoredLabel::new("Fix issue urgently", 0.9)],
                },
                IntentSegment {
                    segment: TranscriptSegment::new("Yes I agree with the plan.", 30, 36),
                    intents: vec![ScoredLabel::new("Affirmation", 0.85)],
                },
            ])
    }

    #[test]
    fn full_report_from_sample_meeting() {
        let report = InsightEngine::default().analyze(&sample_transcript());

        assert_eq!(report.summary.short_text, "Team meeting about a missed deadline.");
        assert_eq!(report.vibe_shifts.len(), 2);
        assert!(report
            .vibe_shifts
            .iter()
            .all(|s| s.direction == ShiftDirection::Worsening));
        assert_eq!(report.hot_topics.len(), 1);
        assert_eq!(report.hot_topics[0].topic, "Missed deadline");
        assert_eq!(report.hot_topics[0].worst_score, -0.7);
        assert_eq!(report.consensus.affirmations, 1);
        assert_eq!(report.consensus.level, ConsensusLevel::High);
        assert_eq!(report.action_items.len(), 1);
        assert_eq!(report.action_items[0].intent, "Fix issue urgently");
        assert_eq!(report.top_topics[0].label, "Missed deadline");
        assert_eq!(report.sentiment_segments.len(), 4);
    }

    #[test]
    fn thresholds_come_from_config() {
        let config = AnalyticsConfig {
            shift_threshold: ShiftThreshold::new(5.0).expect("valid"),
            negative_threshold: NegativeThreshold::new(-0.95).expect("valid"),
            intent_confidence_floor: ConfidenceFloor::new(0.95).expect("valid"),
            ..Default::default()
        };
        let report = InsightEngine::with_defaults(config).analyze(&sample_transcript());
        assert!(report.vibe_shifts.is_empty());
        assert!(report.hot_topics.is_empty());
        assert!(report.action_items.is_empty());
        assert_eq!(report.consensus.ratio, 1.0);
    }

    #[test]
    fn injected_classifier_and_matcher_are_used() {
        let engine = InsightEngine::new(
            AnalyticsConfig::default(),
            |label: &str| {
                if label == "Fix issue urgently" {
                    IntentCategory::Disagreement
                } else {
                    IntentCategory::Neutral
                }
            },
            CommitmentLabels::new(["Affirmation"]),
        );
        let report = engine.analyze(&sample_transcript());
        assert_eq!(report.consensus.disagreements, 1);
        assert_eq!(report.consensus.level, ConsensusLevel::Low);
        assert_eq!(report.action_items.len(), 1);
        assert_eq!(report.action_items[0].text, "Yes I agree with the plan.");
    }

    #[test]
    fn missing_optional_families_degrade_to_empty_results() {
        let transcript = Transcript::new(sample_transcript().sentiment().to_vec()).expect("non-empty");
        let report = InsightEngine::default().analyze(&transcript);
        assert!(report.hot_topics.is_empty());
        assert!(report.top_topics.is_empty());
        assert!(report.action_items.is_empty());
        assert!(report.summary.is_empty());
        assert_eq!(report.consensus.ratio, 1.0);
        assert_eq!(report.vibe_shifts.len(), 2);
    }

    #[test]
    fn empty_sentiment_is_reported() {
        let err = InsightEngine::default()
            .analyze_json(r#"{"results": {"sentiments": {"segments": []}}}"#)
            .unwrap_err();
        assert_eq!(err, EngineError::EmptyTranscript);
    }

    #[test]
    fn malformed_input_is_reported() {
        let err = InsightEngine::default()
            .analyze_json(r#"{"sentiments": {"segments": [{"text": "x"}]}}"#)
            .unwrap_err();
        assert!(matches!(err, EngineError::MalformedInput { family: "sentiments", .. }));
    }

    #[test]
    fn analysis_is_deterministic() {
        let engine = InsightEngine::default();
        let transcript = sample_transcript();
        assert_eq!(engine.analyze(&transcript), engine.analyze(&transcript));
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        let engine = Arc::new(InsightEngine::default());
        let transcript = Arc::new(sample_transcript());
        let expected = engine.analyze(&transcript);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = Arc::clone(&engine);
                let transcript = Arc::clone(&transcript);
                std::thread::spawn(move || engine.analyze(&transcript))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().expect("worker panicked"), expected);
        }
    }
}
