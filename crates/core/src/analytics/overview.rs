use crate::transcript::{OverallSentiment, ScoredLabel, SentimentLabel, TopicSegment, Transcript};
use std::collections::HashMap;

pub const TOP_TOPIC_LIMIT: usize = 10;

/// Distinct topic labels ranked by their highest confidence, ties in order of
/// first appearance.
pub fn rank_top_topics(segments: &[TopicSegment], limit: usize) -> Vec<ScoredLabel> {
    let mut ranked: Vec<ScoredLabel> = Vec::new();
    let mut by_label: HashMap<&str, usize> = HashMap::new();

    for topic in segments.iter().flat_map(|s| s.topics.iter()) {
        match by_label.get(topic.label.as_str()) {
            Some(&i) => {
                if topic.confidence > ranked[i].confidence {
                    ranked[i].confidence = topic.confidence;
                }
            }
            None => {
                by_label.insert(topic.label.as_str(), ranked.len());
                ranked.push(topic.clone());
            }
        }
    }

    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    ranked.truncate(limit);
    ranked
}

/// The provider's average when it sent one, otherwise the mean segment score.
pub fn overall_sentiment(transcript: &Transcript) -> OverallSentiment {
    if let Some(average) = transcript.average_sentiment() {
        return average;
    }
    let segments = transcript.sentiment();
    let score = segments.iter().map(|s| s.score).sum::<f64>() / segments.len().max(1) as f64;
    OverallSentiment {
        label: SentimentLabel::from_score(score),
        score,
    }
}
