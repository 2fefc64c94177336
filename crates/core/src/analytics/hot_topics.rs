use super::THRESHOLD_EPSILON;
use crate::config::{ConfidenceFloor, NegativeThreshold};
use crate::transcript::{SentimentLabel, SentimentSegment, TopicSegment};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const LOG_TARGET: &str = "analytics::hot_topics";

/// A topic whose mentions overlap strongly negative sentiment.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HotTopic {
    pub topic: String,
    pub worst_score: f64,
    pub sentiment: SentimentLabel,
    /// Text of the topic segment that produced `worst_score`.
    pub segment_text: String,
}

/// Joins topic segments with the sentiment segments their word ranges overlap.
///
/// A topic segment is hot when the lowest overlapping sentiment score is at or
/// below `threshold`. Each label appears once, carrying the worst score seen for
/// it; the first occurrence wins ties. Output is ordered most negative first.
pub fn correlate_hot_topics(
    topics: &[TopicSegment],
    sentiment: &[SentimentSegment],
    threshold: NegativeThreshold,
    floor: ConfidenceFloor,
) -> Vec<HotTopic> {
    let mut hot: Vec<HotTopic> = Vec::new();
    let mut by_label: HashMap<&str, usize> = HashMap::new();

    for (idx, tseg) in topics.iter().enumerate() {
        let worst = sentiment
            .iter()
            .filter(|s| s.segment.overlaps(&tseg.segment))
            .min_by(|a, b| a.score.total_cmp(&b.score));
        let Some(worst) = worst else {
            tracing::debug!(
                target: LOG_TARGET,
                segment = idx,
                start_word = tseg.segment.start_word,
                end_word = tseg.segment.end_word,
                "topic segment overlaps no sentiment segment"
            );
            continue;
        };
        if worst.score > threshold.value() + THRESHOLD_EPSILON {
            continue;
        }

        for topic in tseg.topics.iter().filter(|t| floor.admits(t.confidence)) {
            let entry = HotTopic {
                topic: topic.label.clone(),
                worst_score: worst.score,
                sentiment: worst.label,
                segment_text: tseg.segment.text.clone(),
            };
            match by_label.get(topic.label.as_str()) {
                Some(&i) => {
                    if worst.score < hot[i].worst_score {
                        hot[i] = entry;
                    }
                }
                None => {
                    by_label.insert(topic.label.as_str(), hot.len());
                    hot.push(entry);
                }
            }
        }
    }

    // Stable, so equal scores stay in first-seen order.
    hot.sort_by(|a, b| a.worst_score.total_cmp(&b.worst_score));
    hot
}
