use super::raw::{
    RawAverage, RawChannel, RawIntentSegment, RawSentimentSegment, RawSummary, RawTopicSegment,
};
use super::{
    IntentSegment, OverallSentiment, ScoredLabel, SentimentSegment, Summary, TopicSegment,
    Transcript, TranscriptSegment, Word,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

const LOG_TARGET: &str = "transcript::normalize";

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("malformed {family} data: {reason}")]
    Malformed { family: &'static str, reason: String },
    #[error("transcript has no sentiment segments")]
    EmptyTranscript,
}

impl NormalizeError {
    fn malformed(family: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            family,
            reason: reason.into(),
        }
    }
}

/// Parses provider JSON text and normalizes it.
pub fn normalize_json(text: &str) -> Result<Transcript, NormalizeError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| NormalizeError::malformed("response", e.to_string()))?;
    normalize_value(&value)
}

/// Normalizes either the full provider envelope (`{"results": ...}`) or a bare
/// `results` object.
///
/// Every present family is validated before the empty-timeline check, so a
/// structural error always wins over [`NormalizeError::EmptyTranscript`].
pub fn normalize_value(value: &Value) -> Result<Transcript, NormalizeError> {
    let root = value
        .as_object()
        .ok_or_else(|| NormalizeError::malformed("response", "expected a JSON object"))?;
    let results = match root.get("results") {
        Some(Value::Object(results)) => results,
        Some(other) => {
            return Err(NormalizeError::malformed(
                "response",
                format!("`results` must be an object, got {}", json_kind(other)),
            ))
        }
        None => root,
    };

    let (sentiment, average) = parse_sentiments(results)?;
    let topics = parse_topics(results)?;
    let intents = parse_intents(results)?;
    let summary = parse_summary(results)?;
    let alternative = parse_first_alternative(results)?;

    tracing::debug!(
        target: LOG_TARGET,
        sentiment = sentiment.len(),
        topics = topics.len(),
        intents = intents.len(),
        has_summary = !summary.is_empty(),
        "provider output parsed"
    );

    let mut transcript = Transcript::new(sentiment)?
        .with_topics(topics)
        .with_intents(intents)
        .with_summary(summary);
    if let Some(average) = average {
        transcript = transcript.with_average_sentiment(average);
    }
    if let Some((text, confidence, words)) = alternative {
        if let Some(text) = text {
            transcript = transcript.with_text(text, confidence);
        }
        transcript = transcript.with_words(words);
    }
    Ok(transcript)
}

fn parse_sentiments(
    results: &Map<String, Value>,
) -> Result<(Vec<SentimentSegment>, Option<OverallSentiment>), NormalizeError> {
    const FAMILY: &str = "sentiments";
    let Some(family) = family_object(results, FAMILY)? else {
        return Ok((Vec::new(), None));
    };

    let raw: Vec<RawSentimentSegment> = parse_segments(FAMILY, family)?;
    let mut segments = Vec::with_capacity(raw.len());
    for (idx, seg) in raw.into_iter().enumerate() {
        check_range(FAMILY, idx, seg.start_word, seg.end_word)?;
        check_score(FAMILY, idx, seg.sentiment_score)?;
        segments.push(SentimentSegment {
            segment: TranscriptSegment::new(seg.text, seg.start_word, seg.end_word),
            label: seg.sentiment,
            score: seg.sentiment_score,
        });
    }

    let average = match family.get("average") {
        None | Some(Value::Null) => None,
        Some(v) => {
            let avg = <RawAverage as serde::Deserialize>::deserialize(v)
                .map_err(|e| NormalizeError::malformed(FAMILY, format!("average: {e}")))?;
            if !avg.sentiment_score.is_finite() || !(-1.0..=1.0).contains(&avg.sentiment_score) {
                return Err(NormalizeError::malformed(
                    FAMILY,
                    format!("average score {} outside [-1, 1]", avg.sentiment_score),
                ));
            }
            Some(OverallSentiment {
                label: avg.sentiment,
                score: avg.sentiment_score,
            })
        }
    };

    Ok((segments, average))
}

fn parse_topics(results: &Map<String, Value>) -> Result<Vec<TopicSegment>, NormalizeError> {
    const FAMILY: &str = "topics";
    let Some(family) = family_object(results, FAMILY)? else {
        return Ok(Vec::new());
    };

    let raw: Vec<RawTopicSegment> = parse_segments(FAMILY, family)?;
    let mut segments = Vec::with_capacity(raw.len());
    for (idx, seg) in raw.into_iter().enumerate() {
        check_range(FAMILY, idx, seg.start_word, seg.end_word)?;
        let mut topics = Vec::with_capacity(seg.topics.len());
        for t in seg.topics {
            check_confidence(FAMILY, idx, t.confidence_score)?;
            topics.push(ScoredLabel::new(t.topic, t.confidence_score));
        }
        segments.push(TopicSegment {
            segment: TranscriptSegment::new(seg.text, seg.start_word, seg.end_word),
            topics,
        });
    }
    Ok(segments)
}

fn parse_intents(results: &Map<String, Value>) -> Result<Vec<IntentSegment>, NormalizeError> {
    const FAMILY: &str = "intents";
    let Some(family) = family_object(results, FAMILY)? else {
        return Ok(Vec::new());
    };

    let raw: Vec<RawIntentSegment> = parse_segments(FAMILY, family)?;
    let mut segments = Vec::with_capacity(raw.len());
    for (idx, seg) in raw.into_iter().enumerate() {
        check_range(FAMILY, idx, seg.start_word, seg.end_word)?;
        let mut intents = Vec::with_capacity(seg.intents.len());
        for i in seg.intents {
            check_confidence(FAMILY, idx, i.confidence_score)?;
            intents.push(ScoredLabel::new(i.intent, i.confidence_score));
        }
        segments.push(IntentSegment {
            segment: TranscriptSegment::new(seg.text, seg.start_word, seg.end_word),
            intents,
        });
    }
    Ok(segments)
}

fn parse_summary(results: &Map<String, Value>) -> Result<Summary, NormalizeError> {
    const FAMILY: &str = "summary";
    match results.get(FAMILY) {
        None | Some(Value::Null) => Ok(Summary::default()),
        Some(v) => {
            let raw: RawSummary = deserialize(FAMILY, v)?;
            Ok(Summary::new(raw.short.unwrap_or_default()))
        }
    }
}

type Alternative = (Option<String>, Option<f64>, Vec<Word>);

fn parse_first_alternative(
    results: &Map<String, Value>,
) -> Result<Option<Alternative>, NormalizeError> {
    const FAMILY: &str = "channels";
    let channels: Vec<RawChannel> = match results.get(FAMILY) {
        None | Some(Value::Null) => return Ok(None),
        Some(v) => deserialize(FAMILY, v)?,
    };
    let Some(alt) = channels
        .into_iter()
        .next()
        .and_then(|c| c.alternatives.into_iter().next())
    else {
        return Ok(None);
    };

    let words = alt
        .words
        .into_iter()
        .map(|w| Word {
            text: w.punctuated_word.unwrap_or(w.word),
            start: w.start,
            end: w.end,
            confidence: w.confidence,
        })
        .collect();
    Ok(Some((alt.transcript, alt.confidence, words)))
}

/// Returns the family object, or `None` when the family is absent or null.
fn family_object<'a>(
    results: &'a Map<String, Value>,
    family: &'static str,
) -> Result<Option<&'a Map<String, Value>>, NormalizeError> {
    match results.get(family) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(obj)) => Ok(Some(obj)),
        Some(other) => Err(NormalizeError::malformed(
            family,
            format!("expected an object, got {}", json_kind(other)),
        )),
    }
}

fn parse_segments<T: DeserializeOwned>(
    family: &'static str,
    obj: &Map<String, Value>,
) -> Result<Vec<T>, NormalizeError> {
    let items = match obj.get("segments") {
        None | Some(Value::Null) => {
            tracing::warn!(target: LOG_TARGET, family, "family present without segments");
            return Ok(Vec::new());
        }
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(NormalizeError::malformed(
                family,
                format!("`segments` must be an array, got {}", json_kind(other)),
            ))
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            <T as serde::Deserialize>::deserialize(item).map_err(|e| {
                NormalizeError::malformed(family, format!("segment {idx}: {e}"))
            })
        })
        .collect()
}

fn deserialize<T: DeserializeOwned>(family: &'static str, v: &Value) -> Result<T, NormalizeError> {
    <T as serde::Deserialize>::deserialize(v)
        .map_err(|e| NormalizeError::malformed(family, e.to_string()))
}

fn check_range(
    family: &'static str,
    idx: usize,
    start: usize,
    end: usize,
) -> Result<(), NormalizeError> {
    if end < start {
        return Err(NormalizeError::malformed(
            family,
            format!("segment {idx}: end_word {end} precedes start_word {start}"),
        ));
    }
    Ok(())
}

fn check_score(family: &'static str, idx: usize, score: f64) -> Result<(), NormalizeError> {
    if !score.is_finite() || !(-1.0..=1.0).contains(&score) {
        return Err(NormalizeError::malformed(
            family,
            format!("segment {idx}: sentiment score {score} outside [-1, 1]"),
        ));
    }
    Ok(())
}

fn check_confidence(family: &'static str, idx: usize, confidence: f64) -> Result<(), NormalizeError> {
    if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
        return Err(NormalizeError::malformed(
            family,
            format!("segment {idx}: confidence {confidence} outside [0, 1]"),
        ));
    }
    Ok(())
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
