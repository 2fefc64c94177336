mod normalize;
mod raw;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use normalize::{normalize_json, normalize_value, NormalizeError};

/// Deepgram labels a segment positive/negative beyond this magnitude.
pub const SENTIMENT_LABEL_CUTOFF: f64 = 0.333;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn from_score(score: f64) -> Self {
        if score > SENTIMENT_LABEL_CUTOFF {
            Self::Positive
        } else if score < -SENTIMENT_LABEL_CUTOFF {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A span of the transcript covering words `start_word..=end_word`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranscriptSegment {
    pub text: String,
    pub start_word: usize,
    pub end_word: usize,
}

impl TranscriptSegment {
    pub fn new<S: Into<String>>(text: S, start_word: usize, end_word: usize) -> Self {
        Self {
            text: text.into(),
            start_word,
            end_word,
        }
    }

    /// Both ranges are inclusive, so segments sharing a single boundary word overlap.
    pub fn overlaps(&self, other: &TranscriptSegment) -> bool {
        self.start_word <= other.end_word && other.start_word <= self.end_word
    }

    pub fn word_count(&self) -> usize {
        self.end_word.saturating_sub(self.start_word) + 1
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SentimentSegment {
    #[serde(flatten)]
    pub segment: TranscriptSegment,
    pub label: SentimentLabel,
    pub score: f64,
}

impl SentimentSegment {
    pub fn text(&self) -> &str {
        &self.segment.text
    }
}

/// An open-vocabulary label (topic or intent) with the provider's confidence.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScoredLabel {
    pub label: String,
    pub confidence: f64,
}

impl ScoredLabel {
    pub fn new<S: Into<String>>(label: S, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TopicSegment {
    #[serde(flatten)]
    pub segment: TranscriptSegment,
    /// In order of appearance, not confidence.
    pub topics: Vec<ScoredLabel>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct IntentSegment {
    #[serde(flatten)]
    pub segment: TranscriptSegment,
    pub intents: Vec<ScoredLabel>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Summary {
    pub short_text: String,
}

impl Summary {
    pub fn new<S: Into<String>>(short_text: S) -> Self {
        Self {
            short_text: short_text.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.short_text.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct OverallSentiment {
    pub label: SentimentLabel,
    pub score: f64,
}

/// A single recognized word with timings in seconds.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Word {
    pub text: String,
    pub start: f64,
    pub end: f64,
    pub confidence: f64,
}

/// Normalized provider output. Sentiment segments form the primary timeline and
/// are never empty.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Transcript {
    sentiment: Vec<SentimentSegment>,
    topics: Vec<TopicSegment>,
    intents: Vec<IntentSegment>,
    summary: Summary,
    average_sentiment: Option<OverallSentiment>,
    text: Option<String>,
    confidence: Option<f64>,
    words: Vec<Word>,
}

impl Transcript {
    pub fn new(sentiment: Vec<SentimentSegment>) -> Result<Self, NormalizeError> {
        if sentiment.is_empty() {
            return Err(NormalizeError::EmptyTranscript);
        }
        Ok(Self {
            sentiment,
            topics: Vec::new(),
            intents: Vec::new(),
            summary: Summary::default(),
            average_sentiment: None,
            text: None,
            confidence: None,
            words: Vec::new(),
        })
    }

    pub fn with_topics(mut self, topics: Vec<TopicSegment>) -> Self {
        self.topics = topics;
        self
    }

    pub fn with_intents(mut self, intents: Vec<IntentSegment>) -> Self {
        self.intents = intents;
        self
    }

    pub fn with_summary(mut self, summary: Summary) -> Self {
        self.summary = summary;
        self
    }

    pub fn with_average_sentiment(mut self, average: OverallSentiment) -> Self {
        self.average_sentiment = Some(average);
        self
    }

    pub fn with_text<S: Into<String>>(mut self, text: S, confidence: Option<f64>) -> Self {
        self.text = Some(text.into());
        self.confidence = confidence;
        self
    }

    pub fn with_words(mut self, words: Vec<Word>) -> Self {
        self.words = words;
        self
    }

    pub fn sentiment(&self) -> &[SentimentSegment] {
        &self.sentiment
    }

    pub fn topics(&self) -> &[TopicSegment] {
        &self.topics
    }

    pub fn intents(&self) -> &[IntentSegment] {
        &self.intents
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn average_sentiment(&self) -> Option<OverallSentiment> {
        self.average_sentiment
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Start and end time in seconds of a word range, when word timings cover it.
    pub fn time_span(&self, segment: &TranscriptSegment) -> Option<(f64, f64)> {
        let first = self.words.get(segment.start_word)?;
        let last = self.words.get(segment.end_word)?;
        Some((first.start, last.end))
    }
}
