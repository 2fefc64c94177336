//! Wire shapes of the provider's `results` object.

use super::SentimentLabel;
use serde::Deserialize;

#[derive(Deserialize)]
pub(crate) struct RawSentimentSegment {
    pub text: String,
    pub start_word: usize,
    pub end_word: usize,
    pub sentiment: SentimentLabel,
    pub sentiment_score: f64,
}

#[derive(Deserialize)]
pub(crate) struct RawAverage {
    pub sentiment: SentimentLabel,
    pub sentiment_score: f64,
}

#[derive(Deserialize)]
pub(crate) struct RawTopicSegment {
    pub text: String,
    pub start_word: usize,
    pub end_word: usize,
    pub topics: Vec<RawTopic>,
}

#[derive(Deserialize)]
pub(crate) struct RawTopic {
    pub topic: String,
    pub confidence_score: f64,
}

#[derive(Deserialize)]
pub(crate) struct RawIntentSegment {
    pub text: String,
    pub start_word: usize,
    pub end_word: usize,
    pub intents: Vec<RawIntent>,
}

#[derive(Deserialize)]
pub(crate) struct RawIntent {
    pub intent: String,
    pub confidence_score: f64,
}

#[derive(Deserialize)]
pub(crate) struct RawSummary {
    #[serde(default)]
    pub short: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct RawChannel {
    #[serde(default)]
    pub alternatives: Vec<RawAlternative>,
}

#[derive(Deserialize)]
pub(crate) struct RawAlternative {
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub words: Vec<RawWord>,
}

#[derive(Deserialize)]
pub(crate) struct RawWord {
    pub word: String,
    #[serde(default)]
    pub punctuated_word: Option<String>,
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub confidence: f64,
}
