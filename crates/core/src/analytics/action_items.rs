use super::label_words;
use crate::config::ConfidenceFloor;
use crate::transcript::IntentSegment;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const COMMITMENT_PHRASES: &[&str] = &[
    "will",
    "going to",
    "need to",
    "have to",
    "must",
    "should",
    "plan to",
    "commit to",
    "deliver",
    "finish",
    "complete",
    "send",
    "submit",
    "prepare",
    "schedule",
    "fix",
    "deploy",
    "action item",
    "next step",
    "follow up",
    "take away",
];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ActionItem {
    pub text: String,
    pub intent: String,
    pub confidence: f64,
}

/// Decides whether an intent label denotes a commitment to future action.
pub trait CommitmentMatcher: Send + Sync {
    fn is_commitment(&self, label: &str) -> bool;
}

impl<F> CommitmentMatcher for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_commitment(&self, label: &str) -> bool {
        self(label)
    }
}

/// A fixed, case-insensitive set of commitment labels.
#[derive(Clone, Debug, Default)]
pub struct CommitmentLabels {
    labels: HashSet<String>,
}

impl CommitmentLabels {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            labels: labels
                .into_iter()
                .map(|l| l.as_ref().trim().to_lowercase())
                .collect(),
        }
    }
}

impl CommitmentMatcher for CommitmentLabels {
    fn is_commitment(&self, label: &str) -> bool {
        self.labels.contains(&label.trim().to_lowercase())
    }
}

/// Matches labels containing any of a list of words or multi-word phrases.
#[derive(Clone, Debug)]
pub struct CommitmentKeywords {
    phrases: Vec<Vec<String>>,
}

impl CommitmentKeywords {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            phrases: phrases
                .into_iter()
                .map(|p| label_words(p.as_ref()))
                .filter(|words| !words.is_empty())
                .collect(),
        }
    }
}

impl Default for CommitmentKeywords {
    fn default() -> Self {
        Self::new(COMMITMENT_PHRASES)
    }
}

impl CommitmentMatcher for CommitmentKeywords {
    fn is_commitment(&self, label: &str) -> bool {
        let words = label_words(label);
        self.phrases.iter().any(|phrase| {
            words
                .windows(phrase.len())
                .any(|window| window == phrase.as_slice())
        })
    }
}

/// Every commitment intent at or above the floor, in source order. Repeated
/// occurrences are kept as separate items.
pub fn extract_action_items<M>(
    segments: &[IntentSegment],
    matcher: &M,
    floor: ConfidenceFloor,
) -> Vec<ActionItem>
where
    M: CommitmentMatcher + ?Sized,
{
    segments
        .iter()
        .flat_map(move |seg| {
            seg.intents
                .iter()
                .filter(move |i| floor.admits(i.confidence) && matcher.is_commitment(&i.label))
                .map(move |i| ActionItem {
                    text: seg.segment.text.clone(),
                    intent: i.label.clone(),
                    confidence: i.confidence,
                })
        })
        .collect()
}
