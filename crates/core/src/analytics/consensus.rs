use super::label_words;
use crate::config::{ConfidenceFloor, ConfigError};
use crate::transcript::IntentSegment;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub const HIGH_CONSENSUS_RATIO: f64 = 0.66;
pub const MODERATE_CONSENSUS_RATIO: f64 = 0.33;

const AFFIRMATION_KEYWORDS: &[&str] = &[
    "affirm",
    "affirmation",
    "agree",
    "confirm",
    "approve",
    "accept",
    "yes",
];
const DISAGREEMENT_KEYWORDS: &[&str] = &[
    "disagree",
    "disagreement",
    "deny",
    "reject",
    "refuse",
    "oppose",
    "no",
];

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IntentCategory {
    Affirmation,
    Disagreement,
    Neutral,
}

impl FromStr for IntentCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "affirmation" => Ok(Self::Affirmation),
            "disagreement" => Ok(Self::Disagreement),
            "neutral" => Ok(Self::Neutral),
            _ => Err(()),
        }
    }
}

/// Maps provider intent labels onto agreement categories.
pub trait IntentClassifier: Send + Sync {
    fn classify(&self, label: &str) -> IntentCategory;
}

impl<F> IntentClassifier for F
where
    F: Fn(&str) -> IntentCategory + Send + Sync,
{
    fn classify(&self, label: &str) -> IntentCategory {
        self(label)
    }
}

/// Keyword classifier over the words of a label.
///
/// A keyword matches a word when they are equal, or when the keyword has at
/// least four letters and prefixes the word ("agree" matches "agreed" while
/// "no" does not match "notify"). Disagreement keywords are checked first.
#[derive(Clone, Debug)]
pub struct KeywordIntentClassifier {
    affirmation: Vec<String>,
    disagreement: Vec<String>,
}

impl KeywordIntentClassifier {
    pub fn new<A, D, S>(affirmation: A, disagreement: D) -> Self
    where
        A: IntoIterator<Item = S>,
        D: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lower = |s: S| s.into().to_lowercase();
        Self {
            affirmation: affirmation.into_iter().map(lower).collect(),
            disagreement: disagreement.into_iter().map(lower).collect(),
        }
    }

    fn matches(keywords: &[String], words: &[String]) -> bool {
        words.iter().any(|word| {
            keywords
                .iter()
                .any(|kw| word == kw || (kw.len() >= 4 && word.starts_with(kw.as_str())))
        })
    }
}

impl Default for KeywordIntentClassifier {
    fn default() -> Self {
        Self::new(
            AFFIRMATION_KEYWORDS.iter().copied(),
            DISAGREEMENT_KEYWORDS.iter().copied(),
        )
    }
}

impl IntentClassifier for KeywordIntentClassifier {
    fn classify(&self, label: &str) -> IntentCategory {
        let words = label_words(label);
        if Self::matches(&self.disagreement, &words) {
            IntentCategory::Disagreement
        } else if Self::matches(&self.affirmation, &words) {
            IntentCategory::Affirmation
        } else {
            IntentCategory::Neutral
        }
    }
}

/// Exact (case-insensitive) label lookup; unmapped labels are neutral.
#[derive(Clone, Debug, Default)]
pub struct LabelMapClassifier {
    categories: HashMap<String, IntentCategory>,
}

impl LabelMapClassifier {
    pub fn new<I, L>(entries: I) -> Self
    where
        I: IntoIterator<Item = (L, IntentCategory)>,
        L: AsRef<str>,
    {
        Self {
            categories: entries
                .into_iter()
                .map(|(label, category)| (label.as_ref().to_lowercase(), category))
                .collect(),
        }
    }

    /// Builds the map from textual category names, e.g. from CLI flags.
    pub fn from_pairs<I, L, C>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (L, C)>,
        L: AsRef<str>,
        C: AsRef<str>,
    {
        let mut categories = HashMap::new();
        for (label, category) in pairs {
            let parsed = category.as_ref().parse::<IntentCategory>().map_err(|_| {
                ConfigError::UnknownIntentCategory {
                    label: label.as_ref().to_owned(),
                    category: category.as_ref().to_owned(),
                }
            })?;
            categories.insert(label.as_ref().to_lowercase(), parsed);
        }
        Ok(Self { categories })
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl IntentClassifier for LabelMapClassifier {
    fn classify(&self, label: &str) -> IntentCategory {
        self.categories
            .get(&label.to_lowercase())
            .copied()
            .unwrap_or(IntentCategory::Neutral)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConsensusLevel {
    High,
    Moderate,
    Low,
}

impl ConsensusLevel {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= HIGH_CONSENSUS_RATIO {
            Self::High
        } else if ratio >= MODERATE_CONSENSUS_RATIO {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Moderate => "moderate",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for ConsensusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConsensusResult {
    pub affirmations: usize,
    pub disagreements: usize,
    /// Affirmations over classified intents; 1.0 when nothing was classified.
    pub ratio: f64,
    pub level: ConsensusLevel,
}

pub fn calculate_consensus<C>(
    segments: &[IntentSegment],
    classifier: &C,
    floor: ConfidenceFloor,
) -> ConsensusResult
where
    C: IntentClassifier + ?Sized,
{
    let (mut affirmations, mut disagreements) = (0usize, 0usize);
    for intent in segments
        .iter()
        .flat_map(|s| s.intents.iter())
        .filter(|i| floor.admits(i.confidence))
    {
        match classifier.classify(&intent.label) {
            IntentCategory::Affirmation => affirmations += 1,
            IntentCategory::Disagreement => disagreements += 1,
            IntentCategory::Neutral => {}
        }
    }

    let classified = affirmations + disagreements;
    let ratio = if classified == 0 {
        1.0
    } else {
        affirmations as f64 / classified as f64
    };

    ConsensusResult {
        affirmations,
        disagreements,
        ratio,
        level: ConsensusLevel::from_ratio(ratio),
    }
}
