use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_SHIFT_THRESHOLD: f64 = 0.4;
pub const DEFAULT_NEGATIVE_THRESHOLD: f64 = -0.3;
pub const DEFAULT_CONFIDENCE_FLOOR: f64 = 0.0;
pub const DEFAULT_DEEPGRAM_MODEL: &str = "nova-3";
pub const DEFAULT_DEEPGRAM_LANGUAGE: &str = "en";
pub const DEFAULT_DEEPGRAM_BASE_URL: &str = "https://api.deepgram.com";
pub const DEFAULT_SUMMARIZE_VERSION: &str = "v2";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const ENV_DEEPGRAM_API_KEY: &str = "DEEPGRAM_API_KEY";
pub const ENV_DEEPGRAM_MODEL: &str = "DEEPGRAM_MODEL";
pub const ENV_DEEPGRAM_LANGUAGE: &str = "DEEPGRAM_LANGUAGE";
pub const ENV_SHIFT_THRESHOLD: &str = "VIBE_SHIFT_THRESHOLD";
pub const ENV_NEGATIVE_THRESHOLD: &str = "NEGATIVE_SENTIMENT_THRESHOLD";
pub const ENV_INTENT_CONFIDENCE_FLOOR: &str = "INTENT_CONFIDENCE_FLOOR";
pub const ENV_TOPIC_CONFIDENCE_FLOOR: &str = "TOPIC_CONFIDENCE_FLOOR";
pub const ENV_OUTPUT_DIR: &str = "KOKORO_OUTPUT_DIR";

/// Minimum absolute sentiment delta between adjacent segments that counts as a vibe shift.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "f64", into = "f64")]
pub struct ShiftThreshold(f64);

impl ShiftThreshold {
    pub fn new(value: f64) -> Result<Self, ConfigError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(ConfigError::InvalidShiftThreshold(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for ShiftThreshold {
    fn default() -> Self {
        Self(DEFAULT_SHIFT_THRESHOLD)
    }
}

impl TryFrom<f64> for ShiftThreshold {
    type Error = ConfigError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ShiftThreshold> for f64 {
    fn from(t: ShiftThreshold) -> Self {
        t.0
    }
}

/// Sentiment score at or below which a segment is treated as negative.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "f64", into = "f64")]
pub struct NegativeThreshold(f64);

impl NegativeThreshold {
    pub fn new(value: f64) -> Result<Self, ConfigError> {
        if !value.is_finite() || value >= 0.0 {
            return Err(ConfigError::InvalidNegativeThreshold(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for NegativeThreshold {
    fn default() -> Self {
        Self(DEFAULT_NEGATIVE_THRESHOLD)
    }
}

impl TryFrom<f64> for NegativeThreshold {
    type Error = ConfigError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NegativeThreshold> for f64 {
    fn from(t: NegativeThreshold) -> Self {
        t.0
    }
}

/// Confidence below which a topic or intent entry is ignored.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "f64", into = "f64")]
pub struct ConfidenceFloor(f64);

impl ConfidenceFloor {
    pub fn new(value: f64) -> Result<Self, ConfigError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::InvalidConfidenceFloor(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn admits(&self, confidence: f64) -> bool {
        confidence >= self.0
    }
}

impl Default for ConfidenceFloor {
    fn default() -> Self {
        Self(DEFAULT_CONFIDENCE_FLOOR)
    }
}

impl TryFrom<f64> for ConfidenceFloor {
    type Error = ConfigError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ConfidenceFloor> for f64 {
    fn from(f: ConfidenceFloor) -> Self {
        f.0
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalyticsConfig {
    pub shift_threshold: ShiftThreshold,
    pub negative_threshold: NegativeThreshold,
    pub intent_confidence_floor: ConfidenceFloor,
    pub topic_confidence_floor: ConfidenceFloor,
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, ConfigError> {
        let v = value.into();
        if v.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(v))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(**redacted**)")
    }
}

/// Speech-intelligence features requested from the provider.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderFeatures {
    pub sentiment: bool,
    pub intents: bool,
    pub topics: bool,
    pub summarize: Option<String>,
    pub smart_format: bool,
    pub diarize: bool,
}

impl Default for ProviderFeatures {
    fn default() -> Self {
        Self {
            sentiment: true,
            intents: true,
            topics: true,
            summarize: Some(DEFAULT_SUMMARIZE_VERSION.to_owned()),
            smart_format: true,
            diarize: true,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderConfig {
    pub api_key: Option<ApiKey>,
    pub model: String,
    pub language: String,
    pub base_url: String,
    pub features: ProviderFeatures,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_DEEPGRAM_MODEL.to_owned(),
            language: DEFAULT_DEEPGRAM_LANGUAGE.to_owned(),
            base_url: DEFAULT_DEEPGRAM_BASE_URL.to_owned(),
            features: ProviderFeatures::default(),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("shift threshold must be a finite value > 0, got {0}")]
    InvalidShiftThreshold(f64),
    #[error("negative threshold must be a finite value < 0, got {0}")]
    InvalidNegativeThreshold(f64),
    #[error("confidence floor must be within [0, 1], got {0}")]
    InvalidConfidenceFloor(f64),
    #[error("api key must not be empty")]
    EmptyApiKey,
    #[error("{key} is not a number: {value:?}")]
    InvalidNumber { key: String, value: String },
    #[error("intent label {label:?} mapped to unknown category {category:?}")]
    UnknownIntentCategory { label: String, category: String },
}

pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StdEnv;

impl Env for StdEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: std::collections::BTreeMap<String, String>,
}

impl MapEnv {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Env for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn resolve_api_key(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
) -> Result<Option<ApiKey>, ConfigError> {
    match cli_value {
        Some(v) => Ok(Some(ApiKey::new(v)?)),
        None => match env.var(env_key) {
            Some(v) => Ok(Some(ApiKey::new(v)?)),
            None => Ok(None),
        },
    }
}

pub fn resolve_string_with_default(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
    default: &str,
) -> String {
    match cli_value {
        Some(v) => v,
        None => env.var(env_key).unwrap_or_else(|| default.to_owned()),
    }
}

pub fn resolve_number_with_default(
    cli_value: Option<f64>,
    env_key: &str,
    env: &impl Env,
    default: f64,
) -> Result<f64, ConfigError> {
    if let Some(v) = cli_value {
        return Ok(v);
    }
    match env.var(env_key) {
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| ConfigError::InvalidNumber {
                key: env_key.to_owned(),
                value: raw,
            }),
        None => Ok(default),
    }
}

/// Flag/env overrides for the analytics thresholds, before validation.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnalyticsOverrides {
    pub shift_threshold: Option<f64>,
    pub negative_threshold: Option<f64>,
    pub intent_confidence_floor: Option<f64>,
    pub topic_confidence_floor: Option<f64>,
}

pub fn resolve_analytics_config(
    overrides: AnalyticsOverrides,
    env: &impl Env,
) -> Result<AnalyticsConfig, ConfigError> {
    let shift = resolve_number_with_default(
        overrides.shift_threshold,
        ENV_SHIFT_THRESHOLD,
        env,
        DEFAULT_SHIFT_THRESHOLD,
    )?;
    let negative = resolve_number_with_default(
        overrides.negative_threshold,
        ENV_NEGATIVE_THRESHOLD,
        env,
        DEFAULT_NEGATIVE_THRESHOLD,
    )?;
    let intent_floor = resolve_number_with_default(
        overrides.intent_confidence_floor,
        ENV_INTENT_CONFIDENCE_FLOOR,
        env,
        DEFAULT_CONFIDENCE_FLOOR,
    )?;
    let topic_floor = resolve_number_with_default(
        overrides.topic_confidence_floor,
        ENV_TOPIC_CONFIDENCE_FLOOR,
        env,
        DEFAULT_CONFIDENCE_FLOOR,
    )?;

    Ok(AnalyticsConfig {
        shift_threshold: ShiftThreshold::new(shift)?,
        negative_threshold: NegativeThreshold::new(negative)?,
        intent_confidence_floor: ConfidenceFloor::new(intent_floor)?,
        topic_confidence_floor: ConfidenceFloor::new(topic_floor)?,
    })
}
