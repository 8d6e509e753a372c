//! Reader configuration.
//!
//! Every field has a documented default, so a config can be built with
//! [`ReaderConfigBuilder`], parsed from a partial JSON document, or taken
//! wholesale from [`ReaderConfig::default`].
//!
//! ```rust
//! use speech_reader::config::ReaderConfigBuilder;
//! use std::time::Duration;
//!
//! let config = ReaderConfigBuilder::default()
//!     .max_chunk_len(180usize)
//!     .restart_timeout(Duration::from_millis(800))
//!     .build()?;
//! assert_eq!(config.slot_count, 3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Deserializer};

use crate::error::ReaderError;
use crate::lang::detect::DetectorConfig;
use crate::playback::PlaybackConfig;
use crate::text::segment::MAX_CHUNK_LEN;

#[derive(Debug, Clone, PartialEq, Builder, Deserialize)]
#[builder(default, build_fn(validate = "Self::check"))]
#[serde(default, rename_all = "camelCase")]
pub struct ReaderConfig {
    /// Upper bound on the length of a spoken chunk, in characters. Default 240.
    pub max_chunk_len: usize,
    /// Rate passed to the engine with every utterance. Default 1.0.
    pub speech_rate: f32,
    /// How long a (re)start waits for the engine to go idle. Default 500ms.
    #[serde(deserialize_with = "millis")]
    pub restart_timeout: Duration,
    /// Interval between idle checks while waiting. Default 30ms.
    #[serde(deserialize_with = "millis")]
    pub restart_poll_interval: Duration,
    /// Quiet period after a text edit before language detection runs. Default 200ms.
    #[serde(deserialize_with = "millis")]
    pub detect_debounce: Duration,
    /// Number of leading characters inspected by the language detector. Default 4000.
    pub detect_sample_chars: usize,
    /// Number of persisted slots. Default 3.
    pub slot_count: usize,
    /// Host locale used when detection finds no signal. Default `en-US`.
    #[builder(setter(into))]
    pub fallback_locale: String,
    /// Whether automatic language detection starts enabled. Default true.
    pub auto_detect: bool,
    /// Prefix for every storage key. Default `speechApp`.
    #[builder(setter(into))]
    pub storage_prefix: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_chunk_len: MAX_CHUNK_LEN,
            speech_rate: 1.0,
            restart_timeout: Duration::from_millis(500),
            restart_poll_interval: Duration::from_millis(30),
            detect_debounce: Duration::from_millis(200),
            detect_sample_chars: 4000,
            slot_count: 3,
            fallback_locale: "en-US".to_string(),
            auto_detect: true,
            storage_prefix: "speechApp".to_string(),
        }
    }
}

impl ReaderConfig {
    /// Parse a JSON config. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ReaderError> {
        let config: ReaderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReaderError> {
        if self.max_chunk_len == 0 {
            return Err(ReaderError::Config("maxChunkLen must be at least 1".to_string()));
        }
        if self.slot_count == 0 {
            return Err(ReaderError::Config("slotCount must be at least 1".to_string()));
        }
        if !(self.speech_rate.is_finite() && self.speech_rate > 0.0) {
            return Err(ReaderError::Config(format!(
                "speechRate must be a positive number, got {}",
                self.speech_rate
            )));
        }
        Ok(())
    }

    pub fn playback(&self) -> PlaybackConfig {
        PlaybackConfig {
            max_chunk_len: self.max_chunk_len,
            rate: self.speech_rate,
            restart_timeout: self.restart_timeout,
            restart_poll_interval: self.restart_poll_interval,
        }
    }

    pub fn detector(&self) -> DetectorConfig {
        DetectorConfig {
            sample_chars: self.detect_sample_chars,
            fallback_locale: self.fallback_locale.clone(),
        }
    }
}

impl ReaderConfigBuilder {
    fn check(&self) -> Result<(), String> {
        if self.max_chunk_len == Some(0) {
            return Err("max_chunk_len must be at least 1".to_string());
        }
        if self.slot_count == Some(0) {
            return Err("slot_count must be at least 1".to_string());
        }
        Ok(())
    }
}

fn millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            ReaderConfig::from_json_str(r#"{"slotCount": 5, "restartTimeout": 750}"#).unwrap();
        assert_eq!(config.slot_count, 5);
        assert_eq!(config.restart_timeout, Duration::from_millis(750));
        assert_eq!(config.max_chunk_len, 240);
        assert_eq!(config.fallback_locale, "en-US");
    }

    #[test]
    fn rejects_zero_slots() {
        let err = ReaderConfig::from_json_str(r#"{"slotCount": 0}"#).unwrap_err();
        assert!(matches!(err, ReaderError::Config(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = ReaderConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ReaderError::Json(_)));
    }

    #[test]
    fn builder_overrides_single_field() {
        let config = ReaderConfigBuilder::default()
            .fallback_locale("zh-TW")
            .build()
            .unwrap();
        assert_eq!(config.fallback_locale, "zh-TW");
        assert_eq!(config.slot_count, 3);
        assert!(ReaderConfigBuilder::default().max_chunk_len(0usize).build().is_err());
    }
}
