//! Replay settings loaded from `--config`.
//!
//! ```json
//! {
//!   "capture": { "idle_threshold_ms": 40 },
//!   "policy": { "minimum_age": 21 }
//! }
//! ```
//!
//! Both sections and every key inside them are optional.

use anyhow::Context;
use checkstand_hardware::CaptureConfig;
use checkstand_idcheck::DecisionPolicy;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReplayConfig {
    pub capture: CaptureConfig,
    pub policy: DecisionPolicy,
}

impl ReplayConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.capture.validate()?;
        config.policy.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(ReplayConfig::from_json("{}").unwrap(), ReplayConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = ReplayConfig::from_json(
            r#"{ "capture": { "idle_threshold_ms": 40 }, "policy": { "minimum_age": 25 } }"#,
        )
        .unwrap();

        assert_eq!(config.capture.idle_threshold, Duration::from_millis(40));
        assert_eq!(config.capture.read_chunk_size, CaptureConfig::default().read_chunk_size);
        assert_eq!(config.policy.minimum_age, 25);
        assert_eq!(config.policy.max_plausible_age, 120);
    }

    #[test]
    fn test_invalid_capture_is_rejected() {
        let err = ReplayConfig::from_json(r#"{ "capture": { "idle_threshold_ms": 0 } }"#)
            .unwrap_err();
        assert!(err.to_string().contains("idle_threshold"));
    }

    #[test]
    fn test_minimum_age_below_21_is_rejected() {
        let err = ReplayConfig::from_json(r#"{ "policy": { "minimum_age": 18 } }"#).unwrap_err();
        assert!(err.to_string().contains("minimum_age 18"));
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        assert!(ReplayConfig::from_json(r#"{ "capturre": {} }"#).is_err());
    }
}
