//! Feed engine configuration.

use crate::scroll::ScrollTriggerConfig;
use plume_core::FeedError;
use serde::{Deserialize, Serialize};

/// Tunables for one feed view.
///
/// Defaults match the production feed: 10 items per page, a 300px
/// lookahead so the next page is requested before the sentinel scrolls
/// into view, and a 10% intersection threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    /// Items requested per page (`limit` query parameter)
    pub page_limit: u32,
    /// Distance in px below the viewport at which the sentinel already
    /// counts as visible, masking fetch latency
    pub lookahead_margin: f64,
    /// Fraction of the sentinel that must be visible to count as an
    /// intersection (0 means any overlap)
    pub intersection_threshold: f64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_limit: 10,
            lookahead_margin: 300.0,
            intersection_threshold: 0.1,
        }
    }
}

impl FeedConfig {
    /// Parse a config from TOML and validate it.
    ///
    /// # Errors
    /// `FeedError::InvalidConfig` on parse or validation failure.
    pub fn from_toml_str(raw: &str) -> Result<Self, FeedError> {
        let config: Self =
            toml::from_str(raw).map_err(|e| FeedError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    /// `FeedError::InvalidConfig` if any field is out of range.
    pub fn validate(&self) -> Result<(), FeedError> {
        if self.page_limit == 0 {
            return Err(FeedError::invalid_config("page_limit must be at least 1"));
        }
        if !self.lookahead_margin.is_finite() || self.lookahead_margin < 0.0 {
            return Err(FeedError::invalid_config(
                "lookahead_margin must be a non-negative number",
            ));
        }
        if !self.intersection_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.intersection_threshold)
        {
            return Err(FeedError::invalid_config(
                "intersection_threshold must be within 0.0..=1.0",
            ));
        }
        Ok(())
    }

    /// The scroll-trigger slice of this config.
    #[must_use]
    pub fn scroll(&self) -> ScrollTriggerConfig {
        ScrollTriggerConfig {
            lookahead_margin: self.lookahead_margin,
            intersection_threshold: self.intersection_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FeedConfig::default();
        assert_eq!(config.page_limit, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let config = FeedConfig::from_toml_str(
            r#"
            page_limit = 25
            lookahead_margin = 200.0
            intersection_threshold = 0.0
            "#,
        )
        .unwrap();
        assert_eq!(config.page_limit, 25);
        assert_eq!(config.scroll().lookahead_margin, 200.0);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = FeedConfig::from_toml_str("page_limit = 5").unwrap();
        assert_eq!(config.page_limit, 5);
        assert_eq!(config.lookahead_margin, 300.0);
    }

    #[test]
    fn test_rejects_zero_limit() {
        let err = FeedConfig::from_toml_str("page_limit = 0").unwrap_err();
        assert!(err.to_string().contains("page_limit"));
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let config = FeedConfig {
            intersection_threshold: 1.5,
            ..FeedConfig::default()
        };
        assert!(config.validate().is_err());

        let config = FeedConfig {
            intersection_threshold: f64::NAN,
            ..FeedConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_fields() {
        assert!(FeedConfig::from_toml_str("page_size = 10").is_err());
    }
}
