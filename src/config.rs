//! Dashboard configuration
//!
//! Defaults match the stock dashboard. A TOML file named by `GLUCOSE_CONFIG`
//! may override any field, and `GLUCOSE_WS` overrides the feed URL.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::core::layout::Padding;
use crate::core::window::{Millis, FOCUS_SPAN, MINUTE_MS};

/// Default feed URL (override with GLUCOSE_WS env var)
pub const DEFAULT_WS_URL: &str = "ws://127.0.0.1:1337/feed";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub ws_url: String,
    /// Width of the focus window
    pub focus_span_ms: Millis,
    /// Idle time before a user selection reverts to live
    pub idle_timeout_ms: Millis,
    /// Quiet period before a resize is measured
    pub resize_debounce_ms: Millis,
    /// Animation length for updates after the first frame
    pub transition_ms: u32,
    pub padding: Padding,
    /// Share of the chart height given to the focus pane
    pub focus_ratio: f32,
    /// Share of the chart height given to the context pane
    pub context_ratio: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            ws_url: DEFAULT_WS_URL.to_string(),
            focus_span_ms: FOCUS_SPAN,
            idle_timeout_ms: 5 * MINUTE_MS,
            resize_debounce_ms: 100,
            transition_ms: 750,
            padding: Padding::default(),
            focus_ratio: 0.7,
            context_ratio: 0.2,
        }
    }
}

impl DashboardConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: DashboardConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let mut config = match std::env::var("GLUCOSE_CONFIG") {
            Ok(path) => Self::load(&path).unwrap_or_else(|e| {
                warn!(path = %path, error = %e, "Config file unusable, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        if let Ok(url) = std::env::var("GLUCOSE_WS") {
            config.ws_url = url;
        }
        info!(url = %config.ws_url, span_ms = config.focus_span_ms, "Config resolved");
        config
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.focus_span_ms <= 0 {
            return Err(ConfigError::Invalid("focus_span_ms must be positive"));
        }
        if self.idle_timeout_ms <= 0 {
            return Err(ConfigError::Invalid("idle_timeout_ms must be positive"));
        }
        if self.focus_ratio + self.context_ratio > 1.0 {
            return Err(ConfigError::Invalid("pane ratios exceed the chart height"));
        }
        Ok(())
    }
}
