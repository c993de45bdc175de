use std::env;

use serde::{Deserialize, Serialize};

fn default_delay_ms() -> u64 {
    100
}

fn default_tick_ms() -> u64 {
    10
}

fn default_trial_text() -> String {
    "rained cats and dogs".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PreviewConfig {
    /// Quiet period after the last settings change before re-rendering
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_trial_text")]
    pub trial_text: String,
}

impl PreviewConfig {
    pub fn new() -> Self {
        let delay_ms = env::var("PREVIEW_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_delay_ms);

        let tick_ms = env::var("PREVIEW_TICK_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&v: &u64| v > 0)
            .unwrap_or_else(default_tick_ms);

        let trial_text = env::var("PREVIEW_TRIAL_TEXT").unwrap_or_else(|_| default_trial_text());

        Self {
            delay_ms,
            tick_ms,
            trial_text,
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            tick_ms: default_tick_ms(),
            trial_text: default_trial_text(),
        }
    }
}
