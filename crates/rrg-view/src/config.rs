use anyhow::{Context, Result};
use rrg_core::{ColorMode, RangeConfig, SceneOptions, DEFAULT_TAIL_LENGTH, MAX_TAIL_LENGTH};
use serde::{Deserialize, Serialize};
use std::env;

/// View parameters that persist across reloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Initial tail length
    pub tail_length: usize,
    pub scene: SceneOptions,
    /// Benchmark selected when the server offers it
    pub default_benchmark: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            tail_length: DEFAULT_TAIL_LENGTH,
            scene: SceneOptions::default(),
            default_benchmark: "1306.T".to_string(),
        }
    }
}

impl ViewConfig {
    /// Load from environment variables, validating the result
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            tail_length: env::var("RRG_TAIL_LENGTH")
                .unwrap_or_else(|_| defaults.tail_length.to_string())
                .parse()
                .context("RRG_TAIL_LENGTH must be an integer")?,
            scene: SceneOptions {
                range: RangeConfig {
                    padding_factor: env::var("RRG_PADDING_FACTOR")
                        .unwrap_or_else(|_| defaults.scene.range.padding_factor.to_string())
                        .parse()
                        .context("RRG_PADDING_FACTOR must be a number")?,
                    fallback_pad: env::var("RRG_FALLBACK_PAD")
                        .unwrap_or_else(|_| defaults.scene.range.fallback_pad.to_string())
                        .parse()
                        .context("RRG_FALLBACK_PAD must be a number")?,
                },
                color_mode: match env::var("RRG_COLOR_MODE") {
                    Ok(v) => v.parse::<ColorMode>().map_err(anyhow::Error::msg)?,
                    Err(_) => defaults.scene.color_mode,
                },
            },
            default_benchmark: env::var("RRG_DEFAULT_BENCHMARK").unwrap_or(defaults.default_benchmark),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_TAIL_LENGTH).contains(&self.tail_length) {
            anyhow::bail!(
                "tail length must be between 1 and {}, got {}",
                MAX_TAIL_LENGTH,
                self.tail_length
            );
        }
        self.scene.range.validate()?;
        if self.default_benchmark.trim().is_empty() {
            anyhow::bail!("default benchmark must not be empty");
        }
        Ok(())
    }
}
