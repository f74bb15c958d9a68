//! Runtime settings read from the environment.
//!
//! The generation backend address and model are required and never defaulted.
//! Everything else has a sensible default that may be overridden.

use crate::lore::LoreConfig;
use crate::narrator::NarratorConfig;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Generation backend base address.
pub const APP_URL: &str = "APP_URL";
/// Generation backend model identifier.
pub const APP_MODEL: &str = "APP_MODEL";
/// Lore API base endpoint override.
pub const LORE_API_BASE: &str = "LORE_API_BASE";
/// Lore lookup timeout in seconds.
pub const LORE_TIMEOUT_SECS: &str = "LORE_TIMEOUT_SECS";
/// Number of recent turns the narrator remembers.
pub const NARRATOR_MEMORY_TURNS: &str = "NARRATOR_MEMORY_TURNS";
/// Sampling temperature for narration.
pub const NARRATOR_TEMPERATURE: &str = "NARRATOR_TEMPERATURE";
/// Maximum tool-call rounds per narration.
pub const NARRATOR_MAX_TOOL_ROUNDS: &str = "NARRATOR_MAX_TOOL_ROUNDS";

/// Errors from reading settings or wiring the backend.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not set")]
    MissingVariable { name: &'static str },

    #[error("{name} has an invalid value: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Generation backend: {0}")]
    Backend(#[from] ollama::Error),

    #[error("Lore client: {0}")]
    Lore(#[from] reqwest::Error),
}

/// Everything needed to build an orchestrator.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Generation backend base address.
    pub base_url: String,
    /// Generation backend model identifier.
    pub model: String,
    pub lore: LoreConfig,
    pub narrator: NarratorConfig,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = required(&lookup, APP_URL)?;
        let model = required(&lookup, APP_MODEL)?;

        let mut lore = LoreConfig::default();
        if let Some(base) = optional(&lookup, LORE_API_BASE) {
            lore = lore.with_base_url(base);
        }
        if let Some(secs) = parsed::<u64, _>(&lookup, LORE_TIMEOUT_SECS)? {
            if secs == 0 {
                return Err(invalid(LORE_TIMEOUT_SECS, secs));
            }
            lore = lore.with_timeout(Duration::from_secs(secs));
        }

        let mut narrator = NarratorConfig::default();
        if let Some(turns) = parsed::<usize, _>(&lookup, NARRATOR_MEMORY_TURNS)? {
            if turns == 0 {
                return Err(invalid(NARRATOR_MEMORY_TURNS, turns));
            }
            narrator = narrator.with_memory_turns(turns);
        }
        if let Some(temperature) = parsed::<f32, _>(&lookup, NARRATOR_TEMPERATURE)? {
            if !temperature.is_finite() {
                return Err(invalid(NARRATOR_TEMPERATURE, temperature));
            }
            narrator = narrator.with_temperature(temperature);
        }
        if let Some(rounds) = parsed::<usize, _>(&lookup, NARRATOR_MAX_TOOL_ROUNDS)? {
            narrator = narrator.with_max_tool_rounds(rounds);
        }

        Ok(Self {
            base_url,
            model,
            lore,
            narrator,
        })
    }

    /// Lore endpoint in use, for startup diagnostics.
    pub fn lore_endpoint(&self) -> &str {
        &self.lore.base_url
    }
}

fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, name).ok_or(ConfigError::MissingVariable { name })
}

fn parsed<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match optional(lookup, name) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
    }
}

fn invalid(name: &'static str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    }
}
