// ABOUTME: Environment configuration management for the workout tracking service
// ABOUTME: Loads .env, database settings, and validated scoring overrides
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracker_intelligence::config::{ConfigError, ScoringConfig};

use super::database::DatabaseConfig;

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Storage settings
    pub database: DatabaseConfig,
    /// Performance scoring weights and fixed scores
    pub scoring: ScoringConfig,
}

impl TrackerConfig {
    /// Load configuration from environment variables
    ///
    /// A `.env` file in the working directory is loaded first when present.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or the scoring overrides are invalid
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        // Load .env file if it exists
        if let Err(e) = dotenvy::dotenv() {
            warn!("No .env file found or failed to load: {}", e);
        }

        let database = DatabaseConfig::from_env().context("Invalid database configuration")?;
        let scoring = scoring_from_env().context("Invalid scoring configuration")?;

        info!(
            database.url = %database.url,
            database.max_connections = database.max_connections,
            scoring.recent_window = scoring.recent_window,
            "Configuration loaded"
        );
        Ok(Self { database, scoring })
    }
}

/// Scoring defaults with any `SCORING_*` overrides applied, then validated
fn scoring_from_env() -> Result<ScoringConfig, ConfigError> {
    let defaults = ScoringConfig::default();
    let config = ScoringConfig {
        improvement_weight: env_parse_or("SCORING_IMPROVEMENT_WEIGHT", defaults.improvement_weight)?,
        consistency_weight: env_parse_or("SCORING_CONSISTENCY_WEIGHT", defaults.consistency_weight)?,
        volume_weight: env_parse_or("SCORING_VOLUME_WEIGHT", defaults.volume_weight)?,
        recent_window: env_parse_or("SCORING_RECENT_WINDOW", defaults.recent_window)?,
        completion_bonus: env_parse_or("SCORING_COMPLETION_BONUS", defaults.completion_bonus)?,
        ..defaults
    };
    config.validate()?;
    Ok(config)
}

/// Parse an environment variable, falling back to `default` when unset
fn env_parse_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    env::var(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e| ConfigError::Parse(format!("{key}={raw}: {e}")))
    })
}
