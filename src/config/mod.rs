// ABOUTME: Configuration management module for the workout tracking service
// ABOUTME: Handles environment configuration, database settings, and scoring overrides
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module
//!
//! - **Environment**: `TrackerConfig` assembled from environment variables and `.env`
//! - **Database**: type-safe database URL and pool settings

/// Database URL and pool configuration
pub mod database;
/// Environment-driven service configuration
pub mod environment;

pub use database::{DatabaseConfig, DatabaseUrl};
pub use environment::TrackerConfig;
