// ABOUTME: Configuration module for tracker-intelligence crate
// ABOUTME: Re-exports scoring configuration and its validation errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Configuration validation errors
pub mod error;

/// Scoring weights and fixed scores
pub mod scoring;

pub use error::ConfigError;
pub use scoring::ScoringConfig;
