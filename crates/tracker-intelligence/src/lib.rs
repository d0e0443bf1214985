// ABOUTME: Performance analysis engine for workout session tracking
// ABOUTME: Pure scoring of exercise and workout performance against history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Tracker Intelligence
//!
//! Storage-free scoring of exercise performances. Given a current exercise and
//! the user's prior performances of it, [`PerformanceAnalysisService`] produces a
//! 0-100 score built from three sub-scores: improvement over the personal best,
//! consistency with the recent average, and volume against the overall average.

/// Scoring configuration and validation errors
pub mod config;

/// Exercise and workout scoring
pub mod performance_analyzer;

pub use config::{ConfigError, ScoringConfig};
pub use performance_analyzer::{HistoryByExercise, PerformanceAnalysisService};
