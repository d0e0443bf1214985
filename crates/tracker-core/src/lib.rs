// ABOUTME: Core types and constants for the workout tracking platform
// ABOUTME: Foundation crate with error taxonomy, aggregate state machines, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Tracker Core
//!
//! Foundation crate providing the domain model of workout session tracking.
//! This crate has no I/O: it holds the aggregates, their state machines and the
//! typed error taxonomy shared by the scoring engine and the orchestration layer.
//!
//! ## Modules
//!
//! - **errors**: `TrackingError` taxonomy, `DatabaseError`, and the boundary `AppError`
//! - **models**: `WorkoutSession`, `PlannedWorkout`, `UserMetric` and their parts
//! - **constants**: scoring thresholds, labels, and domain limits

/// Typed domain failures, storage errors, and boundary error rendering
pub mod errors;

/// Scoring tiers, description bands, and domain limits
pub mod constants;

/// Aggregates and value types (sessions, planned workouts, body metrics)
pub mod models;
