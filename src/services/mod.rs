// ABOUTME: Domain service layer for workout tracking orchestration
// ABOUTME: Protocol-agnostic operations reusable by any API layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain service layer
//!
//! Services hold the business rules that span aggregates. They take plain
//! values and a cancellation token and return plain serializable values, so
//! any transport can sit in front of them.

/// Session, planned workout and body metric orchestration
pub mod tracking;

pub use tracking::{
    ExercisePerformance, MetricInput, MetricUpdate, SessionCompletion, TrackingService,
    WorkoutScore,
};
