// ABOUTME: Error types for the workout tracking service crate
// ABOUTME: Re-exports the shared taxonomy so callers import errors from one place
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Error Handling
//!
//! Domain failures are [`TrackingError`] values raised by the aggregates and the
//! tracking service. Storage failures are [`DatabaseError`] values raised by the
//! repositories and folded into `TrackingError` at the service boundary.
//! [`AppError`] is the rendered form handed to outer layers.

pub use tracker_core::errors::{
    AppError, AppResult, DatabaseError, ErrorCategory, ErrorCode, TrackingError, TrackingResult,
};
