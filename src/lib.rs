// ABOUTME: Main library entry point for the workout tracking service
// ABOUTME: Wires configuration, SQLite storage, logging and the tracking orchestrator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Workout Tracker
//!
//! Tracking core for strength and conditioning workouts: live sessions with
//! exercises and sets, a calendar of planned workouts, body metrics, and a
//! performance score for every completed exercise.
//!
//! ## Architecture
//!
//! - **`tracker-core`**: aggregates, state machines, error taxonomy, constants
//! - **`tracker-intelligence`**: pure performance scoring over exercise history
//! - **database**: `SQLite` managers and the cancellable repository layer
//! - **services**: `TrackingService`, the orchestrator the API layer calls
//! - **config** / **logging**: environment-driven settings and `tracing` setup
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use tokio_util::sync::CancellationToken;
//! use tracker_intelligence::PerformanceAnalysisService;
//! use uuid::Uuid;
//! use workout_tracker::database::Database;
//! use workout_tracker::services::TrackingService;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let database = Database::new("sqlite::memory:").await?;
//!     let service = TrackingService::from_database(&database, PerformanceAnalysisService::new());
//!
//!     let cancel = CancellationToken::new();
//!     let session = service
//!         .start_workout_session(Uuid::new_v4(), Uuid::new_v4(), &cancel)
//!         .await?;
//!     println!("Started session {}", session.id());
//!     Ok(())
//! }
//! ```

/// Environment-driven configuration
pub mod config;

/// `SQLite` storage and repositories
pub mod database;

/// Error types
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Tracking orchestration
pub mod services;

pub use tracker_core::{constants, models};
pub use tracker_intelligence as intelligence;
