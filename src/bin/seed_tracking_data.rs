// ABOUTME: Demo data seeder for the workout tracking service
// ABOUTME: Builds a deterministic training history, calendar and body metrics for one user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Demo data seeder for the workout tracker.
//!
//! Every write goes through `TrackingService`, so the seeded data obeys the
//! same rules as live traffic and each completed session carries its score.
//!
//! Usage:
//! ```bash
//! # Seed four weeks of training into the configured database
//! cargo run --bin seed-tracking-data
//!
//! # Seed a specific user into a specific file
//! cargo run --bin seed-tracking-data -- --database-url sqlite:./data/demo.db --user-id <uuid>
//!
//! # Verbose output
//! cargo run --bin seed-tracking-data -- -v --weeks 8
//! ```

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;
use workout_tracker::config::{DatabaseConfig, DatabaseUrl, TrackerConfig};
use workout_tracker::database::Database;
use workout_tracker::intelligence::PerformanceAnalysisService;
use workout_tracker::logging::LoggingConfig;
use workout_tracker::models::{
    ExerciseMetricType, PerceivedDifficulty, SetParameters, UserMetricType,
};
use workout_tracker::services::{MetricInput, TrackingService};

/// Demo user used when `--user-id` is not given
const DEMO_USER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0001);

/// Workout template every seeded session executes
const DEMO_WORKOUT_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0100);

#[derive(Parser)]
#[command(
    name = "seed-tracking-data",
    about = "Workout Tracker Demo Data Seeder",
    long_about = "Populate the database with a deterministic training history for one user"
)]
struct SeedArgs {
    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,

    /// User to seed (defaults to the fixed demo user)
    #[arg(long)]
    user_id: Option<Uuid>,

    /// Number of weeks of training history to generate
    #[arg(long, default_value = "4")]
    weeks: u32,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// Exercise of the demo program with its starting load
struct DemoExercise {
    id: Uuid,
    name: &'static str,
    metric_type: ExerciseMetricType,
    base: f64,
    weekly_step: f64,
}

const DEMO_EXERCISES: [DemoExercise; 4] = [
    DemoExercise {
        id: Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0201),
        name: "Back Squat",
        metric_type: ExerciseMetricType::Repetition,
        base: 80.0,
        weekly_step: 2.5,
    },
    DemoExercise {
        id: Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0202),
        name: "Bench Press",
        metric_type: ExerciseMetricType::Repetition,
        base: 60.0,
        weekly_step: 1.25,
    },
    DemoExercise {
        id: Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0203),
        name: "Plank",
        metric_type: ExerciseMetricType::Duration,
        base: 60.0,
        weekly_step: 10.0,
    },
    DemoExercise {
        id: Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0204),
        name: "Rowing",
        metric_type: ExerciseMetricType::Distance,
        base: 2000.0,
        weekly_step: 100.0,
    },
];

/// Sessions per seeded week
const SESSIONS_PER_WEEK: u32 = 3;

/// Sets recorded per exercise
const SETS_PER_EXERCISE: u32 = 3;

/// Set parameters for one set of a demo exercise at a given progression step
fn demo_set(exercise: &DemoExercise, step: u32, set_index: u32) -> SetParameters {
    let load = exercise.weekly_step.mul_add(f64::from(step), exercise.base);
    match exercise.metric_type {
        ExerciseMetricType::Repetition => {
            SetParameters::reps(8 - set_index.min(3), Some(load)).with_rest(120)
        }
        ExerciseMetricType::Duration => SetParameters::duration(load as u32).with_rest(60),
        ExerciseMetricType::Distance => SetParameters::distance(load),
    }
}

/// Run one complete session at progression step `step` and report its score
async fn seed_session(
    service: &TrackingService,
    user_id: Uuid,
    step: u32,
    cancel: &CancellationToken,
) -> Result<()> {
    let session = service
        .start_workout_session(user_id, DEMO_WORKOUT_ID, cancel)
        .await?;

    for exercise in &DEMO_EXERCISES {
        service
            .add_exercise(
                user_id,
                session.id(),
                exercise.id,
                exercise.name,
                exercise.metric_type,
                cancel,
            )
            .await?;
        for set_index in 0..SETS_PER_EXERCISE {
            service
                .add_set(
                    user_id,
                    session.id(),
                    exercise.id,
                    demo_set(exercise, step, set_index),
                    cancel,
                )
                .await?;
        }
    }

    let difficulty = match step % 3 {
        0 => PerceivedDifficulty::Moderate,
        1 => PerceivedDifficulty::Hard,
        _ => PerceivedDifficulty::Easy,
    };
    let completion = service
        .complete_workout_session(user_id, session.id(), difficulty, None, cancel)
        .await?;

    info!(
        "Session {} scored {:.1} ({})",
        step + 1,
        completion.workout_score,
        completion.description
    );
    for exercise in &completion.exercise_scores {
        info!(
            "  {:<12} {:>6.1}  {}",
            exercise.exercise_name, exercise.score, exercise.description
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = SeedArgs::parse();

    let mut logging = LoggingConfig::from_env();
    if args.verbose {
        logging.level = "debug".into();
    }
    logging.init()?;

    info!("=== Workout Tracker Demo Data Seeder ===");

    let config = TrackerConfig::from_env()?;
    let database_config = match args.database_url {
        Some(url) => DatabaseConfig {
            url: DatabaseUrl::parse_url(&url).context("Invalid --database-url")?,
            ..config.database
        },
        None => config.database,
    };
    info!("Connecting to database: {}", database_config.url);
    let database = Database::from_config(&database_config).await?;

    let analyzer = PerformanceAnalysisService::with_config(config.scoring)?;
    let service = TrackingService::from_database(&database, analyzer);
    let cancel = CancellationToken::new();
    let user_id = args.user_id.unwrap_or(DEMO_USER_ID);
    info!("Seeding {} weeks for user {}", args.weeks, user_id);

    if let Some(active) = service.get_active_workout_session(user_id, &cancel).await? {
        info!("Abandoning leftover session {}", active.id());
        service
            .abandon_workout_session(
                user_id,
                active.id(),
                Some("Replaced by demo seeding".into()),
                &cancel,
            )
            .await?;
    }

    for step in 0..args.weeks * SESSIONS_PER_WEEK {
        seed_session(&service, user_id, step, &cancel).await?;
    }

    let today = Utc::now().date_naive();
    let mut scheduled = 0;
    for day in (1..=14).step_by(2) {
        let date = today + Duration::days(day);
        if service
            .get_scheduled_workouts(user_id, date, date, &cancel)
            .await?
            .is_empty()
        {
            service
                .schedule_workout(user_id, DEMO_WORKOUT_ID, date, None, &cancel)
                .await?;
            scheduled += 1;
        }
    }
    info!("Scheduled {} upcoming workouts", scheduled);

    let now = Utc::now();
    for week in 0..args.weeks {
        let weeks_ago = i64::from(args.weeks - week);
        service
            .record_metric(
                user_id,
                MetricInput {
                    metric_type: UserMetricType::Weight,
                    value: 0.3f64.mul_add(-f64::from(week), 82.0),
                    unit: "kg".into(),
                    recorded_at: Some(now - Duration::weeks(weeks_ago)),
                    notes: None,
                },
                &cancel,
            )
            .await?;
    }
    if let Some(latest) = service
        .get_latest_metric(user_id, UserMetricType::Weight, &cancel)
        .await?
    {
        info!("Latest body weight: {:.1} {}", latest.value(), latest.unit);
    }

    info!("=== Seeding complete ===");
    Ok(())
}
