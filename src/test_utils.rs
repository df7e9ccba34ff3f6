//! Shared test utilities for the fitness tracker.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test records with sensible defaults.

use crate::{
    config::database::prepare_store,
    core::{
        meal::{self, NewMeal},
        meditation::{self, NewMeditationSession},
        workout::{self, Intensity, NewWorkout},
    },
    entities,
    errors::Result,
    repository::FitnessRepository,
    state::FitnessState,
};
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    prepare_store(&db).await?;
    Ok(db)
}

/// Repository over a fresh in-memory store.
pub async fn setup_test_repository() -> Result<FitnessRepository> {
    FitnessRepository::new(setup_test_db().await?).await
}

/// State holder over a fresh in-memory store; also returns the repository it wraps.
pub async fn setup_test_state() -> Result<(FitnessState, FitnessRepository)> {
    init_test_tracing();
    let repository = setup_test_repository().await?;
    let state = FitnessState::new(repository.clone());
    Ok((state, repository))
}

/// Creates a test workout with sensible defaults.
///
/// # Defaults
/// * duration: "30 min"
/// * intensity: "Moderate"
pub async fn create_test_workout(
    db: &DatabaseConnection,
    exercise: &str,
) -> Result<entities::workout::Model> {
    workout::create_workout(
        db,
        NewWorkout::new(exercise, "30 min", Intensity::default().as_str()),
    )
    .await
}

/// Creates a test meal with sensible defaults.
///
/// # Defaults
/// * description: "Oatmeal"
/// * calories: "300"
pub async fn create_test_meal(
    db: &DatabaseConnection,
    meal_type: &str,
) -> Result<entities::meal::Model> {
    meal::create_meal(db, NewMeal::new(meal_type, "Oatmeal", "300")).await
}

/// Creates a test meditation session with sensible defaults.
///
/// # Defaults
/// * type: "Breathing"
/// * date: "Today, 09:30 AM"
pub async fn create_test_meditation(
    db: &DatabaseConnection,
    duration: &str,
) -> Result<entities::meditation_session::Model> {
    meditation::create_meditation_session(
        db,
        NewMeditationSession::new("Breathing", duration, "Today, 09:30 AM"),
    )
    .await
}
