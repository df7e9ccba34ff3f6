//! Workout data access - Reads and writes for the workout log.
//!
//! Collections are always returned newest-first (`ORDER BY id DESC`). Deletes
//! match every column of a previously read row, so a stale copy of an edited or
//! already removed row deletes nothing.

use crate::{
    entities::{Workout, workout},
    errors::Result,
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, instrument};

/// Intensity choices offered for a workout. Stored as its label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intensity {
    /// Easy effort
    Light,
    /// Default choice
    #[default]
    Moderate,
    /// Hard effort
    High,
}

impl Intensity {
    /// Label stored in the `intensity` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Moderate => "Moderate",
            Self::High => "High",
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields of a workout that has not been stored yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewWorkout {
    /// Exercise name
    pub exercise: String,
    /// Duration as entered
    pub duration: String,
    /// Intensity label
    pub intensity: String,
}

impl NewWorkout {
    /// Bundles the three text fields of a workout.
    pub fn new(
        exercise: impl Into<String>,
        duration: impl Into<String>,
        intensity: impl Into<String>,
    ) -> Self {
        Self {
            exercise: exercise.into(),
            duration: duration.into(),
            intensity: intensity.into(),
        }
    }
}

/// Retrieves every workout, most recently inserted first.
pub async fn get_all_workouts(db: &DatabaseConnection) -> Result<Vec<workout::Model>> {
    Workout::find()
        .order_by_desc(workout::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Inserts a workout and returns it with its store-assigned id.
#[instrument(skip(db))]
pub async fn create_workout(
    db: &DatabaseConnection,
    new_workout: NewWorkout,
) -> Result<workout::Model> {
    let workout = workout::ActiveModel {
        exercise: Set(new_workout.exercise),
        duration: Set(new_workout.duration),
        intensity: Set(new_workout.intensity),
        ..Default::default()
    };

    let model = workout.insert(db).await?;
    info!("Logged workout '{}' (ID: {})", model.exercise, model.id);
    Ok(model)
}

/// Deletes the row matching every field of `record`.
///
/// Returns the number of rows removed: 1, or 0 when no row matches.
#[instrument(skip(db))]
pub async fn delete_workout(db: &DatabaseConnection, record: &workout::Model) -> Result<u64> {
    let result = Workout::delete_many()
        .filter(workout::Column::Id.eq(record.id))
        .filter(workout::Column::Exercise.eq(record.exercise.as_str()))
        .filter(workout::Column::Duration.eq(record.duration.as_str()))
        .filter(workout::Column::Intensity.eq(record.intensity.as_str()))
        .exec(db)
        .await?;

    debug!(
        "Deleted {} workout row(s) for ID {}",
        result.rows_affected, record.id
    );
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_get_all_workouts_empty() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(get_all_workouts(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_workout_assigns_increasing_ids() -> Result<()> {
        let db = setup_test_db().await?;

        let first = create_test_workout(&db, "Run").await?;
        let second = create_test_workout(&db, "Row").await?;

        assert!(second.id > first.id);
        assert_eq!(first.exercise, "Run");
        assert_eq!(first.intensity, "Moderate");
        Ok(())
    }

    #[tokio::test]
    async fn test_get_all_workouts_newest_first() -> Result<()> {
        let db = setup_test_db().await?;
        for name in ["Run", "Swim", "Cycle"] {
            create_test_workout(&db, name).await?;
        }

        let workouts = get_all_workouts(&db).await?;
        assert_eq!(workouts.len(), 3);
        assert_eq!(workouts[0].exercise, "Cycle");
        assert!(workouts.windows(2).all(|pair| pair[0].id > pair[1].id));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_workout_removes_exactly_one() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_workout(&db, "Run").await?;
        let target = create_test_workout(&db, "Run").await?;

        assert_eq!(delete_workout(&db, &target).await?, 1);

        let remaining = get_all_workouts(&db).await?;
        assert_eq!(remaining.len(), 1);
        assert!(remaining.iter().all(|w| w.id != target.id));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_workout_requires_full_match() -> Result<()> {
        let db = setup_test_db().await?;
        let stored = create_test_workout(&db, "Run").await?;

        let mut stale = stored.clone();
        stale.duration = "45 min".to_string();
        assert_eq!(delete_workout(&db, &stale).await?, 0);

        assert_eq!(delete_workout(&db, &stored).await?, 1);
        assert_eq!(delete_workout(&db, &stored).await?, 0);
        Ok(())
    }

    #[test]
    fn test_intensity_labels() {
        assert_eq!(Intensity::default().to_string(), "Moderate");
        assert_eq!(Intensity::Light.as_str(), "Light");
        assert_eq!(Intensity::High.as_str(), "High");
    }
}
