//! Live collections - Snapshot channels that follow the record store.
//!
//! [`LiveStore`] owns the one store connection and a `watch` channel per
//! observable table. Every write goes through a store-wide gate; once the write
//! commits, the touched table is re-read (newest first) and the full snapshot is
//! published. A receiver's current value is therefore always the latest committed
//! state, and snapshots are published in commit order.

use crate::{
    core::{
        meal::{self, NewMeal},
        meditation::{self, NewMeditationSession},
        workout::{self, NewWorkout},
    },
    entities::{meal as meal_entity, meditation_session, workout as workout_entity},
    errors::Result,
};
use sea_orm::DatabaseConnection;
use tokio::sync::{Mutex, watch};
use tracing::{trace, warn};

/// Live, continuously updated view of one table: the full collection, newest first.
pub type LiveQuery<M> = watch::Receiver<Vec<M>>;

/// Store handle with live reads for workouts, meals and meditation sessions.
#[derive(Debug)]
pub struct LiveStore {
    db: DatabaseConnection,
    write_gate: Mutex<()>,
    workouts: watch::Sender<Vec<workout_entity::Model>>,
    meals: watch::Sender<Vec<meal_entity::Model>>,
    meditations: watch::Sender<Vec<meditation_session::Model>>,
}

impl LiveStore {
    /// Wraps an opened store and loads the initial snapshots.
    ///
    /// # Errors
    /// Returns `Error::Database` if any initial read fails.
    pub async fn new(db: DatabaseConnection) -> Result<Self> {
        let (workouts, _) = watch::channel(workout::get_all_workouts(&db).await?);
        let (meals, _) = watch::channel(meal::get_all_meals(&db).await?);
        let (meditations, _) =
            watch::channel(meditation::get_all_meditation_sessions(&db).await?);

        Ok(Self {
            db,
            write_gate: Mutex::new(()),
            workouts,
            meals,
            meditations,
        })
    }

    /// The underlying connection, for reads that need no live view.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Live workout collection.
    #[must_use]
    pub fn watch_workouts(&self) -> LiveQuery<workout_entity::Model> {
        self.workouts.subscribe()
    }

    /// Live meal collection.
    #[must_use]
    pub fn watch_meals(&self) -> LiveQuery<meal_entity::Model> {
        self.meals.subscribe()
    }

    /// Live meditation session collection.
    #[must_use]
    pub fn watch_meditation_sessions(&self) -> LiveQuery<meditation_session::Model> {
        self.meditations.subscribe()
    }

    /// Inserts a workout and publishes the new snapshot.
    pub async fn insert_workout(&self, new_workout: NewWorkout) -> Result<workout_entity::Model> {
        let _gate = self.write_gate.lock().await;
        let model = workout::create_workout(&self.db, new_workout).await?;
        self.publish_workouts().await;
        Ok(model)
    }

    /// Deletes a workout; publishes only if a row was removed.
    pub async fn delete_workout(&self, record: &workout_entity::Model) -> Result<u64> {
        let _gate = self.write_gate.lock().await;
        let removed = workout::delete_workout(&self.db, record).await?;
        if removed > 0 {
            self.publish_workouts().await;
        }
        Ok(removed)
    }

    /// Inserts a meal and publishes the new snapshot.
    pub async fn insert_meal(&self, new_meal: NewMeal) -> Result<meal_entity::Model> {
        let _gate = self.write_gate.lock().await;
        let model = meal::create_meal(&self.db, new_meal).await?;
        self.publish_meals().await;
        Ok(model)
    }

    /// Deletes a meal; publishes only if a row was removed.
    pub async fn delete_meal(&self, record: &meal_entity::Model) -> Result<u64> {
        let _gate = self.write_gate.lock().await;
        let removed = meal::delete_meal(&self.db, record).await?;
        if removed > 0 {
            self.publish_meals().await;
        }
        Ok(removed)
    }

    /// Inserts a meditation session and publishes the new snapshot.
    pub async fn insert_meditation_session(
        &self,
        new_session: NewMeditationSession,
    ) -> Result<meditation_session::Model> {
        let _gate = self.write_gate.lock().await;
        let model = meditation::create_meditation_session(&self.db, new_session).await?;
        self.publish_meditations().await;
        Ok(model)
    }

    /// Deletes a meditation session; publishes only if a row was removed.
    pub async fn delete_meditation_session(
        &self,
        record: &meditation_session::Model,
    ) -> Result<u64> {
        let _gate = self.write_gate.lock().await;
        let removed = meditation::delete_meditation_session(&self.db, record).await?;
        if removed > 0 {
            self.publish_meditations().await;
        }
        Ok(removed)
    }

    // A failed re-read leaves the previous snapshot in place; the write itself
    // has already committed and is reported as such.
    async fn publish_workouts(&self) {
        match workout::get_all_workouts(&self.db).await {
            Ok(snapshot) => {
                trace!("Publishing {} workouts", snapshot.len());
                self.workouts.send_replace(snapshot);
            }
            Err(e) => warn!("Workout snapshot not refreshed: {}", e),
        }
    }

    async fn publish_meals(&self) {
        match meal::get_all_meals(&self.db).await {
            Ok(snapshot) => {
                trace!("Publishing {} meals", snapshot.len());
                self.meals.send_replace(snapshot);
            }
            Err(e) => warn!("Meal snapshot not refreshed: {}", e),
        }
    }

    async fn publish_meditations(&self) {
        match meditation::get_all_meditation_sessions(&self.db).await {
            Ok(snapshot) => {
                trace!("Publishing {} meditation sessions", snapshot.len());
                self.meditations.send_replace(snapshot);
            }
            Err(e) => warn!("Meditation snapshot not refreshed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::Workout;
    use crate::test_utils::setup_test_db;
    use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait};

    async fn setup_live_store() -> Result<LiveStore> {
        LiveStore::new(setup_test_db().await?).await
    }

    #[tokio::test]
    async fn test_initial_snapshot_reflects_existing_rows() -> Result<()> {
        let db = setup_test_db().await?;
        workout::create_workout(&db, NewWorkout::new("Run", "30 min", "High")).await?;

        let store = LiveStore::new(db).await?;
        assert_eq!(store.watch_workouts().borrow().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_n_inserts_give_n_rows_newest_first() -> Result<()> {
        let store = setup_live_store().await?;
        let live = store.watch_workouts();

        for i in 0..5 {
            store
                .insert_workout(NewWorkout::new(format!("Exercise {i}"), "10 min", "Light"))
                .await?;
        }

        let latest = live.borrow().clone();
        assert_eq!(latest.len(), 5);
        assert_eq!(latest[0].exercise, "Exercise 4");
        assert!(latest.windows(2).all(|pair| pair[0].id > pair[1].id));
        Ok(())
    }

    #[tokio::test]
    async fn test_insert_notifies_subscribers() -> Result<()> {
        let store = setup_live_store().await?;
        let mut live = store.watch_meals();
        assert!(!live.has_changed().unwrap());

        store.insert_meal(NewMeal::new("Lunch", "Soup", "250")).await?;

        assert!(live.has_changed().unwrap());
        assert_eq!(live.borrow_and_update().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_previously_read_record() -> Result<()> {
        let store = setup_live_store().await?;
        let live = store.watch_meditation_sessions();

        for minutes in ["5", "10", "15"] {
            store
                .insert_meditation_session(NewMeditationSession::new(
                    "Breathing",
                    minutes,
                    "Today, 07:00 AM",
                ))
                .await?;
        }
        let target = live.borrow()[1].clone();

        assert_eq!(store.delete_meditation_session(&target).await?, 1);

        let latest = live.borrow().clone();
        assert_eq!(latest.len(), 2);
        assert!(!latest.contains(&target));
        Ok(())
    }

    #[tokio::test]
    async fn test_unmatched_delete_does_not_publish() -> Result<()> {
        let store = setup_live_store().await?;
        let stored = store
            .insert_workout(NewWorkout::new("Run", "30 min", "High"))
            .await?;
        let mut live = store.watch_workouts();

        let mut stale = stored;
        stale.intensity = "Light".to_string();
        assert_eq!(store.delete_workout(&stale).await?, 0);

        assert!(!live.has_changed().unwrap());
        assert_eq!(live.borrow_and_update().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_committed_insert_succeeds_when_refresh_fails() -> Result<()> {
        let store = setup_live_store().await?;
        store
            .insert_workout(NewWorkout::new("Old", "10 min", "Light"))
            .await?;
        let live = store.watch_workouts();

        // Leaves an undecodable row behind so the newest-first re-read fails
        store
            .connection()
            .execute_unprepared(
                "CREATE TRIGGER spoil_duration AFTER INSERT ON workout_table BEGIN \
                 UPDATE workout_table SET duration = X'FF' WHERE id <> NEW.id; END;",
            )
            .await?;

        let stored = store
            .insert_workout(NewWorkout::new("New", "20 min", "High"))
            .await?;

        assert_eq!(stored.exercise, "New");
        assert_eq!(Workout::find().count(store.connection()).await?, 2);
        assert_eq!(live.borrow().len(), 1);
        Ok(())
    }
}
