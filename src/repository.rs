//! Fitness repository - One namespace over the whole data access layer.
//!
//! The live collections are handed out unmodified; the only derived operation is
//! the username point lookup used by the login and registration flows. Cloning
//! is cheap and every clone shares the same store.

use crate::{
    core::{
        live::{LiveQuery, LiveStore},
        meal::NewMeal,
        meditation::NewMeditationSession,
        preference::{self, SavedLogin},
        user::{self, NewUser},
        workout::NewWorkout,
    },
    entities::{meal, meditation_session, user as user_entity, workout},
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Shared handle to the record store.
#[derive(Clone, Debug)]
pub struct FitnessRepository {
    store: Arc<LiveStore>,
}

impl FitnessRepository {
    /// Builds the repository over an opened store connection.
    ///
    /// # Errors
    /// Returns `Error::Database` if the initial snapshots cannot be read.
    pub async fn new(db: DatabaseConnection) -> Result<Self> {
        Ok(Self {
            store: Arc::new(LiveStore::new(db).await?),
        })
    }

    /// The shared store connection, for ad-hoc reads.
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        self.store.connection()
    }

    // --- Workouts ---

    /// Live workout collection, newest first.
    #[must_use]
    pub fn all_workouts(&self) -> LiveQuery<workout::Model> {
        self.store.watch_workouts()
    }

    /// Stores a new workout.
    pub async fn insert_workout(&self, new_workout: NewWorkout) -> Result<workout::Model> {
        self.store.insert_workout(new_workout).await
    }

    /// Removes a previously read workout; returns rows removed.
    pub async fn delete_workout(&self, record: &workout::Model) -> Result<u64> {
        self.store.delete_workout(record).await
    }

    // --- Meals ---

    /// Live meal collection, newest first.
    #[must_use]
    pub fn all_meals(&self) -> LiveQuery<meal::Model> {
        self.store.watch_meals()
    }

    /// Stores a new meal.
    pub async fn insert_meal(&self, new_meal: NewMeal) -> Result<meal::Model> {
        self.store.insert_meal(new_meal).await
    }

    /// Removes a previously read meal; returns rows removed.
    pub async fn delete_meal(&self, record: &meal::Model) -> Result<u64> {
        self.store.delete_meal(record).await
    }

    // --- Meditation ---

    /// Live meditation session collection, newest first.
    #[must_use]
    pub fn all_meditation_sessions(&self) -> LiveQuery<meditation_session::Model> {
        self.store.watch_meditation_sessions()
    }

    /// Stores a new meditation session.
    pub async fn insert_meditation_session(
        &self,
        new_session: NewMeditationSession,
    ) -> Result<meditation_session::Model> {
        self.store.insert_meditation_session(new_session).await
    }

    /// Removes a previously read meditation session; returns rows removed.
    pub async fn delete_meditation_session(
        &self,
        record: &meditation_session::Model,
    ) -> Result<u64> {
        self.store.delete_meditation_session(record).await
    }

    // --- Users ---

    /// Direct lookup of one user, bypassing the live collections.
    pub async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<user_entity::Model>> {
        user::get_user_by_username(self.store.connection(), username).await
    }

    /// Stores a user; `false` when the username is already taken.
    pub async fn register_user(&self, new_user: NewUser) -> Result<bool> {
        user::insert_user_ignoring_conflict(self.store.connection(), new_user).await
    }

    // --- Remembered login ---

    /// Login state remembered from an earlier run.
    pub async fn saved_login(&self) -> Result<SavedLogin> {
        preference::load_saved_login(self.store.connection()).await
    }

    /// Remembers `username` so the login gate is skipped next time.
    pub async fn remember_login(&self, username: &str) -> Result<()> {
        preference::save_login(self.store.connection(), username).await
    }

    /// Forgets the remembered login.
    pub async fn forget_login(&self) -> Result<()> {
        preference::clear_login(self.store.connection()).await
    }
}
