//! Entity module - Contains all SeaORM entity definitions for the record store.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod meal;
pub mod meditation_session;
pub mod preference;
pub mod user;
pub mod workout;

// Re-export specific types to avoid conflicts
pub use meal::{Column as MealColumn, Entity as Meal, Model as MealModel};
pub use meditation_session::{
    Column as MeditationSessionColumn, Entity as MeditationSession,
    Model as MeditationSessionModel,
};
pub use preference::{Column as PreferenceColumn, Entity as Preference, Model as PreferenceModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
pub use workout::{Column as WorkoutColumn, Entity as Workout, Model as WorkoutModel};
