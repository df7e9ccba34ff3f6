//! Data access layer - typed reads and writes per record kind.
//!
//! Each module is a thin pass-through over `SeaORM` with the newest-first ordering
//! baked into every collection read. [`live::LiveStore`] adds the live snapshot
//! channels on top of the workout, meal and meditation modules.

/// Live snapshot channels over the observable tables
pub mod live;
/// Meal log
pub mod meal;
/// Meditation sessions and meditation types
pub mod meditation;
/// Key-value preferences and the remembered login
pub mod preference;
/// Login credentials
pub mod user;
/// Workout log and intensity choices
pub mod workout;
