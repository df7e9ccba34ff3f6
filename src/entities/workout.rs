//! Workout entity - One logged exercise session.
//!
//! Duration and intensity are kept as the free text the user typed; the
//! [`Intensity`](crate::core::workout::Intensity) helper only offers the usual choices.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Workout database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "workout_table")]
pub struct Model {
    /// Store-assigned identifier, newest rows have the highest id
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Exercise name (e.g., "Running", "Pushups")
    pub exercise: String,
    /// Duration as entered (e.g., "30 min")
    pub duration: String,
    /// Intensity label: `"Light"`, `"Moderate"` or `"High"`
    pub intensity: String,
}

/// Workouts stand alone
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
