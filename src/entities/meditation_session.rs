//! Meditation session entity - A finished (or stopped) meditation.
//!
//! Sessions are written by the meditation timer once at least one full minute
//! has elapsed. `date` is the human-readable label shown in the history list,
//! e.g. `"Today, 07:45 AM"`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Meditation session database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meditation_table")]
pub struct Model {
    /// Store-assigned identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Meditation type label (e.g., `"Breathing"`, `"Body Scan"`)
    #[sea_orm(column_name = "type")]
    pub kind: String,
    /// Completed minutes, stored as text
    pub duration: String,
    /// Formatted time the session was saved
    pub date: String,
}

/// Sessions stand alone
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
