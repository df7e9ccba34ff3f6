//! Preference entity - Key-value pairs that survive a restart.
//! Used for the remembered login (`is_logged_in`, `current_username`) so the
//! login gate can be skipped on relaunch.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Preference database model - stores key-value pairs
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "preferences")]
pub struct Model {
    /// Preference key (e.g., `"current_username"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// Value stored as cleartext
    pub value: String,
}

/// `Preference` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
