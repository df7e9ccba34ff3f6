//! User entity - Login credentials for the local login gate.
//!
//! The username column carries a UNIQUE constraint: it is the authoritative
//! guard against duplicate registrations. Passwords are stored and compared as
//! plain text.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_table")]
pub struct Model {
    /// Store-assigned identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name, unique across the table
    #[sea_orm(unique)]
    pub username: String,
    /// Plain-text password
    pub password: String,
}

/// Users have no relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
