//! Preference storage - Key-value pairs that survive a restart.
//!
//! The only consumer is the remembered login: a boolean flag plus the username,
//! stored in cleartext so the login gate can be skipped on relaunch.

use crate::{
    entities::{Preference, preference},
    errors::Result,
};
use sea_orm::{Set, prelude::*, sea_query::OnConflict};
use tracing::{debug, info, instrument};

/// Key of the "logged in" flag (`"true"` / `"false"`).
pub const IS_LOGGED_IN_KEY: &str = "is_logged_in";
/// Key of the remembered username.
pub const CURRENT_USERNAME_KEY: &str = "current_username";

/// Remembered login state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SavedLogin {
    /// Whether the login gate can be skipped
    pub is_logged_in: bool,
    /// Username shown on the dashboard; empty when logged out
    pub username: String,
}

/// Retrieves a value from the preference table.
///
/// Returns `Ok(None)` if the key has never been set.
#[instrument(skip(db))]
pub async fn get_preference(db: &DatabaseConnection, key: &str) -> Result<Option<String>> {
    let value = Preference::find_by_id(key.to_string())
        .one(db)
        .await?
        .map(|row| row.value);
    debug!("Preference '{}': {:?}", key, value);
    Ok(value)
}

/// Sets or updates a value in the preference table (UPSERT).
#[instrument(skip(db))]
pub async fn set_preference(db: &DatabaseConnection, key: &str, value: &str) -> Result<()> {
    let row = preference::ActiveModel {
        key: Set(key.to_string()),
        value: Set(value.to_string()),
    };

    Preference::insert(row)
        .on_conflict(
            OnConflict::column(preference::Column::Key)
                .update_column(preference::Column::Value)
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    debug!("Set preference: {} = {}", key, value);
    Ok(())
}

/// Reads the remembered login; missing keys mean "logged out".
pub async fn load_saved_login(db: &DatabaseConnection) -> Result<SavedLogin> {
    let is_logged_in = get_preference(db, IS_LOGGED_IN_KEY)
        .await?
        .is_some_and(|value| value == "true");
    let username = get_preference(db, CURRENT_USERNAME_KEY)
        .await?
        .unwrap_or_default();

    Ok(SavedLogin {
        is_logged_in,
        username,
    })
}

/// Remembers `username` as logged in.
pub async fn save_login(db: &DatabaseConnection, username: &str) -> Result<()> {
    set_preference(db, IS_LOGGED_IN_KEY, "true").await?;
    set_preference(db, CURRENT_USERNAME_KEY, username).await?;
    info!("Remembered login for '{}'", username);
    Ok(())
}

/// Forgets the remembered login.
pub async fn clear_login(db: &DatabaseConnection) -> Result<()> {
    set_preference(db, IS_LOGGED_IN_KEY, "false").await?;
    set_preference(db, CURRENT_USERNAME_KEY, "").await?;
    info!("Cleared remembered login");
    Ok(())
}
