//! User data access - Credential lookup and registration for the login gate.
//!
//! The username column is UNIQUE, and inserts use `ON CONFLICT DO NOTHING`, so the
//! row count of the insert is the authoritative answer to "was this name free?".

use crate::{
    entities::{User, user},
    errors::Result,
};
use sea_orm::{Set, prelude::*, sea_query::OnConflict};
use tracing::{debug, info, instrument};

/// Credentials for a user that has not been stored yet.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Desired login name
    pub username: String,
    /// Plain-text password
    pub password: String,
}

impl NewUser {
    /// Bundles a username and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Keep passwords out of logs and `#[instrument]` spans.
impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Point lookup of a user by exact username.
#[instrument(skip(db))]
pub async fn get_user_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<user::Model>> {
    let found = User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?;
    debug!("User lookup '{}': found = {}", username, found.is_some());
    Ok(found)
}

/// Inserts a user unless the username is already taken.
///
/// Returns `true` when a row was written and `false` when the unique constraint
/// rejected it.
#[instrument(skip(db))]
pub async fn insert_user_ignoring_conflict(
    db: &DatabaseConnection,
    new_user: NewUser,
) -> Result<bool> {
    let username = new_user.username.clone();
    let user = user::ActiveModel {
        username: Set(new_user.username),
        password: Set(new_user.password),
        ..Default::default()
    };

    let rows = User::insert(user)
        .on_conflict(
            OnConflict::column(user::Column::Username)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    if rows > 0 {
        info!("Registered user '{}'", username);
    } else {
        debug!("Username '{}' already taken", username);
    }
    Ok(rows > 0)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::PaginatorTrait;

    #[tokio::test]
    async fn test_get_user_by_username_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(get_user_by_username(&db, "nobody").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_insert_then_lookup() -> Result<()> {
        let db = setup_test_db().await?;

        assert!(insert_user_ignoring_conflict(&db, NewUser::new("john", "1234")).await?);

        let user = get_user_by_username(&db, "john").await?.unwrap();
        assert_eq!(user.username, "john");
        assert_eq!(user.password, "1234");
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_username_is_ignored() -> Result<()> {
        let db = setup_test_db().await?;

        assert!(insert_user_ignoring_conflict(&db, NewUser::new("john", "1234")).await?);
        assert!(!insert_user_ignoring_conflict(&db, NewUser::new("john", "other")).await?);

        let count = User::find()
            .filter(user::Column::Username.eq("john"))
            .count(&db)
            .await?;
        assert_eq!(count, 1);

        // The original password is kept
        let user = get_user_by_username(&db, "john").await?.unwrap();
        assert_eq!(user.password, "1234");
        Ok(())
    }

    #[tokio::test]
    async fn test_lookup_is_exact_match() -> Result<()> {
        let db = setup_test_db().await?;
        insert_user_ignoring_conflict(&db, NewUser::new("john", "1234")).await?;

        assert!(get_user_by_username(&db, "jo").await?.is_none());
        assert!(get_user_by_username(&db, "john ").await?.is_none());
        Ok(())
    }

    #[test]
    fn test_new_user_debug_hides_password() {
        let rendered = format!("{:?}", NewUser::new("john", "hunter2"));
        assert!(rendered.contains("john"));
        assert!(!rendered.contains("hunter2"));
    }
}
