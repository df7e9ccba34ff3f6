//! Meditation session data access and the meditation type catalogue.
//!
//! Sessions are usually written by the [`timer`](crate::timer) once enough time
//! has elapsed, but they can also be added directly.

use crate::{
    entities::{MeditationSession, meditation_session},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, instrument};

/// The four guided meditation styles offered by the timer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeditationType {
    /// Breath counting
    #[default]
    Breathing,
    /// Progressive body scan
    BodyScan,
    /// Loving-kindness (metta)
    LovingKindness,
    /// Guided imagery
    Visualization,
}

impl MeditationType {
    /// All types in display order.
    pub const ALL: [Self; 4] = [
        Self::Breathing,
        Self::BodyScan,
        Self::LovingKindness,
        Self::Visualization,
    ];

    /// Label stored in the `type` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Breathing => "Breathing",
            Self::BodyScan => "Body Scan",
            Self::LovingKindness => "Loving-Kindness",
            Self::Visualization => "Visualization",
        }
    }
}

impl fmt::Display for MeditationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeditationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidRecord {
                message: format!("unknown meditation type '{s}'"),
            })
    }
}

/// Fields of a meditation session that has not been stored yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewMeditationSession {
    /// Meditation type label
    pub kind: String,
    /// Completed minutes as text
    pub duration: String,
    /// Formatted save time
    pub date: String,
}

impl NewMeditationSession {
    /// Bundles the three text fields of a session.
    pub fn new(
        kind: impl Into<String>,
        duration: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            duration: duration.into(),
            date: date.into(),
        }
    }
}

/// Retrieves every meditation session, most recently inserted first.
pub async fn get_all_meditation_sessions(
    db: &DatabaseConnection,
) -> Result<Vec<meditation_session::Model>> {
    MeditationSession::find()
        .order_by_desc(meditation_session::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Inserts a meditation session and returns it with its store-assigned id.
#[instrument(skip(db))]
pub async fn create_meditation_session(
    db: &DatabaseConnection,
    new_session: NewMeditationSession,
) -> Result<meditation_session::Model> {
    let session = meditation_session::ActiveModel {
        kind: Set(new_session.kind),
        duration: Set(new_session.duration),
        date: Set(new_session.date),
        ..Default::default()
    };

    let model = session.insert(db).await?;
    info!(
        "Saved {} min {} session (ID: {})",
        model.duration, model.kind, model.id
    );
    Ok(model)
}

/// Deletes the row matching every field of `record`; returns rows removed (0 or 1).
#[instrument(skip(db))]
pub async fn delete_meditation_session(
    db: &DatabaseConnection,
    record: &meditation_session::Model,
) -> Result<u64> {
    let result = MeditationSession::delete_many()
        .filter(meditation_session::Column::Id.eq(record.id))
        .filter(meditation_session::Column::Kind.eq(record.kind.as_str()))
        .filter(meditation_session::Column::Duration.eq(record.duration.as_str()))
        .filter(meditation_session::Column::Date.eq(record.date.as_str()))
        .exec(db)
        .await?;

    debug!(
        "Deleted {} meditation row(s) for ID {}",
        result.rows_affected, record.id
    );
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_meditation_session_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let session = create_meditation_session(
            &db,
            NewMeditationSession::new("Body Scan", "10", "Today, 08:15 PM"),
        )
        .await?;

        assert_eq!(session.kind, "Body Scan");
        assert_eq!(session.duration, "10");
        assert_eq!(session.date, "Today, 08:15 PM");
        Ok(())
    }

    #[tokio::test]
    async fn test_get_and_delete_sessions() -> Result<()> {
        let db = setup_test_db().await?;
        let older = create_test_meditation(&db, "5").await?;
        let newer = create_test_meditation(&db, "10").await?;

        let sessions = get_all_meditation_sessions(&db).await?;
        assert_eq!(sessions, vec![newer.clone(), older.clone()]);

        assert_eq!(delete_meditation_session(&db, &newer).await?, 1);
        assert_eq!(get_all_meditation_sessions(&db).await?, vec![older]);
        Ok(())
    }

    #[test]
    fn test_meditation_type_labels() {
        let labels: Vec<_> = MeditationType::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(
            labels,
            ["Breathing", "Body Scan", "Loving-Kindness", "Visualization"]
        );
        assert_eq!(
            "loving-kindness".parse::<MeditationType>().unwrap(),
            MeditationType::LovingKindness
        );
        assert!("Yoga".parse::<MeditationType>().is_err());
    }
}
