//! Database configuration module for the fitness tracker.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the store always matches the Rust structs.
//!
//! Schema upgrades are destructive: when the stored `PRAGMA user_version` does not
//! match [`SCHEMA_VERSION`], every table is dropped and recreated empty.

use crate::entities::{Meal, MeditationSession, Preference, User, Workout};
use crate::errors::Result;
use sea_orm::sea_query::{Table, TableCreateStatement, TableDropStatement};
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityName, EntityTrait, Schema, Statement,
};
use std::path::Path;
use tracing::{debug, info, warn};

/// Current layout of the record store. Bump on any entity change.
pub const SCHEMA_VERSION: i32 = 2;

/// Default location of the store file, relative to the working directory.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/fitness.sqlite?mode=rwc";

/// Reads the database URL override from the environment, if any.
///
/// `FITNESS_DATABASE_URL` wins over the generic `DATABASE_URL`.
#[must_use]
pub fn env_database_url() -> Option<String> {
    std::env::var("FITNESS_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
}

/// Establishes a connection to the `SQLite` database at `database_url`.
///
/// For file-backed URLs the parent directory is created first so the store can be
/// created on first run.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(parent) = database_file(database_url).and_then(Path::parent) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    debug!("Connecting to {}", database_url);
    Database::connect(database_url).await.map_err(Into::into)
}

/// Opens the store and brings its schema to [`SCHEMA_VERSION`].
///
/// This is the single entry point used at start-up; the returned connection is the
/// one store handle for the whole process.
pub async fn open_store(database_url: &str) -> Result<DatabaseConnection> {
    let db = create_connection(database_url).await?;
    prepare_store(&db).await?;
    Ok(db)
}

/// Creates missing tables, or wipes and recreates all of them on a version mismatch.
pub async fn prepare_store(db: &DatabaseConnection) -> Result<()> {
    let stored = stored_schema_version(db).await?;

    if stored != SCHEMA_VERSION && has_any_table(db).await? {
        warn!(
            "Store schema version {} does not match {}; dropping all data",
            stored, SCHEMA_VERSION
        );
        drop_tables(db).await?;
    }

    create_tables(db).await?;
    db.execute_unprepared(&format!("PRAGMA user_version = {SCHEMA_VERSION}"))
        .await?;
    info!("Record store ready (schema version {})", SCHEMA_VERSION);
    Ok(())
}

/// Creates all record tables from the entity definitions, skipping existing ones.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let statements = [
        create_statement(&schema, Workout),
        create_statement(&schema, Meal),
        create_statement(&schema, MeditationSession),
        create_statement(&schema, User),
        create_statement(&schema, Preference),
    ];

    for statement in &statements {
        db.execute(builder.build(statement)).await?;
    }

    Ok(())
}

/// Drops every table owned by the store.
pub async fn drop_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();

    let statements = [
        drop_statement(Workout),
        drop_statement(Meal),
        drop_statement(MeditationSession),
        drop_statement(User),
        drop_statement(Preference),
    ];

    for statement in &statements {
        db.execute(builder.build(statement)).await?;
    }

    Ok(())
}

/// Reads `PRAGMA user_version`; a fresh database reports 0.
pub async fn stored_schema_version(db: &DatabaseConnection) -> Result<i32> {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(backend, "PRAGMA user_version"))
        .await?;

    match row {
        Some(row) => Ok(row.try_get::<i32>("", "user_version")?),
        None => Ok(0),
    }
}

async fn has_any_table(db: &DatabaseConnection) -> Result<bool> {
    let backend = db.get_database_backend();
    let names = [
        Workout.table_name(),
        Meal.table_name(),
        MeditationSession.table_name(),
        User.table_name(),
        Preference.table_name(),
    ]
    .iter()
    .map(|name| format!("'{name}'"))
    .collect::<Vec<_>>()
    .join(", ");

    let row = db
        .query_one(Statement::from_string(
            backend,
            format!(
                "SELECT COUNT(*) AS table_count FROM sqlite_master \
                 WHERE type = 'table' AND name IN ({names})"
            ),
        ))
        .await?;

    let count = match row {
        Some(row) => row.try_get::<i64>("", "table_count")?,
        None => 0,
    };
    Ok(count > 0)
}

fn create_statement<E: EntityTrait>(schema: &Schema, entity: E) -> TableCreateStatement {
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    statement
}

fn drop_statement<E: EntityTrait>(entity: E) -> TableDropStatement {
    Table::drop().table(entity).if_exists().to_owned()
}

/// Extracts the file path from a `sqlite://` URL, ignoring in-memory databases.
fn database_file(database_url: &str) -> Option<&Path> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();

    if path.is_empty() || path.starts_with(":memory:") {
        None
    } else {
        Some(Path::new(path))
    }
}
