/// Database connection, table creation and destructive schema migration
pub mod database;

/// Application settings loaded from `fitness.toml`
pub mod settings;
