//! Database module
//!
//! Handles SQLite connection and migrations.

pub mod connection;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};

/// Temp-file database with migrations applied, for tests
#[cfg(test)]
pub(crate) mod test_support {
    use tempfile::TempDir;

    use super::{migrations, Database};

    /// Keep the `TempDir` alive for as long as the database is used
    pub fn temp_database() -> (TempDir, Database) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db = Database::new(dir.path().join("test.db")).expect("open database");
        db.with_conn(|conn| migrations::run_migrations(conn))
            .expect("run migrations");
        (dir, db)
    }
}
