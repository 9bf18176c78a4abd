#![forbid(unsafe_code)]

use rusqlite::Transaction;

/// Schema generation this build reads and writes.
pub const DB_VERSION: i64 = 0;

/// One self-contained upgrade step. Steps are applied cumulatively in
/// strictly increasing `to_version` order, each inside its own transaction
/// that also advances the version row.
pub(crate) struct Migration {
    pub(crate) to_version: i64,
    pub(crate) apply: fn(&Transaction<'_>) -> Result<(), rusqlite::Error>,
}

// No historical steps yet: version 0 stores are created directly by
// `create_bootstrap_schema`. Future generations append here.
pub(crate) const MIGRATIONS: &[Migration] = &[];

/// Creates the full current-generation schema on an empty store, version row
/// included. Must run inside a transaction so a fresh store either gets the
/// whole schema or none of it.
pub(crate) fn create_bootstrap_schema(tx: &Transaction<'_>) -> Result<(), rusqlite::Error> {
    tx.execute_batch(
        r#"
        CREATE TABLE ttaat_db_version (
          version INTEGER NOT NULL
        );

        CREATE TABLE rounds (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          category TEXT NOT NULL,
          question TEXT NOT NULL,
          trivia_1 TEXT NOT NULL,
          trivia_2 TEXT NOT NULL,
          trivia_3 TEXT NOT NULL,
          created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE guesses (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          round_id INTEGER NOT NULL,
          guess_index INTEGER NOT NULL,
          submitted_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
          FOREIGN KEY (round_id) REFERENCES rounds(id)
        );

        CREATE TABLE twists (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          round_id INTEGER NOT NULL,
          twist_index INTEGER NOT NULL,
          explanation_1 TEXT NOT NULL,
          explanation_2 TEXT NOT NULL,
          explanation_3 TEXT NOT NULL,
          revealed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
          FOREIGN KEY (round_id) REFERENCES rounds(id)
        );
        "#,
    )?;

    tx.execute(
        "INSERT INTO ttaat_db_version(version) VALUES (?1)",
        [DB_VERSION],
    )?;

    Ok(())
}
