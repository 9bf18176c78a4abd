#![forbid(unsafe_code)]

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
    InvalidInput(&'static str),
    NotInitialized,
    SchemaVersionUnsupported {
        installed: i64,
        supported: i64,
    },
    MigrationFailed {
        version: i64,
        source: rusqlite::Error,
    },
    UnknownRound {
        round_id: i64,
    },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::NotInitialized => {
                write!(f, "database is not initialized; run the upgrade first")
            }
            Self::SchemaVersionUnsupported {
                installed,
                supported,
            } => write!(
                f,
                "database schema version {installed} is newer than this build supports (max {supported})"
            ),
            Self::MigrationFailed { version, source } => {
                write!(f, "migration to version {version} failed: {source}")
            }
            Self::UnknownRound { round_id } => write!(f, "unknown round (round_id={round_id})"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}
