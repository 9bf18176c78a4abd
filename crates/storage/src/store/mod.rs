#![forbid(unsafe_code)]

mod error;
mod requests;
mod schema;

pub use error::StoreError;
pub use requests::*;
pub use schema::DB_VERSION;

use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::path::{Path, PathBuf};
use std::time::Duration;
use ttaat_core::{Guess, Round, Score, StatementIndex, Twist, TwistIndexStats};

const VERSION_TABLE: &str = "ttaat_db_version";

/// Result of bringing a store up to [`DB_VERSION`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpgradeOutcome {
    pub was_upgraded: bool,
    pub old_version: Option<i64>,
    pub new_version: i64,
}

/// Handle to the on-disk game store. Callers pass this value into every
/// operation; tests substitute an in-memory store via
/// [`SqliteStore::open_in_memory`].
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

/// Resolves the store file location, creating the containing directory if
/// needed. `TTAAT_DATA_DIR` overrides the base directory; otherwise the
/// standard per-user data path is used (`XDG_DATA_HOME`, falling back to
/// `~/.local/share`), with a `ttaat/` subdirectory.
pub fn default_db_path() -> Result<PathBuf, StoreError> {
    let dir = std::env::var_os("TTAAT_DATA_DIR")
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("XDG_DATA_HOME").map(|base| PathBuf::from(base).join("ttaat"))
        })
        .or_else(|| {
            std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".local/share/ttaat"))
        })
        .ok_or(StoreError::InvalidInput(
            "cannot resolve a data directory (set TTAAT_DATA_DIR or HOME)",
        ))?;

    std::fs::create_dir_all(&dir)?;
    Ok(dir.join("ttaat.db"))
}

impl SqliteStore {
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(default_db_path()?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    /// Installed schema version, or `None` when the store has never been
    /// initialized (no version table yet).
    pub fn installed_version(&self) -> Result<Option<i64>, StoreError> {
        let has_version_table = self
            .conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                [VERSION_TABLE],
                |row| row.get::<_, String>(0),
            )
            .optional()?
            .is_some();

        if !has_version_table {
            return Ok(None);
        }

        let version = self
            .conn
            .query_row("SELECT version FROM ttaat_db_version", [], |row| {
                row.get::<_, i64>(0)
            })
            .optional()?;

        match version {
            Some(v) => Ok(Some(v)),
            None => Err(StoreError::InvalidInput(
                "version table exists but holds no row",
            )),
        }
    }

    /// Brings the store to [`DB_VERSION`]: bootstraps an empty store,
    /// applies pending migration steps in order, or reports a no-op. A store
    /// newer than this build surfaces
    /// [`StoreError::SchemaVersionUnsupported`], never "up to date".
    pub fn upgrade(&mut self) -> Result<UpgradeOutcome, StoreError> {
        let Some(installed) = self.installed_version()? else {
            let tx = self.conn.transaction()?;
            schema::create_bootstrap_schema(&tx)?;
            tx.commit()?;
            return Ok(UpgradeOutcome {
                was_upgraded: true,
                old_version: None,
                new_version: DB_VERSION,
            });
        };

        if installed > DB_VERSION {
            return Err(StoreError::SchemaVersionUnsupported {
                installed,
                supported: DB_VERSION,
            });
        }

        if installed == DB_VERSION {
            return Ok(UpgradeOutcome {
                was_upgraded: false,
                old_version: Some(installed),
                new_version: installed,
            });
        }

        for step in schema::MIGRATIONS {
            if step.to_version <= installed {
                continue;
            }
            // Each step commits (or rolls back) on its own, version row
            // included, so a failure never leaves the version advanced past
            // the last fully applied step.
            let tx = self.conn.transaction()?;
            (step.apply)(&tx).map_err(|source| StoreError::MigrationFailed {
                version: step.to_version,
                source,
            })?;
            tx.execute(
                "UPDATE ttaat_db_version SET version=?1",
                [step.to_version],
            )
            .map_err(|source| StoreError::MigrationFailed {
                version: step.to_version,
                source,
            })?;
            tx.commit()?;
        }

        Ok(UpgradeOutcome {
            was_upgraded: true,
            old_version: Some(installed),
            new_version: DB_VERSION,
        })
    }

    pub fn create_round(&mut self, request: CreateRoundRequest) -> Result<i64, StoreError> {
        self.ensure_initialized()?;
        require_text(&request.category, "category must not be empty")?;
        require_text(&request.question, "question must not be empty")?;
        require_text(&request.trivia_1, "trivia_1 must not be empty")?;
        require_text(&request.trivia_2, "trivia_2 must not be empty")?;
        require_text(&request.trivia_3, "trivia_3 must not be empty")?;

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO rounds(category, question, trivia_1, trivia_2, trivia_3) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                request.category,
                request.question,
                request.trivia_1,
                request.trivia_2,
                request.trivia_3,
            ],
        )?;
        let round_id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(round_id)
    }

    pub fn submit_guess(
        &mut self,
        round_id: i64,
        guess_index: StatementIndex,
    ) -> Result<(), StoreError> {
        self.ensure_initialized()?;

        let tx = self.conn.transaction()?;
        ensure_round_exists_tx(&tx, round_id)?;
        tx.execute(
            "INSERT INTO guesses(round_id, guess_index) VALUES (?1, ?2)",
            params![round_id, guess_index.as_i64()],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Records the reveal for a round. Nothing prevents a second reveal for
    /// the same round; re-reveal stays allowed, matching the game's current
    /// behavior.
    pub fn reveal_twist(&mut self, request: RevealTwistRequest) -> Result<(), StoreError> {
        self.ensure_initialized()?;
        require_text(&request.explanation_1, "explanation_1 must not be empty")?;
        require_text(&request.explanation_2, "explanation_2 must not be empty")?;
        require_text(&request.explanation_3, "explanation_3 must not be empty")?;

        let tx = self.conn.transaction()?;
        ensure_round_exists_tx(&tx, request.round_id)?;
        tx.execute(
            "INSERT INTO twists(round_id, twist_index, explanation_1, explanation_2, explanation_3) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                request.round_id,
                request.twist_index.as_i64(),
                request.explanation_1,
                request.explanation_2,
                request.explanation_3,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn round(&self, round_id: i64) -> Result<Option<Round>, StoreError> {
        self.ensure_initialized()?;
        let row = self
            .conn
            .query_row(
                "SELECT id, category, question, trivia_1, trivia_2, trivia_3, created_at \
                 FROM rounds WHERE id=?1",
                [round_id],
                round_from_row,
            )
            .optional()?;
        Ok(row)
    }

    pub fn last_round(&self) -> Result<Option<Round>, StoreError> {
        self.ensure_initialized()?;
        let row = self
            .conn
            .query_row(
                "SELECT id, category, question, trivia_1, trivia_2, trivia_3, created_at \
                 FROM rounds ORDER BY id DESC LIMIT 1",
                [],
                round_from_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Guesses recorded against a round, oldest first. The schema does not
    /// cap this at one per round.
    pub fn guesses_for_round(&self, round_id: i64) -> Result<Vec<Guess>, StoreError> {
        self.ensure_initialized()?;
        let mut stmt = self.conn.prepare(
            "SELECT id, round_id, guess_index, submitted_at FROM guesses \
             WHERE round_id=?1 ORDER BY id ASC",
        )?;
        let mut rows = stmt.query([round_id])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let guess_index = StatementIndex::try_new(row.get::<_, i64>(2)?)
                .map_err(|_| StoreError::InvalidInput("guess row holds an out-of-range index"))?;
            out.push(Guess {
                id: row.get(0)?,
                round_id: row.get(1)?,
                guess_index,
                submitted_at: row.get(3)?,
            });
        }
        Ok(out)
    }

    /// Reveals recorded against a round, oldest first. Usually zero or one,
    /// but re-reveals are not constrained away.
    pub fn twists_for_round(&self, round_id: i64) -> Result<Vec<Twist>, StoreError> {
        self.ensure_initialized()?;
        let mut stmt = self.conn.prepare(
            "SELECT id, round_id, twist_index, explanation_1, explanation_2, explanation_3, revealed_at \
             FROM twists WHERE round_id=?1 ORDER BY id ASC",
        )?;
        let mut rows = stmt.query([round_id])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let twist_index = StatementIndex::try_new(row.get::<_, i64>(2)?)
                .map_err(|_| StoreError::InvalidInput("twist row holds an out-of-range index"))?;
            out.push(Twist {
                id: row.get(0)?,
                round_id: row.get(1)?,
                twist_index,
                explanation_1: row.get(3)?,
                explanation_2: row.get(4)?,
                explanation_3: row.get(5)?,
                revealed_at: row.get(6)?,
            });
        }
        Ok(out)
    }

    /// Player vs. game-master score over rounds that have both a guess and a
    /// revealed twist (inner join on the round).
    pub fn score(&self) -> Result<Score, StoreError> {
        self.ensure_initialized()?;
        let player = self.conn.query_row(
            "SELECT COUNT(*) FROM guesses \
             JOIN twists ON guesses.round_id = twists.round_id \
             WHERE guesses.guess_index = twists.twist_index",
            [],
            |row| row.get::<_, i64>(0),
        )?;
        let game_master = self.conn.query_row(
            "SELECT COUNT(*) FROM guesses \
             JOIN twists ON guesses.round_id = twists.round_id \
             WHERE guesses.guess_index != twists.twist_index",
            [],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(Score {
            player: player as u64,
            game_master: game_master as u64,
        })
    }

    /// Distribution of twist slots across all reveals. Slots that never held
    /// the twist are present with a zero count.
    pub fn twist_index_stats(&self) -> Result<TwistIndexStats, StoreError> {
        self.ensure_initialized()?;
        let mut counts = [0u64; 3];
        let mut stmt = self
            .conn
            .prepare("SELECT twist_index, COUNT(*) FROM twists GROUP BY twist_index")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let index = StatementIndex::try_new(row.get::<_, i64>(0)?)
                .map_err(|_| StoreError::InvalidInput("twist row holds an out-of-range index"))?;
            counts[index.as_usize()] = row.get::<_, i64>(1)? as u64;
        }
        Ok(TwistIndexStats::from_counts(counts))
    }

    pub fn total_rounds(&self) -> Result<u64, StoreError> {
        self.ensure_initialized()?;
        let total = self
            .conn
            .query_row("SELECT COUNT(*) FROM rounds", [], |row| {
                row.get::<_, i64>(0)
            })?;
        Ok(total as u64)
    }

    fn ensure_initialized(&self) -> Result<(), StoreError> {
        match self.installed_version()? {
            Some(_) => Ok(()),
            None => Err(StoreError::NotInitialized),
        }
    }
}

fn configure_connection(conn: &Connection) -> Result<(), StoreError> {
    conn.busy_timeout(Duration::from_secs(5))?;
    // journal_mode returns the resulting mode as a row ("wal" on disk,
    // "memory" for in-memory stores), so it cannot go through execute_batch.
    let _mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
    conn.execute_batch("PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;")?;
    Ok(())
}

fn require_text(value: &str, message: &'static str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::InvalidInput(message));
    }
    Ok(())
}

fn ensure_round_exists_tx(tx: &Transaction<'_>, round_id: i64) -> Result<(), StoreError> {
    let exists = tx
        .query_row("SELECT 1 FROM rounds WHERE id=?1", [round_id], |row| {
            row.get::<_, i64>(0)
        })
        .optional()?
        .is_some();
    if !exists {
        return Err(StoreError::UnknownRound { round_id });
    }
    Ok(())
}

fn round_from_row(row: &rusqlite::Row<'_>) -> Result<Round, rusqlite::Error> {
    Ok(Round {
        id: row.get(0)?,
        category: row.get(1)?,
        question: row.get(2)?,
        trivia_1: row.get(3)?,
        trivia_2: row.get(4)?,
        trivia_3: row.get(5)?,
        created_at: row.get(6)?,
    })
}
