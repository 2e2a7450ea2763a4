//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The engine reaches storage through `LedgerRepository` and never
//! executes SQL directly.

use crate::{error::EngineResult, ledger::SignalLedger};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::Mutex;

/// Where ledger snapshots live between process runs.
pub trait LedgerRepository: Send {
    fn load_ledger(&self, account_id: &str) -> EngineResult<Option<SignalLedger>>;
    fn save_ledger(&self, account_id: &str, ledger: &SignalLedger) -> EngineResult<()>;
}

pub struct ProgressStore {
    conn: Connection,
}

impl ProgressStore {
    /// Open (or create) the database at `path`. URI paths are accepted, so
    /// `file:name?mode=memory&cache=shared` gives a shared in-memory db.
    pub fn open(path: &str) -> EngineResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> EngineResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> EngineResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_ledger.sql"))?;
        Ok(())
    }

    // ── Ledger snapshots ───────────────────────────────────────

    pub fn save_ledger(&self, account_id: &str, ledger: &SignalLedger) -> EngineResult<()> {
        let json = serde_json::to_string(ledger)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO ledger_snapshot
                (account_id, total_signals, last_signal_date, state_json)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                account_id,
                ledger.total_signals as i64,
                ledger.last_signal_date.map(|d| d.to_string()),
                json,
            ],
        )?;
        Ok(())
    }

    pub fn load_ledger(&self, account_id: &str) -> EngineResult<Option<SignalLedger>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT state_json FROM ledger_snapshot WHERE account_id = ?1",
                params![account_id],
                |row| row.get(0),
            )
            .optional()?;
        match json {
            Some(j) => Ok(Some(serde_json::from_str(&j)?)),
            None => Ok(None),
        }
    }

    /// Remove an account's ledger. Returns true if a row was deleted.
    pub fn delete_ledger(&self, account_id: &str) -> EngineResult<bool> {
        let n = self.conn.execute(
            "DELETE FROM ledger_snapshot WHERE account_id = ?1",
            params![account_id],
        )?;
        Ok(n > 0)
    }

    // ── Test / summary helpers ────────────────────────────────────────

    /// Number of persisted ledgers.
    pub fn ledger_count(&self) -> EngineResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM ledger_snapshot",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Total signals as stored for `account_id`, without decoding the snapshot.
    pub fn stored_total_signals(&self, account_id: &str) -> EngineResult<Option<u64>> {
        let total = self
            .conn
            .query_row(
                "SELECT total_signals FROM ledger_snapshot WHERE account_id = ?1",
                params![account_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(total.map(|t| t as u64))
    }
}

impl LedgerRepository for ProgressStore {
    fn load_ledger(&self, account_id: &str) -> EngineResult<Option<SignalLedger>> {
        ProgressStore::load_ledger(self, account_id)
    }

    fn save_ledger(&self, account_id: &str, ledger: &SignalLedger) -> EngineResult<()> {
        ProgressStore::save_ledger(self, account_id, ledger)
    }
}

/// Process-local repository. Snapshots still pass through JSON so the
/// round-trip behaves like the SQLite store.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    snapshots: Mutex<HashMap<String, String>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerRepository for MemoryRepository {
    fn load_ledger(&self, account_id: &str) -> EngineResult<Option<SignalLedger>> {
        let snapshots = self
            .snapshots
            .lock()
            .map_err(|_| anyhow::anyhow!("memory repository lock poisoned"))?;
        match snapshots.get(account_id) {
            Some(j) => Ok(Some(serde_json::from_str(j)?)),
            None => Ok(None),
        }
    }

    fn save_ledger(&self, account_id: &str, ledger: &SignalLedger) -> EngineResult<()> {
        let json = serde_json::to_string(ledger)?;
        self.snapshots
            .lock()
            .map_err(|_| anyhow::anyhow!("memory repository lock poisoned"))?
            .insert(account_id.to_string(), json);
        Ok(())
    }
}
