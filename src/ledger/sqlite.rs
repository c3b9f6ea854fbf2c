//! SQLite-backed append-only award ledger.

use std::path::Path;

use rusqlite::{Connection, params};

use crate::{
    award::AwardRecord,
    types::{AwardReason, Points, TsMs, UserId},
};

use super::{LedgerError, LedgerResult, PointsLedger};

/// SQLite implementation of [`PointsLedger`].
pub struct SqliteLedger {
    conn: Connection,
}

impl SqliteLedger {
    /// Opens or creates a SQLite-backed ledger at `path`.
    ///
    /// Enables WAL mode and sets `synchronous=NORMAL`.
    pub fn open(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_connection(conn)
    }

    /// Opens an in-memory SQLite ledger.
    pub fn open_in_memory() -> LedgerResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn)
    }

    fn init_connection(conn: Connection) -> LedgerResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(Self { conn })
    }

    /// Number of rows in the ledger.
    pub fn len(&self) -> LedgerResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM point_history", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// True when the ledger holds no rows.
    pub fn is_empty(&self) -> LedgerResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl PointsLedger for SqliteLedger {
    fn append(&mut self, record: &AwardRecord) -> LedgerResult<bool> {
        if record.points == 0 {
            return Ok(false);
        }

        self.conn.execute(
            "INSERT INTO point_history(user_id, points, reason, ts_ms) VALUES (?1, ?2, ?3, ?4)",
            params![
                record.user_id as i64,
                i64::from(record.points),
                record.reason.as_str(),
                record.ts_ms as i64,
            ],
        )?;
        Ok(true)
    }

    fn by_user(&self, user_id: UserId) -> LedgerResult<Vec<AwardRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, points, reason, ts_ms FROM point_history \
             WHERE user_id = ?1 ORDER BY ts_ms DESC, id DESC",
        )?;

        let rows = stmt.query_map(params![user_id as i64], |row| {
            let user_id: i64 = row.get(0)?;
            let points: i64 = row.get(1)?;
            let reason: String = row.get(2)?;
            let ts_ms: i64 = row.get(3)?;
            Ok((user_id, points, reason, ts_ms))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (user_id, points, reason, ts_ms) = row?;
            let reason = AwardReason::parse(&reason)
                .ok_or_else(|| LedgerError::Message(format!("unknown award reason: {reason}")))?;
            out.push(AwardRecord {
                user_id: user_id as UserId,
                points: points as Points,
                reason,
                ts_ms: ts_ms as TsMs,
            });
        }
        Ok(out)
    }

    fn totals_by_user(&self) -> LedgerResult<Vec<(UserId, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, SUM(points) FROM point_history GROUP BY user_id",
        )?;

        let rows = stmt.query_map([], |row| {
            let user_id: i64 = row.get(0)?;
            let total: i64 = row.get(1)?;
            Ok((user_id as UserId, total as u64))
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}
