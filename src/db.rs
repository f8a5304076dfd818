use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::pipeline::RawMessage;
use crate::sheet::{Cell, Row};

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    }
    let conn = Connection::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS messages (
            seq         INTEGER PRIMARY KEY,
            id          TEXT UNIQUE NOT NULL,
            html        TEXT NOT NULL,
            read        BOOLEAN NOT NULL DEFAULT 0,
            read_at     TEXT,
            received_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_messages_read ON messages(read);

        -- Append-only sheets: one row per signal, link cell kept apart
        CREATE TABLE IF NOT EXISTS sheet_rows (
            id          INTEGER PRIMARY KEY,
            sheet       TEXT NOT NULL,
            row_index   INTEGER NOT NULL,
            cells       TEXT NOT NULL,
            link_text   TEXT NOT NULL,
            link_url    TEXT NOT NULL,
            appended_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(sheet, row_index)
        );
        CREATE INDEX IF NOT EXISTS idx_sheet_rows_sheet ON sheet_rows(sheet);
        ",
    )?;
    Ok(())
}

// ── Mailbox ──

pub fn insert_messages(conn: &Connection, messages: &[RawMessage]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare("INSERT OR IGNORE INTO messages (id, html) VALUES (?1, ?2)")?;
        for m in messages {
            count += stmt.execute(rusqlite::params![m.id, m.html])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

/// Unread messages in arrival order.
pub fn fetch_unread(conn: &Connection, limit: Option<usize>) -> Result<Vec<RawMessage>> {
    let sql = format!(
        "SELECT id, html FROM messages WHERE read = 0 ORDER BY seq{}",
        match limit {
            Some(n) => format!(" LIMIT {}", n),
            None => String::new(),
        }
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(RawMessage {
                id: row.get(0)?,
                html: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn mark_read(conn: &Connection, ids: &[String]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "UPDATE messages SET read = 1, read_at = datetime('now') WHERE id = ?1 AND read = 0",
        )?;
        for id in ids {
            count += stmt.execute(rusqlite::params![id])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

// ── Sheets ──

/// Append `rows` after the last row already in `sheet`.
pub fn append_rows(conn: &Connection, sheet: &str, rows: &[Row]) -> Result<usize> {
    if rows.is_empty() {
        return Ok(0);
    }
    let tx = conn.unchecked_transaction()?;
    {
        let last: i64 = tx.query_row(
            "SELECT COALESCE(MAX(row_index), 0) FROM sheet_rows WHERE sheet = ?1",
            [sheet],
            |r| r.get(0),
        )?;
        let mut stmt = tx.prepare(
            "INSERT INTO sheet_rows (sheet, row_index, cells, link_text, link_url)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for (i, row) in rows.iter().enumerate() {
            let cells = serde_json::to_string(row.values())?;
            let (text, url) = row.link().unwrap_or_default();
            stmt.execute(rusqlite::params![sheet, last + 1 + i as i64, cells, text, url])?;
        }
    }
    tx.commit()?;
    Ok(rows.len())
}

pub struct SheetEntry {
    pub row_index: i64,
    pub values: Vec<Cell>,
    pub link_text: String,
    pub link_url: String,
}

/// Latest rows of `sheet`, newest first.
pub fn fetch_sheet(conn: &Connection, sheet: &str, limit: usize) -> Result<Vec<SheetEntry>> {
    let mut stmt = conn.prepare(
        "SELECT row_index, cells, link_text, link_url
         FROM sheet_rows
         WHERE sheet = ?1
         ORDER BY row_index DESC
         LIMIT ?2",
    )?;
    let raw = stmt
        .query_map(rusqlite::params![sheet, limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    raw.into_iter()
        .map(|(row_index, cells, link_text, link_url)| {
            let values = serde_json::from_str(&cells)
                .with_context(|| format!("Corrupt cells in {} row {}", sheet, row_index))?;
            Ok(SheetEntry {
                row_index,
                values,
                link_text,
                link_url,
            })
        })
        .collect()
}

// ── Stats ──

pub struct Stats {
    pub messages: usize,
    pub read: usize,
    pub unread: usize,
    pub sheets: Vec<(String, usize)>,
}

pub fn get_stats(conn: &Connection, sheets: &[&str]) -> Result<Stats> {
    let messages: usize = conn.query_row("SELECT COUNT(*) FROM messages", [], |r| r.get(0))?;
    let read: usize =
        conn.query_row("SELECT COUNT(*) FROM messages WHERE read = 1", [], |r| r.get(0))?;
    let mut counts = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        let n: usize = conn.query_row(
            "SELECT COUNT(*) FROM sheet_rows WHERE sheet = ?1",
            [sheet],
            |r| r.get(0),
        )?;
        counts.push((sheet.to_string(), n));
    }
    Ok(Stats {
        messages,
        read,
        unread: messages - read,
        sheets: counts,
    })
}
