use super::Persistence;
use crate::diff::Patch;
use crate::error::{Error, Result};
use crate::models::{Representation, Snapshot, Version};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

const SCHEMA_VERSION: i32 = 1;

pub struct SqliteStorage {
    conn: Connection,
}

struct VersionRow {
    id: i64,
    parent_id: i64,
    timestamp: String,
    message: String,
    fingerprint: String,
    kind: String,
    content: Option<String>,
    patch: Option<String>,
}

impl SqliteStorage {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        let storage = Self { conn };
        storage.initialize()?;
        Ok(storage)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self { conn };
        storage.initialize()?;
        Ok(storage)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS versions (
                id INTEGER PRIMARY KEY,
                parent_id INTEGER NOT NULL,
                timestamp TEXT NOT NULL,
                message TEXT NOT NULL,
                fingerprint TEXT NOT NULL,
                kind TEXT NOT NULL,
                content TEXT,
                patch TEXT
            );

            CREATE TABLE IF NOT EXISTS branches (
                name TEXT PRIMARY KEY,
                version_id INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_versions_parent ON versions(parent_id);
            "#,
        )?;

        let version: Option<i32> = self
            .conn
            .query_row("SELECT version FROM schema_version", [], |row| row.get(0))
            .optional()?;

        if version.is_none() {
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )?;
        }

        Ok(())
    }

    fn version_from_row(row: &Row) -> rusqlite::Result<VersionRow> {
        Ok(VersionRow {
            id: row.get(0)?,
            parent_id: row.get(1)?,
            timestamp: row.get(2)?,
            message: row.get(3)?,
            fingerprint: row.get(4)?,
            kind: row.get(5)?,
            content: row.get(6)?,
            patch: row.get(7)?,
        })
    }

    fn version_from_parts(row: VersionRow) -> Result<Version> {
        let representation = match (row.kind.as_str(), row.content, row.patch) {
            ("full", Some(content), _) => Representation::Full { content },
            ("diff", _, Some(patch)) => Representation::Diff {
                patch: serde_json::from_str::<Patch>(&patch)?,
            },
            (kind, _, _) => {
                return Err(Error::CorruptHistory(format!(
                    "version {} has unusable representation '{}'",
                    row.id, kind
                )))
            }
        };

        Ok(Version::new(
            row.id as u64,
            row.parent_id as u64,
            row.message,
            row.timestamp,
            row.fingerprint,
            representation,
        ))
    }
}

impl Persistence for SqliteStorage {
    /// Replaces every stored row inside one transaction.
    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch("DELETE FROM versions; DELETE FROM branches; DELETE FROM meta;")?;

        for version in snapshot.versions.values() {
            let (kind, content, patch) = match &version.representation {
                Representation::Full { content } => ("full", Some(content.as_str()), None),
                Representation::Diff { patch } => ("diff", None, Some(serde_json::to_string(patch)?)),
            };

            tx.execute(
                "INSERT INTO versions (id, parent_id, timestamp, message, fingerprint, kind, content, patch)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    version.id as i64,
                    version.parent_id as i64,
                    version.timestamp,
                    version.message,
                    version.fingerprint,
                    kind,
                    content,
                    patch,
                ],
            )?;
        }

        for (name, id) in &snapshot.branches {
            tx.execute(
                "INSERT INTO branches (name, version_id) VALUES (?1, ?2)",
                params![name, *id as i64],
            )?;
        }

        tx.execute(
            "INSERT INTO meta (key, value) VALUES ('current_branch', ?1)",
            params![snapshot.current_branch],
        )?;

        tx.commit()?;
        debug!("saved {} versions to sqlite", snapshot.versions.len());
        Ok(())
    }

    fn load(&self) -> Result<Snapshot> {
        let current_branch: String = self
            .conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'current_branch'",
                [],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no history has been saved to this database",
                ))
            })?;

        let mut stmt = self.conn.prepare(
            "SELECT id, parent_id, timestamp, message, fingerprint, kind, content, patch
             FROM versions ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], Self::version_from_row)?
            .collect::<rusqlite::Result<Vec<VersionRow>>>()?;

        let mut versions = BTreeMap::new();
        for row in rows {
            let version = Self::version_from_parts(row)?;
            versions.insert(version.id, version);
        }

        let mut stmt = self
            .conn
            .prepare("SELECT name, version_id FROM branches")?;
        let branches = stmt
            .query_map([], |row| {
                let name: String = row.get(0)?;
                let id: i64 = row.get(1)?;
                Ok((name, id as u64))
            })?
            .collect::<rusqlite::Result<BTreeMap<String, u64>>>()?;

        Ok(Snapshot {
            versions,
            branches,
            current_branch,
        })
    }
}
