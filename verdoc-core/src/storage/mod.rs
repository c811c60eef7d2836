//! Persistence adapters. A store is saved as a [`Snapshot`] and rebuilt
//! from one; the adapters never see head or working content.

mod json;
mod sqlite;

pub use json::JsonFile;
pub use sqlite::SqliteStorage;

use crate::config::{Backend, HistoryConfig};
use crate::error::Result;
use crate::models::Snapshot;

pub trait Persistence {
    fn save(&self, snapshot: &Snapshot) -> Result<()>;
    fn load(&self) -> Result<Snapshot>;
}

/// Opens the adapter selected by `config`.
pub fn open(config: &HistoryConfig) -> Result<Box<dyn Persistence>> {
    Ok(match config.backend {
        Backend::Json => Box::new(JsonFile::new(&config.path)),
        Backend::Sqlite => Box::new(SqliteStorage::new(&config.path)?),
    })
}
