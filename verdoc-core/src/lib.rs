//! # verdoc-core
//!
//! Core library for verdoc - a single text document with an append-only
//! graph of versions, named branches, rollback and rebase.
//!
//! The [`DocumentStore`] owns the working buffer and the version graph.
//! Versions above the configured compression threshold are stored as
//! positional diffs from their parent and rebuilt on demand.

pub mod config;
pub mod diff;
pub mod error;
pub mod models;
pub mod provider;
pub mod storage;
pub mod store;

pub use config::{Backend, Config, HistoryConfig, StoreConfig};
pub use diff::{Patch, Token};
pub use error::{Error, Result};
pub use models::{Representation, Snapshot, Version, VersionId, ROOT};
pub use provider::{Clock, Fingerprinter, LocalClock, Sha256Fingerprinter};
pub use storage::{JsonFile, Persistence, SqliteStorage};
pub use store::{DocumentStore, Log, RebaseOutcome, Status};
