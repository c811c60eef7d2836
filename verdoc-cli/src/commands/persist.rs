use anyhow::{Context, Result};
use colored::Colorize;
use verdoc_core::{storage, DocumentStore};

use super::Session;

pub fn save(session: &Session) -> Result<()> {
    let history = &session.config.history;
    storage::open(history)?
        .save(&session.store.snapshot())
        .with_context(|| format!("Failed to save history to {:?}", history.path))?;

    println!(
        "{} History saved to {} ({})",
        "[Save]".green().bold(),
        history.path.display(),
        history.backend.as_str()
    );
    Ok(())
}

/// Replaces the session's store only once the loaded history has been
/// validated and rebuilt.
pub fn load(session: &mut Session) -> Result<()> {
    let history = &session.config.history;
    let snapshot = storage::open(history)?
        .load()
        .with_context(|| format!("Failed to load history from {:?}", history.path))?;
    let store = DocumentStore::from_snapshot(snapshot, session.config.store.clone())?;

    println!(
        "{} Loaded history from {}",
        "[Load]".green().bold(),
        history.path.display()
    );
    session.store = store;
    Ok(())
}
