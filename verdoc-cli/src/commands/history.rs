use anyhow::Result;
use colored::Colorize;
use verdoc_core::{DocumentStore, Error, VersionId};

use crate::display;

pub fn log(store: &DocumentStore) {
    let mut empty = true;
    for version in store.log() {
        println!("{}", display::version_line(version));
        empty = false;
    }

    if empty {
        println!("{}", "No commits yet".yellow());
    }
}

pub fn show(store: &DocumentStore, id: Option<VersionId>) -> Result<()> {
    let id = id.unwrap_or(store.head());
    let content = store.show(Some(id))?;
    println!("{} Version {}:", "[Show]".cyan().bold(), id);
    println!("{}", content);
    Ok(())
}

pub fn diff(store: &DocumentStore, from: VersionId, to: VersionId) -> Result<()> {
    let patch = store.diff(from, to)?;
    println!("{}", display::render_patch(&patch));
    println!(
        "  {} change(s) between {} and {}",
        patch.change_count().to_string().cyan(),
        from,
        to
    );
    Ok(())
}

pub fn filter(store: &DocumentStore, keyword: &str) {
    let matches = store.filter(keyword);
    if matches.is_empty() {
        println!("{}", format!("No versions mention '{}'", keyword).yellow());
        return;
    }

    for version in matches {
        println!("{}", display::version_line(version));
    }
}

pub fn avg(store: &DocumentStore) -> Result<()> {
    match store.average_length() {
        Ok(avg) => println!(
            "{} Average characters per version: {:.2}",
            "[Avg]".cyan().bold(),
            avg
        ),
        Err(Error::EmptyStore) => {
            println!("{} No versions available.", "[Avg]".cyan().bold())
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

pub fn status(store: &DocumentStore) -> Result<()> {
    let status = store.status()?;

    println!("{}", "Status".bold().cyan());
    println!("  {}: {}", "Branch".bold(), status.branch);
    println!("  {}: {}", "Head".bold(), status.head);
    println!("  {}: {}", "Versions".bold(), status.versions);
    if status.dirty {
        println!("  {}", "Uncommitted changes".yellow());
    } else {
        println!("  {}", "Clean".green());
    }
    if status.can_undo {
        println!("  {}", "Undo available".dimmed());
    }
    Ok(())
}
