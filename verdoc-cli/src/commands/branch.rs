use anyhow::Result;
use colored::Colorize;
use verdoc_core::{DocumentStore, VersionId};

pub fn rollback(store: &mut DocumentStore, id: VersionId) -> Result<()> {
    store.rollback(id)?;
    println!("{} Switched to version {}", "[Rollback]".green().bold(), id);
    Ok(())
}

pub fn branch(store: &mut DocumentStore, name: String) {
    let head = store.head();
    println!(
        "{} Created branch '{}' at version {}",
        "[Branch]".green().bold(),
        name,
        head
    );
    store.branch(name);
}

pub fn list(store: &DocumentStore) {
    for (name, id) in store.branches() {
        let marker = if name == store.current_branch() {
            "*".green().bold()
        } else {
            " ".normal()
        };
        println!("{} {} {}", marker, name, format!("@{}", id).dimmed());
    }
}

pub fn checkout(store: &mut DocumentStore, name: &str) -> Result<()> {
    store.checkout(name)?;
    println!("{} Switched to branch '{}'", "[Checkout]".green().bold(), name);
    Ok(())
}

pub fn rebase(store: &mut DocumentStore, onto: &str) -> Result<()> {
    let outcome = store.rebase(onto)?;

    if outcome.is_fast_forward() {
        println!(
            "{} Fast-forwarded to '{}' at version {}",
            "[Rebase]".green().bold(),
            onto,
            outcome.head
        );
        return Ok(());
    }

    println!(
        "{} Rebased onto {} (merge base {})",
        "[Rebase]".green().bold(),
        onto,
        outcome.merge_base
    );
    for (original, replayed) in &outcome.replayed {
        println!("  {} -> {}", original, replayed.to_string().cyan());
    }
    Ok(())
}
