use anyhow::Result;
use colored::Colorize;
use verdoc_core::DocumentStore;

pub fn create(store: &mut DocumentStore, text: String) {
    store.create(text);
    println!("{}", "[Created] New document initialized.".green());
}

pub fn append(store: &mut DocumentStore, text: &str) {
    store.append(text);
}

pub fn remove(store: &mut DocumentStore, count: usize) {
    if !store.remove_last(count) {
        println!(
            "{}",
            format!(
                "[Remove] Buffer has fewer than {} characters, nothing removed.",
                count
            )
            .yellow()
        );
    }
}

pub fn undo(store: &mut DocumentStore) {
    if store.undo() {
        println!("{}", "[Undo] Reverted to last uncommitted state.".green());
    } else {
        println!("{}", "[Undo] Nothing to undo.".yellow());
    }
}

pub fn commit(store: &mut DocumentStore, message: String) -> Result<()> {
    let id = store.commit(message)?;
    let version = store.version(id)?;

    println!("{} Version {} saved.", "[Commit]".green().bold(), id);
    if version.representation.is_diff() {
        println!("  {}: diff from {}", "Stored as".bold(), version.parent_id);
    }
    Ok(())
}
