pub mod branch;
pub mod edit;
pub mod history;
pub mod persist;

use anyhow::{bail, Context, Result};
use verdoc_core::{Config, DocumentStore, VersionId};

/// Live state of one interactive session.
pub struct Session {
    pub store: DocumentStore,
    pub config: Config,
}

impl Session {
    pub fn new(store: DocumentStore, config: Config) -> Self {
        Self { store, config }
    }

    pub fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Create(text) => edit::create(&mut self.store, text),
            Command::Append(text) => edit::append(&mut self.store, &text),
            Command::Remove(count) => edit::remove(&mut self.store, count),
            Command::Commit(message) => edit::commit(&mut self.store, message)?,
            Command::Undo => edit::undo(&mut self.store),
            Command::Log => history::log(&self.store),
            Command::Show(id) => history::show(&self.store, id)?,
            Command::Diff(from, to) => history::diff(&self.store, from, to)?,
            Command::Filter(keyword) => history::filter(&self.store, &keyword),
            Command::Avg => history::avg(&self.store)?,
            Command::Status => history::status(&self.store)?,
            Command::Rollback(id) => branch::rollback(&mut self.store, id)?,
            Command::Branch(name) => branch::branch(&mut self.store, name),
            Command::Branches => branch::list(&self.store),
            Command::Checkout(name) => branch::checkout(&mut self.store, &name)?,
            Command::Rebase(onto) => branch::rebase(&mut self.store, &onto)?,
            Command::Save => persist::save(self)?,
            Command::Load => persist::load(self)?,
            Command::Help => println!("{}", crate::display::HELP),
            Command::Exit => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create(String),
    Append(String),
    Remove(usize),
    Commit(String),
    Undo,
    Log,
    Show(Option<VersionId>),
    Rollback(VersionId),
    Branch(String),
    Branches,
    Checkout(String),
    Rebase(String),
    Diff(VersionId, VersionId),
    Filter(String),
    Avg,
    Status,
    Save,
    Load,
    Help,
    Exit,
}

impl Command {
    /// Parses one input line. Text arguments take the rest of the line.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']).trim_start();
        let (op, rest) = line.split_once(' ').unwrap_or((line, ""));

        let command = match op {
            "create" => Command::Create(rest.to_string()),
            "append" => Command::Append(rest.to_string()),
            "remove" => Command::Remove(number(rest, "remove <n>")?),
            "commit" => Command::Commit(rest.trim().to_string()),
            "undo" => Command::Undo,
            "log" => Command::Log,
            "show" => match rest.trim() {
                "" => Command::Show(None),
                id => Command::Show(Some(number(id, "show [id]")?)),
            },
            "rollback" => Command::Rollback(number(rest, "rollback <id>")?),
            "branch" => Command::Branch(word(rest, "branch <name>")?),
            "branches" => Command::Branches,
            "checkout" => Command::Checkout(word(rest, "checkout <name>")?),
            "rebase" => Command::Rebase(word(rest, "rebase <branch>")?),
            "diff" => {
                let mut ids = rest.split_whitespace();
                match (ids.next(), ids.next()) {
                    (Some(from), Some(to)) => {
                        Command::Diff(number(from, "diff <v1> <v2>")?, number(to, "diff <v1> <v2>")?)
                    }
                    _ => bail!("Usage: diff <v1> <v2>"),
                }
            }
            "filter" => Command::Filter(word(rest, "filter <keyword>")?),
            "avg" => Command::Avg,
            "status" => Command::Status,
            "save" => Command::Save,
            "load" => Command::Load,
            "help" => Command::Help,
            "exit" | "quit" => Command::Exit,
            "" => bail!("Empty command"),
            other => bail!("Unknown command '{}'. Type 'help' for a list.", other),
        };

        Ok(command)
    }
}

fn number<T: std::str::FromStr>(arg: &str, usage: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let arg = arg.trim();
    if arg.is_empty() {
        bail!("Usage: {}", usage);
    }
    arg.parse::<T>()
        .with_context(|| format!("'{}' is not a valid number (usage: {})", arg, usage))
}

fn word(arg: &str, usage: &str) -> Result<String> {
    match arg.split_whitespace().next() {
        Some(word) => Ok(word.to_string()),
        None => bail!("Usage: {}", usage),
    }
}
