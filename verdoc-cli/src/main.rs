use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{warn, Level};
use verdoc_core::{Backend, Config, DocumentStore};

mod commands;
mod display;

use commands::{Command, Session};

#[derive(Parser)]
#[command(name = "verdoc")]
#[command(version, about = "Versioned text document with branches and rebase", long_about = None)]
struct Cli {
    /// Config file (TOML)
    #[arg(short, long, default_value = "verdoc.toml")]
    config: PathBuf,

    /// History file used by save and load
    #[arg(long)]
    history: Option<PathBuf>,

    /// History backend: json or sqlite
    #[arg(short, long, value_parser = parse_backend)]
    backend: Option<Backend>,

    /// Log store events to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn parse_backend(s: &str) -> Result<Backend, String> {
    Backend::parse(s).ok_or_else(|| format!("unknown backend '{}' (expected json or sqlite)", s))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let explicit_config = cli.config != PathBuf::from("verdoc.toml");
    if explicit_config && !cli.config.exists() {
        warn!("config {:?} not found, using defaults", cli.config);
    }
    let mut config = Config::load_or_default(&cli.config)
        .with_context(|| format!("Failed to read config {:?}", cli.config))?;
    if let Some(history) = cli.history {
        config.history.path = history;
    }
    if let Some(backend) = cli.backend {
        config.history.backend = backend;
    }

    let store = DocumentStore::new(config.store.clone());
    let mut session = Session::new(store, config);

    println!("{}", display::BANNER.bold().cyan());

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read command")?;
        if line.trim().is_empty() {
            continue;
        }

        match Command::parse(&line) {
            Ok(Command::Exit) => break,
            Ok(command) => {
                if let Err(e) = session.execute(command) {
                    println!("{} {}", "[Error]".red().bold(), e);
                }
            }
            Err(e) => println!("{} {}", "[Error]".red().bold(), e),
        }
    }

    Ok(())
}
