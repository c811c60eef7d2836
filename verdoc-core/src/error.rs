use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Version not found: {0}")]
    VersionNotFound(u64),

    #[error("Branch not found: {0}")]
    BranchNotFound(String),

    #[error("Cannot rebase onto '{onto}': no common ancestor")]
    NoCommonAncestor { onto: String },

    #[error("No versions available")]
    EmptyStore,

    #[error("Corrupt history: {0}")]
    CorruptHistory(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

impl Error {
    /// True for the "referenced id or branch does not exist" family.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::VersionNotFound(_) | Error::BranchNotFound(_))
    }
}
