use super::Persistence;
use crate::error::{Error, Result};
use crate::models::Snapshot;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Pretty-printed JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Persistence for JsonFile {
    /// Writes to a temp file next to the target, then renames it over the
    /// target.
    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&snapshot.to_json_bytes()?)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        debug!("saved {} versions to {:?}", snapshot.versions.len(), self.path);
        Ok(())
    }

    fn load(&self) -> Result<Snapshot> {
        let bytes = std::fs::read(&self.path)?;
        let snapshot = Snapshot::from_json_bytes(&bytes)?;
        debug!("read {} versions from {:?}", snapshot.versions.len(), self.path);
        Ok(snapshot)
    }
}
