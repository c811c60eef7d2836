use crate::diff::Patch;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type VersionId = u64;

/// Parent of every root version. Never a real version id.
pub const ROOT: VersionId = 0;

/// How a version's content is kept on disk and in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Representation {
    Full { content: String },
    Diff { patch: Patch },
}

impl Representation {
    pub fn is_diff(&self) -> bool {
        matches!(self, Representation::Diff { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub id: VersionId,
    pub timestamp: String,
    pub message: String,
    pub parent_id: VersionId,
    pub fingerprint: String,
    pub representation: Representation,
}

impl Version {
    pub fn new(
        id: VersionId,
        parent_id: VersionId,
        message: impl Into<String>,
        timestamp: impl Into<String>,
        fingerprint: impl Into<String>,
        representation: Representation,
    ) -> Self {
        Self {
            id,
            timestamp: timestamp.into(),
            message: message.into(),
            parent_id,
            fingerprint: fingerprint.into(),
            representation,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id == ROOT
    }
}

/// Everything a persistence adapter stores. Head and working content are
/// derived on load, never saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub versions: BTreeMap<VersionId, Version>,
    #[serde(default)]
    pub branches: BTreeMap<String, VersionId>,
    pub current_branch: String,
}

impl Snapshot {
    pub fn empty(default_branch: &str) -> Self {
        Self {
            versions: BTreeMap::new(),
            branches: BTreeMap::from([(default_branch.to_string(), ROOT)]),
            current_branch: default_branch.to_string(),
        }
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Checks the graph invariants a store relies on.
    pub fn validate(&self) -> Result<()> {
        if !self.branches.contains_key(&self.current_branch) {
            return Err(Error::BranchNotFound(self.current_branch.clone()));
        }

        for (key, version) in &self.versions {
            if *key != version.id || version.id == ROOT {
                return Err(Error::CorruptHistory(format!(
                    "version stored under key {} has id {}",
                    key, version.id
                )));
            }
        }

        for version in self.versions.values() {
            let mut steps = 0usize;
            let mut id = version.parent_id;
            while id != ROOT {
                steps += 1;
                if steps > self.versions.len() {
                    return Err(Error::CorruptHistory(format!(
                        "parent chain of version {} does not terminate",
                        version.id
                    )));
                }
                id = match self.versions.get(&id) {
                    Some(parent) => parent.parent_id,
                    None => {
                        return Err(Error::CorruptHistory(format!(
                            "version {} references missing parent {}",
                            version.id, id
                        )))
                    }
                };
            }
        }

        for (name, id) in &self.branches {
            if *id != ROOT && !self.versions.contains_key(id) {
                return Err(Error::CorruptHistory(format!(
                    "branch '{}' points at missing version {}",
                    name, id
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full(id: VersionId, parent_id: VersionId, content: &str) -> Version {
        Version::new(
            id,
            parent_id,
            "msg",
            "2024-01-01 00:00:00",
            "fp",
            Representation::Full {
                content: content.to_string(),
            },
        )
    }

    #[test]
    fn test_empty_snapshot_is_valid() {
        let snapshot = Snapshot::empty("main");
        assert_eq!(snapshot.branches.get("main"), Some(&ROOT));
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn test_unknown_current_branch_rejected() {
        let mut snapshot = Snapshot::empty("main");
        snapshot.current_branch = "ghost".to_string();
        assert!(matches!(
            snapshot.validate(),
            Err(Error::BranchNotFound(name)) if name == "ghost"
        ));
    }

    #[test]
    fn test_cycle_rejected() {
        let mut snapshot = Snapshot::empty("main");
        snapshot.versions.insert(1, full(1, 2, "a"));
        snapshot.versions.insert(2, full(2, 1, "b"));
        assert!(matches!(snapshot.validate(), Err(Error::CorruptHistory(_))));
    }

    #[test]
    fn test_dangling_parent_and_branch_rejected() {
        let mut snapshot = Snapshot::empty("main");
        snapshot.versions.insert(1, full(1, 7, "a"));
        assert!(matches!(snapshot.validate(), Err(Error::CorruptHistory(_))));

        let mut snapshot = Snapshot::empty("main");
        snapshot.branches.insert("main".to_string(), 3);
        assert!(matches!(snapshot.validate(), Err(Error::CorruptHistory(_))));
    }

    #[test]
    fn test_snapshot_json_layout() {
        let mut snapshot = Snapshot::empty("main");
        snapshot.versions.insert(1, full(1, ROOT, "hello"));
        snapshot.branches.insert("main".to_string(), 1);

        let value: serde_json::Value =
            serde_json::from_slice(&snapshot.to_json_bytes().unwrap()).unwrap();
        assert_eq!(value["currentBranch"], "main");
        assert_eq!(value["branches"]["main"], 1);
        assert_eq!(value["versions"]["1"]["representation"]["kind"], "full");
        assert_eq!(
            value["versions"]["1"]["representation"]["content"],
            "hello"
        );

        let back = Snapshot::from_json_bytes(&snapshot.to_json_bytes().unwrap()).unwrap();
        assert_eq!(back, snapshot);
    }
}
