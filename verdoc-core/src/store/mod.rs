//! The version store: working buffer, undo snapshot, version graph and
//! branch pointers.

mod rebase;

pub use rebase::RebaseOutcome;

use crate::config::StoreConfig;
use crate::diff::{self, Patch};
use crate::error::{Error, Result};
use crate::models::{Representation, Snapshot, Version, VersionId, ROOT};
use crate::provider::{Clock, Fingerprinter, LocalClock, Sha256Fingerprinter};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

pub struct DocumentStore {
    versions: BTreeMap<VersionId, Version>,
    branches: BTreeMap<String, VersionId>,
    current_branch: String,
    head_id: VersionId,
    working: String,
    last_uncommitted: Option<String>,
    next_id: VersionId,
    config: StoreConfig,
    fingerprinter: Box<dyn Fingerprinter>,
    clock: Box<dyn Clock>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub branch: String,
    pub head: VersionId,
    pub dirty: bool,
    pub can_undo: bool,
    pub versions: usize,
}

impl DocumentStore {
    pub fn new(config: StoreConfig) -> Self {
        let snapshot = Snapshot::empty(&config.default_branch);
        Self {
            versions: snapshot.versions,
            branches: snapshot.branches,
            current_branch: snapshot.current_branch,
            head_id: ROOT,
            working: String::new(),
            last_uncommitted: None,
            next_id: 1,
            config,
            fingerprinter: Box::new(Sha256Fingerprinter),
            clock: Box::new(LocalClock),
        }
    }

    /// Rebuilds a store from persisted state. Head and working content are
    /// derived from the current branch.
    pub fn from_snapshot(snapshot: Snapshot, config: StoreConfig) -> Result<Self> {
        snapshot.validate()?;

        let next_id = snapshot.versions.keys().next_back().map_or(1, |id| id + 1);
        let head_id = *snapshot
            .branches
            .get(&snapshot.current_branch)
            .ok_or_else(|| Error::BranchNotFound(snapshot.current_branch.clone()))?;

        let mut store = Self {
            versions: snapshot.versions,
            branches: snapshot.branches,
            current_branch: snapshot.current_branch,
            head_id,
            working: String::new(),
            last_uncommitted: None,
            next_id,
            config,
            fingerprinter: Box::new(Sha256Fingerprinter),
            clock: Box::new(LocalClock),
        };
        store.working = store.content_at(head_id)?;

        debug!(
            "loaded {} versions, branch '{}' at {}",
            store.versions.len(),
            store.current_branch,
            head_id
        );
        Ok(store)
    }

    pub fn with_fingerprinter(mut self, fingerprinter: impl Fingerprinter + 'static) -> Self {
        self.fingerprinter = Box::new(fingerprinter);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            versions: self.versions.clone(),
            branches: self.branches.clone(),
            current_branch: self.current_branch.clone(),
        }
    }

    // Accessors
    pub fn working(&self) -> &str {
        &self.working
    }

    pub fn head(&self) -> VersionId {
        self.head_id
    }

    pub fn current_branch(&self) -> &str {
        &self.current_branch
    }

    pub fn next_id(&self) -> VersionId {
        self.next_id
    }

    pub fn can_undo(&self) -> bool {
        self.last_uncommitted.is_some()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn version(&self, id: VersionId) -> Result<&Version> {
        self.versions.get(&id).ok_or(Error::VersionNotFound(id))
    }

    pub fn versions(&self) -> impl Iterator<Item = &Version> {
        self.versions.values()
    }

    pub fn branches(&self) -> Vec<(&str, VersionId)> {
        self.branches
            .iter()
            .map(|(name, id)| (name.as_str(), *id))
            .collect()
    }

    pub fn status(&self) -> Result<Status> {
        Ok(Status {
            branch: self.current_branch.clone(),
            head: self.head_id,
            dirty: self.content_at(self.head_id)? != self.working,
            can_undo: self.can_undo(),
            versions: self.versions.len(),
        })
    }

    // Editing
    pub fn create(&mut self, content: impl Into<String>) {
        self.working = content.into();
        self.last_uncommitted = None;
        debug!("working buffer reset ({} chars)", self.working.chars().count());
    }

    pub fn append(&mut self, text: &str) {
        self.last_uncommitted = Some(self.working.clone());
        self.working.push_str(text);
    }

    /// Drops the last `count` characters. Returns false, leaving the buffer
    /// alone, when the buffer is shorter than `count`. The undo snapshot is
    /// taken either way.
    pub fn remove_last(&mut self, count: usize) -> bool {
        self.last_uncommitted = Some(self.working.clone());

        let len = self.working.chars().count();
        if count > len {
            debug!("cannot remove {} chars from a buffer of {}", count, len);
            return false;
        }

        let cut = self
            .working
            .char_indices()
            .nth(len - count)
            .map_or(self.working.len(), |(idx, _)| idx);
        self.working.truncate(cut);
        true
    }

    /// Restores the snapshot taken before the last edit. Returns false when
    /// there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.last_uncommitted.take() {
            Some(previous) => {
                self.working = previous;
                true
            }
            None => {
                debug!("nothing to undo");
                false
            }
        }
    }

    pub fn commit(&mut self, message: impl Into<String>) -> Result<VersionId> {
        let id = self.next_id;
        let representation = if id > self.config.compression_threshold {
            let base = self.content_at(self.head_id)?;
            Representation::Diff {
                patch: diff::encode(&base, &self.working),
            }
        } else {
            Representation::Full {
                content: self.working.clone(),
            }
        };

        let version = Version::new(
            id,
            self.head_id,
            message,
            self.clock.now(),
            self.fingerprinter.fingerprint(&self.working),
            representation,
        );
        debug!(
            "commit {} on '{}' (parent {}, diff: {})",
            id,
            self.current_branch,
            version.parent_id,
            version.representation.is_diff()
        );

        self.versions.insert(id, version);
        self.move_head(id);
        self.next_id += 1;
        self.last_uncommitted = None;
        Ok(id)
    }

    // Navigation
    pub fn rollback(&mut self, id: VersionId) -> Result<()> {
        let content = self.reconstruct(id)?;
        self.working = content;
        self.move_head(id);
        debug!("rolled '{}' back to {}", self.current_branch, id);
        Ok(())
    }

    /// Points `name` at the current head, creating or overwriting it.
    pub fn branch(&mut self, name: impl Into<String>) {
        let name = name.into();
        debug!("branch '{}' at {}", name, self.head_id);
        self.branches.insert(name, self.head_id);
    }

    pub fn checkout(&mut self, name: &str) -> Result<()> {
        let head = *self
            .branches
            .get(name)
            .ok_or_else(|| Error::BranchNotFound(name.to_string()))?;
        let content = self.content_at(head)?;

        self.current_branch = name.to_string();
        self.head_id = head;
        self.working = content;
        debug!("checked out '{}' at {}", name, head);
        Ok(())
    }

    /// Walks from the current head back to the root, newest first.
    pub fn log(&self) -> Log<'_> {
        Log {
            versions: &self.versions,
            next: self.head_id,
        }
    }

    pub fn show(&self, id: Option<VersionId>) -> Result<String> {
        self.reconstruct(id.unwrap_or(self.head_id))
    }

    pub fn diff(&self, from: VersionId, to: VersionId) -> Result<Patch> {
        let old = self.reconstruct(from)?;
        let new = self.reconstruct(to)?;
        Ok(diff::encode(&old, &new))
    }

    /// Versions whose message contains `keyword`, ignoring case, by id.
    pub fn filter(&self, keyword: &str) -> Vec<&Version> {
        let needle = keyword.to_lowercase();
        self.versions
            .values()
            .filter(|v| v.message.to_lowercase().contains(&needle))
            .collect()
    }

    /// Mean reconstructed length in characters over every stored version.
    pub fn average_length(&self) -> Result<f64> {
        if self.versions.is_empty() {
            return Err(Error::EmptyStore);
        }

        let mut total = 0usize;
        for id in self.versions.keys() {
            total += self.reconstruct(*id)?.chars().count();
        }
        Ok(total as f64 / self.versions.len() as f64)
    }

    /// Full content of version `id`, replaying diffs from the nearest
    /// full snapshot.
    pub fn reconstruct(&self, id: VersionId) -> Result<String> {
        let mut patches: Vec<&Patch> = Vec::new();
        let mut cursor = id;

        let base = loop {
            let version = self.version(cursor)?;
            match &version.representation {
                Representation::Full { content } => break content.clone(),
                Representation::Diff { patch } => {
                    patches.push(patch);
                    if version.parent_id == ROOT {
                        break String::new();
                    }
                    if patches.len() > self.versions.len() {
                        return Err(Error::CorruptHistory(format!(
                            "parent chain of version {} does not terminate",
                            id
                        )));
                    }
                    cursor = version.parent_id;
                }
            }
        };

        Ok(patches
            .into_iter()
            .rev()
            .fold(base, |text, patch| diff::decode(&text, patch)))
    }

    /// Like `reconstruct`, but the root sentinel reads as an empty document.
    fn content_at(&self, id: VersionId) -> Result<String> {
        if id == ROOT {
            Ok(String::new())
        } else {
            self.reconstruct(id)
        }
    }

    /// Version ids from `from` back to the root, newest first.
    fn lineage(&self, from: VersionId) -> Result<Vec<VersionId>> {
        let mut ids = Vec::new();
        let mut cursor = from;
        while cursor != ROOT {
            ids.push(cursor);
            cursor = self.version(cursor)?.parent_id;
        }
        Ok(ids)
    }

    fn move_head(&mut self, id: VersionId) {
        self.head_id = id;
        self.branches.insert(self.current_branch.clone(), id);
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentStore")
            .field("current_branch", &self.current_branch)
            .field("head_id", &self.head_id)
            .field("next_id", &self.next_id)
            .field("versions", &self.versions.len())
            .field("branches", &self.branches)
            .finish_non_exhaustive()
    }
}

pub struct Log<'a> {
    versions: &'a BTreeMap<VersionId, Version>,
    next: VersionId,
}

impl<'a> Iterator for Log<'a> {
    type Item = &'a Version;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == ROOT {
            return None;
        }
        let version = self.versions.get(&self.next)?;
        self.next = version.parent_id;
        Some(version)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> String {
            "2024-01-01 12:00:00".to_string()
        }
    }

    pub(crate) fn store() -> DocumentStore {
        DocumentStore::default().with_clock(FixedClock)
    }

    pub(crate) fn commit_text(store: &mut DocumentStore, text: &str) -> VersionId {
        store.create(text);
        store.commit(format!("set {}", text)).unwrap()
    }

    fn assert_consistent(store: &DocumentStore) {
        assert_eq!(store.branches[&store.current_branch], store.head_id);
        let max = store.versions.keys().next_back().copied().unwrap_or(ROOT);
        assert!(store.next_id > max);
        for version in store.versions.values() {
            assert!(store.lineage(version.id).unwrap().len() <= store.len());
        }
    }

    #[test]
    fn test_fresh_store() {
        let store = store();
        assert_eq!(store.current_branch(), "main");
        assert_eq!(store.head(), ROOT);
        assert_eq!(store.next_id(), 1);
        assert!(store.is_empty());
        assert_eq!(store.log().count(), 0);
        assert_consistent(&store);
    }

    #[test]
    fn test_undo_scenario() {
        let mut store = store();
        store.create("ab");
        store.append("c");
        assert_eq!(store.working(), "abc");
        assert!(store.can_undo());

        assert!(store.undo());
        assert_eq!(store.working(), "ab");
        assert!(!store.undo());
        assert_eq!(store.working(), "ab");
    }

    #[test]
    fn test_remove_last() {
        let mut store = store();
        store.create("héllo");
        assert!(store.remove_last(4));
        assert_eq!(store.working(), "h");

        assert!(!store.remove_last(5));
        assert_eq!(store.working(), "h");
        assert!(store.undo());
        assert_eq!(store.working(), "h");

        assert!(store.remove_last(1));
        assert_eq!(store.working(), "");
    }

    #[test]
    fn test_create_and_commit_clear_undo() {
        let mut store = store();
        store.append("x");
        store.create("y");
        assert!(!store.can_undo());

        store.append("z");
        store.commit("yz").unwrap();
        assert!(!store.can_undo());
    }

    #[test]
    fn test_commit_links_parent_and_moves_branch() {
        let mut store = store();
        let first = commit_text(&mut store, "one");
        let second = commit_text(&mut store, "two");

        assert_eq!((first, second), (1, 2));
        let version = store.version(second).unwrap();
        assert_eq!(version.parent_id, first);
        assert_eq!(version.message, "set two");
        assert_eq!(version.timestamp, "2024-01-01 12:00:00");
        assert_eq!(store.head(), second);
        assert_consistent(&store);
    }

    #[test]
    fn test_compression_boundary_and_fidelity() {
        let mut store = store();
        let texts = ["a", "ab", "abc", "xbc", "xbcd", "xbcde", "", "zz", "zzz"];
        for text in texts {
            commit_text(&mut store, text);
        }

        for (index, text) in texts.iter().enumerate() {
            let id = index as VersionId + 1;
            let version = store.version(id).unwrap();
            assert_eq!(version.representation.is_diff(), id > 5, "version {}", id);
            similar_asserts::assert_eq!(store.reconstruct(id).unwrap().as_str(), *text);
            assert_eq!(
                version.fingerprint,
                Sha256Fingerprinter.fingerprint(text),
                "fingerprint covers full content of {}",
                id
            );
        }
        assert_consistent(&store);
    }

    #[test]
    fn test_empty_document_is_distinct_from_diff() {
        let mut store = store();
        let id = commit_text(&mut store, "");
        assert_eq!(
            store.version(id).unwrap().representation,
            Representation::Full {
                content: String::new()
            }
        );
        assert_eq!(store.show(None).unwrap(), "");
    }

    #[test]
    fn test_rollback() {
        let mut store = store();
        commit_text(&mut store, "one");
        commit_text(&mut store, "two");
        store.append(" more");

        store.rollback(1).unwrap();
        assert_eq!(store.working(), "one");
        assert_eq!(store.head(), 1);
        assert_eq!(store.len(), 2);
        assert_consistent(&store);

        let err = store.rollback(9).unwrap_err();
        assert!(matches!(err, Error::VersionNotFound(9)));
        assert_eq!(store.head(), 1);
        assert_eq!(store.working(), "one");
    }

    #[test]
    fn test_branch_and_checkout() {
        let mut store = store();
        commit_text(&mut store, "base");
        store.branch("feature");
        commit_text(&mut store, "main work");

        store.checkout("feature").unwrap();
        assert_eq!(store.current_branch(), "feature");
        assert_eq!(store.head(), 1);
        assert_eq!(store.working(), "base");

        let id = commit_text(&mut store, "feature work");
        assert_eq!(store.version(id).unwrap().parent_id, 1);
        assert_eq!(
            store.branches(),
            vec![("feature", id), ("main", 2)]
        );
        assert_consistent(&store);

        assert!(store.checkout("missing").unwrap_err().is_not_found());
        assert_eq!(store.current_branch(), "feature");
    }

    #[test]
    fn test_branch_overwrites_existing_pointer() {
        let mut store = store();
        commit_text(&mut store, "one");
        store.branch("tag");
        commit_text(&mut store, "two");
        store.branch("tag");
        assert!(store.branches().contains(&("tag", 2)));
    }

    #[test]
    fn test_branch_at_root_checks_out_empty_and_diffs_from_nothing() {
        let mut store = store();
        store.branch("fresh");
        for i in 0..6 {
            commit_text(&mut store, &format!("main {}", i));
        }

        store.checkout("fresh").unwrap();
        assert_eq!(store.head(), ROOT);
        assert_eq!(store.working(), "");

        let id = commit_text(&mut store, "fresh start");
        let version = store.version(id).unwrap();
        assert_eq!(version.parent_id, ROOT);
        assert!(version.representation.is_diff());
        assert_eq!(store.reconstruct(id).unwrap(), "fresh start");
    }

    #[test]
    fn test_log_walks_to_root() {
        let mut store = store();
        commit_text(&mut store, "one");
        commit_text(&mut store, "two");
        store.branch("side");
        commit_text(&mut store, "three");
        store.checkout("side").unwrap();
        commit_text(&mut store, "four");

        let ids: Vec<_> = store.log().map(|v| v.id).collect();
        assert_eq!(ids, vec![4, 2, 1]);
        let again: Vec<_> = store.log().map(|v| v.id).collect();
        assert_eq!(again, ids);
    }

    #[test]
    fn test_show() {
        let mut store = store();
        assert!(matches!(store.show(None), Err(Error::VersionNotFound(0))));

        commit_text(&mut store, "one");
        commit_text(&mut store, "two");
        assert_eq!(store.show(None).unwrap(), "two");
        assert_eq!(store.show(Some(1)).unwrap(), "one");
        assert!(store.show(Some(3)).unwrap_err().is_not_found());
    }

    #[test]
    fn test_diff_between_versions() {
        let mut store = store();
        commit_text(&mut store, "cat");
        commit_text(&mut store, "cut");

        let patch = store.diff(1, 2).unwrap();
        assert_eq!(patch.to_string(), "c[-a][+u]t");
        assert!(matches!(store.diff(1, 5), Err(Error::VersionNotFound(5))));
        assert!(matches!(store.diff(5, 1), Err(Error::VersionNotFound(5))));
    }

    #[test]
    fn test_filter_ignores_case() {
        let mut store = store();
        store.create("x");
        store.commit("Fix typo").unwrap();
        store.commit("add intro").unwrap();
        store.commit("FIX layout").unwrap();

        let ids: Vec<_> = store.filter("fix").iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(store.filter("nothing").is_empty());
    }

    #[test]
    fn test_average_length() {
        let mut store = store();
        assert!(matches!(store.average_length(), Err(Error::EmptyStore)));

        for text in ["ab", "abcd", "abcdef", "a", "", "abc"] {
            commit_text(&mut store, text);
        }
        let avg = store.average_length().unwrap();
        assert!((avg - 16.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_status_tracks_dirty_buffer() {
        let mut store = store();
        commit_text(&mut store, "one");
        assert!(!store.status().unwrap().dirty);

        store.append("!");
        let status = store.status().unwrap();
        assert!(status.dirty);
        assert!(status.can_undo);
        assert_eq!(status.branch, "main");
        assert_eq!(status.head, 1);
        assert_eq!(status.versions, 1);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut store = store();
        for i in 0..7 {
            commit_text(&mut store, &format!("text {}", i));
        }
        store.branch("side");
        store.rollback(3).unwrap();

        let loaded =
            DocumentStore::from_snapshot(store.snapshot(), StoreConfig::default()).unwrap();
        assert_eq!(loaded.head(), 3);
        assert_eq!(loaded.working(), "text 2");
        assert_eq!(loaded.next_id(), 8);
        assert_eq!(loaded.branches(), store.branches());
        assert!(!loaded.can_undo());
        assert_consistent(&loaded);
    }

    #[test]
    fn test_from_snapshot_rejects_unknown_branch() {
        let mut snapshot = Snapshot::empty("main");
        snapshot.current_branch = "gone".to_string();
        let err = DocumentStore::from_snapshot(snapshot, StoreConfig::default()).unwrap_err();
        assert!(matches!(err, Error::BranchNotFound(_)));
    }
}
