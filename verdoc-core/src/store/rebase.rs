use super::DocumentStore;
use crate::diff;
use crate::error::{Error, Result};
use crate::models::{Representation, Version, VersionId};
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebaseOutcome {
    pub merge_base: VersionId,
    /// `(original, replayed)` pairs, oldest first.
    pub replayed: Vec<(VersionId, VersionId)>,
    pub head: VersionId,
}

impl RebaseOutcome {
    pub fn is_fast_forward(&self) -> bool {
        self.replayed.is_empty()
    }
}

impl DocumentStore {
    /// Replays the versions unique to the current branch on top of `onto`.
    ///
    /// Originals are left in place; every replayed version gets a fresh id
    /// and is stored as a diff against its new parent. All lookups happen
    /// before the first insert, so a failed rebase leaves the store as it
    /// was.
    pub fn rebase(&mut self, onto: &str) -> Result<RebaseOutcome> {
        let onto_tip = *self
            .branches
            .get(onto)
            .ok_or_else(|| Error::BranchNotFound(onto.to_string()))?;

        let head_lineage = self.lineage(self.head_id)?;
        let ancestors: HashSet<VersionId> = head_lineage.iter().copied().collect();

        let merge_base = self
            .lineage(onto_tip)?
            .into_iter()
            .find(|id| ancestors.contains(id))
            .ok_or_else(|| Error::NoCommonAncestor {
                onto: onto.to_string(),
            })?;

        let mut pending = Vec::new();
        for id in head_lineage.into_iter().take_while(|id| *id != merge_base) {
            let original = self.version(id)?;
            pending.push((original.clone(), self.reconstruct(id)?));
        }
        pending.reverse();

        let mut cursor = onto_tip;
        let mut cursor_content = self.content_at(onto_tip)?;
        let mut replayed = Vec::with_capacity(pending.len());

        for (original, content) in pending {
            let id = self.next_id;
            self.next_id += 1;

            let version = Version::new(
                id,
                cursor,
                format!("{}{}", self.config.rebase_prefix, original.message),
                self.clock.now(),
                original.fingerprint,
                Representation::Diff {
                    patch: diff::encode(&cursor_content, &content),
                },
            );
            debug!("replayed {} as {} on {}", original.id, id, cursor);

            self.versions.insert(id, version);
            replayed.push((original.id, id));
            cursor = id;
            cursor_content = content;
        }

        self.move_head(cursor);
        self.working = cursor_content;
        debug!(
            "rebased '{}' onto '{}' (base {}, {} replayed)",
            self.current_branch,
            onto,
            merge_base,
            replayed.len()
        );

        Ok(RebaseOutcome {
            merge_base,
            replayed,
            head: cursor,
        })
    }
}
