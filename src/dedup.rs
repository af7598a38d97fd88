//! Display-name deduplication.
//!
//! A record whose name equals an already emitted name gets `-2` appended.
//! The suffix never increments: a third `X` also becomes `X-2`.

use crate::constants::COLLISION_SUFFIX;
use crate::node::NodeRecord;
use std::collections::HashSet;
use tracing::debug;

/// Output of a deduplication pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupOutcome {
    /// Records in first-seen order with renamed collisions
    pub nodes: Vec<NodeRecord>,
    /// Records dropped as identical copies (only with `drop_identical`)
    pub dropped: usize,
}

/// Renames colliding display names, optionally dropping identical copies first
#[derive(Debug, Clone, Copy, Default)]
pub struct Deduplicator {
    drop_identical: bool,
}

impl Deduplicator {
    /// `drop_identical` drops a record equal in every field to an earlier one
    /// instead of renaming it.
    pub fn new(drop_identical: bool) -> Self {
        Deduplicator { drop_identical }
    }

    /// Runs one pass over `records`, preserving order.
    pub fn run(&self, records: Vec<NodeRecord>) -> DedupOutcome {
        let mut emitted_names: HashSet<String> = HashSet::with_capacity(records.len());
        let mut seen: HashSet<NodeRecord> = HashSet::new();
        let mut outcome = DedupOutcome {
            nodes: Vec::with_capacity(records.len()),
            dropped: 0,
        };

        for mut record in records {
            if self.drop_identical && !seen.insert(record.clone()) {
                debug!(name = %record.name, server = %record.server, "dropping identical node");
                outcome.dropped += 1;
                continue;
            }
            if emitted_names.contains(&record.name) {
                debug!(name = %record.name, "renaming duplicate node name");
                record.name.push_str(COLLISION_SUFFIX);
            }
            emitted_names.insert(record.name.clone());
            outcome.nodes.push(record);
        }
        outcome
    }
}

/// Renames colliding display names without dropping anything.
pub fn dedup_names(records: Vec<NodeRecord>) -> Vec<NodeRecord> {
    Deduplicator::default().run(records).nodes
}
