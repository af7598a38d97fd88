//! Batch coordinator: parse, filter and deduplicate every line of a subscription.
//!
//! Blank lines and `#` comment lines are skipped silently. A bad line is
//! recorded as a [`Failure`] and never stops the batch; a safety rejection is
//! recorded separately as a [`Rejection`].

use crate::config::SieveConfig;
use crate::dedup::Deduplicator;
use crate::node::{NodeRecord, Scheme};
use crate::outcome::{Failure, ParseOutcome};
use crate::safety::{RejectReason, Verdict};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A parsed node excluded by the safety policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// Display name as parsed
    pub name: String,
    /// Node scheme
    pub scheme: Scheme,
    /// Server address
    pub server: String,
    /// Server port
    pub port: u16,
    /// Rule that matched
    pub reason: RejectReason,
}

impl Rejection {
    fn new(record: NodeRecord, reason: RejectReason) -> Self {
        Rejection {
            name: record.name,
            scheme: record.scheme,
            server: record.server,
            port: record.port,
            reason,
        }
    }
}

/// Summary counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Records in the final list
    pub accepted: usize,
    /// Lines that failed to parse
    pub failed: usize,
    /// Parsed records excluded by the safety policy
    pub rejected: usize,
    /// Identical records dropped by the deduplicator
    pub dropped_duplicates: usize,
}

/// Result of processing a whole subscription
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    /// Accepted records, first-seen order, unique names
    pub nodes: Vec<NodeRecord>,
    /// Parse failures in input order
    pub failures: Vec<Failure>,
    /// Safety rejections in input order
    pub rejections: Vec<Rejection>,
    /// Identical records dropped by the deduplicator
    pub dropped_duplicates: usize,
}

/// Serializable view of a batch without the records themselves
#[derive(Debug, Clone, Serialize)]
pub struct Report<'a> {
    /// Counters
    pub summary: Summary,
    /// Parse failures
    pub failures: &'a [Failure],
    /// Safety rejections
    pub rejections: &'a [Rejection],
}

impl Batch {
    /// Counters for reporting.
    pub fn summary(&self) -> Summary {
        Summary {
            accepted: self.nodes.len(),
            failed: self.failures.len(),
            rejected: self.rejections.len(),
            dropped_duplicates: self.dropped_duplicates,
        }
    }

    /// Report of everything except the accepted records.
    pub fn report(&self) -> Report<'_> {
        Report {
            summary: self.summary(),
            failures: &self.failures,
            rejections: &self.rejections,
        }
    }
}

fn is_skippable(line: &str) -> bool {
    line.is_empty() || line.starts_with('#')
}

/// Runs parse → safety → dedup over `lines`.
pub fn process_lines<'a, I>(lines: I, config: &SieveConfig) -> Batch
where
    I: IntoIterator<Item = &'a str>,
{
    let mut accepted = Vec::new();
    let mut batch = Batch::default();

    for raw in lines {
        let line = raw.trim();
        if is_skippable(line) {
            continue;
        }
        match crate::parse_descriptor(line) {
            ParseOutcome::Parsed(record) => {
                match config.safety.evaluate(record.port, &record.server) {
                    Verdict::Accept => accepted.push(record),
                    Verdict::Reject(reason) => {
                        debug!(
                            name = %record.name,
                            server = %record.server,
                            port = record.port,
                            %reason,
                            "node rejected"
                        );
                        batch.rejections.push(Rejection::new(record, reason));
                    }
                }
            }
            ParseOutcome::Failed { line, error } => {
                debug!(kind = ?error.kind(), %error, "descriptor skipped");
                batch
                    .failures
                    .push(Failure::new(&line, &error, config.preview_len));
            }
        }
    }

    let deduped = Deduplicator::new(config.drop_identical).run(accepted);
    batch.nodes = deduped.nodes;
    batch.dropped_duplicates = deduped.dropped;

    let summary = batch.summary();
    info!(
        accepted = summary.accepted,
        failed = summary.failed,
        rejected = summary.rejected,
        dropped_duplicates = summary.dropped_duplicates,
        "batch processed"
    );
    batch
}

/// Splits `text` into lines and runs [`process_lines`].
pub fn process_text(text: &str, config: &SieveConfig) -> Batch {
    process_lines(text.lines(), config)
}
