// src/session.rs
// =============================================================================
// This module holds the state of one editing session: the loaded tree,
// what the checker found out about each link, and which links the user
// has marked for deletion.
//
// Ownership rules:
// - The session exclusively owns the tree and the selection set
// - The checker only ever sees read-only snapshots of the links and
//   reports back by id; it can't touch the tree
// - Status lives here, keyed by node id, never inside the tree - so it
//   is session-scoped and is never written into an export
//
// The state is an explicit struct (not globals) so independent sessions
// - say, two tests - can never interfere with each other.
//
// Rust concepts:
// - HashMap/HashSet for the per-id bookkeeping
// - &mut self methods: the borrow checker enforces the single-owner rule
// =============================================================================

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use tokio::sync::mpsc::UnboundedSender;

use crate::checker::{self, CheckOutcome, CheckReport, CheckTarget, LinkStatus, Probe};
use crate::codec::{self, BookmarkFormat, CodecError};
use crate::tree::BookmarkTree;

pub struct Session {
    tree: Option<BookmarkTree>,
    source_format: Option<BookmarkFormat>,
    /// Last known status per link id; reset when a fresh full check starts
    statuses: HashMap<String, LinkStatus>,
    /// Ids whose last check came back as a failure - the recheck scope
    failed: HashSet<String>,
    /// Ids marked for deletion; consumed by save
    selection: HashSet<String>,
}

impl Session {
    pub fn new() -> Self {
        Session {
            tree: None,
            source_format: None,
            statuses: HashMap::new(),
            failed: HashSet::new(),
            selection: HashSet::new(),
        }
    }

    /// Loads a bookmark export, replacing the current tree
    ///
    /// All-or-nothing: when decoding fails, the previously loaded tree
    /// and all session state stay exactly as they were.
    pub fn load(&mut self, content: &str, hint: Option<BookmarkFormat>) -> Result<(), CodecError> {
        let (tree, format) = codec::decode(content, hint)?;
        self.tree = Some(tree);
        self.source_format = Some(format);
        self.statuses.clear();
        self.failed.clear();
        self.selection.clear();
        Ok(())
    }

    pub fn tree(&self) -> Option<&BookmarkTree> {
        self.tree.as_ref()
    }

    /// The format the current tree was loaded from
    pub fn source_format(&self) -> Option<BookmarkFormat> {
        self.source_format
    }

    pub fn link_count(&self) -> usize {
        self.tree.as_ref().map_or(0, |t| t.traverse_links().len())
    }

    pub fn failed_ids(&self) -> &HashSet<String> {
        &self.failed
    }

    pub fn selection(&self) -> &HashSet<String> {
        &self.selection
    }

    pub fn status_of(&self, id: &str) -> Option<&LinkStatus> {
        self.statuses.get(id)
    }

    /// Marks a link for deletion
    pub fn select(&mut self, id: impl Into<String>) {
        self.selection.insert(id.into());
    }

    /// Marks every currently-failing link for deletion
    pub fn select_failures(&mut self) {
        self.selection.extend(self.failed.iter().cloned());
    }

    // Read-only snapshots of every link, in traversal order
    fn targets(&self) -> Vec<CheckTarget> {
        let Some(tree) = self.tree.as_ref() else {
            return Vec::new();
        };
        tree.traverse_links()
            .into_iter()
            .map(|link| CheckTarget {
                id: link.id().to_string(),
                name: link.name().to_string(),
                url: link.url().unwrap_or_default().to_string(),
            })
            .collect()
    }

    /// Runs a full health check over every link in the tree
    ///
    /// Starts fresh: every link goes back to Unchecked, the failure set
    /// is rebuilt from this run alone, and every confirmed 404 is
    /// pre-selected for deletion.
    pub async fn check_all<P: Probe>(
        &mut self,
        probe: &P,
        concurrency: usize,
        events: UnboundedSender<CheckOutcome>,
    ) -> CheckReport {
        self.statuses.clear();
        self.failed.clear();

        let targets = self.targets();
        for target in &targets {
            self.statuses
                .insert(target.id.clone(), LinkStatus::Unchecked);
        }

        let report = checker::check_links(probe, targets, concurrency, events).await;
        self.apply(&report);
        report
    }

    /// Re-runs the check over only the links that failed last time
    ///
    /// Same pool, same classification - just a filtered input list.
    /// Links that come back Ok leave the failure set; the rest stay.
    pub async fn recheck<P: Probe>(
        &mut self,
        probe: &P,
        concurrency: usize,
        events: UnboundedSender<CheckOutcome>,
    ) -> CheckReport {
        let targets: Vec<CheckTarget> = self
            .targets()
            .into_iter()
            .filter(|target| self.failed.contains(&target.id))
            .collect();

        let report = checker::check_links(probe, targets, concurrency, events).await;
        self.apply(&report);
        report
    }

    // Folds one run's outcomes into the session bookkeeping
    fn apply(&mut self, report: &CheckReport) {
        for outcome in &report.outcomes {
            self.statuses
                .insert(outcome.id.clone(), outcome.status.clone());
            if outcome.status.is_failure() {
                self.failed.insert(outcome.id.clone());
                // A confirmed 404 is the strongest deletion signal we
                // ever get, so it ticks its own checkbox
                if outcome.status == LinkStatus::NotFound {
                    self.selection.insert(outcome.id.clone());
                }
            } else if outcome.status.is_ok() {
                self.failed.remove(&outcome.id);
            }
        }
    }

    /// Prunes the selection out of a copy of the tree and encodes it
    ///
    /// The session's own tree is untouched - saving is a projection,
    /// not an edit. Selected ids that no longer exist are ignored.
    pub fn save(&self, format: BookmarkFormat) -> Result<String> {
        let tree = self.tree.as_ref().context("no bookmark file loaded")?;
        let pruned = tree.prune(&self.selection);
        Ok(codec::encode(&pruned, format)?)
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

/// The default output filename: Bookmarks_<YYYYMMDD> with the format's
/// extension, mirroring what the browser's save dialog would suggest
pub fn default_export_name(format: BookmarkFormat) -> String {
    let stamp = chrono::Local::now().format("%Y%m%d");
    format!("Bookmarks_{stamp}.{}", format.extension())
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is the status map here and not on the tree nodes?
//    - Statuses are per-run scratch state; the tree is the document
//    - Keeping them apart means an export can never leak check results,
//      and a reload naturally drops stale statuses
//
// 2. What makes recheck "narrowing"?
//    - recheck() feeds the pool only the ids in the failed set
//    - Anything that comes back Ok is removed from the set
//    - So each recheck can only shrink the set, never grow it
//
// 3. Why does save() not mutate the session's tree?
//    - prune() returns a fresh copy with the selection removed
//    - The loaded tree stays intact, so the user can keep checking and
//      re-saving with a different selection afterwards
//
// 4. Why pass the Probe in instead of storing it?
//    - The session is pure bookkeeping; the network lives outside
//    - Tests hand in a scripted fake and the session can't tell the
//      difference
// -----------------------------------------------------------------------------
