// src/checker/pool.rs
// =============================================================================
// This module runs the actual link health check: a bounded pool of
// logical workers draining one shared FIFO queue of links.
//
// How it works:
// 1. The full link list becomes the queue (a Vec plus an atomic cursor)
// 2. Exactly `concurrency` worker futures are created
// 3. Each worker pops the next link, probes it to completion, reports
//    the outcome, and pops again
// 4. The run is over when the queue is empty and every in-flight probe
//    has finished
//
// "Workers" are concurrent futures on one task, not OS threads - all the
// waiting happens at network await points, so one thread of control is
// plenty. Dequeue order is FIFO; completion order across workers is not.
//
// Rust concepts:
// - AtomicUsize: a lock-free pop-or-done cursor shared by the workers
// - futures::future::join_all: runs the workers concurrently and acts
//   as the completion barrier
// - tokio mpsc: streams results out incrementally as they complete
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use url::Url;

use super::probe::{Probe, ProbeFailure};

/// How many probes may be in flight at once unless the caller says
/// otherwise. Matches what a browser quietly tolerates without rate
/// limiting or connection pressure.
pub const DEFAULT_CONCURRENCY: usize = 5;

// The health classification of one link
//
// These are first-class results, never errors: a check run always
// resolves every input to exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LinkStatus {
    /// Not probed (yet, or ever - links without a URL stay here)
    Unchecked,
    /// Reachable. An opaque success lands here even when the hidden
    /// status was an error - reachability is all we can observe.
    Ok,
    /// The opaque probe was cut off by its own timeout
    Timeout,
    /// The fallback probe saw a 404 - the strongest deletion signal
    NotFound,
    /// The fallback probe saw some other non-2xx status
    HttpError { code: u16 },
    /// Neither probe could say anything: cross-origin opacity, network
    /// refusal, or a fallback timeout
    Blocked,
}

impl LinkStatus {
    /// True for every status the failure set tracks (anything probed
    /// that didn't come back reachable)
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            LinkStatus::Timeout
                | LinkStatus::NotFound
                | LinkStatus::HttpError { .. }
                | LinkStatus::Blocked
        )
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, LinkStatus::Ok)
    }
}

// One link to check: a read-only snapshot of the node, never the node
// itself - the checker must not be able to mutate the tree
#[derive(Debug, Clone)]
pub struct CheckTarget {
    pub id: String,
    pub name: String,
    pub url: String,
}

// The checked result for one link, emitted as soon as its probe chain
// finishes
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(flatten)]
    pub status: LinkStatus,
}

// Per-status tallies for the end-of-run summary
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusCounts {
    pub ok: usize,
    pub timeout: usize,
    pub not_found: usize,
    pub http_error: usize,
    pub blocked: usize,
    pub skipped: usize,
}

impl StatusCounts {
    /// Tallies a slice of outcomes, for callers that merge outcomes
    /// from more than one run before summarizing
    pub fn tally(outcomes: &[CheckOutcome]) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for outcome in outcomes {
            counts.record(&outcome.status);
        }
        counts
    }

    fn record(&mut self, status: &LinkStatus) {
        match status {
            LinkStatus::Unchecked => self.skipped += 1,
            LinkStatus::Ok => self.ok += 1,
            LinkStatus::Timeout => self.timeout += 1,
            LinkStatus::NotFound => self.not_found += 1,
            LinkStatus::HttpError { .. } => self.http_error += 1,
            LinkStatus::Blocked => self.blocked += 1,
        }
    }

    pub fn failures(&self) -> usize {
        self.timeout + self.not_found + self.http_error + self.blocked
    }
}

// Everything a finished run produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    pub outcomes: Vec<CheckOutcome>,
    pub counts: StatusCounts,
}

impl CheckReport {
    pub fn processed(&self) -> usize {
        self.outcomes.len()
    }
}

// Only http(s) URLs can be probed at all. Anything else (javascript:,
// file:, malformed text) fails both fetch modes, so it maps straight to
// Blocked without spending network time on it.
fn is_probeable(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Classifies one URL with the two-tier probe strategy
///
/// 1. Opaque probe (30s): completes -> Ok; its own timeout -> Timeout,
///    terminal, no fallback.
/// 2. Any other opaque failure -> transparent probe (20s): 404 ->
///    NotFound, 2xx -> Ok, other code -> HttpError, failure -> Blocked.
pub async fn classify<P: Probe>(probe: &P, url: &str) -> LinkStatus {
    if !is_probeable(url) {
        return LinkStatus::Blocked;
    }

    match probe.opaque(url).await {
        Ok(()) => LinkStatus::Ok,
        Err(ProbeFailure::TimedOut) => LinkStatus::Timeout,
        Err(ProbeFailure::Unreachable) => match probe.transparent(url).await {
            Ok(404) => LinkStatus::NotFound,
            Ok(code) if (200..300).contains(&code) => LinkStatus::Ok,
            Ok(code) => LinkStatus::HttpError { code },
            Err(_) => LinkStatus::Blocked,
        },
    }
}

/// Checks a list of links with a bounded worker pool
///
/// Every target resolves to exactly one outcome; targets with an empty
/// URL resolve immediately to Unchecked without consuming a probe. Each
/// outcome is sent over `events` the moment it completes (a dropped
/// receiver is fine - the report still collects everything), and the
/// final report carries all outcomes plus the per-status counts.
pub async fn check_links<P: Probe>(
    probe: &P,
    targets: Vec<CheckTarget>,
    concurrency: usize,
    events: UnboundedSender<CheckOutcome>,
) -> CheckReport {
    // The shared queue: the target list plus an atomic cursor. fetch_add
    // is the atomic pop-or-done - each index is handed out exactly once,
    // in FIFO order, no matter how the workers interleave.
    let next = AtomicUsize::new(0);
    let report = Mutex::new(CheckReport::default());

    let workers: Vec<_> = (0..concurrency.max(1))
        .map(|_| {
            let events = events.clone();
            let next = &next;
            let report = &report;
            let targets = &targets;
            async move {
                loop {
                    let index = next.fetch_add(1, Ordering::SeqCst);
                    let Some(target) = targets.get(index) else {
                        break;
                    };

                    // A worker is strictly sequential: this link's probe
                    // chain finishes before the next pop
                    let status = if target.url.is_empty() {
                        LinkStatus::Unchecked
                    } else {
                        classify(probe, &target.url).await
                    };

                    let outcome = CheckOutcome {
                        id: target.id.clone(),
                        name: target.name.clone(),
                        url: target.url.clone(),
                        status,
                    };

                    {
                        let mut report = report.lock().await;
                        report.counts.record(&outcome.status);
                        report.outcomes.push(outcome.clone());
                    }

                    // The receiver may already be gone; results stand
                    // regardless
                    let _ = events.send(outcome);
                }
            }
        })
        .collect();

    // Completion barrier: the run is done when every worker has drained
    // out of the queue and finished its in-flight probe
    futures::future::join_all(workers).await;

    report.into_inner()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a pool of exactly N workers instead of buffer_unordered(N)?
//    - Both bound concurrency, but the explicit pool makes the queue
//      visible: one FIFO list, one cursor, N consumers
//    - That's the shape the recheck feature needs too - same pool, just
//      a shorter list
//
// 2. What does fetch_add give us?
//    - next.fetch_add(1) returns the old value and bumps the counter in
//      one atomic step
//    - Two workers can race to pop and still never get the same index
//    - When the index runs past the list, the worker is done - that's
//      the whole "pop or done" protocol
//
// 3. Why join_all instead of tokio::spawn?
//    - The workers are futures, not threads; join_all polls them all
//      concurrently inside this one function call
//    - Probing is pure I/O waiting, so one thread of control is plenty
//    - Bonus: the workers can borrow `targets` directly, because they
//      never leave this stack frame
//
// 4. Why both a channel AND a report?
//    - The channel streams outcomes out while the run is still going
//      (progress display wants that)
//    - The report is the complete answer handed back at the end
//    - If nobody listens to the channel, send() fails and we just ignore it
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::super::probe::testing::{MockBehavior, MockProbe};
    use super::*;
    use tokio::sync::mpsc;

    fn target(id: &str, url: &str) -> CheckTarget {
        CheckTarget {
            id: id.to_string(),
            name: format!("link {id}"),
            url: url.to_string(),
        }
    }

    #[tokio::test]
    async fn classify_opaque_success_is_ok() {
        let probe = MockProbe::new(&[("https://a.example.com", MockBehavior::Reachable)]);
        assert_eq!(classify(&probe, "https://a.example.com").await, LinkStatus::Ok);
    }

    #[tokio::test]
    async fn classify_primary_timeout_is_terminal() {
        let probe = MockProbe::new(&[("https://slow.example.com", MockBehavior::PrimaryTimeout)]);
        assert_eq!(
            classify(&probe, "https://slow.example.com").await,
            LinkStatus::Timeout
        );
        // No fallback was attempted: only the one opaque probe ran
        assert_eq!(probe.probed_urls().len(), 1);
    }

    #[tokio::test]
    async fn classify_fallback_statuses() {
        let probe = MockProbe::new(&[
            ("https://gone.example.com", MockBehavior::Fallback(404)),
            ("https://fine.example.com", MockBehavior::Fallback(204)),
            ("https://broken.example.com", MockBehavior::Fallback(500)),
            ("https://dark.example.com", MockBehavior::Dark),
        ]);
        assert_eq!(
            classify(&probe, "https://gone.example.com").await,
            LinkStatus::NotFound
        );
        assert_eq!(
            classify(&probe, "https://fine.example.com").await,
            LinkStatus::Ok
        );
        assert_eq!(
            classify(&probe, "https://broken.example.com").await,
            LinkStatus::HttpError { code: 500 }
        );
        assert_eq!(
            classify(&probe, "https://dark.example.com").await,
            LinkStatus::Blocked
        );
    }

    #[tokio::test]
    async fn classify_rejects_unprobeable_schemes() {
        let probe = MockProbe::new(&[]);
        assert_eq!(
            classify(&probe, "javascript:void(0)").await,
            LinkStatus::Blocked
        );
        assert_eq!(classify(&probe, "not a url at all").await, LinkStatus::Blocked);
        // The network was never touched
        assert!(probe.probed_urls().is_empty());
    }

    #[tokio::test]
    async fn every_target_gets_exactly_one_outcome() {
        let probe = MockProbe::new(&[
            ("https://a.example.com", MockBehavior::Reachable),
            ("https://b.example.com", MockBehavior::Fallback(404)),
            ("https://c.example.com", MockBehavior::Dark),
        ]);
        let targets = vec![
            target("1", "https://a.example.com"),
            target("2", "https://b.example.com"),
            target("3", "https://c.example.com"),
            target("4", ""), // no URL: skipped, never probed
        ];

        let (tx, mut rx) = mpsc::unbounded_channel();
        let report = check_links(&probe, targets, DEFAULT_CONCURRENCY, tx).await;

        assert_eq!(report.processed(), 4);
        let mut ids: Vec<_> = report.outcomes.iter().map(|o| o.id.clone()).collect();
        ids.sort();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);

        assert_eq!(report.counts.ok, 1);
        assert_eq!(report.counts.not_found, 1);
        assert_eq!(report.counts.blocked, 1);
        assert_eq!(report.counts.skipped, 1);
        assert_eq!(report.counts.failures(), 2);

        // The empty URL never consumed a probe
        assert!(!probe.probed_urls().contains(&String::new()));

        // One event per target came over the channel too
        let mut events = 0;
        while rx.try_recv().is_ok() {
            events += 1;
        }
        assert_eq!(events, 4);
    }

    #[tokio::test]
    async fn empty_input_terminates_immediately() {
        let probe = MockProbe::new(&[]);
        let (tx, _rx) = mpsc::unbounded_channel();
        let report = check_links(&probe, Vec::new(), DEFAULT_CONCURRENCY, tx).await;
        assert_eq!(report.processed(), 0);
    }

    #[tokio::test]
    async fn classification_is_stable_across_budgets() {
        let probe = MockProbe::new(&[
            ("https://a.example.com", MockBehavior::Reachable),
            ("https://b.example.com", MockBehavior::PrimaryTimeout),
            ("https://c.example.com", MockBehavior::Fallback(503)),
        ]);
        let targets = vec![
            target("1", "https://a.example.com"),
            target("2", "https://b.example.com"),
            target("3", "https://c.example.com"),
        ];

        for budget in [1, 2, 50] {
            let (tx, _rx) = mpsc::unbounded_channel();
            let report = check_links(&probe, targets.clone(), budget, tx).await;
            let status_of = |id: &str| {
                report
                    .outcomes
                    .iter()
                    .find(|o| o.id == id)
                    .map(|o| o.status.clone())
                    .unwrap()
            };
            assert_eq!(status_of("1"), LinkStatus::Ok);
            assert_eq!(status_of("2"), LinkStatus::Timeout);
            assert_eq!(status_of("3"), LinkStatus::HttpError { code: 503 });
        }
    }

    #[tokio::test]
    async fn zero_budget_is_clamped_to_one_worker() {
        let probe = MockProbe::new(&[]);
        let (tx, _rx) = mpsc::unbounded_channel();
        let targets = vec![target("1", "https://a.example.com")];
        let report = check_links(&probe, targets, 0, tx).await;
        assert_eq!(report.processed(), 1);
    }

    #[tokio::test]
    async fn dequeue_order_is_fifo_with_one_worker() {
        let probe = MockProbe::new(&[]);
        let (tx, _rx) = mpsc::unbounded_channel();
        let targets = vec![
            target("1", "https://a.example.com"),
            target("2", "https://b.example.com"),
            target("3", "https://c.example.com"),
        ];
        check_links(&probe, targets, 1, tx).await;
        assert_eq!(
            probe.probed_urls(),
            vec![
                "https://a.example.com",
                "https://b.example.com",
                "https://c.example.com"
            ]
        );
    }
}
