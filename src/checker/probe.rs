// src/checker/probe.rs
// =============================================================================
// This module defines the two network probe primitives the link checker
// is built on, plus the real reqwest-backed implementation.
//
// Two probe modes:
// - opaque: answers only "did the transport round trip complete?".
//   The status code is deliberately not observed - a 404 hidden behind
//   an opaque response still counts as "reachable".
// - transparent: answers with the numeric HTTP status code, but is more
//   likely to be rejected outright by the target.
//
// The checker runs the cheap opaque probe first and only falls back to
// the transparent probe when the opaque one fails for a reason other
// than its own timeout.
//
// Rust concepts:
// - Traits: the checker is generic over Probe, so tests can substitute
//   a deterministic fake and never touch the network
// - async fn in traits: stable since Rust 1.75
// =============================================================================

use std::time::Duration;

use reqwest::Client;

// Per-attempt timeout budgets. The opaque probe gets the longer budget
// because slow-but-alive hosts are common; the fallback is already a
// second chance and can be cut off sooner.
pub const OPAQUE_TIMEOUT: Duration = Duration::from_secs(30);
pub const TRANSPARENT_TIMEOUT: Duration = Duration::from_secs(20);

// Why a probe attempt failed
//
// Callers only ever need the two-way split: "the attempt's own timeout
// cut it off" versus "everything else" (connection refused, DNS failure,
// TLS trouble, policy block - indistinguishable from out here).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeFailure {
    /// The attempt was aborted by its own timeout budget
    TimedOut,
    /// Network error, DNS failure, refused connection, policy block
    Unreachable,
}

// The network-fetch primitives the checker consumes
//
// Implementations must never panic; every attempt resolves to Ok or to
// one of the two failure kinds.
pub trait Probe {
    /// Opaque fetch: Ok(()) means the transport completed, regardless of
    /// what status code the server answered with
    async fn opaque(&self, url: &str) -> Result<(), ProbeFailure>;

    /// Transparent fetch: Ok(code) reveals the numeric status code
    async fn transparent(&self, url: &str) -> Result<u16, ProbeFailure>;
}

// The real implementation over reqwest
//
// One client is shared across all probes so connections get pooled.
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            // Follow up to 5 redirects, like a browser would
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(HttpProbe { client })
    }
}

impl Probe for HttpProbe {
    async fn opaque(&self, url: &str) -> Result<(), ProbeFailure> {
        // GET rather than HEAD: some servers reject HEAD outright, and
        // we never read the body anyway. Any response at all - even a
        // 4xx or 5xx - proves the host is reachable.
        match self.client.get(url).timeout(OPAQUE_TIMEOUT).send().await {
            Ok(_response) => Ok(()),
            Err(e) if e.is_timeout() => Err(ProbeFailure::TimedOut),
            Err(_) => Err(ProbeFailure::Unreachable),
        }
    }

    async fn transparent(&self, url: &str) -> Result<u16, ProbeFailure> {
        match self.client.head(url).timeout(TRANSPARENT_TIMEOUT).send().await {
            Ok(response) => Ok(response.status().as_u16()),
            Err(e) if e.is_timeout() => Err(ProbeFailure::TimedOut),
            Err(_) => Err(ProbeFailure::Unreachable),
        }
    }
}

// A deterministic probe for tests: scripted behavior per URL, and a log
// of which URLs were actually probed
#[cfg(test)]
pub mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::{Probe, ProbeFailure};

    /// How the fake network treats one URL
    #[derive(Debug, Clone, Copy)]
    pub enum MockBehavior {
        /// Opaque probe completes
        Reachable,
        /// Opaque probe hits its timeout
        PrimaryTimeout,
        /// Opaque probe fails, transparent probe answers with this code
        Fallback(u16),
        /// Both probes fail
        Dark,
    }

    pub struct MockProbe {
        behaviors: HashMap<String, MockBehavior>,
        probed: Mutex<Vec<String>>,
    }

    impl MockProbe {
        pub fn new(entries: &[(&str, MockBehavior)]) -> Self {
            MockProbe {
                behaviors: entries
                    .iter()
                    .map(|(url, behavior)| (url.to_string(), *behavior))
                    .collect(),
                probed: Mutex::new(Vec::new()),
            }
        }

        fn behavior(&self, url: &str) -> MockBehavior {
            // URLs the script doesn't mention count as reachable
            self.behaviors
                .get(url)
                .copied()
                .unwrap_or(MockBehavior::Reachable)
        }

        /// Every URL the checker handed to the opaque probe, in order
        pub fn probed_urls(&self) -> Vec<String> {
            self.probed.lock().unwrap().clone()
        }
    }

    impl Probe for MockProbe {
        async fn opaque(&self, url: &str) -> Result<(), ProbeFailure> {
            self.probed.lock().unwrap().push(url.to_string());
            match self.behavior(url) {
                MockBehavior::Reachable => Ok(()),
                MockBehavior::PrimaryTimeout => Err(ProbeFailure::TimedOut),
                MockBehavior::Fallback(_) | MockBehavior::Dark => Err(ProbeFailure::Unreachable),
            }
        }

        async fn transparent(&self, url: &str) -> Result<u16, ProbeFailure> {
            match self.behavior(url) {
                MockBehavior::Fallback(code) => Ok(code),
                _ => Err(ProbeFailure::Unreachable),
            }
        }
    }
}
