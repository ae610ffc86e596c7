//! Client-side engagement tracking.
//!
//! "Unique" read and download metrics are approximated with a client-local
//! ledger: each installation remembers which resources it already counted
//! and triggers at most one server-side increment per resource and counter
//! kind. The ledger is a trusted-client heuristic, not a security boundary;
//! a client that clears its ledger will recount.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::resource::{CounterKind, ResourceStore};
use crate::Result;

/// Persisted ledger content.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerState {
    #[serde(default)]
    read: HashSet<String>,
    #[serde(default)]
    downloaded: HashSet<String>,
}

/// Per-installation record of which resources were already counted.
///
/// Backed by a JSON file when a path is given; a missing or unreadable file
/// starts an empty ledger. Entries never expire.
#[derive(Debug)]
pub struct EngagementLedger {
    path: Option<PathBuf>,
    state: LedgerState,
}

impl EngagementLedger {
    /// Ledger without persistence.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: LedgerState::default(),
        }
    }

    /// Load the ledger from a JSON file, starting empty when the file does
    /// not exist or cannot be parsed.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "unreadable ledger, starting fresh");
                LedgerState::default()
            }),
            Err(_) => LedgerState::default(),
        };

        Self {
            path: Some(path),
            state,
        }
    }

    /// Whether this resource was already counted for the given kind.
    pub fn is_counted(&self, counter: CounterKind, resource_id: &str) -> bool {
        self.entries(counter).contains(resource_id)
    }

    /// Record a counted resource and persist the ledger.
    pub fn mark(&mut self, counter: CounterKind, resource_id: &str) -> Result<()> {
        let inserted = match counter {
            CounterKind::Read => self.state.read.insert(resource_id.to_string()),
            CounterKind::Download => self.state.downloaded.insert(resource_id.to_string()),
        };

        if inserted {
            self.persist()?;
        }

        Ok(())
    }

    fn entries(&self, counter: CounterKind) -> &HashSet<String> {
        match counter {
            CounterKind::Read => &self.state.read,
            CounterKind::Download => &self.state.downloaded,
        }
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = Path::new(path).parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string(&self.state).map_err(std::io::Error::other)?;
        std::fs::write(path, content)?;

        Ok(())
    }
}

/// De-duplicated engagement counting: ledger check, then one atomic
/// server-side increment, then ledger mark.
///
/// The check and the mark are separate critical sections, so two
/// near-simultaneous actions from the same client can still double-count;
/// that narrow window is accepted for approximate metrics.
pub struct EngagementTracker {
    store: Arc<dyn ResourceStore>,
    ledger: Mutex<EngagementLedger>,
}

impl EngagementTracker {
    /// Create a tracker over the given store and ledger.
    pub fn new(store: Arc<dyn ResourceStore>, ledger: EngagementLedger) -> Self {
        Self {
            store,
            ledger: Mutex::new(ledger),
        }
    }

    /// Count a preview action. Returns whether an increment was issued.
    pub async fn record_read(&self, resource_id: &str) -> Result<bool> {
        self.record(resource_id, CounterKind::Read).await
    }

    /// Count a download action. Returns whether an increment was issued.
    pub async fn record_download(&self, resource_id: &str) -> Result<bool> {
        self.record(resource_id, CounterKind::Download).await
    }

    async fn record(&self, resource_id: &str, counter: CounterKind) -> Result<bool> {
        if self.ledger.lock().unwrap().is_counted(counter, resource_id) {
            return Ok(false);
        }

        self.store.increment(resource_id, counter).await?;

        let mut ledger = self.ledger.lock().unwrap();
        if let Err(e) = ledger.mark(counter, resource_id) {
            tracing::warn!(
                resource_id,
                counter = %counter,
                error = %e,
                "counted but failed to persist ledger"
            );
        }

        Ok(true)
    }
}
