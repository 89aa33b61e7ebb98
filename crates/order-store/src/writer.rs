//! # Persisted Preferences
//!
//! SQLite-backed `PreferenceStore` for the synchronous engine.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  OrderEngine (sync)                                                     │
//! │       │ store.set("userTheme", "dark")                                  │
//! │       ▼                                                                 │
//! │  PersistedPreferences                                                   │
//! │   ├── snapshot.insert(...)      ← reads are served from here            │
//! │   └── tx.send(Set { .. })       ← never blocks                          │
//! │              │                                                          │
//! │              │ unbounded mpsc (FIFO)                                    │
//! │              ▼                                                          │
//! │  writer task (tokio::spawn, exactly one)                                │
//! │   └── PreferenceRepository::set(...)  ← UPSERT, last write wins         │
//! │                                                                         │
//! │  Failures are logged by the writer; the engine never sees them.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use order_core::prefs::{PreferenceKey, PreferenceStore};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::preference::PreferenceRepository;

enum WriteOp {
    Set { key: &'static str, value: String },
    Remove { key: &'static str },
    Flush(oneshot::Sender<()>),
    Shutdown,
}

// =============================================================================
// Store
// =============================================================================

/// Preference store with an in-memory snapshot and asynchronous write-behind.
#[derive(Debug)]
pub struct PersistedPreferences {
    snapshot: HashMap<String, String>,
    tx: mpsc::UnboundedSender<WriteOp>,
}

impl std::fmt::Debug for WriteOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteOp::Set { key, .. } => write!(f, "Set({key})"),
            WriteOp::Remove { key } => write!(f, "Remove({key})"),
            WriteOp::Flush(_) => f.write_str("Flush"),
            WriteOp::Shutdown => f.write_str("Shutdown"),
        }
    }
}

impl PersistedPreferences {
    /// Loads the current preferences and starts the writer task.
    ///
    /// Must be called from inside a tokio runtime.
    pub async fn open(db: &Database) -> DbResult<(Self, PreferenceWriter)> {
        let repo = db.preferences();
        let snapshot = repo.all().await?;
        info!(count = snapshot.len(), "Loaded preferences");

        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_writer(repo, rx));

        let writer = PreferenceWriter {
            tx: tx.clone(),
            handle,
        };
        Ok((PersistedPreferences { snapshot, tx }, writer))
    }

    fn send(&self, op: WriteOp) {
        if let Err(err) = self.tx.send(op) {
            debug!(op = ?err.0, "Preference writer closed, write kept in memory only");
        }
    }
}

impl PreferenceStore for PersistedPreferences {
    fn get(&self, key: PreferenceKey) -> Option<String> {
        self.snapshot.get(key.as_str()).cloned()
    }

    fn set(&mut self, key: PreferenceKey, value: &str) {
        self.snapshot
            .insert(key.as_str().to_string(), value.to_string());
        self.send(WriteOp::Set {
            key: key.as_str(),
            value: value.to_string(),
        });
    }

    fn remove(&mut self, key: PreferenceKey) {
        self.snapshot.remove(key.as_str());
        self.send(WriteOp::Remove { key: key.as_str() });
    }
}

// =============================================================================
// Writer
// =============================================================================

/// Handle to the writer task.
#[derive(Debug)]
pub struct PreferenceWriter {
    tx: mpsc::UnboundedSender<WriteOp>,
    handle: JoinHandle<usize>,
}

impl PreferenceWriter {
    /// Waits until every write queued before this call has been applied.
    pub async fn flush(&self) -> DbResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(WriteOp::Flush(ack_tx))
            .map_err(|_| DbError::WriterClosed)?;
        ack_rx.await.map_err(|_| DbError::WriterClosed)
    }

    /// Applies the remaining queued writes, stops the task and returns how
    /// many writes it applied in total.
    pub async fn shutdown(self) -> DbResult<usize> {
        // A closed channel means the task already stopped; still join it.
        let _ = self.tx.send(WriteOp::Shutdown);
        self.handle
            .await
            .map_err(|e| DbError::Internal(format!("preference writer failed: {e}")))
    }
}

async fn run_writer(repo: PreferenceRepository, mut rx: mpsc::UnboundedReceiver<WriteOp>) -> usize {
    let mut applied = 0;

    while let Some(op) = rx.recv().await {
        let result = match op {
            WriteOp::Set { key, value } => repo.set(key, &value).await,
            WriteOp::Remove { key } => repo.remove(key).await.map(|_| ()),
            WriteOp::Flush(ack) => {
                let _ = ack.send(());
                continue;
            }
            WriteOp::Shutdown => break,
        };

        match result {
            Ok(()) => applied += 1,
            Err(err) => warn!(error = %err, "Failed to persist preference"),
        }
    }

    debug!(applied, "Preference writer stopped");
    applied
}

// =============================================================================
// Unit Tests
// =============================================================================
