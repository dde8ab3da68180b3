//! Coalesced asynchronous rebuilds with stale-result suppression
//!
//! Every mutation synchronously bumps a monotonic `requested` counter and
//! nudges a worker thread. The worker drains queued requests down to the
//! newest one, rebuilds, and publishes only if its captured version is still
//! the highest requested. Rapid successive mutations therefore collapse into
//! at most one real rebuild plus possibly one extra in-flight one, and a
//! slow stale build can never overwrite a newer snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, RwLock};
use std::thread;

use crate::resolve::{self, ResolvedSnapshot};
use crate::section::InputSection;

/// Serialized publication point: the monotonic version counter plus the
/// currently published snapshot.
///
/// Matchers read `current()` lock-free of the builder: snapshots are
/// immutable `Arc`s, so a keystroke at worst sees the previous generation.
#[derive(Debug)]
pub struct SnapshotGate {
    requested: AtomicU64,
    published: RwLock<Arc<ResolvedSnapshot>>,
}

impl SnapshotGate {
    pub fn new() -> Self {
        Self {
            requested: AtomicU64::new(0),
            published: RwLock::new(Arc::new(ResolvedSnapshot::empty())),
        }
    }

    /// Claim the next rebuild version. Called synchronously on every mutation.
    pub fn request(&self) -> u64 {
        self.requested.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Highest version requested so far
    pub fn requested_version(&self) -> u64 {
        self.requested.load(Ordering::SeqCst)
    }

    /// The latest published snapshot
    pub fn current(&self) -> Arc<ResolvedSnapshot> {
        match self.published.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Publish a completed build, unless it is stale.
    ///
    /// A build is stale if a newer version has been requested since it was
    /// captured, or if a newer snapshot is already published. Stale builds
    /// are discarded silently; that is expected, not an error.
    pub fn publish(&self, snapshot: ResolvedSnapshot) -> Option<Arc<ResolvedSnapshot>> {
        let version = snapshot.version();
        if version < self.requested_version() {
            tracing::debug!(version, newest = self.requested_version(), "discarding stale rebuild");
            return None;
        }
        let mut guard = match self.published.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if version <= guard.version() {
            tracing::debug!(version, published = guard.version(), "discarding out-of-order rebuild");
            return None;
        }
        let snapshot = Arc::new(snapshot);
        *guard = snapshot.clone();
        Some(snapshot)
    }
}

impl Default for SnapshotGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Async rebuild trigger for one consumer.
///
/// Owns the worker thread that turns "something changed" notifications into
/// published snapshots. The `source` closure captures handles to the shared
/// and consumer stacks and clones their enabled sections at build time.
pub struct RebuildScheduler {
    gate: Arc<SnapshotGate>,
    // Sender is not Sync; the scheduler is shared across threads via Arc
    trigger_tx: Mutex<Sender<u64>>,
    subscribers: Arc<Mutex<Vec<Sender<Arc<ResolvedSnapshot>>>>>,
}

impl RebuildScheduler {
    pub fn new<F>(source: F) -> Self
    where
        F: Fn() -> (Vec<InputSection>, Vec<InputSection>) + Send + 'static,
    {
        let gate = Arc::new(SnapshotGate::new());
        let subscribers: Arc<Mutex<Vec<Sender<Arc<ResolvedSnapshot>>>>> =
            Arc::new(Mutex::new(Vec::new()));
        let (trigger_tx, trigger_rx) = mpsc::channel::<u64>();

        let worker_gate = gate.clone();
        let worker_subscribers = subscribers.clone();
        thread::Builder::new()
            .name("keystack-rebuild".to_string())
            .spawn(move || {
                run_worker(trigger_rx, worker_gate, worker_subscribers, source);
            })
            .ok();

        Self { gate, trigger_tx: Mutex::new(trigger_tx), subscribers }
    }

    /// Note that the stacks changed and a rebuild is needed. Cheap; safe to
    /// call in tight loops.
    pub fn trigger(&self) {
        let version = self.gate.request();
        if let Ok(tx) = self.trigger_tx.lock() {
            // Worker gone means we are shutting down; nothing to do
            let _ = tx.send(version);
        }
    }

    /// The latest published snapshot
    pub fn current(&self) -> Arc<ResolvedSnapshot> {
        self.gate.current()
    }

    pub fn gate(&self) -> &SnapshotGate {
        &self.gate
    }

    /// Receive every snapshot published from now on
    pub fn subscribe(&self) -> Receiver<Arc<ResolvedSnapshot>> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }
}

impl std::fmt::Debug for RebuildScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RebuildScheduler")
            .field("requested", &self.gate.requested_version())
            .field("published", &self.gate.current().version())
            .finish()
    }
}

fn run_worker<F>(
    trigger_rx: Receiver<u64>,
    gate: Arc<SnapshotGate>,
    subscribers: Arc<Mutex<Vec<Sender<Arc<ResolvedSnapshot>>>>>,
    source: F,
) where
    F: Fn() -> (Vec<InputSection>, Vec<InputSection>),
{
    // Exits when the scheduler (the only Sender) is dropped
    while let Ok(mut version) = trigger_rx.recv() {
        // Coalesce: drain queued requests down to the newest one
        while let Ok(newer) = trigger_rx.try_recv() {
            version = newer;
        }

        let (shared, consumer) = source();
        let snapshot = resolve::build(version, &shared, &consumer);
        if let Some(published) = gate.publish(snapshot) {
            tracing::debug!(version = published.version(), "published binding snapshot");
            if let Ok(mut subscribers) = subscribers.lock() {
                subscribers.retain(|tx| tx.send(published.clone()).is_ok());
            }
        }
    }
}
