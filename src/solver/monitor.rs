//! Live search counters, readable from any thread without locking.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Atomic counters updated by the search as it runs. A host thread can
/// poll [`snapshot`](SearchMonitor::snapshot) while a solve is in
/// flight; each update on the hot path is a single relaxed atomic add.
#[derive(Debug, Default)]
pub struct SearchMonitor {
    nodes: AtomicU64,
    propagations: AtomicU64,
    failures: AtomicU64,
    solutions: AtomicU64,
}

impl SearchMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_node(&self) {
        let _ = self.nodes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_propagation(&self) {
        let _ = self.propagations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_failure(&self) {
        let _ = self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_solution(&self) {
        let _ = self.solutions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn nodes(&self) -> u64 {
        self.nodes.load(Ordering::Relaxed)
    }

    pub fn propagations(&self) -> u64 {
        self.propagations.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn solutions(&self) -> u64 {
        self.solutions.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            nodes: self.nodes(),
            propagations: self.propagations(),
            failures: self.failures(),
            solutions: self.solutions(),
        }
    }
}

/// A point-in-time copy of the monitor counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonitorSnapshot {
    pub nodes: u64,
    pub propagations: u64,
    pub failures: u64,
    pub solutions: u64,
}
