//! Multi-writer accumulator shared by parallel rule checks.
//!
//! A [`ConcurrentBank`] holds three independent containers, each behind its
//! own lock: a symbol set, an invocation list and a reference-symbol set.
//! Writers in different containers never contend. Draining clones a snapshot
//! under the container's lock, so the bank stays writable afterwards.
//!
//! The bank does not order writers against readers. A caller that needs
//! every insert in a snapshot must join its writers first.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::hash::Hash;
use tracing::debug;

/// Thread-safe store of symbols, invocations and reference symbols.
#[derive(Debug)]
pub struct ConcurrentBank<S, I, R> {
    symbols: Mutex<HashSet<S>>,
    invocations: Mutex<Vec<I>>,
    reference_symbols: Mutex<HashSet<R>>,
}

impl<S, I, R> Default for ConcurrentBank<S, I, R> {
    fn default() -> Self {
        Self {
            symbols: Mutex::new(HashSet::new()),
            invocations: Mutex::new(Vec::new()),
            reference_symbols: Mutex::new(HashSet::new()),
        }
    }
}

impl<S, I, R> ConcurrentBank<S, I, R>
where
    S: Eq + Hash + Clone,
    I: Clone,
    R: Eq + Hash + Clone,
{
    /// Creates an empty bank.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a batch of symbols.
    pub fn add_symbols(&self, batch: impl IntoIterator<Item = S>) {
        self.symbols.lock().extend(batch);
    }

    /// Appends a batch of invocations, keeping their order within the batch.
    pub fn add_invocations(&self, batch: impl IntoIterator<Item = I>) {
        self.invocations.lock().extend(batch);
    }

    /// Inserts a batch of reference symbols.
    pub fn add_reference_symbols(&self, batch: impl IntoIterator<Item = R>) {
        self.reference_symbols.lock().extend(batch);
    }

    /// Snapshot of all symbols.
    #[must_use]
    pub fn all_symbols(&self) -> HashSet<S> {
        let snapshot = self.symbols.lock().clone();
        debug!("Drained {} symbols", snapshot.len());
        snapshot
    }

    /// Snapshot of all invocations.
    #[must_use]
    pub fn all_invocations(&self) -> Vec<I> {
        let snapshot = self.invocations.lock().clone();
        debug!("Drained {} invocations", snapshot.len());
        snapshot
    }

    /// Snapshot of all reference symbols.
    #[must_use]
    pub fn all_reference_symbols(&self) -> HashSet<R> {
        let snapshot = self.reference_symbols.lock().clone();
        debug!("Drained {} reference symbols", snapshot.len());
        snapshot
    }

    /// Number of distinct symbols.
    #[must_use]
    pub fn symbol_count(&self) -> usize {
        self.symbols.lock().len()
    }

    /// Number of recorded invocations.
    #[must_use]
    pub fn invocation_count(&self) -> usize {
        self.invocations.lock().len()
    }

    /// Number of distinct reference symbols.
    #[must_use]
    pub fn reference_symbol_count(&self) -> usize {
        self.reference_symbols.lock().len()
    }
}
