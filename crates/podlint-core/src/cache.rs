//! Run-scoped, compute-once configuration cache.
//!
//! A [`ConfigCache`] belongs to one analysis run. The first caller of
//! [`ConfigCache::load`] runs the loader; callers arriving while it runs
//! block until it finishes, and every caller receives the same
//! [`Arc<LoadOutcome>`]. Once populated, reads cost a single atomic check.

use crate::pod::{load_document, ConfigDocument, LoadOutcome};
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Produces a [`LoadOutcome`] for a document.
pub trait ConfigLoader: Send + Sync {
    /// Loads `doc`. Called at most once per successful cache fill.
    fn load(&self, doc: &ConfigDocument) -> LoadOutcome;
}

/// The markup pipeline: parse, bind, validate.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupLoader;

impl ConfigLoader for MarkupLoader {
    fn load(&self, doc: &ConfigDocument) -> LoadOutcome {
        load_document(doc)
    }
}

/// Cooperative cancellation signal shared between a run and its callers.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// A flag that is not yet cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The load was cancelled before the pipeline started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("configuration load cancelled before it started")]
pub struct LoadCancelled;

/// Compute-once holder of a run's [`LoadOutcome`].
pub struct ConfigCache {
    document: ConfigDocument,
    loader: Box<dyn ConfigLoader>,
    slot: OnceCell<Arc<LoadOutcome>>,
    loads: AtomicUsize,
}

impl std::fmt::Debug for ConfigCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigCache")
            .field("document", &self.document)
            .field("loaded", &self.slot.get().is_some())
            .finish_non_exhaustive()
    }
}

impl ConfigCache {
    /// Creates a cache that loads `document` through the markup pipeline.
    #[must_use]
    pub fn new(document: ConfigDocument) -> Self {
        Self::with_loader(document, MarkupLoader)
    }

    /// Creates a cache with a custom loader.
    #[must_use]
    pub fn with_loader(document: ConfigDocument, loader: impl ConfigLoader + 'static) -> Self {
        Self {
            document,
            loader: Box::new(loader),
            slot: OnceCell::new(),
            loads: AtomicUsize::new(0),
        }
    }

    /// The document this cache loads.
    #[must_use]
    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    /// Returns the run's outcome, loading it on first use.
    pub fn load(&self) -> Arc<LoadOutcome> {
        Arc::clone(self.slot.get_or_init(|| self.run_loader()))
    }

    /// Like [`load`](Self::load), but gives up if `cancel` is set before
    /// the pipeline starts.
    ///
    /// A cancelled attempt leaves the cache empty, so a later caller can
    /// still load.
    ///
    /// # Errors
    ///
    /// Returns [`LoadCancelled`] if the outcome was not yet computed and
    /// `cancel` was set.
    pub fn try_load(&self, cancel: &CancelFlag) -> Result<Arc<LoadOutcome>, LoadCancelled> {
        self.slot
            .get_or_try_init(|| {
                if cancel.is_cancelled() {
                    warn!("Config load cancelled before parsing");
                    return Err(LoadCancelled);
                }
                Ok(self.run_loader())
            })
            .map(Arc::clone)
    }

    /// Returns the outcome if it has already been computed.
    #[must_use]
    pub fn get(&self) -> Option<Arc<LoadOutcome>> {
        self.slot.get().map(Arc::clone)
    }

    /// Number of times the loader actually ran (0 or 1).
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    fn run_loader(&self) -> Arc<LoadOutcome> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        debug!("Loading config {:?}", self.document.path());

        let outcome = self.loader.load(&self.document);
        info!(
            "Config loaded from {:?}: failure={}, issues={}",
            outcome.source_path,
            outcome.failure.is_some(),
            outcome.issues.len()
        );
        Arc::new(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    struct CountingLoader {
        calls: Arc<AtomicUsize>,
        delay: Duration,
    }

    impl ConfigLoader for CountingLoader {
        fn load(&self, doc: &ConfigDocument) -> LoadOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(self.delay);
            MarkupLoader.load(doc)
        }
    }

    fn counting_cache(text: &str, delay: Duration) -> (ConfigCache, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = ConfigCache::with_loader(
            ConfigDocument::from_text("podlint.xml", text),
            CountingLoader {
                calls: Arc::clone(&calls),
                delay,
            },
        );
        (cache, calls)
    }

    #[test]
    fn concurrent_callers_share_one_load() {
        let (cache, calls) = counting_cache(
            r#"<config><LongLine maxLineLength="80"/></config>"#,
            Duration::from_millis(20),
        );
        let barrier = Barrier::new(20);

        let outcomes: Vec<Arc<LoadOutcome>> = thread::scope(|s| {
            let handles: Vec<_> = (0..20)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        cache.load()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.load_count(), 1);
        assert!(outcomes.iter().all(|o| Arc::ptr_eq(o, &outcomes[0])));
    }

    #[test]
    fn successive_loads_are_identical() {
        let cache = ConfigCache::new(ConfigDocument::from_text(
            "podlint.xml",
            r#"<config><LongLine maxLineLength="a"/></config>"#,
        ));
        let first = cache.load();
        let second = cache.load();
        assert_eq!(*first, *second);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.load_count(), 1);
    }

    #[test]
    fn absent_document_loads_defaults() {
        let cache = ConfigCache::new(ConfigDocument::absent());
        assert!(cache.get().is_none());
        let outcome = cache.load();
        assert!(outcome.is_clean());
        assert!(outcome.source_path.is_none());
        assert!(cache.get().is_some());
    }

    #[test]
    fn cancelled_load_does_not_poison_the_slot() {
        let (cache, calls) = counting_cache("<config/>", Duration::ZERO);
        let cancel = CancelFlag::new();
        cancel.cancel();

        assert_eq!(cache.try_load(&cancel), Err(LoadCancelled));
        assert!(cache.get().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let outcome = cache.try_load(&CancelFlag::new()).unwrap();
        assert!(outcome.is_clean());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancellation_after_fill_still_returns_outcome() {
        let (cache, calls) = counting_cache("<config/>", Duration::ZERO);
        let first = cache.load();

        let cancel = CancelFlag::new();
        cancel.cancel();
        let second = cache.try_load(&cancel).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
