use std::sync::atomic::{AtomicUsize, Ordering};

/// Process-wide identity registry.
///
/// Every cell and binding is assigned a surrogate key exactly once, at
/// construction, and memoizes it in its handle from then on. Keys are never
/// reused, so a key uniquely names a participant for the lifetime of the
/// process. Subscriber lists deduplicate and remove entries by key.
struct IdRegistry {
    next: AtomicUsize,
}

impl IdRegistry {
    const fn new() -> Self {
        Self {
            next: AtomicUsize::new(0),
        }
    }

    fn assign(&self) -> usize {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

static REGISTRY: IdRegistry = IdRegistry::new();

/// Assign the next surrogate key.
pub(crate) fn next_id() -> usize {
    REGISTRY.assign()
}
