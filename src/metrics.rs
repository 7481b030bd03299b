use std::cell::Cell;

/// Running counters of the events a [`crate::BlockRegistry`] has serviced.
///
/// Obtained by calling [`crate::BlockRegistry::metrics`].
#[derive(Debug, Default)]
pub struct Metrics {
    /// Allocations that had to request a new block from the system.
    pub fresh_allocations: Cell<u64>,

    /// Allocations satisfied by a previously freed block.
    pub reuses: Cell<u64>,

    /// Blocks returned to the reuse pool.
    pub releases: Cell<u64>,

    /// Deallocations of unmanaged or already free addresses.
    pub rejected_deallocations: Cell<u64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_fresh_allocations(&self) -> u64 {
        self.fresh_allocations.get()
    }

    pub fn get_reuses(&self) -> u64 {
        self.reuses.get()
    }

    pub fn get_releases(&self) -> u64 {
        self.releases.get()
    }

    pub fn get_rejected_deallocations(&self) -> u64 {
        self.rejected_deallocations.get()
    }

    /// Total number of successful allocations, fresh or reused.
    pub fn get_total_allocations(&self) -> u64 {
        self.get_fresh_allocations() + self.get_reuses()
    }
}

pub(crate) fn bump(counter: &Cell<u64>) {
    counter.set(counter.get() + 1);
}
