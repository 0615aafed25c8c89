//! Shared test runtime
//!
//! `ScriptedRuntime` has a fixed young generation capacity and a single
//! young collector whose cycles are scripted per allocation.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::{self, Write};

use tenure_probe::{
    CollectorId, ManagedAllocator, ProbeError, ProbeResult, RegionUsage, Reporter,
    RuntimeIntrospector,
};

pub const COLLECTOR: &str = "Scripted Young";

/// Tenured growth caused by a scripted collection
pub const PROMOTED_ON_COLLECTION: usize = 4096;

pub struct ScriptedRuntime {
    young_capacity: usize,
    tenure_from: Option<usize>,
    dirty_from: Option<usize>,
    unknown_collector: bool,
    collections: RefCell<VecDeque<bool>>,
    tenured_used: Cell<usize>,
    cycles: Cell<u64>,
    allocations: RefCell<Vec<usize>>,
}

impl ScriptedRuntime {
    pub fn new(young_capacity: usize) -> Self {
        Self {
            young_capacity,
            tenure_from: None,
            dirty_from: None,
            unknown_collector: false,
            collections: RefCell::new(VecDeque::new()),
            tenured_used: Cell::new(0),
            cycles: Cell::new(0),
            allocations: RefCell::new(Vec::new()),
        }
    }

    /// Objects of at least `size` bytes land in the tenured generation
    pub fn tenure_from(mut self, size: usize) -> Self {
        self.tenure_from = Some(size);
        self
    }

    /// Per allocation, whether a collection runs during it; quiet afterwards
    pub fn collections(self, script: impl IntoIterator<Item = bool>) -> Self {
        self.collections.borrow_mut().extend(script);
        self
    }

    /// Hand out blocks with non-zero content
    pub fn dirty(self) -> Self {
        self.dirty_from(0)
    }

    /// Hand out non-zero blocks from the `index`-th allocation on
    pub fn dirty_from(mut self, index: usize) -> Self {
        self.dirty_from = Some(index);
        self
    }

    /// List a collector that cannot be queried
    pub fn unknown_collector(mut self) -> Self {
        self.unknown_collector = true;
        self
    }

    pub fn allocations(&self) -> Vec<usize> {
        self.allocations.borrow().clone()
    }

    pub fn cycles(&self) -> u64 {
        self.cycles.get()
    }
}

impl RuntimeIntrospector for ScriptedRuntime {
    fn young_generation_usage(&self) -> RegionUsage {
        RegionUsage::new(self.young_capacity, 0)
    }

    fn tenured_generation_usage(&self) -> RegionUsage {
        RegionUsage::new(usize::MAX, self.tenured_used.get())
    }

    fn young_generation_collectors(&self) -> Vec<CollectorId> {
        let mut ids = vec![CollectorId::new(COLLECTOR)];
        if self.unknown_collector {
            ids.push(CollectorId::new("Vanished"));
        }
        ids
    }

    fn collection_count(&self, id: &CollectorId) -> ProbeResult<u64> {
        if id.as_str() == COLLECTOR {
            Ok(self.cycles.get())
        } else {
            Err(ProbeError::missing_collector(id.as_str()))
        }
    }
}

impl ManagedAllocator for ScriptedRuntime {
    fn allocate_bytes(&self, size: usize) -> ProbeResult<Box<[u8]>> {
        let index = {
            let mut allocations = self.allocations.borrow_mut();
            allocations.push(size);
            allocations.len() - 1
        };

        let collects = self.collections.borrow_mut().pop_front().unwrap_or(false);
        if collects {
            self.cycles.set(self.cycles.get() + 1);
            self.tenured_used
                .set(self.tenured_used.get() + PROMOTED_ON_COLLECTION);
        }

        if self.tenure_from.is_some_and(|threshold| size >= threshold) {
            self.tenured_used
                .set(self.tenured_used.get().saturating_add(size));
        }

        let dirty = self.dirty_from.is_some_and(|from| index >= from);
        let fill = if dirty { 1 } else { 0 };
        Ok(vec![fill; size].into_boxed_slice())
    }
}

pub fn buffers() -> Reporter<Vec<u8>, Vec<u8>> {
    Reporter::new(Vec::new(), Vec::new(), "Eden", "Old")
}

pub fn text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).expect("probe output is UTF-8")
}

/// Writer that rejects every write
pub struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::from(io::ErrorKind::BrokenPipe))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
