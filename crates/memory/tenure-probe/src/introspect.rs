//! Runtime introspection seam
//!
//! The probe never talks to a concrete runtime. Each target supplies an
//! adapter implementing [`RuntimeIntrospector`] (read-only memory and
//! collector statistics) and [`ManagedAllocator`] (allocation inside the
//! probed heap).

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, warn};

use crate::{ProbeError, ProbeResult};

/// Snapshot of one generation at an instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegionUsage {
    /// Committed capacity in bytes
    pub committed: usize,
    /// Used bytes
    pub used: usize,
}

impl RegionUsage {
    /// Create a new usage snapshot
    pub fn new(committed: usize, used: usize) -> Self {
        Self { committed, used }
    }

    /// `used <= committed`, which any well-behaved runtime reports
    pub fn is_consistent(&self) -> bool {
        self.used <= self.committed
    }
}

/// Identifier of one collector instance
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectorId(String);

impl CollectorId {
    /// Create a collector id from its reported name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Collector name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only view of a generational runtime
pub trait RuntimeIntrospector {
    /// Current young generation capacity and usage
    fn young_generation_usage(&self) -> RegionUsage;

    /// Current tenured generation capacity and usage
    fn tenured_generation_usage(&self) -> RegionUsage;

    /// Collectors that service the young generation
    fn young_generation_collectors(&self) -> Vec<CollectorId>;

    /// Number of completed cycles of one collector
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::MissingCollector`] if the runtime does not know `id`
    fn collection_count(&self, id: &CollectorId) -> ProbeResult<u64>;

    /// Name of the young generation region, used in findings
    fn young_generation_name(&self) -> &str {
        "young generation"
    }

    /// Name of the tenured generation region, used in findings
    fn tenured_generation_name(&self) -> &str {
        "tenured generation"
    }
}

/// Allocation inside the probed heap
pub trait ManagedAllocator {
    /// Allocate a zero-filled block of `size` bytes in the managed heap
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot satisfy the request
    fn allocate_bytes(&self, size: usize) -> ProbeResult<Box<[u8]>>;
}

/// A runtime the prober can drive
pub trait ManagedRuntime: RuntimeIntrospector + ManagedAllocator {}

impl<T: RuntimeIntrospector + ManagedAllocator + ?Sized> ManagedRuntime for T {}

/// Collection counts per collector, taken at one instant
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CollectorSnapshot {
    counts: BTreeMap<CollectorId, u64>,
}

impl CollectorSnapshot {
    /// Read the current count of every collector in `collectors`
    ///
    /// # Errors
    ///
    /// Propagates [`ProbeError::MissingCollector`] from the runtime
    pub fn capture<R>(runtime: &R, collectors: &[CollectorId]) -> ProbeResult<Self>
    where
        R: RuntimeIntrospector + ?Sized,
    {
        let mut counts = BTreeMap::new();
        for id in collectors {
            counts.insert(id.clone(), runtime.collection_count(id)?);
        }
        Ok(Self { counts })
    }

    /// Build a snapshot from explicit counts
    pub fn from_counts<I, S>(counts: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        Self {
            counts: counts
                .into_iter()
                .map(|(name, count)| (CollectorId::new(name), count))
                .collect(),
        }
    }

    /// Count recorded for `id`
    pub fn get(&self, id: &CollectorId) -> Option<u64> {
        self.counts.get(id).copied()
    }

    /// Recorded collectors and counts, ordered by id
    pub fn iter(&self) -> impl Iterator<Item = (&CollectorId, u64)> {
        self.counts.iter().map(|(id, count)| (id, *count))
    }

    /// Number of tracked collectors
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True if no collector is tracked
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Collectors and region names resolved once, before probing
#[derive(Debug, Clone)]
pub struct RuntimeBinding {
    collectors: Vec<CollectorId>,
    young_name: String,
    tenured_name: String,
}

impl RuntimeBinding {
    /// Discover the young generation collectors and check each is queryable
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::NoYoungCollectors`] or
    /// [`ProbeError::MissingCollector`]; both are fatal configuration errors
    pub fn bind<R>(runtime: &R) -> ProbeResult<Self>
    where
        R: RuntimeIntrospector + ?Sized,
    {
        let collectors = runtime.young_generation_collectors();
        if collectors.is_empty() {
            return Err(ProbeError::NoYoungCollectors);
        }

        for id in &collectors {
            let count = runtime.collection_count(id)?;
            debug!("Collector {} has run {} times", id, count);
        }

        let young = runtime.young_generation_usage();
        let tenured = runtime.tenured_generation_usage();
        if !young.is_consistent() || !tenured.is_consistent() {
            warn!(
                "Runtime reports used bytes above committed capacity (young {:?}, tenured {:?})",
                young, tenured
            );
        }

        Ok(Self {
            collectors,
            young_name: runtime.young_generation_name().to_string(),
            tenured_name: runtime.tenured_generation_name().to_string(),
        })
    }

    /// Young generation collectors
    pub fn collectors(&self) -> &[CollectorId] {
        &self.collectors
    }

    /// Young generation region name
    pub fn young_name(&self) -> &str {
        &self.young_name
    }

    /// Tenured generation region name
    pub fn tenured_name(&self) -> &str {
        &self.tenured_name
    }
}
