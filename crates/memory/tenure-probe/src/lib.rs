//! # Tenured Allocation Probe
//!
//! Finds the allocation size at which a generational collector stops
//! placing new objects in the young generation and allocates them directly
//! in the tenured generation.
//!
//! ## Architecture
//!
//! ```text
//!     Prober ──► CollectorSnapshot (before)
//!        │   ──► workload::allocate
//!        │   ──► CollectorSnapshot (after) ──► detector::occurred
//!        │   ──► classifier::classify
//!        ▼
//!     Reporter (stdout findings / stderr notices)
//! ```
//!
//! The runtime under test is reached only through [`RuntimeIntrospector`]
//! and [`ManagedAllocator`]. [`GenerationalHeap`] is a simulated
//! generational runtime implementing both.
//!
//! ## Usage
//!
//! ```no_run
//! use tenure_probe::{GenerationalHeap, HeapConfig, ProbeConfig, Prober, Reporter};
//!
//! # fn main() -> tenure_probe::ProbeResult<()> {
//! let heap = GenerationalHeap::new(HeapConfig::default())?;
//! let reporter = Reporter::stdio("Eden", "Old");
//! let mut prober = Prober::new(&heap, ProbeConfig::default(), reporter)?;
//! let report = prober.run()?;
//! println!("threshold below {}", report.final_size);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unused_imports)]

pub mod classifier;
pub mod config;
pub mod detector;
pub mod error;
pub mod generational;
pub mod introspect;
pub mod prober;
pub mod report;
pub mod workload;

pub use classifier::{Classification, classify};
pub use config::{DEFAULT_INITIAL_SIZE, DEFAULT_RETRY_BUDGET, ProbeConfig};
pub use error::{ProbeError, ProbeResult};
pub use generational::config::{HeapConfig, OldGenConfig, YoungGenConfig};
pub use generational::{CollectionStats, GenerationalHeap};
pub use introspect::{
    CollectorId, CollectorSnapshot, ManagedAllocator, ManagedRuntime, RegionUsage,
    RuntimeBinding, RuntimeIntrospector,
};
pub use prober::{AttemptOutcome, ProbeAttempt, ProbeReport, ProbeRound, ProbeState, Prober};
pub use report::Reporter;
