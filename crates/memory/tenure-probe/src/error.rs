//! Error types for the tenured allocation probe

/// Probe operation result type
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can stop a probe run
///
/// Interference from a collection is not represented here: it is an
/// attempt outcome and is retried by the prober.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The checksum over a freshly allocated block was not zero
    #[error("Integrity fault: checksum of {size} freshly allocated bytes was {checksum}")]
    IntegrityFault {
        /// Size of the allocated block
        size: usize,
        /// Observed checksum
        checksum: u64,
    },

    /// The runtime handed back a block of the wrong length
    #[error("Integrity fault: requested {size} bytes, runtime returned {len}")]
    TruncatedBlock {
        /// Requested size
        size: usize,
        /// Length of the returned block
        len: usize,
    },

    /// The runtime does not report any collector for the young generation
    #[error("No collector services the young generation")]
    NoYoungCollectors,

    /// A collector listed at startup cannot be queried
    #[error("Collector not found: {0}")]
    MissingCollector(String),

    /// Invalid configuration
    #[error("Invalid probe configuration: {0}")]
    InvalidConfig(String),

    /// Doubling the probe size would overflow
    #[error("Probe size {size} cannot be doubled without overflow")]
    SizeOverflow {
        /// Last size that was probed
        size: usize,
    },

    /// The runtime could not satisfy the allocation at all
    #[error("Out of memory: requested {required} bytes, available {available} bytes")]
    OutOfMemory {
        /// Requested bytes
        required: usize,
        /// Available bytes
        available: usize,
    },

    /// Writing a finding failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProbeError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a missing collector error
    pub fn missing_collector(name: impl Into<String>) -> Self {
        Self::MissingCollector(name.into())
    }

    /// Create an out of memory error
    pub fn out_of_memory(required: usize, available: usize) -> Self {
        Self::OutOfMemory {
            required,
            available,
        }
    }

    /// Whether the error invalidates the measurement technique itself
    pub fn is_integrity_fault(&self) -> bool {
        matches!(
            self,
            Self::IntegrityFault { .. } | Self::TruncatedBlock { .. }
        )
    }
}
