//! Exponential search for the direct tenured allocation threshold
//!
//! Starting from the configured size, each round allocates one block and
//! classifies where it landed. The size doubles after every round whose
//! size was still below the young generation capacity measured before the
//! attempt; the first round at or above that capacity is the last one.
//! The reported threshold is therefore accurate to within a factor of 2.
//!
//! An attempt during which any young generation collector ran is discarded
//! and retried with the same size, up to the retry budget. A size that
//! never gets a quiet attempt is reported as unclassified and the search
//! moves on. A size whose double would overflow fails the search before
//! it is allocated.

use std::io::Write;

use log::{debug, info, warn};

use crate::classifier::{self, Classification};
use crate::config::ProbeConfig;
use crate::detector;
use crate::introspect::{CollectorSnapshot, ManagedRuntime, RuntimeBinding};
use crate::report::Reporter;
use crate::workload;
use crate::{ProbeError, ProbeResult};

/// Prober state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    /// Attempting `size` with no retry pending
    Searching {
        /// Size under test
        size: usize,
    },
    /// A collection spoiled an attempt for `size`
    Retrying {
        /// Size under test
        size: usize,
        /// Attempts left
        remaining: u32,
    },
    /// Search finished
    Done {
        /// Last size tested
        size: usize,
        /// Young generation capacity at the end
        capacity: usize,
    },
}

/// Outcome of the attempts for one size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// A quiet attempt was classified
    Accepted(Classification),
    /// The last attempt saw a collection; more attempts remain
    Interfered,
    /// Every attempt saw a collection
    Exhausted,
}

/// Attempts for one requested size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeAttempt {
    /// Size under test
    pub requested_size: usize,
    /// Attempts left
    pub retries_remaining: u32,
    /// Latest outcome, `None` before the first attempt
    pub outcome: Option<AttemptOutcome>,
}

impl ProbeAttempt {
    /// New attempt for `requested_size` with `budget` tries
    pub fn new(requested_size: usize, budget: u32) -> Self {
        Self {
            requested_size,
            retries_remaining: budget,
            outcome: None,
        }
    }

    /// Record a quiet, classified attempt
    pub fn accept(&mut self, classification: Classification) {
        self.retries_remaining = self.retries_remaining.saturating_sub(1);
        self.outcome = Some(AttemptOutcome::Accepted(classification));
    }

    /// Record an attempt spoiled by a collection
    pub fn interfere(&mut self) {
        self.retries_remaining = self.retries_remaining.saturating_sub(1);
        self.outcome = Some(if self.retries_remaining == 0 {
            AttemptOutcome::Exhausted
        } else {
            AttemptOutcome::Interfered
        });
    }

    /// Accepted or exhausted
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.outcome,
            Some(AttemptOutcome::Accepted(_) | AttemptOutcome::Exhausted)
        )
    }
}

/// Result of one search round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeRound {
    /// Size tested
    pub size: usize,
    /// Young generation capacity measured before the attempts
    pub capacity_before: usize,
    /// Terminal outcome, `Accepted` or `Exhausted`
    pub outcome: AttemptOutcome,
    /// Attempts spent on this size
    pub attempts: u32,
}

impl ProbeRound {
    /// Classification, if a quiet attempt was found
    pub fn classification(&self) -> Option<Classification> {
        match self.outcome {
            AttemptOutcome::Accepted(classification) => Some(classification),
            _ => None,
        }
    }
}

/// Everything a completed search observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    /// Rounds in the order they ran
    pub rounds: Vec<ProbeRound>,
    /// Size of the terminal round
    pub final_size: usize,
    /// Young generation capacity after the terminal round
    pub final_capacity: usize,
}

impl ProbeReport {
    /// Smallest size classified as a direct tenured allocation
    pub fn first_direct_tenured(&self) -> Option<usize> {
        self.rounds
            .iter()
            .find(|round| round.classification() == Some(Classification::DirectTenuredAllocation))
            .map(|round| round.size)
    }
}

/// Drives the search against one runtime
pub struct Prober<'r, R: ?Sized, O, E> {
    runtime: &'r R,
    binding: RuntimeBinding,
    config: ProbeConfig,
    reporter: Reporter<O, E>,
    state: ProbeState,
}

impl<'r, R, O, E> Prober<'r, R, O, E>
where
    R: ManagedRuntime + ?Sized,
    O: Write,
    E: Write,
{
    /// Validate `config` and bind the runtime's collectors
    ///
    /// # Errors
    ///
    /// Returns configuration errors before any allocation happens
    pub fn new(runtime: &'r R, config: ProbeConfig, reporter: Reporter<O, E>) -> ProbeResult<Self> {
        config.validate()?;
        let binding = RuntimeBinding::bind(runtime)?;
        debug!(
            "Probing {} with {} collectors",
            binding.young_name(),
            binding.collectors().len()
        );

        Ok(Self {
            runtime,
            binding,
            state: ProbeState::Searching {
                size: config.initial_size,
            },
            config,
            reporter,
        })
    }

    /// Current state
    pub fn state(&self) -> ProbeState {
        self.state
    }

    /// Runtime binding resolved at construction
    pub fn binding(&self) -> &RuntimeBinding {
        &self.binding
    }

    /// Consume the prober and return its reporter
    pub fn into_reporter(self) -> Reporter<O, E> {
        self.reporter
    }

    /// Run the search to completion
    ///
    /// # Errors
    ///
    /// Stops on an integrity fault, a runtime allocation failure, an output
    /// failure, or a size that cannot be doubled
    pub fn run(&mut self) -> ProbeResult<ProbeReport> {
        let mut size = self.config.initial_size;
        let mut rounds = Vec::new();

        loop {
            self.state = ProbeState::Searching { size };
            let capacity_before = self.runtime.young_generation_usage().committed;
            let next = if size < capacity_before {
                Some(size.checked_mul(2).ok_or(ProbeError::SizeOverflow { size })?)
            } else {
                None
            };

            rounds.push(self.probe_size(size, capacity_before)?);

            match next {
                Some(next) => size = next,
                None => break,
            }
        }

        let final_capacity = self.runtime.young_generation_usage().committed;
        self.reporter.exceeded(size, final_capacity)?;
        info!(
            "Search stopped at {} bytes (capacity {}) after {} rounds",
            size,
            final_capacity,
            rounds.len()
        );
        self.state = ProbeState::Done {
            size,
            capacity: final_capacity,
        };

        Ok(ProbeReport {
            rounds,
            final_size: size,
            final_capacity,
        })
    }

    /// Attempt one size until a quiet attempt or the budget runs out
    fn probe_size(&mut self, size: usize, capacity_before: usize) -> ProbeResult<ProbeRound> {
        let mut attempt = ProbeAttempt::new(size, self.config.retry_budget);
        let mut attempts = 0;

        let outcome = loop {
            attempts += 1;
            match self.attempt_once(size)? {
                Some(classification) => {
                    let capacity = self.runtime.young_generation_usage().committed;
                    self.reporter.classified(classification, size, capacity)?;
                    info!("{} bytes: {}", size, classification);
                    attempt.accept(classification);
                    break AttemptOutcome::Accepted(classification);
                }
                None => {
                    attempt.interfere();
                    if attempt.is_terminal() {
                        warn!("{} bytes could not be classified in {} attempts", size, attempts);
                        self.reporter.unclassified(size)?;
                        break AttemptOutcome::Exhausted;
                    }
                    self.state = ProbeState::Retrying {
                        size,
                        remaining: attempt.retries_remaining,
                    };
                }
            }
        };
        self.state = ProbeState::Searching { size };

        Ok(ProbeRound {
            size,
            capacity_before,
            outcome,
            attempts,
        })
    }

    /// One measurement; `None` if a collection ran during it
    fn attempt_once(&mut self, size: usize) -> ProbeResult<Option<Classification>> {
        let tenured_before = self.runtime.tenured_generation_usage();
        let before = CollectorSnapshot::capture(self.runtime, self.binding.collectors())?;

        workload::allocate(self.runtime, size)?;

        let after = CollectorSnapshot::capture(self.runtime, self.binding.collectors())?;
        let tenured_after = self.runtime.tenured_generation_usage();

        if let Some(collector) = detector::advanced_collector(&before, &after) {
            debug!("Attempt for {} bytes spoiled by {}", size, collector);
            self.reporter.interference(collector)?;
            return Ok(None);
        }

        if !tenured_after.is_consistent() {
            warn!("Runtime reports inconsistent tenured usage {:?}", tenured_after);
        }

        Ok(Some(classifier::classify(&tenured_before, &tenured_after)))
    }
}
