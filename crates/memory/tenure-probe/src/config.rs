//! Probe configuration

use crate::{ProbeError, ProbeResult};

/// Default initial probe size (64KB)
pub const DEFAULT_INITIAL_SIZE: usize = 64 * 1024;

/// Default number of attempts per size
pub const DEFAULT_RETRY_BUDGET: u32 = 5;

/// Probe configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// First size tested, in bytes
    pub initial_size: usize,

    /// Attempts per size before giving up on classifying it
    pub retry_budget: u32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            initial_size: DEFAULT_INITIAL_SIZE,
            retry_budget: DEFAULT_RETRY_BUDGET,
        }
    }
}

impl ProbeConfig {
    /// Configuration starting at `initial_size` with the default retry budget
    pub fn with_initial_size(initial_size: usize) -> Self {
        Self {
            initial_size,
            ..Self::default()
        }
    }

    /// Check that the search can make progress
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::InvalidConfig`] for a zero size or retry budget
    pub fn validate(&self) -> ProbeResult<()> {
        if self.initial_size == 0 {
            return Err(ProbeError::invalid_config("initial size must be positive"));
        }
        if self.retry_budget == 0 {
            return Err(ProbeError::invalid_config("retry budget must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ProbeConfig::default();
        assert_eq!(config.initial_size, 65536);
        assert_eq!(config.retry_budget, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_size_rejected() {
        let config = ProbeConfig::with_initial_size(0);
        assert!(matches!(
            config.validate(),
            Err(ProbeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_budget_rejected() {
        let config = ProbeConfig {
            retry_budget: 0,
            ..ProbeConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
