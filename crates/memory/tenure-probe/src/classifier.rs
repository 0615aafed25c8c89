//! Result classification from tenured generation occupancy

use std::fmt;

use crate::introspect::RegionUsage;

/// Where a tested allocation landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The object went straight to the tenured generation
    DirectTenuredAllocation,
    /// The object was absorbed by the young generation
    YoungGenerationAllocation,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectTenuredAllocation => f.write_str("direct tenured allocation"),
            Self::YoungGenerationAllocation => f.write_str("young generation allocation"),
        }
    }
}

/// Classify one allocation from tenured usage taken just before and after it
///
/// Any change in tenured occupancy is attributed to the tested object. The
/// caller must discard attempts during which a collection ran.
pub fn classify(tenured_before: &RegionUsage, tenured_after: &RegionUsage) -> Classification {
    if tenured_after.used != tenured_before.used {
        Classification::DirectTenuredAllocation
    } else {
        Classification::YoungGenerationAllocation
    }
}
