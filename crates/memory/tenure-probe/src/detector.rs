//! Collection event detection
//!
//! Compares two [`CollectorSnapshot`]s taken around one allocation.

use crate::introspect::{CollectorId, CollectorSnapshot};

/// First collector whose count changed between `before` and `after`
///
/// Collectors are visited in id order. A collector tracked in `before` but
/// absent from `after` counts as changed.
pub fn advanced_collector<'a>(
    before: &'a CollectorSnapshot,
    after: &CollectorSnapshot,
) -> Option<&'a CollectorId> {
    before
        .iter()
        .find(|(id, count)| after.get(id) != Some(*count))
        .map(|(id, _)| id)
}

/// True if any tracked collector ran between the two snapshots
pub fn occurred(before: &CollectorSnapshot, after: &CollectorSnapshot) -> bool {
    advanced_collector(before, after).is_some()
}
