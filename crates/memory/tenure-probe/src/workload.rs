//! Allocation workload
//!
//! Allocates a block in the managed heap and sums every byte. The sum is a
//! data dependency on the whole block, routed through [`black_box`] so the
//! optimizer can neither drop the allocation nor fold the sum to zero.

use std::hint::black_box;

use log::trace;

use crate::introspect::ManagedAllocator;
use crate::{ProbeError, ProbeResult};

/// Sum of all bytes in `block`
pub fn checksum(block: &[u8]) -> u64 {
    black_box(block)
        .iter()
        .fold(0u64, |sum, byte| sum.wrapping_add(u64::from(*byte)))
}

/// Allocate `size` bytes through `allocator` and verify they are zero-filled
///
/// # Errors
///
/// Returns [`ProbeError::TruncatedBlock`] if the block is not `size` bytes
/// long, [`ProbeError::IntegrityFault`] if the checksum is not zero, and
/// propagates allocation failures from the runtime
pub fn allocate<A>(allocator: &A, size: usize) -> ProbeResult<()>
where
    A: ManagedAllocator + ?Sized,
{
    let block = allocator.allocate_bytes(black_box(size))?;
    if block.len() != size {
        return Err(ProbeError::TruncatedBlock {
            size,
            len: block.len(),
        });
    }

    let sum = checksum(&block);
    trace!("Allocated {} bytes, checksum {}", block.len(), sum);

    if sum != 0 {
        return Err(ProbeError::IntegrityFault {
            size,
            checksum: sum,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Filled(u8);

    struct Short;

    impl ManagedAllocator for Filled {
        fn allocate_bytes(&self, size: usize) -> ProbeResult<Box<[u8]>> {
            Ok(vec![self.0; size].into_boxed_slice())
        }
    }

    impl ManagedAllocator for Short {
        fn allocate_bytes(&self, size: usize) -> ProbeResult<Box<[u8]>> {
            Ok(vec![0; size / 2].into_boxed_slice())
        }
    }

    #[test]
    fn test_checksum() {
        assert_eq!(checksum(&[]), 0);
        assert_eq!(checksum(&[1, 2, 3]), 6);
        assert_eq!(checksum(&[255; 4]), 1020);
    }

    #[test]
    fn test_zeroed_block_passes() {
        assert!(allocate(&Filled(0), 4096).is_ok());
    }

    #[test]
    fn test_dirty_block_is_integrity_fault() {
        let err = allocate(&Filled(1), 8).unwrap_err();
        assert!(matches!(
            err,
            ProbeError::IntegrityFault {
                size: 8,
                checksum: 8
            }
        ));
    }

    #[test]
    fn test_short_block_is_integrity_fault() {
        let err = allocate(&Short, 65536).unwrap_err();
        assert!(err.is_integrity_fault());
        assert!(matches!(
            err,
            ProbeError::TruncatedBlock {
                size: 65536,
                len: 32768
            }
        ));
    }

    #[test]
    fn test_empty_block_for_nonzero_size_is_rejected() {
        struct Empty;

        impl ManagedAllocator for Empty {
            fn allocate_bytes(&self, _size: usize) -> ProbeResult<Box<[u8]>> {
                Ok(Box::default())
            }
        }

        assert!(allocate(&Empty, 1).is_err());
        assert!(allocate(&Empty, 0).is_ok());
    }
}
