use std::alloc::{self, Layout};
use std::ptr::NonNull;
use std::slice;

use crate::config::is_valid_alignment;
use crate::{BenchError, Result};

/// Zeroed heap buffer whose start is aligned to exactly the requested
/// boundary.
///
/// With a non-zero alignment the address is a multiple of `align` but not
/// of `2 * align`, so benchmarks measure the alignment asked for rather
/// than whatever the allocator happens to return. An alignment of 0 keeps
/// the allocator's placement.
pub struct AlignedBuffer {
    ptr: NonNull<u8>,
    layout: Layout,
    offset: usize,
    len: usize,
}

impl AlignedBuffer {
    /// Allocate `len` zeroed bytes aligned to `align`
    pub fn new(len: usize, align: usize) -> Result<Self> {
        if len == 0 {
            return Err(BenchError::ConfigError(
                "Buffer size must be greater than 0".to_string(),
            ));
        }
        if !is_valid_alignment(align) {
            return Err(BenchError::ConfigError(format!(
                "Alignment must be a power of 2: {}",
                align
            )));
        }

        let too_large =
            || BenchError::AllocationError(format!("{} bytes aligned to {}", len, align));

        // Allocate `len` plus two alignments of slack on a `2 * align`
        // boundary and start one alignment in.
        let (layout, offset) = if align == 0 {
            (Layout::from_size_align(len, 1).map_err(|_| too_large())?, 0)
        } else {
            let boundary = align.checked_mul(2).ok_or_else(too_large)?;
            let size = len.checked_add(boundary).ok_or_else(too_large)?;
            (
                Layout::from_size_align(size, boundary).map_err(|_| too_large())?,
                align,
            )
        };

        // SAFETY: `layout` has a non-zero size since `len > 0`.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).ok_or_else(too_large)?;

        Ok(Self {
            ptr,
            layout,
            offset,
            len,
        })
    }

    /// Start of the usable region
    pub fn as_ptr(&self) -> *const u8 {
        // SAFETY: `offset + len` never exceeds the allocation size.
        unsafe { self.ptr.as_ptr().add(self.offset) }
    }

    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: the region is allocated, zero-initialized and owned by `self`.
        unsafe { slice::from_raw_parts(self.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as above, and `&mut self` guarantees exclusive access.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr().add(self.offset), self.len) }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        // SAFETY: `ptr` was returned by `alloc_zeroed` with this exact layout.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_alignment() {
        for align in [1usize, 2, 8, 64, 4096] {
            let buffer = AlignedBuffer::new(1000, align).unwrap();
            let addr = buffer.as_ptr() as usize;
            assert_eq!(addr % align, 0, "not aligned to {}", align);
            assert_ne!(addr % (2 * align), 0, "over-aligned for {}", align);
            assert_eq!(buffer.len(), 1000);
        }
    }

    #[test]
    fn test_default_alignment_and_zeroed() {
        let mut buffer = AlignedBuffer::new(256, 0).unwrap();
        assert!(buffer.as_slice().iter().all(|&b| b == 0));

        buffer.as_mut_slice()[255] = 7;
        assert_eq!(buffer.as_slice()[255], 7);
        assert!(!buffer.is_empty());
    }

    #[test]
    fn test_invalid_requests() {
        assert!(matches!(AlignedBuffer::new(0, 0), Err(BenchError::ConfigError(_))));
        assert!(matches!(AlignedBuffer::new(16, 3), Err(BenchError::ConfigError(_))));
        assert!(matches!(
            AlignedBuffer::new(usize::MAX - 8, 64),
            Err(BenchError::AllocationError(_))
        ));
    }
}
