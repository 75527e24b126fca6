//! Typed errors for the allocator's non-hot-path surface.
//!
//! The hot path (`allocate`, `free`, `reallocate`) keeps the null/no-op contract
//! that is the allocator's actual failure semantics; adding `Result` there
//! would misrepresent it. `init` and the heap checker are the two spots where
//! a structured error genuinely fits: `init` reports success or failure, and
//! the checker exists purely to name which invariant broke.

use thiserror::Error;

/// Failure from [`crate::Allocator::init`].
#[derive(Debug, Error)]
pub enum InitError {
  /// The raw-heap collaborator refused to grow the region during bootstrap.
  #[error("raw heap collaborator refused initial growth (out of memory)")]
  OutOfMemory,
}

/// A specific heap invariant violated, as detected by [`crate::Allocator::check_heap`].
///
/// One variant per failure mode, so callers get a typed answer instead of a
/// printed diagnostic and a process exit.
#[derive(Debug, Error)]
pub enum CheckError {
  #[error("prologue block is corrupted")]
  PrologueCorrupt,

  #[error("epilogue block is corrupted")]
  EpilogueCorrupt,

  #[error("block at offset {offset:#x} is not 8-byte aligned")]
  Unaligned { offset: usize },

  #[error("block at offset {offset:#x} lies outside [heap_lo, heap_hi]")]
  OutOfRange { offset: usize },

  #[error("free block at offset {offset:#x} has mismatched header/footer")]
  HeaderFooterMismatch { offset: usize },

  #[error("block at offset {offset:#x} has size {size}, below the 16-byte minimum")]
  BelowMinimumSize { offset: usize, size: u32 },

  #[error(
    "block at offset {offset:#x} has prev_alloc={prev_alloc} but its physical predecessor's alloc bit is {actual}"
  )]
  PrevAllocMismatch {
    offset: usize,
    prev_alloc: bool,
    actual: bool,
  },

  #[error("blocks at offsets {first:#x} and {second:#x} are adjacent and both free")]
  AdjacentFreeBlocks { first: usize, second: usize },

  #[error("free list bucket {bucket} head points outside the heap")]
  ListHeadNotInHeap { bucket: usize },

  #[error("free list link at offset {offset:#x} points outside the heap")]
  ListLinkNotInHeap { offset: usize },

  #[error("free list prev/next links are inconsistent around offset {offset:#x}")]
  ListLinkInconsistent { offset: usize },

  #[error("free list bucket {bucket} contains a cycle")]
  ListCycle { bucket: usize },

  #[error(
    "free block count from a physical scan ({from_scan}) disagrees with the free list count ({from_lists})"
  )]
  FreeCountMismatch { from_scan: usize, from_lists: usize },

  #[error("block at offset {offset:#x} (size {size}) does not belong in bucket {bucket}")]
  BucketRangeViolation {
    bucket: usize,
    offset: usize,
    size: u32,
  },
}
