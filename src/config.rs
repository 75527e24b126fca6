//! Tunable allocator constants.
//!
//! A handful of workload-tuned magic numbers, named and documented rather
//! than left inline.

/// Power of two of the smallest size class (`2^BASE_POWER == 16`, the minimum block size).
pub const BASE_POWER: u32 = 4;

/// Number of size-class buckets. The last bucket is open-ended (`>= 2^(BASE_POWER+NUM_BUCKETS-1)`).
pub const NUM_BUCKETS: usize = 18;

/// Tunable parameters an embedder may override via [`crate::Allocator::with_config`].
#[derive(Debug, Clone, Copy)]
pub struct Config {
  /// Bytes requested from the raw-heap collaborator at `init` time, before any
  /// allocation has happened. Tuned for workloads that make a handful of small
  /// allocations before needing real growth: big enough to avoid an immediate
  /// re-extension, small enough not to waste address space on programs that
  /// never allocate much.
  pub initial_chunk: usize,

  /// Minimum bytes requested from the raw-heap collaborator whenever no fit is
  /// found and the frontier must be extended. Picked so that satisfying one
  /// large allocation (a few KiB) still leaves slack for several small
  /// follow-up allocations without triggering a second extension. See the
  /// S4 scenario in the test suite.
  pub grow_chunk: usize,

  /// Split threshold `T`: requests below this place the allocated portion at
  /// the low end of the chosen free block (remainder high); requests at or
  /// above it place the allocated portion at the high end (remainder low),
  /// clustering long-lived large allocations against the frontier. Tuned for
  /// a mixed workload of many small, short-lived allocations and a handful
  /// of large, long-lived ones.
  pub split_threshold: u32,

  /// Enables the optional next-fit "rover" search: the most recently touched
  /// free block is tried first before falling back to the ordinary
  /// segregated first-fit-within-class search. Off by default, since
  /// first-fit-within-class alone already behaves like best-fit within a
  /// constant factor, and the rover trades some utilization for recency
  /// locality.
  pub use_rover: bool,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      initial_chunk: 1 << 12, // 4 KiB
      grow_chunk: 1 << 13,    // 8 KiB
      split_threshold: 96,
      use_rover: false,
    }
  }
}
