//! The segregated free-list index: an array of size-class buckets, each the head of
//! a doubly-linked list of free blocks whose sizes fall in that class's range.
//!
//! Bucket `i` covers `[2^(i+BASE_POWER), 2^(i+BASE_POWER+1))`; the last bucket is
//! open-ended. Insertion is LIFO: new free blocks go to the head of their bucket,
//! a policy chosen once and kept consistent for the allocator's lifetime.

use crate::block;
use crate::config::{BASE_POWER, NUM_BUCKETS};

/// Segregated free-list index. Bucket heads are process-local state rather than
/// heap-resident, which keeps `init` simple: no bucket-head array needs to be
/// carved out of the managed region.
pub struct FreeList {
  heads: [u32; NUM_BUCKETS],
}

impl FreeList {
  pub fn new() -> Self {
    Self {
      heads: [0; NUM_BUCKETS],
    }
  }

  /// Maps a block size to its bucket index: `clamp(floor(log2(size)) - BASE_POWER, 0, K-1)`.
  pub fn bucket_for(size: u32) -> usize {
    debug_assert!(size >= block::MIN_BLOCK as u32);
    let log2 = 31 - size.leading_zeros();
    let idx = log2.saturating_sub(BASE_POWER);
    (idx as usize).min(NUM_BUCKETS - 1)
  }

  /// Head offset of a given bucket, or `0` if empty. Exposed for the heap checker.
  pub fn head(&self, bucket: usize) -> u32 {
    self.heads[bucket]
  }

  /// Inserts `bp`, which must already carry a valid free header/footer, at the
  /// head of its bucket's list.
  ///
  /// # Safety
  /// `bp` must be a free block's payload pointer within the region rooted at `heap_lo`.
  pub unsafe fn insert(&mut self, heap_lo: *mut u8, bp: *mut u8) {
    unsafe {
      let size = block::block_size(bp);
      let idx = Self::bucket_for(size);
      let old_head = self.heads[idx];
      if let Some(old_head_bp) = block::itop(heap_lo, old_head) {
        block::set_prev_free_raw(old_head_bp, block::ptoi(heap_lo, bp));
      }
      block::set_prev_free_raw(bp, 0);
      block::set_next_free_raw(bp, old_head);
      self.heads[idx] = block::ptoi(heap_lo, bp);
    }
  }

  /// Unlinks `bp` from whichever bucket it currently sits in.
  ///
  /// # Safety
  /// `bp` must currently be linked into exactly one bucket (i.e. it must be free).
  pub unsafe fn remove(&mut self, heap_lo: *mut u8, bp: *mut u8) {
    unsafe {
      let size = block::block_size(bp);
      let idx = Self::bucket_for(size);
      let prev = block::get_prev_free_raw(bp);
      let next = block::get_next_free_raw(bp);

      match (block::itop(heap_lo, prev), block::itop(heap_lo, next)) {
        (None, None) => {
          self.heads[idx] = 0;
        }
        (None, Some(next_bp)) => {
          block::set_prev_free_raw(next_bp, 0);
          self.heads[idx] = next;
        }
        (Some(prev_bp), None) => {
          block::set_next_free_raw(prev_bp, 0);
        }
        (Some(prev_bp), Some(next_bp)) => {
          block::set_next_free_raw(prev_bp, next);
          block::set_prev_free_raw(next_bp, prev);
        }
      }
    }
  }

  /// Fit search: walks buckets from `bucket_for(asize)` upward, returning the
  /// first block in the first non-empty bucket that is large enough.
  ///
  /// # Safety
  /// The free-list index must be internally consistent (every linked block free
  /// and within the heap rooted at `heap_lo`).
  pub unsafe fn find_fit(&self, heap_lo: *mut u8, asize: u32) -> Option<*mut u8> {
    unsafe {
      let start = Self::bucket_for(asize);
      for idx in start..NUM_BUCKETS {
        let mut cur = self.heads[idx];
        while let Some(bp) = block::itop(heap_lo, cur) {
          if block::block_size(bp) >= asize {
            return Some(bp);
          }
          cur = block::get_next_free_raw(bp);
        }
      }
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bucket_for_matches_power_of_two_ranges() {
    assert_eq!(FreeList::bucket_for(16), 0);
    assert_eq!(FreeList::bucket_for(31), 0);
    assert_eq!(FreeList::bucket_for(32), 1);
    assert_eq!(FreeList::bucket_for(63), 1);
    assert_eq!(FreeList::bucket_for(64), 2);
    assert_eq!(FreeList::bucket_for(1 << 25), NUM_BUCKETS - 1);
  }

  fn write_free(heap_lo: *mut u8, offset: usize, size: u32) -> *mut u8 {
    unsafe {
      let bp = heap_lo.add(offset);
      block::write_free_header_footer(bp, size, true);
      bp
    }
  }

  #[test]
  fn insert_and_find_fit_single_bucket() {
    let mut buf = vec![0u8; 4096];
    let heap_lo = buf.as_mut_ptr();
    let mut fl = FreeList::new();

    unsafe {
      let a = write_free(heap_lo, 16, 32);
      let b = write_free(heap_lo, 64, 32);
      fl.insert(heap_lo, a);
      fl.insert(heap_lo, b);

      // LIFO: b was inserted last, so it's found first.
      let found = fl.find_fit(heap_lo, 32).unwrap();
      assert_eq!(found, b);

      fl.remove(heap_lo, b);
      let found = fl.find_fit(heap_lo, 32).unwrap();
      assert_eq!(found, a);

      fl.remove(heap_lo, a);
      assert!(fl.find_fit(heap_lo, 32).is_none());
    }
  }

  #[test]
  fn find_fit_escalates_to_larger_bucket() {
    let mut buf = vec![0u8; 4096];
    let heap_lo = buf.as_mut_ptr();
    let mut fl = FreeList::new();

    unsafe {
      let big = write_free(heap_lo, 16, 256);
      fl.insert(heap_lo, big);
      // no 32-byte block exists, but the 256-byte block's bucket is scanned too.
      let found = fl.find_fit(heap_lo, 32).unwrap();
      assert_eq!(found, big);
    }
  }

  #[test]
  fn remove_middle_of_list_preserves_links() {
    let mut buf = vec![0u8; 4096];
    let heap_lo = buf.as_mut_ptr();
    let mut fl = FreeList::new();

    unsafe {
      let a = write_free(heap_lo, 16, 32);
      let b = write_free(heap_lo, 64, 32);
      let c = write_free(heap_lo, 112, 32);
      fl.insert(heap_lo, a);
      fl.insert(heap_lo, b);
      fl.insert(heap_lo, c); // list head-to-tail: c, b, a

      fl.remove(heap_lo, b);

      let idx = FreeList::bucket_for(32);
      let head = block::itop(heap_lo, fl.head(idx)).unwrap();
      assert_eq!(head, c);
      let next = block::itop(heap_lo, block::get_next_free_raw(head)).unwrap();
      assert_eq!(next, a);
      assert_eq!(block::get_next_free_raw(next), 0);
    }
  }
}
