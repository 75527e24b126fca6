//! Immediate coalescing: merges a newly-freed block with any free physical
//! neighbors, in one of four cases driven by `(prev_alloc, next_alloc)`.

use crate::block;
use crate::freelist::FreeList;

/// Coalesces `bp`, already written as a free block with correct `prev_alloc`,
/// with any free physical neighbors, inserts the (possibly merged) result into
/// the free list, and returns its payload pointer.
///
/// `rover` is the allocator's cached next-fit candidate, if any. Whenever a
/// merge absorbs a block as the physical successor rather than as the
/// surviving base address, that block's former header location stops being a
/// block boundary at all; if `rover` was pointing there, it is cleared so a
/// later lookup never dereferences it as a header.
///
/// # Safety
/// `bp` must be a free block's payload pointer; its neighbors (if any) must be
/// valid blocks within the heap rooted at `heap_lo`.
pub unsafe fn coalesce(
  fl: &mut FreeList,
  heap_lo: *mut u8,
  bp: *mut u8,
  rover: &mut Option<*mut u8>,
) -> *mut u8 {
  unsafe {
    let prev_alloc = block::prev_is_alloc(bp);
    let next = block::next_block(bp);
    let next_alloc = block::is_alloc(next);
    let size = block::block_size(bp);

    let (result, merged_size) = match (prev_alloc, next_alloc) {
      (true, true) => (bp, size),

      (true, false) => {
        let next_size = block::block_size(next);
        fl.remove(heap_lo, next);
        if *rover == Some(next) {
          *rover = None;
        }
        (bp, size + next_size)
      }

      (false, true) => {
        let prev = block::prev_block(bp);
        let prev_size = block::block_size(prev);
        fl.remove(heap_lo, prev);
        (prev, size + prev_size)
      }

      (false, false) => {
        let prev = block::prev_block(bp);
        let prev_size = block::block_size(prev);
        let next_size = block::block_size(next);
        fl.remove(heap_lo, prev);
        fl.remove(heap_lo, next);
        if *rover == Some(next) {
          *rover = None;
        }
        (prev, size + prev_size + next_size)
      }
    };

    // The merged block's own prev_alloc never changes: in the (true,_) cases bp
    // keeps its existing prev_alloc bit; in the (false,_) cases result == prev,
    // which already carries the correct bit in its own header.
    let result_prev_alloc = block::prev_is_alloc(result);
    block::write_free_header_footer(result, merged_size, result_prev_alloc);
    block::set_prev_alloc(block::next_block(result), false);
    fl.insert(heap_lo, result);
    result
  }
}
