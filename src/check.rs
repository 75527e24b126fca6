//! Heap checker: an optional, debug-build-friendly consistency walk. Returns
//! the first invariant violation found rather than printing and aborting;
//! this allocator never logs.

use std::collections::HashSet;

use crate::block;
use crate::config::NUM_BUCKETS;
use crate::error::CheckError;
use crate::freelist::FreeList;

/// Walks the managed region from the prologue to the epilogue, checking block
/// layout invariants, then walks every free-list bucket, checking list
/// soundness and cross-checking the free count against the physical scan.
///
/// # Safety
/// `heap_lo`/`heap_hi` must bound a region `init` has already bootstrapped.
pub unsafe fn check_heap(heap_lo: *mut u8, heap_hi: *mut u8, fl: &FreeList) -> Result<(), CheckError> {
  unsafe {
    let prologue = heap_lo.add(8);
    let prologue_header = block::header_word(prologue);
    if block::unpack_size(prologue_header) != 8 || !block::unpack_alloc(prologue_header) {
      return Err(CheckError::PrologueCorrupt);
    }
    if block::get_word(block::footer_ptr(prologue, 8)) != prologue_header {
      return Err(CheckError::PrologueCorrupt);
    }

    let mut scanned_free = 0usize;
    let mut prev_alloc_expected = true;
    let mut prev_was_free = false;
    let mut prev_offset = 0usize;
    let mut cur = block::next_block(prologue);

    loop {
      let offset = cur.offset_from(heap_lo) as usize;
      if offset % block::ALIGNMENT != 0 {
        return Err(CheckError::Unaligned { offset });
      }

      let size = block::block_size(cur);
      if size == 0 {
        if !block::is_alloc(cur) {
          return Err(CheckError::EpilogueCorrupt);
        }
        break;
      }

      if (cur as usize) + size as usize - 1 > heap_hi as usize {
        return Err(CheckError::OutOfRange { offset });
      }

      let alloc = block::is_alloc(cur);
      let prev_alloc_bit = block::prev_is_alloc(cur);
      if prev_alloc_bit != prev_alloc_expected {
        return Err(CheckError::PrevAllocMismatch {
          offset,
          prev_alloc: prev_alloc_bit,
          actual: prev_alloc_expected,
        });
      }

      if !alloc {
        if size < block::MIN_BLOCK as u32 {
          return Err(CheckError::BelowMinimumSize { offset, size });
        }
        if block::get_word(block::footer_ptr(cur, size)) != block::header_word(cur) {
          return Err(CheckError::HeaderFooterMismatch { offset });
        }
        if prev_was_free {
          return Err(CheckError::AdjacentFreeBlocks {
            first: prev_offset,
            second: offset,
          });
        }
        scanned_free += 1;
      }

      prev_was_free = !alloc;
      prev_alloc_expected = alloc;
      prev_offset = offset;
      cur = block::next_block(cur);
    }

    let mut list_count = 0usize;
    for bucket in 0..NUM_BUCKETS {
      let head = fl.head(bucket);
      if head != 0 && in_range(heap_lo, heap_hi, head).is_none() {
        return Err(CheckError::ListHeadNotInHeap { bucket });
      }

      let mut seen = HashSet::new();
      let mut prev_off = 0u32;
      let mut cur_off = head;
      while cur_off != 0 {
        if !seen.insert(cur_off) {
          return Err(CheckError::ListCycle { bucket });
        }
        let bp = match in_range(heap_lo, heap_hi, cur_off) {
          Some(p) => p,
          None => return Err(CheckError::ListLinkNotInHeap { offset: cur_off as usize }),
        };
        if block::get_prev_free_raw(bp) != prev_off {
          return Err(CheckError::ListLinkInconsistent { offset: cur_off as usize });
        }
        let size = block::block_size(bp);
        if FreeList::bucket_for(size) != bucket {
          return Err(CheckError::BucketRangeViolation {
            bucket,
            offset: cur_off as usize,
            size,
          });
        }
        list_count += 1;
        prev_off = cur_off;
        cur_off = block::get_next_free_raw(bp);
      }
    }

    if list_count != scanned_free {
      return Err(CheckError::FreeCountMismatch {
        from_scan: scanned_free,
        from_lists: list_count,
      });
    }

    Ok(())
  }
}

unsafe fn in_range(heap_lo: *mut u8, heap_hi: *mut u8, offset: u32) -> Option<*mut u8> {
  unsafe {
    let bp = block::itop(heap_lo, offset)?;
    if (bp as usize) >= heap_lo as usize && (bp as usize) <= heap_hi as usize {
      Some(bp)
    } else {
      None
    }
  }
}
