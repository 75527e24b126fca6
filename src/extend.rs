//! Frontier extension: grows the raw heap and turns the new bytes into one
//! additional free block, coalescing with whatever free block (if any)
//! already sat at the old frontier.
//!
//! The old epilogue's single header word is reused as the new free block's
//! header, and a fresh epilogue header is written past the new block.

use crate::block;
use crate::coalesce::coalesce;
use crate::freelist::FreeList;
use crate::rawheap::RawHeap;

/// Extends the managed region by `words` words (rounded up to an even count to
/// preserve 8-byte alignment), turning the new space into a free block that is
/// immediately coalesced with any free block already at the frontier.
///
/// Returns the coalesced free block's payload pointer, or `None` if the raw
/// heap collaborator refused to grow.
///
/// # Safety
/// `heap_lo` must already have a valid epilogue header at the current frontier
/// (i.e. `init` must have run).
pub unsafe fn extend_heap<H: RawHeap>(
  heap: &mut H,
  fl: &mut FreeList,
  heap_lo: *mut u8,
  words: usize,
  rover: &mut Option<*mut u8>,
) -> Option<*mut u8> {
  unsafe {
    let words = if words % 2 != 0 { words + 1 } else { words };
    let size = (words * block::WORD) as u32;

    let base = heap.extend(size as usize)?;

    // `base` is simultaneously the old epilogue's header address and the new
    // free block's payload pointer: the epilogue was a zero-size, header-only
    // allocated block, so new_bp == base exactly (no offset needed).
    let old_epilogue_word = block::get_word(base.sub(block::WORD));
    let prev_alloc = block::unpack_prev_alloc(old_epilogue_word);

    let new_bp = base;
    block::write_free_header_footer(new_bp, size, prev_alloc);

    let new_epilogue = block::header_ptr(block::next_block(new_bp));
    block::put_word(new_epilogue, block::pack(0, false, true));

    Some(coalesce(fl, heap_lo, new_bp, rover))
  }
}
