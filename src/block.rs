//! Block byte layout, pure address algebra over the managed heap region.
//!
//! Every block is a run of bytes bounded by a 32-bit header word, and (if free) a
//! mirrored 32-bit footer word. The header packs three fields into one word:
//!
//! ```text
//!   31                                   3   2   1   0
//!   +------------------------------------+---+---+---+
//!   |               size (bytes)         | - | P | A |
//!   +------------------------------------+---+---+---+
//!                                           P = prev_alloc, A = alloc
//! ```
//!
//! `size` is always a multiple of 8, so the low 3 bits are free for flags; only
//! the bottom two are used (`prev_alloc` and `alloc`).
//!
//! A block's *payload pointer* `bp` sits one word past its header:
//!
//! ```text
//!   bp-4        bp              bp+size-8      bp+size-4
//!    +-----------+----------------+--------------+
//!    |  header   |    payload     |    footer    |   (free block)
//!    +-----------+----------------+--------------+
//!
//!    +-----------+-----------------------------------+
//!    |  header   |              payload              |   (allocated block, footerless)
//!    +-----------+-----------------------------------+
//! ```
//!
//! Allocated blocks carry no footer; the space is returned to the caller as
//! payload instead. This is why blocks track a `prev_alloc` bit at all: without
//! a footer on the preceding block, coalescing still needs to know the
//! preceding block's alloc state without reading its (nonexistent) footer,
//! hence the bit lives in this block's own header.
//!
//! Free blocks additionally carry `prev_free`/`next_free` links in the first two
//! payload words, stored as 32-bit offsets relative to
//! [`crate::rawheap::RawHeap::heap_lo`] rather than raw 8-byte pointers. This
//! keeps the minimum block size at 16 bytes on 64-bit hosts: header(4) +
//! prev-offset(4) + next-offset(4) + footer(4).

pub const WORD: usize = 4;
pub const DSIZE: usize = 8;
pub const ALIGNMENT: usize = 8;
pub const MIN_BLOCK: usize = 16;

/// Packs a block's size and flag bits into one header/footer word.
#[inline]
pub const fn pack(size: u32, prev_alloc: bool, alloc: bool) -> u32 {
  size | ((prev_alloc as u32) << 1) | (alloc as u32)
}

#[inline]
pub const fn unpack_size(word: u32) -> u32 {
  word & !0x7
}

#[inline]
pub const fn unpack_alloc(word: u32) -> bool {
  word & 0x1 != 0
}

#[inline]
pub const fn unpack_prev_alloc(word: u32) -> bool {
  word & 0x2 != 0
}

/// Reads a 32-bit word at `p`. `p` must be within the managed region and word-aligned.
#[inline]
pub unsafe fn get_word(p: *mut u8) -> u32 {
  unsafe { (p as *mut u32).read() }
}

#[inline]
pub unsafe fn put_word(p: *mut u8, val: u32) {
  unsafe { (p as *mut u32).write(val) }
}

/// Address of a block's header, given its payload pointer.
#[inline]
pub unsafe fn header_ptr(bp: *mut u8) -> *mut u8 {
  unsafe { bp.sub(WORD) }
}

/// Address of a block's footer, given its payload pointer and size.
/// Only meaningful for free blocks (and the degenerate 8-byte prologue).
#[inline]
pub unsafe fn footer_ptr(bp: *mut u8, size: u32) -> *mut u8 {
  unsafe { bp.add(size as usize - DSIZE) }
}

#[inline]
pub unsafe fn header_word(bp: *mut u8) -> u32 {
  unsafe { get_word(header_ptr(bp)) }
}

#[inline]
pub unsafe fn block_size(bp: *mut u8) -> u32 {
  unsafe { unpack_size(header_word(bp)) }
}

#[inline]
pub unsafe fn is_alloc(bp: *mut u8) -> bool {
  unsafe { unpack_alloc(header_word(bp)) }
}

#[inline]
pub unsafe fn prev_is_alloc(bp: *mut u8) -> bool {
  unsafe { unpack_prev_alloc(header_word(bp)) }
}

/// Payload pointer of the block physically following `bp`.
///
/// When `bp` is the last real block, this returns the epilogue's payload pointer
/// (a block of size 0); callers detect the epilogue via `block_size(..) == 0`.
#[inline]
pub unsafe fn next_block(bp: *mut u8) -> *mut u8 {
  unsafe { bp.add(block_size(bp) as usize) }
}

/// Payload pointer of the block physically preceding `bp`.
///
/// Requires the preceding block to carry a footer, i.e. that it is free (or the
/// prologue). Callers must check `prev_is_alloc(bp)` first; this is never called
/// on a block whose predecessor is allocated.
#[inline]
pub unsafe fn prev_block(bp: *mut u8) -> *mut u8 {
  unsafe {
    let prev_footer = bp.sub(DSIZE);
    let prev_size = unpack_size(get_word(prev_footer));
    bp.sub(prev_size as usize)
  }
}

/// Writes matching free header and footer, preserving the supplied `prev_alloc` bit.
pub unsafe fn write_free_header_footer(bp: *mut u8, size: u32, prev_alloc: bool) {
  unsafe {
    put_word(header_ptr(bp), pack(size, prev_alloc, false));
    put_word(footer_ptr(bp, size), pack(size, prev_alloc, false));
  }
}

/// Writes an allocated header. No footer is written, since allocated blocks are footerless.
pub unsafe fn write_alloc_header(bp: *mut u8, size: u32, prev_alloc: bool) {
  unsafe {
    put_word(header_ptr(bp), pack(size, prev_alloc, true));
  }
}

/// Updates `bp`'s `prev_alloc` bit in place, re-mirroring the footer if `bp` is free.
pub unsafe fn set_prev_alloc(bp: *mut u8, prev_alloc: bool) {
  unsafe {
    let word = header_word(bp);
    let size = unpack_size(word);
    let alloc = unpack_alloc(word);
    put_word(header_ptr(bp), pack(size, prev_alloc, alloc));
    if !alloc && size > 0 {
      put_word(footer_ptr(bp, size), pack(size, prev_alloc, alloc));
    }
  }
}

/// Converts a payload pointer into a 32-bit offset relative to `heap_lo`.
#[inline]
pub unsafe fn ptoi(heap_lo: *mut u8, bp: *mut u8) -> u32 {
  unsafe { bp.offset_from(heap_lo) as u32 }
}

/// Converts a `heap_lo`-relative offset back into a payload pointer.
/// Offset `0` denotes "no block" (the prologue occupies that slot and is never free).
#[inline]
pub unsafe fn itop(heap_lo: *mut u8, offset: u32) -> Option<*mut u8> {
  if offset == 0 {
    None
  } else {
    Some(unsafe { heap_lo.add(offset as usize) })
  }
}

/// Reads the raw `prev_free` offset stored in a free block's payload.
#[inline]
pub unsafe fn get_prev_free_raw(bp: *mut u8) -> u32 {
  unsafe { get_word(bp) }
}

/// Reads the raw `next_free` offset stored in a free block's payload.
#[inline]
pub unsafe fn get_next_free_raw(bp: *mut u8) -> u32 {
  unsafe { get_word(bp.add(WORD)) }
}

#[inline]
pub unsafe fn set_prev_free_raw(bp: *mut u8, offset: u32) {
  unsafe { put_word(bp, offset) }
}

#[inline]
pub unsafe fn set_next_free_raw(bp: *mut u8, offset: u32) {
  unsafe { put_word(bp.add(WORD), offset) }
}
