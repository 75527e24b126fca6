//! The public allocator surface: `init`, `allocate`, `free`,
//! `reallocate`, `calloc`, and the optional heap checker.
//!
//! Generic over [`RawHeap`] so the same logic runs against a real process
//! break ([`crate::rawheap::SbrkHeap`]) or a simulated one
//! ([`crate::rawheap::SimHeap`]) for testing.

use std::ptr::{self, NonNull};

use crate::block;
use crate::check;
use crate::coalesce::coalesce;
use crate::config::Config;
use crate::error::{CheckError, InitError};
use crate::extend::extend_heap;
use crate::freelist::FreeList;
use crate::rawheap::RawHeap;

/// A segregated-fits dynamic storage allocator over a raw, growable byte region.
///
/// Not `Send`/`Sync`: it holds raw pointers into a region it owns exclusively
/// and performs no internal synchronization. Single-threaded use only.
pub struct Allocator<H: RawHeap> {
  heap: H,
  heap_lo: *mut u8,
  freelist: FreeList,
  config: Config,
  rover: Option<*mut u8>,
}

impl<H: RawHeap> Allocator<H> {
  /// Builds an allocator with default tuning. Call [`Self::init`] before use.
  pub fn new(heap: H) -> Self {
    Self::with_config(heap, Config::default())
  }

  /// Builds an allocator with caller-supplied tuning. Call [`Self::init`] before use.
  pub fn with_config(heap: H, config: Config) -> Self {
    Self {
      heap,
      heap_lo: ptr::null_mut(),
      freelist: FreeList::new(),
      config,
      rover: None,
    }
  }

  /// Bootstraps the managed region: a one-word alignment pad, an 8-byte
  /// prologue, and a 0-byte epilogue, then grows the frontier by
  /// `config.initial_chunk` bytes of free space.
  ///
  /// Idempotent only in the sense that calling it twice corrupts the heap;
  /// callers must call it exactly once.
  pub fn init(&mut self) -> Result<(), InitError> {
    unsafe {
      let base = self
        .heap
        .extend(4 * block::WORD)
        .ok_or(InitError::OutOfMemory)?;
      self.heap_lo = self.heap.heap_lo();

      let prologue = base.add(2 * block::WORD);
      block::put_word(block::header_ptr(prologue), block::pack(8, true, true));
      block::put_word(block::footer_ptr(prologue, 8), block::pack(8, true, true));

      let epilogue_hdr = block::header_ptr(block::next_block(prologue));
      block::put_word(epilogue_hdr, block::pack(0, true, true));

      let words = self.config.initial_chunk / block::WORD;
      extend_heap(&mut self.heap, &mut self.freelist, self.heap_lo, words, &mut self.rover)
        .ok_or(InitError::OutOfMemory)?;
    }
    Ok(())
  }

  /// Adjusts a requested payload size to a block size: room for a header,
  /// rounded up to 8 bytes, never below the 16-byte minimum block.
  fn adjusted_size(n: usize) -> u32 {
    let with_header = n + block::WORD;
    let aligned = with_header.div_ceil(block::ALIGNMENT) * block::ALIGNMENT;
    aligned.max(block::MIN_BLOCK) as u32
  }

  unsafe fn find_fit(&self, asize: u32) -> Option<*mut u8> {
    unsafe {
      if self.config.use_rover {
        if let Some(rover) = self.rover {
          if !block::is_alloc(rover) && block::block_size(rover) >= asize {
            return Some(rover);
          }
        }
      }
      self.freelist.find_fit(self.heap_lo, asize)
    }
  }

  /// Allocates at least `n` bytes, returning `None` on out-of-memory.
  pub fn allocate(&mut self, n: usize) -> Option<NonNull<u8>> {
    if n == 0 {
      return None;
    }
    let asize = Self::adjusted_size(n);
    unsafe {
      let bp = match self.find_fit(asize) {
        Some(bp) => bp,
        None => {
          let grow = asize.max(self.config.grow_chunk as u32);
          let words = (grow as usize).div_ceil(block::WORD);
          extend_heap(&mut self.heap, &mut self.freelist, self.heap_lo, words, &mut self.rover)?
        }
      };
      let placed = crate::place::place(
        &mut self.freelist,
        self.heap_lo,
        bp,
        asize,
        self.config.split_threshold,
      );
      NonNull::new(placed)
    }
  }

  /// Frees a previously allocated block. A `None` pointer is a no-op.
  pub fn free(&mut self, p: Option<NonNull<u8>>) {
    let Some(p) = p else { return };
    unsafe {
      let bp = p.as_ptr();
      let size = block::block_size(bp);
      let prev_alloc = block::prev_is_alloc(bp);
      block::write_free_header_footer(bp, size, prev_alloc);
      let merged = coalesce(&mut self.freelist, self.heap_lo, bp, &mut self.rover);
      if self.config.use_rover {
        self.rover = Some(merged);
      }
    }
  }

  /// Resizes a block in place where possible, falling back to
  /// allocate-copy-free otherwise.
  ///
  /// `p == None` behaves as `allocate(n)`; `n == 0` behaves as `free(p)` and
  /// returns `None`.
  pub fn reallocate(&mut self, p: Option<NonNull<u8>>, n: usize) -> Option<NonNull<u8>> {
    let Some(p) = p else {
      return self.allocate(n);
    };
    if n == 0 {
      self.free(Some(p));
      return None;
    }

    let asize = Self::adjusted_size(n);
    unsafe {
      let bp = p.as_ptr();
      let csize = block::block_size(bp);
      let prev_alloc = block::prev_is_alloc(bp);

      if asize <= csize {
        let remainder = csize - asize;
        if remainder >= block::MIN_BLOCK as u32 {
          block::write_alloc_header(bp, asize, prev_alloc);
          let rem_bp = bp.add(asize as usize);
          block::write_free_header_footer(rem_bp, remainder, true);
          let merged = coalesce(&mut self.freelist, self.heap_lo, rem_bp, &mut self.rover);
          if self.config.use_rover {
            self.rover = Some(merged);
          }
        }
        return Some(p);
      }

      let next = block::next_block(bp);
      let next_size = block::block_size(next);
      let next_is_epilogue = next_size == 0 && block::is_alloc(next);

      if next_is_epilogue {
        let needed = asize - csize;
        let grow = needed.max(self.config.grow_chunk as u32);
        let words = (grow as usize).div_ceil(block::WORD);
        // Extend raw heap directly at the frontier rather than going through
        // extend_heap+coalesce: the successor here is bp itself (already
        // allocated), not a free neighbor, so there is nothing to coalesce.
        let add_words = if words % 2 != 0 { words + 1 } else { words };
        let add_size = (add_words * block::WORD) as u32;
        if self.heap.extend(add_size as usize).is_some() {
          let new_total = csize + add_size;
          block::write_alloc_header(bp, new_total, prev_alloc);
          let new_epilogue = block::header_ptr(block::next_block(bp));
          block::put_word(new_epilogue, block::pack(0, false, true));
          return self.place_grown(bp, asize, prev_alloc);
        }
        return self.allocate_copy_free(p, csize, n);
      }

      if !block::is_alloc(next) {
        let fused_size = csize + next_size;
        if fused_size >= asize {
          self.freelist.remove(self.heap_lo, next);
          // `next`'s former header is swallowed into `bp` and stops being a
          // block boundary; a rover still pointing there would read stale bytes.
          if self.rover == Some(next) {
            self.rover = None;
          }
          block::write_alloc_header(bp, fused_size, prev_alloc);
          block::set_prev_alloc(block::next_block(bp), true);
          return self.place_grown(bp, asize, prev_alloc);
        }
      }

      self.allocate_copy_free(p, csize, n)
    }
  }

  /// After a grow-in-place (frontier extend or fusion) leaves `bp` sized for
  /// at least `asize`, splits any excess back into the free list.
  unsafe fn place_grown(&mut self, bp: *mut u8, asize: u32, prev_alloc: bool) -> Option<NonNull<u8>> {
    unsafe {
      let total = block::block_size(bp);
      let remainder = total - asize;
      if remainder >= block::MIN_BLOCK as u32 {
        block::write_alloc_header(bp, asize, prev_alloc);
        let rem_bp = bp.add(asize as usize);
        block::write_free_header_footer(rem_bp, remainder, true);
        let merged = coalesce(&mut self.freelist, self.heap_lo, rem_bp, &mut self.rover);
        if self.config.use_rover {
          self.rover = Some(merged);
        }
      } else {
        block::set_prev_alloc(block::next_block(bp), true);
      }
      NonNull::new(bp)
    }
  }

  unsafe fn allocate_copy_free(&mut self, old: NonNull<u8>, old_size: u32, n: usize) -> Option<NonNull<u8>> {
    unsafe {
      let new_p = self.allocate(n)?;
      let copy_len = (old_size as usize - block::WORD).min(n);
      ptr::copy_nonoverlapping(old.as_ptr(), new_p.as_ptr(), copy_len);
      self.free(Some(old));
      Some(new_p)
    }
  }

  /// Zero-initialized allocation of `nmemb * size` bytes. Returns `None` if
  /// the product overflows `usize` or the underlying allocation fails.
  pub fn calloc(&mut self, nmemb: usize, size: usize) -> Option<NonNull<u8>> {
    let total = nmemb.checked_mul(size)?;
    let p = self.allocate(total)?;
    unsafe { ptr::write_bytes(p.as_ptr(), 0, total) };
    Some(p)
  }

  /// Walks the entire managed region, checking every block-layout and
  /// free-list invariant, returning the first violation found.
  pub fn check_heap(&self) -> Result<(), CheckError> {
    check::check_heap(self.heap_lo, self.heap.heap_hi(), &self.freelist)
  }
}
