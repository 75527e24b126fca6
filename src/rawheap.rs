//! The raw-heap collaborator: grows a managed byte region on request. The
//! allocator core treats it as an external dependency, but this crate still
//! needs a concrete implementation to run or be tested at all.
//!
//! [`RawHeap`] is the trait the allocator is generic over. Two implementations are
//! provided:
//!
//! - [`SbrkHeap`] grows the real process break via `libc::sbrk`.
//! - [`SimHeap`] simulates a growable region inside a fixed-capacity boxed
//!   buffer, so the allocator's own test suite doesn't fight over one
//!   process's single real program break across parallel tests.

use libc::{c_void, intptr_t, sbrk};
use std::ptr;

/// Extends a managed byte region at its high end; the region's low end and
/// previously-extended bytes never move.
pub trait RawHeap {
  /// Grows the region by exactly `bytes`, returning the address of the first
  /// newly-added byte (the region's old exclusive upper bound) on success, or
  /// `None` if the collaborator refuses (out of memory).
  fn extend(&mut self, bytes: usize) -> Option<*mut u8>;

  /// Lowest managed address. Unspecified before the first successful `extend`.
  fn heap_lo(&self) -> *mut u8;

  /// Highest valid managed address (inclusive). Unspecified before the first
  /// successful `extend`.
  fn heap_hi(&self) -> *mut u8;
}

/// Grows the real process break via `sbrk(2)`.
pub struct SbrkHeap {
  lo: Option<*mut u8>,
  hi: *mut u8,
}

impl SbrkHeap {
  pub fn new() -> Self {
    Self {
      lo: None,
      hi: ptr::null_mut(),
    }
  }
}

impl Default for SbrkHeap {
  fn default() -> Self {
    Self::new()
  }
}

impl RawHeap for SbrkHeap {
  fn extend(&mut self, bytes: usize) -> Option<*mut u8> {
    unsafe {
      let addr = sbrk(bytes as intptr_t);
      if addr == usize::MAX as *mut c_void {
        return None;
      }
      let base = addr as *mut u8;
      if self.lo.is_none() {
        self.lo = Some(base);
      }
      self.hi = base.add(bytes).sub(1);
      Some(base)
    }
  }

  fn heap_lo(&self) -> *mut u8 {
    self.lo.unwrap_or(ptr::null_mut())
  }

  fn heap_hi(&self) -> *mut u8 {
    self.hi
  }
}

/// Simulates a growable region inside a fixed-capacity, never-reallocated buffer.
///
/// Growth beyond `capacity` fails exactly like a real out-of-memory `sbrk`, which
/// lets tests exercise the allocator's OOM paths deterministically.
pub struct SimHeap {
  buf: Box<[u8]>,
  used: usize,
}

impl SimHeap {
  pub fn new(capacity: usize) -> Self {
    Self {
      buf: vec![0u8; capacity].into_boxed_slice(),
      used: 0,
    }
  }
}

impl RawHeap for SimHeap {
  fn extend(&mut self, bytes: usize) -> Option<*mut u8> {
    if self.used.checked_add(bytes)? > self.buf.len() {
      return None;
    }
    let base = unsafe { self.buf.as_mut_ptr().add(self.used) };
    self.used += bytes;
    Some(base)
  }

  fn heap_lo(&self) -> *mut u8 {
    self.buf.as_ptr() as *mut u8
  }

  fn heap_hi(&self) -> *mut u8 {
    unsafe { self.buf.as_ptr().add(self.used.saturating_sub(1)) as *mut u8 }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sim_heap_grows_and_reports_bounds() {
    let mut heap = SimHeap::new(1024);
    let a = heap.extend(64).unwrap();
    assert_eq!(heap.heap_lo(), a);
    assert_eq!(heap.heap_hi(), unsafe { a.add(63) });

    let b = heap.extend(64).unwrap();
    assert_eq!(b, unsafe { a.add(64) });
    assert_eq!(heap.heap_hi(), unsafe { a.add(127) });
  }

  #[test]
  fn sim_heap_refuses_growth_past_capacity() {
    let mut heap = SimHeap::new(128);
    assert!(heap.extend(64).is_some());
    assert!(heap.extend(128).is_none());
    assert!(heap.extend(64).is_some());
  }
}
