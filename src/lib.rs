//! # segfit - A Segregated-Fits Dynamic Storage Allocator
//!
//! This crate provides a **segregated free-list** allocator implementation in
//! Rust that manages memory on top of a growable raw byte region (by default,
//! the process break via `sbrk`).
//!
//! ## Overview
//!
//! Unlike a bump allocator, which never reclaims interior memory, a
//! segregated-fits allocator indexes free blocks by size class so that a
//! `free`d block can be found again and reused:
//!
//! ```text
//!   Segregated Free Lists:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                         HEAP MEMORY                                  │
//!   │                                                                      │
//!   │  ┌────┬──────┬────┬────────┬────┬──────────────────┬────┬─────────┐  │
//!   │  │ A1 │ free │ A2 │  free  │ A3 │       free        │ A4 │  free   │  │
//!   │  └────┴──────┴────┴────────┴────┴──────────────────┴────┴─────────┘  │
//!   │         │               │                 │                │        │
//!   │         └───────┬───────┴─────────────────┴────────┬───────┘        │
//!   │                 ▼                                  ▼                │
//!   │         bucket[16..32)                      bucket[256..512)        │
//!   │         (size-class free lists, indexed by floor(log2(size)))       │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   free() reinserts a block into its bucket instead of discarding it.
//!   allocate() searches buckets from the requested size class upward.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   segfit
//!   ├── align      - Alignment macros (align!, align_to!)
//!   ├── block      - Block header/footer byte layout (internal)
//!   ├── config     - Tunable constants (bucket count, chunk sizes, split threshold)
//!   ├── freelist   - Segregated free-list index (bucket_for, insert, remove, find_fit)
//!   ├── coalesce   - Immediate coalescing of a freed block with its neighbors
//!   ├── place      - Carving an allocation out of a free block, with splitting
//!   ├── extend     - Growing the raw heap's frontier into a new free block
//!   ├── rawheap    - The raw, growable byte region abstraction (sbrk or simulated)
//!   ├── check      - An optional heap-consistency checker
//!   ├── error      - Typed errors for `init` and the heap checker
//!   └── allocator  - The public `Allocator` type: init/allocate/free/reallocate/calloc
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use segfit::{Allocator, SbrkHeap};
//!
//! fn main() {
//!     let mut allocator = Allocator::new(SbrkHeap::new());
//!     allocator.init().expect("failed to bootstrap heap");
//!
//!     let p = allocator.allocate(64).expect("out of memory");
//!     unsafe { p.as_ptr().write_bytes(0, 64) };
//!
//!     allocator.free(Some(p));
//! }
//! ```
//!
//! ## Block Layout
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
//! Every block carries a 4-byte header packing its size and two flag bits
//! (`alloc`, and the *preceding* block's `alloc` state). Allocated blocks skip
//! the footer entirely. The only block that needs a footer is a free one,
//! since coalescing needs to walk backward from an arbitrary block, and the
//! `prev_alloc` bit is what lets that walk skip over allocated predecessors
//! without reading a footer that was never written.
//!
//! ## Features
//!
//! - **Size-class segregation**: O(1) average placement via bucketed free lists
//! - **Immediate coalescing**: adjacent free blocks are merged as soon as either frees
//! - **In-place growth**: `reallocate` extends at the frontier or fuses with a
//!   free successor before ever falling back to allocate-copy-free
//! - **Footerless allocated blocks**: one word of header-only overhead per live allocation
//! - **Pluggable raw heap**: `sbrk`-backed for real use, buffer-backed for tests
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no synchronization primitives; `Allocator` is `!Send`/`!Sync`
//! - **Unix-only by default**: `SbrkHeap` requires `libc::sbrk` (POSIX systems)
//! - **Never shrinks**: freed memory returns to the free list, never to the OS
//!
//! ## Safety
//!
//! This crate is inherently unsafe as it deals with raw memory management.
//! Most internal operations require `unsafe` blocks; the public `Allocator`
//! API is safe to call, but the pointers it hands out are raw and their
//! lifetime is the caller's responsibility, same as any `malloc`/`free` pair.

pub mod align;
mod allocator;
mod block;
mod check;
mod coalesce;
pub mod config;
mod error;
mod extend;
mod freelist;
mod place;
mod rawheap;

pub use allocator::Allocator;
pub use config::Config;
pub use error::{CheckError, InitError};
pub use rawheap::{RawHeap, SbrkHeap, SimHeap};
