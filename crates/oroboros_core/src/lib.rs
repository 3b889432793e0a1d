//! # OROBOROS Core Engine
//!
//! Engine primitives the pool system is built on:
//! - A generational slot pool: values created once, checked out and
//!   returned without touching the allocator
//! - A node hierarchy used to group pooled instances for inspection
//!
//! ## Architecture Rules
//!
//! 1. **No heap allocations in hot path** - All memory is pre-allocated
//! 2. **Generational handles** - Stale references never resolve
//!
//! ## Example
//!
//! ```rust,ignore
//! use oroboros_core::{Hierarchy, SlotPool};
//!
//! let mut hierarchy = Hierarchy::new();
//! let root = hierarchy.create_root("PoolManager");
//!
//! let mut pool: SlotPool<Tile> = SlotPool::with_capacity(10);
//! pool.prefill(10, |_| Tile::default());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod memory;
pub mod scene;

pub use memory::{SlotHandle, SlotPool};
pub use scene::{Hierarchy, Node, NodeId};
