//! # Memory Management
//!
//! Pre-allocated pools for zero-allocation gameplay.
//!
//! ## Design Philosophy
//!
//! All memory is allocated once at startup. During gameplay:
//! - No heap allocations
//! - No garbage collection
//! - Predictable, flat latency

mod pool;

pub use pool::{SlotHandle, SlotPool};
