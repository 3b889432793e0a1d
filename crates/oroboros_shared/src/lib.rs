//! # OROBOROS Shared
//!
//! Placement math shared by the pool system and its callers.
//!
//! ## RULE
//!
//! This crate must NEVER depend on a GPU, window or engine crate.
//! Pool callers from any layer must be able to use these types.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod math;

pub use math::{Quaternion, Transform, Vec3};
