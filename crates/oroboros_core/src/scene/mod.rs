//! # Scene Hierarchy
//!
//! Named grouping nodes used to organize pooled instances for inspection.
//! Nodes have no behavioral role: nothing is rendered or simulated here.

mod hierarchy;
mod node;

pub use hierarchy::Hierarchy;
pub use node::{Node, NodeId};
