//! # Node Hierarchy
//!
//! Slot-backed parent/child tree of named grouping nodes.

use super::node::{Node, NodeId};

struct NodeSlot {
    node: Option<Node>,
    generation: u32,
}

/// A forest of named grouping nodes.
///
/// Removed slots are recycled with a bumped generation, so ids of
/// removed nodes never resolve again.
///
/// # Example
///
/// ```rust,ignore
/// let mut hierarchy = Hierarchy::new();
/// let root = hierarchy.create_root("PoolManager");
/// let shadows = hierarchy.create("Pool: Shadow", Some(root)).unwrap();
/// assert_eq!(hierarchy.path(shadows).unwrap(), "PoolManager/Pool: Shadow");
/// ```
#[derive(Default)]
pub struct Hierarchy {
    slots: Vec<NodeSlot>,
    free_indices: Vec<u32>,
    len: usize,
}

impl Hierarchy {
    /// Creates an empty hierarchy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the hierarchy has no nodes.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Creates a root node.
    pub fn create_root(&mut self, name: impl Into<String>) -> NodeId {
        self.insert(name.into(), None)
    }

    /// Creates a root node with one child per name, in order.
    ///
    /// # Returns
    ///
    /// The root and its children.
    pub fn create_root_with_children<S: Into<String>>(
        &mut self,
        name: impl Into<String>,
        children: impl IntoIterator<Item = S>,
    ) -> (NodeId, Vec<NodeId>) {
        let root = self.insert(name.into(), None);
        let children = children
            .into_iter()
            .map(|child| self.insert(child.into(), Some(root)))
            .collect();
        (root, children)
    }

    /// Creates a node named `name` under `parent` (or as a root).
    ///
    /// # Returns
    ///
    /// The new node's ID, or None if `parent` does not exist.
    pub fn create(&mut self, name: impl Into<String>, parent: Option<NodeId>) -> Option<NodeId> {
        if let Some(parent) = parent {
            if !self.contains(parent) {
                return None;
            }
        }
        Some(self.insert(name.into(), parent))
    }

    fn insert(&mut self, name: String, parent: Option<NodeId>) -> NodeId {
        let node = Node {
            name,
            parent,
            children: Vec::new(),
        };

        let id = if let Some(index) = self.free_indices.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.node = Some(node);
            NodeId::new(index, slot.generation)
        } else {
            let index = to_index(self.slots.len());
            self.slots.push(NodeSlot {
                node: Some(node),
                generation: 0,
            });
            NodeId::new(index, 0)
        };

        if let Some(parent) = parent.and_then(|p| self.get_mut(p)) {
            parent.children.push(id);
        }
        self.len += 1;

        tracing::debug!(node = %id, "hierarchy node created");
        id
    }

    /// Whether `id` refers to a live node.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Looks up a node.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.as_ref()
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.as_mut()
    }

    /// Name of a node.
    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(Node::name)
    }

    /// Parent of a node. None for roots and unknown ids.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    /// Children of a node. Empty for unknown ids.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[][..], Node::children)
    }

    /// First child of `parent` named `name`.
    #[must_use]
    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&child| self.name(child) == Some(name))
    }

    /// Slash-separated path from the root to `id`.
    #[must_use]
    pub fn path(&self, id: NodeId) -> Option<String> {
        let mut segments = vec![self.name(id)?];
        let mut cursor = self.parent(id);
        while let Some(parent) = cursor {
            segments.push(self.name(parent)?);
            cursor = self.parent(parent);
        }
        segments.reverse();
        Some(segments.join("/"))
    }

    /// Iterates over root nodes.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let node = slot.node.as_ref()?;
            let id = NodeId::new(to_index(index), slot.generation);
            node.parent.is_none().then_some(id)
        })
    }

    /// Removes `id` and its whole subtree.
    ///
    /// # Returns
    ///
    /// Number of nodes removed (0 if `id` was not live).
    pub fn remove(&mut self, id: NodeId) -> usize {
        let Some(node) = self.get(id) else {
            return 0;
        };
        let parent = node.parent;

        if let Some(parent) = parent.and_then(|p| self.get_mut(p)) {
            parent.children.retain(|&child| child != id);
        }

        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let slot = &mut self.slots[current.index() as usize];
            if let Some(node) = slot.node.take() {
                stack.extend(node.children);
                self.free_indices.push(current.index());
                removed += 1;
            }
        }
        self.len -= removed;
        removed
    }

    /// Removes every node. Outstanding ids become stale.
    pub fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.node.take().is_some() {
                self.free_indices.push(to_index(index));
            }
        }
        self.len = 0;
    }
}

#[inline]
#[allow(clippy::cast_possible_truncation)]
const fn to_index(index: usize) -> u32 {
    index as u32
}
