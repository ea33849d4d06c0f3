//! Hierarchical campus tree.
//!
//! The `HierarchyTree` is a single arena of nodes. Node 0 is a synthetic
//! root; every other node holds exactly one entity and knows its parent
//! and its children in insertion order. Children-of queries and graph
//! views are both derived from this one structure.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::entity::{Entity, EntityKind};
use crate::error::{HierarchyError, Result};

/// Index of a node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    /// The synthetic root node.
    pub const ROOT: NodeId = NodeId(0);

    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

/// A node in the hierarchy tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// The entity held by this node (`None` only for the root).
    entity: Option<Entity>,

    /// Parent node (`None` only for the root).
    parent: Option<NodeId>,

    /// Child nodes in insertion order.
    children: Vec<NodeId>,
}

impl Node {
    pub fn entity(&self) -> Option<&Entity> {
        self.entity.as_ref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// The campus hierarchy: root → departments → buildings → floors → rooms.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyTree {
    /// All nodes; index 0 is the root.
    nodes: Vec<Node>,

    /// Lookup from (kind, entity ID) to node.
    index: HashMap<(EntityKind, String), NodeId>,
}

impl Default for HierarchyTree {
    fn default() -> Self {
        Self::new()
    }
}

impl HierarchyTree {
    /// Create an empty tree holding only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                entity: None,
                parent: None,
                children: Vec::new(),
            }],
            index: HashMap::new(),
        }
    }

    /// Number of entities (the root is not counted).
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn root(&self) -> &Node {
        &self.nodes[NodeId::ROOT.0]
    }

    /// Find the node holding an entity.
    pub fn find(&self, kind: EntityKind, id: &str) -> Option<NodeId> {
        self.index.get(&(kind, id.to_string())).copied()
    }

    pub fn contains(&self, kind: EntityKind, id: &str) -> bool {
        self.find(kind, id).is_some()
    }

    pub fn entity(&self, node: NodeId) -> Option<&Entity> {
        self.node(node).and_then(Node::entity)
    }

    /// Get an entity by kind and ID.
    pub fn get(&self, kind: EntityKind, id: &str) -> Option<&Entity> {
        self.find(kind, id).and_then(|node| self.entity(node))
    }

    /// Insert an entity under the parent with the given ID, or under the
    /// root when `parent_id` is `None`.
    ///
    /// The parent is looked up among entities of the kind this entity
    /// expects as its parent. The entity's parent attribute is overwritten
    /// so it always names the node it is attached to.
    pub fn insert(&mut self, mut entity: Entity, parent_id: Option<&str>) -> Result<NodeId> {
        let kind = entity.kind();
        if self.contains(kind, entity.id()) {
            return Err(HierarchyError::DuplicateKey {
                column: format!("{kind}_id"),
                values: vec![entity.id().to_string()],
            });
        }

        let parent = match (parent_id, kind.parent_kind()) {
            (Some(pid), Some(parent_kind)) => {
                self.find(parent_kind, pid)
                    .ok_or_else(|| HierarchyError::EntityNotFound {
                        kind: parent_kind,
                        id: pid.to_string(),
                    })?
            }
            (Some(pid), None) => {
                warn!("Ignoring parent '{pid}' for top-level {kind} '{}'", entity.id());
                NodeId::ROOT
            }
            (None, _) => NodeId::ROOT,
        };

        entity.set_parent_id(if parent.is_root() {
            None
        } else {
            parent_id.map(str::to_string)
        });

        let node_id = NodeId(self.nodes.len());
        self.index
            .insert((kind, entity.id().to_string()), node_id);
        self.nodes.push(Node {
            entity: Some(entity),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(node_id);

        Ok(node_id)
    }

    /// All entities of a kind, in insertion order.
    pub fn entities(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.nodes
            .iter()
            .filter_map(Node::entity)
            .filter(move |e| e.kind() == kind)
    }

    /// All entities, in insertion order.
    pub fn all_entities(&self) -> impl Iterator<Item = &Entity> {
        self.nodes.iter().filter_map(Node::entity)
    }

    /// The first inserted entity of a kind.
    pub fn first(&self, kind: EntityKind) -> Option<&Entity> {
        self.entities(kind).next()
    }

    /// Direct children of a node, in insertion order.
    pub fn children_of(&self, node: NodeId) -> impl Iterator<Item = &Entity> {
        self.node(node)
            .map(Node::children)
            .unwrap_or_default()
            .iter()
            .filter_map(|child| self.entity(*child))
    }

    /// Entities attached directly to the root.
    pub fn top_level(&self) -> impl Iterator<Item = &Entity> {
        self.children_of(NodeId::ROOT)
    }

    /// Direct parent entity of a node; `None` for root-attached nodes.
    pub fn parent_of(&self, node: NodeId) -> Option<&Entity> {
        self.node(node)
            .and_then(Node::parent)
            .and_then(|parent| self.entity(parent))
    }

    /// Path from the top-level ancestor down to the node, inclusive.
    pub fn ancestry(&self, node: NodeId) -> Vec<&Entity> {
        let mut ancestry = Vec::new();
        let mut current = Some(node);

        while let Some(id) = current {
            let Some(n) = self.node(id) else {
                break;
            };
            if let Some(entity) = n.entity() {
                ancestry.push(entity);
            }
            current = n.parent;
        }

        ancestry.reverse();
        ancestry
    }

    /// All descendants of a node in depth-first order.
    pub fn descendants(&self, node: NodeId) -> Vec<&Entity> {
        let mut descendants = Vec::new();
        let mut to_visit: Vec<NodeId> = self
            .node(node)
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();

        while let Some(id) = to_visit.pop() {
            if let Some(n) = self.node(id) {
                descendants.extend(n.entity());
                to_visit.extend(n.children.iter().rev());
            }
        }

        descendants
    }

    /// Depth of a node (root = 0, departments = 1).
    pub fn depth(&self, node: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.node(node).and_then(Node::parent);
        while let Some(id) = current {
            depth += 1;
            current = self.node(id).and_then(Node::parent);
        }
        depth
    }

    /// Get statistics about the tree.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();

        for entity in self.all_entities() {
            match entity {
                Entity::Department(_) => stats.departments += 1,
                Entity::Building(_) => stats.buildings += 1,
                Entity::Floor(_) => stats.floors += 1,
                Entity::Room(room) => {
                    stats.rooms += 1;
                    stats.total_capacity += u64::from(room.capacity);
                }
            }
        }

        stats.root_attached = self
            .top_level()
            .filter(|e| e.kind() != EntityKind::Department)
            .count();

        stats
    }
}

/// Statistics about the hierarchy tree.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    pub departments: usize,
    pub buildings: usize,
    pub floors: usize,
    pub rooms: usize,
    /// Non-department entities hanging directly off the root.
    pub root_attached: usize,
    pub total_capacity: u64,
}

impl fmt::Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Campus Statistics:")?;
        writeln!(f, "  Departments: {}", self.departments)?;
        writeln!(f, "  Buildings: {}", self.buildings)?;
        writeln!(f, "  Floors: {}", self.floors)?;
        writeln!(f, "  Rooms: {}", self.rooms)?;
        writeln!(f, "  Root-attached: {}", self.root_attached)?;
        writeln!(f, "  Total capacity: {}", self.total_capacity)
    }
}
