//! Read-only queries over a hierarchy tree.
//!
//! Queries never fail. Unknown IDs and an empty tree produce empty or
//! absent results.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::entity::{Entity, EntityKind};
use crate::tree::HierarchyTree;

/// Search matches grouped by entity kind.
///
/// Every kind is always present, possibly with no matches. Matches keep
/// the tree's insertion order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SearchResults<'a> {
    matches: BTreeMap<EntityKind, Vec<&'a Entity>>,
}

impl<'a> SearchResults<'a> {
    fn empty() -> Self {
        Self {
            matches: EntityKind::ALL.iter().map(|kind| (*kind, Vec::new())).collect(),
        }
    }

    /// Matches of one kind.
    pub fn get(&self, kind: EntityKind) -> &[&'a Entity] {
        self.matches.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn total(&self) -> usize {
        self.matches.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, &[&'a Entity])> {
        self.matches.iter().map(|(kind, v)| (*kind, v.as_slice()))
    }
}

/// Counts of everything beneath an entity.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntitySummary {
    pub buildings: usize,
    pub floors: usize,
    pub rooms: usize,
    pub total_capacity: u64,
}

/// Query engine borrowing a tree.
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'a> {
    tree: &'a HierarchyTree,
}

impl<'a> QueryEngine<'a> {
    pub fn new(tree: &'a HierarchyTree) -> Self {
        Self { tree }
    }

    pub fn get(&self, kind: EntityKind, id: &str) -> Option<&'a Entity> {
        self.tree.get(kind, id)
    }

    /// Direct children of an entity that are of its child kind.
    pub fn children(&self, kind: EntityKind, id: &str) -> Vec<&'a Entity> {
        let (Some(node), Some(child_kind)) = (self.tree.find(kind, id), kind.child_kind()) else {
            return Vec::new();
        };
        self.tree
            .children_of(node)
            .filter(|child| child.kind() == child_kind)
            .collect()
    }

    /// Direct parent entity; `None` when root-attached or unknown.
    pub fn parent(&self, kind: EntityKind, id: &str) -> Option<&'a Entity> {
        self.tree
            .find(kind, id)
            .and_then(|node| self.tree.parent_of(node))
    }

    /// Path from the top-level ancestor down to the entity, inclusive.
    pub fn ancestry(&self, kind: EntityKind, id: &str) -> Vec<&'a Entity> {
        self.tree
            .find(kind, id)
            .map(|node| self.tree.ancestry(node))
            .unwrap_or_default()
    }

    /// Totals of everything beneath an entity.
    pub fn summary(&self, kind: EntityKind, id: &str) -> Option<EntitySummary> {
        let node = self.tree.find(kind, id)?;
        let mut summary = EntitySummary::default();
        for entity in self.tree.descendants(node) {
            match entity {
                Entity::Department(_) => {}
                Entity::Building(_) => summary.buildings += 1,
                Entity::Floor(_) => summary.floors += 1,
                Entity::Room(room) => {
                    summary.rooms += 1;
                    summary.total_capacity += u64::from(room.capacity);
                }
            }
        }
        Some(summary)
    }

    /// Case-insensitive substring search across every kind.
    ///
    /// Departments, buildings and floors match on name and description;
    /// rooms also match on type and facilities. An empty query matches
    /// nothing.
    pub fn search(&self, query: &str) -> SearchResults<'a> {
        let mut results = SearchResults::empty();
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return results;
        }

        for entity in self.tree.all_entities() {
            let hit = entity
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if hit {
                results.matches.entry(entity.kind()).or_default().push(entity);
            }
        }

        results
    }
}
