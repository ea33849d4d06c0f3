//! The owned campus hierarchy session.

use tracing::info;

use crate::config::HierarchyConfig;
use crate::entity::{Building, Department, Entity, EntityKind, Floor, Room};
use crate::error::{HierarchyError, Result};
use crate::export;
use crate::format::TableFormat;
use crate::graph::{GraphView, ViewScope};
use crate::import::{ImportReport, Importer};
use crate::query::{EntitySummary, QueryEngine, SearchResults};
use crate::table::Table;
use crate::tree::{HierarchyTree, TreeStats};

/// In-memory authoritative campus hierarchy.
///
/// Starts empty. Each successful [`import`](Self::import) replaces the
/// whole tree; a failed one leaves the previous tree in place.
#[derive(Debug, Clone, Default)]
pub struct HierarchyStore {
    tree: HierarchyTree,
    importer: Importer,
}

impl HierarchyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: HierarchyConfig) -> Self {
        Self {
            tree: HierarchyTree::new(),
            importer: Importer::new(config),
        }
    }

    pub fn config(&self) -> &HierarchyConfig {
        self.importer.config()
    }

    pub fn tree(&self) -> &HierarchyTree {
        &self.tree
    }

    /// Replace the store's contents with the hierarchy in `table`.
    pub fn import(&mut self, table: &Table) -> Result<ImportReport> {
        let (tree, report) = self.importer.import(table)?;
        self.tree = tree;
        info!("Installed campus hierarchy with {} entities", self.tree.len());
        Ok(report)
    }

    pub fn export(&self, format: TableFormat) -> Table {
        export::export(&self.tree, format)
    }

    pub fn has_data(&self) -> bool {
        !self.tree.is_empty()
    }

    pub fn departments(&self) -> Vec<&Department> {
        self.tree
            .entities(EntityKind::Department)
            .filter_map(Entity::as_department)
            .collect()
    }

    /// All buildings, or those of one department.
    pub fn buildings(&self, department_id: Option<&str>) -> Vec<&Building> {
        self.scoped(EntityKind::Building, department_id)
            .into_iter()
            .filter_map(Entity::as_building)
            .collect()
    }

    /// All floors, or those of one building.
    pub fn floors(&self, building_id: Option<&str>) -> Vec<&Floor> {
        self.scoped(EntityKind::Floor, building_id)
            .into_iter()
            .filter_map(Entity::as_floor)
            .collect()
    }

    /// All rooms, or those of one floor.
    pub fn rooms(&self, floor_id: Option<&str>) -> Vec<&Room> {
        self.scoped(EntityKind::Room, floor_id)
            .into_iter()
            .filter_map(Entity::as_room)
            .collect()
    }

    pub fn get(&self, kind: EntityKind, id: &str) -> Option<&Entity> {
        self.query().get(kind, id)
    }

    /// Like [`get`](Self::get), but an unknown entity is an error.
    pub fn require(&self, kind: EntityKind, id: &str) -> Result<&Entity> {
        self.get(kind, id)
            .ok_or_else(|| HierarchyError::EntityNotFound {
                kind,
                id: id.to_string(),
            })
    }

    pub fn parent_of(&self, kind: EntityKind, id: &str) -> Option<&Entity> {
        self.query().parent(kind, id)
    }

    pub fn children(&self, kind: EntityKind, id: &str) -> Vec<&Entity> {
        self.query().children(kind, id)
    }

    pub fn ancestry(&self, kind: EntityKind, id: &str) -> Vec<&Entity> {
        self.query().ancestry(kind, id)
    }

    pub fn summary(&self, kind: EntityKind, id: &str) -> Option<EntitySummary> {
        self.query().summary(kind, id)
    }

    pub fn search(&self, query: &str) -> SearchResults<'_> {
        self.query().search(query)
    }

    pub fn graph_view(&self, scope: &ViewScope) -> GraphView {
        GraphView::build(&self.tree, scope, &self.config().coordinates)
    }

    pub fn stats(&self) -> TreeStats {
        self.tree.stats()
    }

    fn query(&self) -> QueryEngine<'_> {
        QueryEngine::new(&self.tree)
    }

    fn scoped(&self, kind: EntityKind, parent_id: Option<&str>) -> Vec<&Entity> {
        match (parent_id, kind.parent_kind()) {
            (Some(parent_id), Some(parent_kind)) => self.children(parent_kind, parent_id),
            _ => self.tree.entities(kind).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SIMPLE: &str = "\
type,id,name,building_id,description,x,y
department,D1,CS,,,,
building,B1,Tech Hall,D1,,,
building,B2,Annex,D1,,,
floor,F1,Ground,B1,,,
floor,F2,Annex Ground,B2,,,
room,R1,Lab A,F1,,10,20
room,R2,Office,F2,,,
";

    fn loaded() -> HierarchyStore {
        let mut store = HierarchyStore::new();
        store
            .import(&Table::from_csv_str(SIMPLE).unwrap())
            .unwrap();
        store
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = HierarchyStore::new();
        assert!(!store.has_data());
        assert!(store.departments().is_empty());
        assert!(store.rooms(None).is_empty());
        assert!(store.search("lab").is_empty());
        assert!(store.graph_view(&ViewScope::Departments).is_empty());
        assert_eq!(store.export(TableFormat::Standard).len(), 0);
    }

    #[test]
    fn test_scoped_lists() {
        let store = loaded();
        let floor_ids: Vec<&str> = store
            .floors(Some("B2"))
            .into_iter()
            .map(|f| f.id.as_str())
            .collect();
        assert_eq!(floor_ids, vec!["F2"]);
        assert_eq!(store.floors(None).len(), 2);
        assert_eq!(store.buildings(Some("D1")).len(), 2);
        assert!(store.rooms(Some("missing")).is_empty());
    }

    #[test]
    fn test_require_unknown_entity() {
        let store = loaded();
        assert!(store.require(EntityKind::Room, "R1").is_ok());
        let err = store.require(EntityKind::Room, "R9").unwrap_err();
        assert!(matches!(
            err,
            HierarchyError::EntityNotFound {
                kind: EntityKind::Room,
                ..
            }
        ));
    }

    #[test]
    fn test_failed_import_keeps_previous_tree() {
        let mut store = loaded();
        let before = store.stats();
        let bad = Table::from_csv_str(
            "type,id,name,building_id,description,x,y\n\
             department,D1,A,,,,\n\
             department,D1,B,,,,\n",
        )
        .unwrap();
        assert!(store.import(&bad).is_err());
        assert_eq!(store.stats(), before);
    }

    #[test]
    fn test_summary_and_config() {
        let store = HierarchyStore::with_config(HierarchyConfig::default());
        assert_eq!(store.config().room_defaults.capacity, 40);

        let store = loaded();
        let summary = store.summary(EntityKind::Department, "D1").unwrap();
        assert_eq!(summary.rooms, 2);
        assert_eq!(summary.total_capacity, 80);
    }
}
