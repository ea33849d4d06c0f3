//! Building a hierarchy tree from tabular data.
//!
//! The importer validates a table, then runs the transform for its format
//! into a brand new [`HierarchyTree`]. Nothing is shared with any previous
//! tree, so a failed import cannot leave partial state behind.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::HierarchyConfig;
use crate::entity::{Building, Department, Entity, EntityKind, Floor, Room};
use crate::error::Result;
use crate::format::{self, TableFormat};
use crate::table::{Row, Table};
use crate::tree::{HierarchyTree, TreeStats};

/// Where an entity with an unresolvable parent reference was attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "to", rename_all = "snake_case")]
pub enum Attachment {
    /// The first previously imported entity of the expected parent kind.
    FirstAvailable { parent_id: String },
    /// Directly under the root.
    Root,
}

/// A parent reference that did not name an imported entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    pub row: usize,
    pub kind: EntityKind,
    pub id: String,
    /// The reference as written, `None` when the cell was blank.
    pub reference: Option<String>,
    pub attached: Attachment,
}

/// A row ignored because its `type` is not an entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub row: usize,
    pub entity_type: String,
}

/// Summary of a successful import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub format: TableFormat,
    pub rows: usize,
    pub stats: TreeStats,
    pub dangling: Vec<DanglingReference>,
    pub skipped: Vec<SkippedRow>,
}

/// Transforms validated tables into hierarchy trees.
#[derive(Debug, Clone, Default)]
pub struct Importer {
    config: HierarchyConfig,
}

impl Importer {
    pub fn new(config: HierarchyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HierarchyConfig {
        &self.config
    }

    /// Validate `table` and build a fresh tree from it.
    pub fn import(&self, table: &Table) -> Result<(HierarchyTree, ImportReport)> {
        let format = format::validate(table)?;
        debug!("Importing {} rows as {format} format", table.len());

        let mut tree = HierarchyTree::new();
        let mut report = ImportReport {
            format,
            rows: table.len(),
            stats: TreeStats::default(),
            dangling: Vec::new(),
            skipped: Vec::new(),
        };

        match format {
            TableFormat::Standard => self.import_standard(table, &mut tree)?,
            TableFormat::Simple => self.import_simple(table, &mut tree, &mut report)?,
        }

        report.stats = tree.stats();
        info!(
            "Imported {format} table: {} departments, {} buildings, {} floors, {} rooms",
            report.stats.departments,
            report.stats.buildings,
            report.stats.floors,
            report.stats.rooms
        );
        if !report.dangling.is_empty() {
            warn!(
                "{} parent references could not be resolved and were reattached",
                report.dangling.len()
            );
        }

        Ok((tree, report))
    }

    /// One row per room; the first row naming an ancestor defines it.
    fn import_standard(&self, table: &Table, tree: &mut HierarchyTree) -> Result<()> {
        for row in table.rows() {
            let dept_id = row.require("department_id")?;
            let building_id = row.require("building_id")?;
            let floor_id = row.require("floor_id")?;
            let room_id = row.require("room_id")?;

            if !tree.contains(EntityKind::Department, dept_id) {
                let department = Department {
                    id: dept_id.to_string(),
                    name: text_or_empty(&row, "department_name"),
                    description: optional(&row, "department_description"),
                };
                tree.insert(department.into(), None)?;
            }

            if !tree.contains(EntityKind::Building, building_id) {
                let building = Building {
                    description: optional(&row, "building_description"),
                    ..Building::new(building_id, text_or_empty(&row, "building_name"))
                };
                tree.insert(building.into(), Some(dept_id))?;
            }

            if !tree.contains(EntityKind::Floor, floor_id) {
                let floor = Floor {
                    description: optional(&row, "floor_description"),
                    ..Floor::new(floor_id, text_or_empty(&row, "floor_name"))
                };
                tree.insert(floor.into(), Some(building_id))?;
            }

            let room = Room {
                id: room_id.to_string(),
                name: text_or_empty(&row, "room_name"),
                room_type: row
                    .text("room_type")
                    .unwrap_or(self.config.room_defaults.room_type.as_str())
                    .to_string(),
                description: optional(&row, "room_description"),
                capacity: row.require_count("capacity")?,
                x: row.require_number("x_coordinate")?,
                y: row.require_number("y_coordinate")?,
                facilities: optional(&row, "room_facilities"),
                accessibility: optional(&row, "accessibility"),
                floor_id: None,
            };
            tree.insert(room.into(), Some(floor_id))?;
        }

        Ok(())
    }

    /// One row per entity, processed level by level so that a row may only
    /// reference entities from the levels above it.
    fn import_simple(
        &self,
        table: &Table,
        tree: &mut HierarchyTree,
        report: &mut ImportReport,
    ) -> Result<()> {
        let mut levels: [Vec<Row<'_>>; 4] = Default::default();

        for row in table.rows() {
            let entity_type = row.require("type")?;
            row.require("id")?;
            match EntityKind::parse(entity_type) {
                Some(kind) => levels[level(kind)].push(row),
                None => {
                    warn!(
                        "Skipping row {} with unknown type '{entity_type}'",
                        row.number()
                    );
                    report.skipped.push(SkippedRow {
                        row: row.number(),
                        entity_type: entity_type.to_string(),
                    });
                }
            }
        }

        for kind in EntityKind::ALL {
            let rows = &levels[level(kind)];
            debug!("Importing {} {}", rows.len(), kind.plural());
            for row in rows {
                let entity = self.simple_entity(kind, row)?;
                let parent = resolve_parent(tree, kind, row, entity.id(), report);
                tree.insert(entity, parent.as_deref())?;
            }
        }

        Ok(())
    }

    fn simple_entity(&self, kind: EntityKind, row: &Row<'_>) -> Result<Entity> {
        let id = row.require("id")?;
        let name = text_or_empty(row, "name");
        let description = optional(row, "description");
        let point = self.config.coordinates.resolve(
            row.number_or_none("x"),
            row.number_or_none("y"),
            id,
            &name,
        );

        let entity = match kind {
            EntityKind::Department => Department {
                id: id.to_string(),
                name,
                description,
            }
            .into(),
            EntityKind::Building => Building {
                description,
                x: Some(point.x),
                y: Some(point.y),
                ..Building::new(id, name)
            }
            .into(),
            EntityKind::Floor => Floor {
                description,
                x: Some(point.x),
                y: Some(point.y),
                ..Floor::new(id, name)
            }
            .into(),
            EntityKind::Room => {
                let defaults = &self.config.room_defaults;
                Room {
                    description,
                    capacity: defaults.capacity,
                    x: point.x,
                    y: point.y,
                    ..Room::new(id, name, defaults.room_type.clone())
                }
                .into()
            }
        };
        Ok(entity)
    }
}

/// Resolve the overloaded `building_id` reference of a simple-format row.
///
/// Falls back to the first imported entity of the expected parent kind,
/// then to the root. Which entity is "first" follows insertion order.
fn resolve_parent(
    tree: &HierarchyTree,
    kind: EntityKind,
    row: &Row<'_>,
    id: &str,
    report: &mut ImportReport,
) -> Option<String> {
    let parent_kind = kind.parent_kind()?;
    let reference = row.text("building_id");

    if let Some(reference) = reference {
        if tree.contains(parent_kind, reference) {
            return Some(reference.to_string());
        }
    }

    let fallback = tree.first(parent_kind).map(|e| e.id().to_string());
    let attached = match &fallback {
        Some(parent_id) => Attachment::FirstAvailable {
            parent_id: parent_id.clone(),
        },
        None => Attachment::Root,
    };
    warn!(
        "Row {}: {kind} '{id}' references unknown {parent_kind} '{}', attaching to {}",
        row.number(),
        reference.unwrap_or_default(),
        fallback.as_deref().unwrap_or("root")
    );
    report.dangling.push(DanglingReference {
        row: row.number(),
        kind,
        id: id.to_string(),
        reference: reference.map(str::to_string),
        attached,
    });

    fallback
}

fn level(kind: EntityKind) -> usize {
    match kind {
        EntityKind::Department => 0,
        EntityKind::Building => 1,
        EntityKind::Floor => 2,
        EntityKind::Room => 3,
    }
}

fn text_or_empty(row: &Row<'_>, column: &str) -> String {
    row.get(column).unwrap_or_default().to_string()
}

fn optional(row: &Row<'_>, column: &str) -> Option<String> {
    row.text(column).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HierarchyError;
    use crate::format::{SIMPLE_COLUMNS, STANDARD_COLUMNS};
    use pretty_assertions::assert_eq;

    fn simple_table(rows: &[[&str; 7]]) -> Table {
        let mut table = Table::new(SIMPLE_COLUMNS.iter().copied());
        for row in rows {
            table.push_row(row.iter().copied());
        }
        table
    }

    #[test]
    fn test_simple_import_levels_in_order() {
        // Rows are listed bottom-up; the level ordering still resolves them.
        let table = simple_table(&[
            ["room", "R1", "Lab A", "F1", "", "", ""],
            ["floor", "F1", "Floor 1", "B1", "", "", ""],
            ["building", "B1", "Tech Hall", "D1", "", "10", "20"],
            ["department", "D1", "CS", "", "", "", ""],
        ]);
        let (tree, report) = Importer::default().import(&table).unwrap();

        assert!(report.dangling.is_empty());
        assert_eq!(tree.get(EntityKind::Room, "R1").unwrap().parent_id(), Some("F1"));
        let building = tree.get(EntityKind::Building, "B1").unwrap();
        assert_eq!(building.position(), Some((10.0, 20.0)));
    }

    #[test]
    fn test_simple_room_defaults() {
        let table = simple_table(&[["room", "R1", "Lab A", "", "", "", ""]]);
        let config = HierarchyConfig::default();
        let (tree, _) = Importer::new(config.clone()).import(&table).unwrap();

        let room = tree.get(EntityKind::Room, "R1").unwrap().as_room().unwrap();
        assert_eq!(room.room_type, "generic");
        assert_eq!(room.capacity, 40);
        assert_eq!(room.x, config.coordinates.synthesize("R1"));
        assert_eq!(room.y, config.coordinates.synthesize("Lab A"));
    }

    #[test]
    fn test_non_numeric_coordinates_are_synthesized() {
        let table = simple_table(&[["building", "B1", "Hall", "", "", "north", "7"]]);
        let (tree, _) = Importer::default().import(&table).unwrap();

        let building = tree.get(EntityKind::Building, "B1").unwrap().as_building().unwrap();
        let synthesized = HierarchyConfig::default().coordinates.synthesize("B1");
        assert_eq!(building.x, Some(synthesized));
        assert_eq!(building.y, Some(7.0));
    }

    #[test]
    fn test_dangling_building_goes_to_first_department() {
        let table = simple_table(&[
            ["department", "D1", "CS", "", "", "", ""],
            ["department", "D2", "Math", "", "", "", ""],
            ["building", "B1", "Hall", "D9", "", "", ""],
        ]);
        let (tree, report) = Importer::default().import(&table).unwrap();

        assert_eq!(
            tree.get(EntityKind::Building, "B1").unwrap().parent_id(),
            Some("D1")
        );
        assert_eq!(
            report.dangling,
            vec![DanglingReference {
                row: 3,
                kind: EntityKind::Building,
                id: "B1".to_string(),
                reference: Some("D9".to_string()),
                attached: Attachment::FirstAvailable {
                    parent_id: "D1".to_string()
                },
            }]
        );
    }

    #[test]
    fn test_unknown_type_is_skipped() {
        let table = simple_table(&[
            ["department", "D1", "CS", "", "", "", ""],
            ["parking", "P1", "Lot A", "", "", "", ""],
        ]);
        let (tree, report) = Importer::default().import(&table).unwrap();

        assert_eq!(tree.len(), 1);
        assert_eq!(
            report.skipped,
            vec![SkippedRow {
                row: 2,
                entity_type: "parking".to_string()
            }]
        );
    }

    #[test]
    fn test_blank_id_fails() {
        let table = simple_table(&[["department", "", "CS", "", "", "", ""]]);
        let err = Importer::default().import(&table).unwrap_err();
        assert!(matches!(err, HierarchyError::MissingField { row: 1, .. }));
    }

    #[test]
    fn test_standard_import_groups_ancestors() {
        let mut table = Table::new(STANDARD_COLUMNS.iter().copied());
        table.push_row([
            "D1", "CS", "B1", "Tech Hall", "F1", "Ground", "R1", "Lab 1", "lab", "30", "10", "20",
        ]);
        table.push_row([
            "D1", "Renamed", "B1", "Tech Hall", "F1", "Ground", "R2", "Office", "office", "2", "30",
            "40",
        ]);
        let (tree, report) = Importer::default().import(&table).unwrap();

        assert_eq!(report.format, TableFormat::Standard);
        assert_eq!(report.stats.departments, 1);
        assert_eq!(report.stats.rooms, 2);
        // First occurrence wins for ancestor attributes.
        assert_eq!(tree.get(EntityKind::Department, "D1").unwrap().name(), "CS");

        let room = tree.get(EntityKind::Room, "R2").unwrap().as_room().unwrap();
        assert_eq!(room.capacity, 2);
        assert_eq!((room.x, room.y), (30.0, 40.0));
        assert_eq!(room.floor_id.as_deref(), Some("F1"));

        let building = tree.get(EntityKind::Building, "B1").unwrap();
        assert_eq!(building.position(), None);
    }

    #[test]
    fn test_standard_invalid_capacity() {
        let mut table = Table::new(STANDARD_COLUMNS.iter().copied());
        table.push_row([
            "D1", "CS", "B1", "Hall", "F1", "Ground", "R1", "Lab", "lab", "many", "10", "20",
        ]);
        let err = Importer::default().import(&table).unwrap_err();
        match err {
            HierarchyError::InvalidValue { row, column, value } => {
                assert_eq!(row, 1);
                assert_eq!(column, "capacity");
                assert_eq!(value, "many");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
