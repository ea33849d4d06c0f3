//! Serializing a hierarchy tree back to tabular form.
//!
//! Either format can be produced from any tree, whatever format it was
//! imported from. Exporting to the simple format drops the room-only
//! attributes (`type`, `capacity`, `facilities`, `accessibility`) because
//! that layout has no columns for them; re-importing such a table gives
//! rooms the configured defaults instead. This loss is accepted.

use crate::entity::{Entity, EntityKind};
use crate::format::TableFormat;
use crate::table::Table;
use crate::tree::HierarchyTree;

/// Export `tree` in the requested format.
pub fn export(tree: &HierarchyTree, format: TableFormat) -> Table {
    match format {
        TableFormat::Standard => export_standard(tree),
        TableFormat::Simple => export_simple(tree),
    }
}

/// One row per room with its full ancestor chain. Rooms attached outside
/// a complete chain get blank ancestor cells.
fn export_standard(tree: &HierarchyTree) -> Table {
    let mut table = Table::new(TableFormat::Standard.export_columns());

    for room_entity in tree.entities(EntityKind::Room) {
        let Some(room) = room_entity.as_room() else {
            continue;
        };
        let ancestry = tree
            .find(EntityKind::Room, &room.id)
            .map(|node| tree.ancestry(node))
            .unwrap_or_default();
        let ancestor = |kind: EntityKind| ancestry.iter().copied().find(|e| e.kind() == kind);
        let dept = ancestor(EntityKind::Department);
        let building = ancestor(EntityKind::Building);
        let floor = ancestor(EntityKind::Floor);

        table.push_row([
            id_of(dept),
            name_of(dept),
            id_of(building),
            name_of(building),
            id_of(floor),
            name_of(floor),
            room.id.clone(),
            room.name.clone(),
            room.room_type.clone(),
            room.capacity.to_string(),
            room.x.to_string(),
            room.y.to_string(),
            description_of(dept),
            description_of(building),
            description_of(floor),
            room.description.clone().unwrap_or_default(),
            room.facilities.clone().unwrap_or_default(),
            room.accessibility.clone().unwrap_or_default(),
        ]);
    }

    table
}

/// One row per entity, departments first. The `building_id` column holds
/// each row's parent ID.
fn export_simple(tree: &HierarchyTree) -> Table {
    let mut table = Table::new(TableFormat::Simple.export_columns());

    for kind in EntityKind::ALL {
        for entity in tree.entities(kind) {
            let (x, y) = entity
                .position()
                .map(|(x, y)| (x.to_string(), y.to_string()))
                .unwrap_or_default();
            table.push_row([
                kind.as_str().to_string(),
                entity.id().to_string(),
                entity.name().to_string(),
                entity.parent_id().unwrap_or_default().to_string(),
                entity.description().unwrap_or_default().to_string(),
                x,
                y,
            ]);
        }
    }

    table
}

fn id_of(entity: Option<&Entity>) -> String {
    entity.map(|e| e.id().to_string()).unwrap_or_default()
}

fn name_of(entity: Option<&Entity>) -> String {
    entity.map(|e| e.name().to_string()).unwrap_or_default()
}

fn description_of(entity: Option<&Entity>) -> String {
    entity
        .and_then(Entity::description)
        .unwrap_or_default()
        .to_string()
}
