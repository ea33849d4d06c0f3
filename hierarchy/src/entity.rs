//! Campus entity records.
//!
//! The hierarchy has four levels: departments contain buildings, buildings
//! contain floors and floors contain rooms. Every record carries the ID of
//! the parent it is attached to in the tree (absent when it hangs directly
//! off the root), so there is no overloaded reference field.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the four levels of the campus hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Department,
    Building,
    Floor,
    Room,
}

impl EntityKind {
    /// All kinds, top level first.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Department,
        EntityKind::Building,
        EntityKind::Floor,
        EntityKind::Room,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Department => "department",
            EntityKind::Building => "building",
            EntityKind::Floor => "floor",
            EntityKind::Room => "room",
        }
    }

    /// Plural label used for grouped output ("departments", "rooms", ...).
    pub fn plural(self) -> &'static str {
        match self {
            EntityKind::Department => "departments",
            EntityKind::Building => "buildings",
            EntityKind::Floor => "floors",
            EntityKind::Room => "rooms",
        }
    }

    /// The kind an entity of this kind expects as its parent.
    pub fn parent_kind(self) -> Option<EntityKind> {
        match self {
            EntityKind::Department => None,
            EntityKind::Building => Some(EntityKind::Department),
            EntityKind::Floor => Some(EntityKind::Building),
            EntityKind::Room => Some(EntityKind::Floor),
        }
    }

    /// The kind of this kind's direct children.
    pub fn child_kind(self) -> Option<EntityKind> {
        match self {
            EntityKind::Department => Some(EntityKind::Building),
            EntityKind::Building => Some(EntityKind::Floor),
            EntityKind::Floor => Some(EntityKind::Room),
            EntityKind::Room => None,
        }
    }

    /// Prefix used for graph node keys (`dept_D1`, `room_R1`).
    pub fn node_prefix(self) -> &'static str {
        match self {
            EntityKind::Department => "dept",
            EntityKind::Building => "building",
            EntityKind::Floor => "floor",
            EntityKind::Room => "room",
        }
    }

    /// Parse a kind name, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown entity kind: {s}"))
    }
}

/// An academic department, the top level of the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Department {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A building belonging to a department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Department this building is attached to, absent when root-attached.
    pub department_id: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl Building {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            department_id: None,
            x: None,
            y: None,
        }
    }
}

/// A floor of a building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Building this floor is attached to, absent when root-attached.
    pub building_id: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl Floor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            building_id: None,
            x: None,
            y: None,
        }
    }
}

/// A room on a floor. Rooms always have display coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: String,
    /// Free-text category such as lecture, lab, office, hall or generic.
    #[serde(rename = "type")]
    pub room_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub capacity: u32,
    pub x: f64,
    pub y: f64,
    /// Semicolon-delimited facility list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facilities: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<String>,
    /// Floor this room is attached to, absent when root-attached.
    pub floor_id: Option<String>,
}

impl Room {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        room_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            room_type: room_type.into(),
            description: None,
            capacity: 0,
            x: 0.0,
            y: 0.0,
            facilities: None,
            accessibility: None,
            floor_id: None,
        }
    }

    /// Individual facilities, trimmed, with empty entries dropped.
    pub fn facility_list(&self) -> Vec<&str> {
        self.facilities
            .as_deref()
            .map(|f| {
                f.split(';')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Any campus entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Department(Department),
    Building(Building),
    Floor(Floor),
    Room(Room),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Department(_) => EntityKind::Department,
            Entity::Building(_) => EntityKind::Building,
            Entity::Floor(_) => EntityKind::Floor,
            Entity::Room(_) => EntityKind::Room,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Entity::Department(d) => &d.id,
            Entity::Building(b) => &b.id,
            Entity::Floor(f) => &f.id,
            Entity::Room(r) => &r.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Entity::Department(d) => &d.name,
            Entity::Building(b) => &b.name,
            Entity::Floor(f) => &f.name,
            Entity::Room(r) => &r.name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Entity::Department(d) => d.description.as_deref(),
            Entity::Building(b) => b.description.as_deref(),
            Entity::Floor(f) => f.description.as_deref(),
            Entity::Room(r) => r.description.as_deref(),
        }
    }

    /// ID of the entity this one is attached to.
    pub fn parent_id(&self) -> Option<&str> {
        match self {
            Entity::Department(_) => None,
            Entity::Building(b) => b.department_id.as_deref(),
            Entity::Floor(f) => f.building_id.as_deref(),
            Entity::Room(r) => r.floor_id.as_deref(),
        }
    }

    pub(crate) fn set_parent_id(&mut self, parent_id: Option<String>) {
        match self {
            Entity::Department(_) => {}
            Entity::Building(b) => b.department_id = parent_id,
            Entity::Floor(f) => f.building_id = parent_id,
            Entity::Room(r) => r.floor_id = parent_id,
        }
    }

    /// Stored display coordinates, if any.
    pub fn position(&self) -> Option<(f64, f64)> {
        match self {
            Entity::Department(_) => None,
            Entity::Building(b) => b.x.zip(b.y),
            Entity::Floor(f) => f.x.zip(f.y),
            Entity::Room(r) => Some((r.x, r.y)),
        }
    }

    /// Text fields that participate in search, in match order.
    pub fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name()];
        if let Entity::Room(room) = self {
            fields.push(&room.room_type);
        }
        fields.extend(self.description());
        if let Entity::Room(room) = self {
            fields.extend(room.facilities.as_deref());
        }
        fields
    }

    pub fn as_department(&self) -> Option<&Department> {
        match self {
            Entity::Department(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_building(&self) -> Option<&Building> {
        match self {
            Entity::Building(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_floor(&self) -> Option<&Floor> {
        match self {
            Entity::Floor(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_room(&self) -> Option<&Room> {
        match self {
            Entity::Room(r) => Some(r),
            _ => None,
        }
    }
}

impl From<Department> for Entity {
    fn from(value: Department) -> Self {
        Entity::Department(value)
    }
}

impl From<Building> for Entity {
    fn from(value: Building) -> Self {
        Entity::Building(value)
    }
}

impl From<Floor> for Entity {
    fn from(value: Floor) -> Self {
        Entity::Floor(value)
    }
}

impl From<Room> for Entity {
    fn from(value: Room) -> Self {
        Entity::Room(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kind_parse_is_case_insensitive() {
        assert_eq!(EntityKind::parse("Building"), Some(EntityKind::Building));
        assert_eq!(EntityKind::parse(" ROOM "), Some(EntityKind::Room));
        assert_eq!(EntityKind::parse("wing"), None);
        assert!("corridor".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_kind_levels() {
        assert_eq!(EntityKind::Department.parent_kind(), None);
        assert_eq!(EntityKind::Room.parent_kind(), Some(EntityKind::Floor));
        assert_eq!(EntityKind::Floor.child_kind(), Some(EntityKind::Room));
        assert_eq!(EntityKind::Room.child_kind(), None);
    }

    #[test]
    fn test_facility_list() {
        let mut room = Room::new("R1", "Lab A", "lab");
        room.facilities = Some("projector; whiteboard;;  sinks ".to_string());
        assert_eq!(room.facility_list(), vec!["projector", "whiteboard", "sinks"]);

        room.facilities = None;
        assert!(room.facility_list().is_empty());
    }

    #[test]
    fn test_room_search_fields() {
        let mut room = Room::new("R1", "CS Lab 1", "lab");
        room.facilities = Some("projector".to_string());
        let entity = Entity::from(room);
        assert_eq!(entity.search_fields(), vec!["CS Lab 1", "lab", "projector"]);
    }

    #[test]
    fn test_entity_serializes_with_kind_tag() {
        let entity = Entity::from(Department::new("D1", "CS"));
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["kind"], "department");
        assert_eq!(json["id"], "D1");
    }
}
