//! Node/edge views of one level of the hierarchy.
//!
//! A view is derived from the tree every time it is requested, so it can
//! never drift from the data. Positions live on a 0..100 canvas.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::config::CoordinateConfig;
use crate::entity::{Entity, EntityKind};
use crate::position::Point;
use crate::tree::{HierarchyTree, NodeId};

const ROOT_KEY: &str = "root";
const ROOT_LABEL: &str = "Campus";
const CIRCLE_RADIUS: f64 = 30.0;
const HIGHLIGHT_COLOR: &str = "#D81B60";
const HIGHLIGHT_SCALE: f64 = 1.5;

/// Which level of the hierarchy a view shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum ViewScope {
    /// The root and every department.
    Departments,
    /// A department and its buildings.
    Buildings { department_id: String },
    /// A building and its floors.
    Floors { building_id: String },
    /// A floor and its rooms. A room ID resolves to that room's floor.
    Rooms { floor_id: String },
}

/// A drawable node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    /// `root`, or `<prefix>_<id>` such as `dept_D1` or `room_R1`.
    pub key: String,

    /// `None` for the root.
    pub kind: Option<EntityKind>,

    pub entity_id: Option<String>,

    pub label: String,

    pub position: Point,

    pub color: String,

    pub size: f64,
}

/// A parent/child link between two node keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
}

/// Nodes and edges of one scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphView {
    pub title: String,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphView {
    /// Build the view of `scope`. Unknown targets give an empty view.
    pub fn build(tree: &HierarchyTree, scope: &ViewScope, coordinates: &CoordinateConfig) -> Self {
        let view = match scope {
            ViewScope::Departments => departments_view(tree),
            ViewScope::Buildings { department_id } => buildings_view(tree, department_id),
            ViewScope::Floors { building_id } => floors_view(tree, building_id, coordinates),
            ViewScope::Rooms { floor_id } => rooms_view(tree, floor_id),
        };
        view.unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, key: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.key == key)
    }

    /// Mark every node for the entity `id` as selected. Returns whether
    /// any node matched.
    pub fn highlight(&mut self, id: &str) -> bool {
        let mut found = false;
        for node in self
            .nodes
            .iter_mut()
            .filter(|n| n.entity_id.as_deref() == Some(id))
        {
            node.size *= HIGHLIGHT_SCALE;
            node.color = HIGHLIGHT_COLOR.to_string();
            found = true;
        }
        found
    }

    fn with_center(title: String, center: GraphNode) -> Self {
        Self {
            title,
            nodes: vec![center],
            edges: Vec::new(),
        }
    }

    fn push_child(&mut self, child: GraphNode) {
        if let Some(center) = self.nodes.first() {
            self.edges.push(GraphEdge {
                from: center.key.clone(),
                to: child.key.clone(),
            });
        }
        self.nodes.push(child);
    }
}

fn departments_view(tree: &HierarchyTree) -> Option<GraphView> {
    if tree.is_empty() {
        return None;
    }
    let root = GraphNode {
        key: ROOT_KEY.to_string(),
        kind: None,
        entity_id: None,
        label: ROOT_LABEL.to_string(),
        position: Point::CENTER,
        color: "#1E88E5".to_string(),
        size: 20.0,
    };
    let mut view = GraphView::with_center("Campus Departments".to_string(), root);

    let departments: Vec<&Entity> = tree.entities(EntityKind::Department).collect();
    let count = departments.len();
    for (index, dept) in departments.into_iter().enumerate() {
        view.push_child(entity_node(dept, on_circle(index, count)));
    }
    Some(view)
}

fn buildings_view(tree: &HierarchyTree, department_id: &str) -> Option<GraphView> {
    let node = tree.find(EntityKind::Department, department_id)?;
    let dept = tree.entity(node)?;
    let mut view = GraphView::with_center(
        format!("Buildings - {}", dept.name()),
        entity_node(dept, Point::CENTER),
    );

    let buildings = children_of_kind(tree, node, EntityKind::Building);
    let count = buildings.len();
    for (index, building) in buildings.into_iter().enumerate() {
        let position = building
            .position()
            .map_or_else(|| on_circle(index, count), Point::from);
        view.push_child(entity_node(building, position));
    }
    Some(view)
}

fn floors_view(
    tree: &HierarchyTree,
    building_id: &str,
    coordinates: &CoordinateConfig,
) -> Option<GraphView> {
    let node = tree.find(EntityKind::Building, building_id)?;
    let building = tree.entity(node)?;

    let floors: Vec<(&Entity, Point)> = children_of_kind(tree, node, EntityKind::Floor)
        .into_iter()
        .filter_map(|entity| {
            let floor = entity.as_floor()?;
            Some((
                entity,
                coordinates.resolve(floor.x, floor.y, &floor.id, &floor.name),
            ))
        })
        .collect();

    let center = if floors.is_empty() {
        Point::new(50.0, 60.0)
    } else {
        let n = floors.len() as f64;
        let x = floors.iter().map(|(_, p)| p.x).sum::<f64>() / n;
        let y = floors.iter().map(|(_, p)| p.y).sum::<f64>() / n;
        Point::new(x, y + 10.0)
    };

    let mut view = GraphView::with_center(
        format!("Floors - {}", building.name()),
        entity_node(building, center),
    );
    for (floor, position) in floors {
        view.push_child(entity_node(floor, position));
    }
    Some(view)
}

fn rooms_view(tree: &HierarchyTree, target: &str) -> Option<GraphView> {
    let node = match tree.find(EntityKind::Floor, target) {
        Some(node) => node,
        None => {
            let room = tree.find(EntityKind::Room, target)?;
            let parent = tree.node(room)?.parent()?;
            (tree.entity(parent)?.kind() == EntityKind::Floor).then_some(parent)?
        }
    };
    let floor = tree.entity(node)?;
    let mut view = GraphView::with_center(
        format!("Rooms - {}", floor.name()),
        entity_node(floor, Point::CENTER),
    );

    for room in children_of_kind(tree, node, EntityKind::Room) {
        let position = room.position().map_or(Point::CENTER, Point::from);
        view.push_child(entity_node(room, position));
    }
    Some(view)
}

fn children_of_kind(tree: &HierarchyTree, node: NodeId, kind: EntityKind) -> Vec<&Entity> {
    tree.children_of(node).filter(|e| e.kind() == kind).collect()
}

fn entity_node(entity: &Entity, position: Point) -> GraphNode {
    let (color, size) = style(entity);
    GraphNode {
        key: node_key(entity.kind(), entity.id()),
        kind: Some(entity.kind()),
        entity_id: Some(entity.id().to_string()),
        label: entity.name().to_string(),
        position,
        color: color.to_string(),
        size,
    }
}

/// Graph key of an entity, e.g. `building_B1`.
pub fn node_key(kind: EntityKind, id: &str) -> String {
    format!("{}_{id}", kind.node_prefix())
}

fn style(entity: &Entity) -> (&'static str, f64) {
    match entity {
        Entity::Department(_) => ("#43A047", 15.0),
        Entity::Building(_) => ("#FB8C00", 15.0),
        Entity::Floor(_) => ("#8E24AA", 15.0),
        Entity::Room(room) => {
            let color = match room.room_type.to_lowercase().as_str() {
                "lecture" => "#E53935",
                "lab" => "#00ACC1",
                "office" => "#7CB342",
                "hall" => "#FFB300",
                _ => "#78909C",
            };
            (color, 10.0)
        }
    }
}

/// Evenly spaced point `index` of `count` around the canvas centre,
/// starting at the top.
fn on_circle(index: usize, count: usize) -> Point {
    let angle = TAU * index as f64 / count.max(1) as f64 - TAU / 4.0;
    Point::new(
        Point::CENTER.x + CIRCLE_RADIUS * angle.cos(),
        Point::CENTER.y + CIRCLE_RADIUS * angle.sin(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Building, Department, Floor, Room};
    use pretty_assertions::assert_eq;

    fn keys(view: &GraphView) -> Vec<&str> {
        view.nodes.iter().map(|n| n.key.as_str()).collect()
    }

    fn sample_tree() -> HierarchyTree {
        let mut tree = HierarchyTree::new();
        tree.insert(Department::new("D1", "CS").into(), None).unwrap();
        tree.insert(Department::new("D2", "Math").into(), None).unwrap();
        let mut b1 = Building::new("B1", "Tech Hall");
        b1.x = Some(20.0);
        b1.y = Some(70.0);
        tree.insert(b1.into(), Some("D1")).unwrap();
        tree.insert(Building::new("B2", "Annex").into(), Some("D1"))
            .unwrap();
        let mut f1 = Floor::new("F1", "Ground");
        f1.x = Some(40.0);
        f1.y = Some(20.0);
        tree.insert(f1.into(), Some("B1")).unwrap();
        let mut f2 = Floor::new("F2", "First");
        f2.x = Some(60.0);
        f2.y = Some(40.0);
        tree.insert(f2.into(), Some("B1")).unwrap();
        let mut r1 = Room::new("R1", "Lab A", "Lab");
        r1.x = 10.0;
        r1.y = 15.0;
        tree.insert(r1.into(), Some("F1")).unwrap();
        tree.insert(Room::new("R2", "Hall 1", "hall").into(), Some("F1"))
            .unwrap();
        tree
    }

    fn build(tree: &HierarchyTree, scope: ViewScope) -> GraphView {
        GraphView::build(tree, &scope, &CoordinateConfig::default())
    }

    #[test]
    fn test_departments_view() {
        let tree = sample_tree();
        let view = build(&tree, ViewScope::Departments);

        assert_eq!(view.title, "Campus Departments");
        assert_eq!(keys(&view), vec!["root", "dept_D1", "dept_D2"]);
        assert_eq!(view.edges.len(), 2);
        assert_eq!(view.nodes[0].position, Point::CENTER);
        assert_eq!(view.nodes[0].size, 20.0);

        // first department sits straight above the centre
        let d1 = &view.nodes[1].position;
        assert!((d1.x - 50.0).abs() < 1e-9);
        assert!((d1.y - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_buildings_view_uses_stored_coordinates() {
        let tree = sample_tree();
        let view = build(
            &tree,
            ViewScope::Buildings {
                department_id: "D1".to_string(),
            },
        );

        assert_eq!(view.title, "Buildings - CS");
        assert_eq!(keys(&view), vec!["dept_D1", "building_B1", "building_B2"]);
        assert_eq!(view.nodes[0].position, Point::CENTER);
        assert_eq!(view.nodes[1].position, Point::new(20.0, 70.0));
        assert_eq!(view.nodes[2].position, on_circle(1, 2));
        assert_eq!(
            view.edges[0],
            GraphEdge {
                from: "dept_D1".to_string(),
                to: "building_B1".to_string(),
            }
        );
    }

    #[test]
    fn test_floors_view_centroid() {
        let tree = sample_tree();
        let view = build(
            &tree,
            ViewScope::Floors {
                building_id: "B1".to_string(),
            },
        );
        assert_eq!(keys(&view), vec!["building_B1", "floor_F1", "floor_F2"]);
        assert_eq!(view.nodes[0].position, Point::new(50.0, 40.0));
    }

    #[test]
    fn test_floors_view_without_floors() {
        let tree = sample_tree();
        let view = build(
            &tree,
            ViewScope::Floors {
                building_id: "B2".to_string(),
            },
        );
        assert_eq!(keys(&view), vec!["building_B2"]);
        assert_eq!(view.nodes[0].position, Point::new(50.0, 60.0));
        assert!(view.edges.is_empty());
    }

    #[test]
    fn test_rooms_view_styles_by_type() {
        let tree = sample_tree();
        let view = build(
            &tree,
            ViewScope::Rooms {
                floor_id: "F1".to_string(),
            },
        );
        assert_eq!(view.title, "Rooms - Ground");
        let lab = view.node("room_R1").unwrap();
        assert_eq!(lab.color, "#00ACC1");
        assert_eq!(lab.size, 10.0);
        assert_eq!(lab.position, Point::new(10.0, 15.0));
        assert_eq!(view.node("room_R2").unwrap().color, "#FFB300");
    }

    #[test]
    fn test_rooms_view_accepts_room_id() {
        let tree = sample_tree();
        let by_room = build(
            &tree,
            ViewScope::Rooms {
                floor_id: "R2".to_string(),
            },
        );
        let by_floor = build(
            &tree,
            ViewScope::Rooms {
                floor_id: "F1".to_string(),
            },
        );
        assert_eq!(by_room, by_floor);
    }

    #[test]
    fn test_unknown_target_is_empty() {
        let tree = sample_tree();
        let view = build(
            &tree,
            ViewScope::Floors {
                building_id: "nope".to_string(),
            },
        );
        assert!(view.is_empty());
        assert!(build(&HierarchyTree::new(), ViewScope::Departments).is_empty());
    }

    #[test]
    fn test_highlight() {
        let tree = sample_tree();
        let mut view = build(&tree, ViewScope::Departments);
        assert!(view.highlight("D2"));
        let d2 = view.node("dept_D2").unwrap();
        assert_eq!(d2.color, "#D81B60");
        assert_eq!(d2.size, 22.5);
        assert!(!view.highlight("missing"));
    }
}
