//! # Campus Hierarchy
//!
//! This crate holds the campus data model and its import and query engine:
//!
//! - **Entities**: departments, buildings, floors and rooms
//! - **Formats**: standard (one row per room) and simple (one row per entity) tables
//! - **Hierarchy Tree**: a single arena tree rooted at a synthetic campus node
//! - **Queries**: children, parents, ancestry, summaries and multi-field search
//! - **Graph Views**: positioned nodes and edges for one level at a time
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Hierarchy Store                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  Table ──► format::validate ──► Importer ──► HierarchyTree      │
//! │                                                   │             │
//! │                          ┌────────────────────────┼──────┐      │
//! │                          ▼                        ▼      ▼      │
//! │                     QueryEngine              GraphView  export  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use campus_hierarchy::{HierarchyStore, Table, ViewScope};
//!
//! let mut store = HierarchyStore::new();
//! let report = store.import(&Table::from_path("campus.csv")?)?;
//!
//! let labs = store.search("lab");
//! let view = store.graph_view(&ViewScope::Departments);
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod export;
pub mod format;
pub mod graph;
pub mod import;
pub mod position;
pub mod query;
pub mod store;
pub mod table;
pub mod tree;

pub use config::{CoordinateConfig, HierarchyConfig, RoomDefaults, SearchConfig};
pub use entity::{Building, Department, Entity, EntityKind, Floor, Room};
pub use error::{HierarchyError, Result};
pub use format::TableFormat;
pub use graph::{GraphEdge, GraphNode, GraphView, ViewScope};
pub use import::{Attachment, DanglingReference, ImportReport, Importer, SkippedRow};
pub use position::Point;
pub use query::{EntitySummary, QueryEngine, SearchResults};
pub use store::HierarchyStore;
pub use table::{Row, Table};
pub use tree::{HierarchyTree, NodeId, TreeStats};
