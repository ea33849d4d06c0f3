//! Configuration for importing and browsing campus data.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HierarchyError, Result};
use crate::position::{Point, stable_hash};

/// Configuration for the campus hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    /// Fallback coordinate synthesis.
    pub coordinates: CoordinateConfig,

    /// Values given to rooms imported from the simple format.
    pub room_defaults: RoomDefaults,

    /// Rules applied by callers before searching.
    pub search: SearchConfig,
}

impl HierarchyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the coordinate configuration.
    pub fn with_coordinates(mut self, config: CoordinateConfig) -> Self {
        self.coordinates = config;
        self
    }

    /// Set the room defaults.
    pub fn with_room_defaults(mut self, defaults: RoomDefaults) -> Self {
        self.room_defaults = defaults;
        self
    }

    /// Set the search configuration.
    pub fn with_search(mut self, config: SearchConfig) -> Self {
        self.search = config;
        self
    }

    /// Parse a TOML document. Missing sections keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| HierarchyError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.coordinates.span == 0 {
            return Err(HierarchyError::Config(
                "coordinates.span must be greater than zero".to_string(),
            ));
        }
        if !self.coordinates.base.is_finite() {
            return Err(HierarchyError::Config(
                "coordinates.base must be a finite number".to_string(),
            ));
        }
        Ok(())
    }
}

/// Deterministic coordinates for entities imported without `x`/`y`.
///
/// A synthesized coordinate is `base + (stable_hash(key) % span)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinateConfig {
    pub base: f64,
    pub span: u64,
}

impl Default for CoordinateConfig {
    fn default() -> Self {
        Self {
            base: 50.0,
            span: 40,
        }
    }
}

impl CoordinateConfig {
    /// Synthesize one coordinate from a key.
    pub fn synthesize(&self, key: &str) -> f64 {
        let offset = stable_hash(key) % self.span.max(1);
        self.base + offset as f64
    }

    /// Use the given coordinates where present, otherwise derive x from
    /// the entity's ID and y from its name.
    pub fn resolve(&self, x: Option<f64>, y: Option<f64>, id: &str, name: &str) -> Point {
        Point {
            x: x.unwrap_or_else(|| self.synthesize(id)),
            y: y.unwrap_or_else(|| self.synthesize(name)),
        }
    }
}

/// Defaults for room attributes the simple format does not carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomDefaults {
    pub room_type: String,
    pub capacity: u32,
}

impl Default for RoomDefaults {
    fn default() -> Self {
        Self {
            room_type: "generic".to_string(),
            capacity: 40,
        }
    }
}

/// Search rules enforced at the caller boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Shortest query accepted from a user.
    pub min_query_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { min_query_len: 2 }
    }
}

impl SearchConfig {
    /// Whether a user-supplied query is long enough to run.
    pub fn accepts(&self, query: &str) -> bool {
        query.trim().chars().count() >= self.min_query_len
    }
}
