use crate::models::geometry::{Coordinate, Shape};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique point identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(pub String);

impl PointId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PointId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Point category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Vehicle home base
    Depot,
    /// Water source where vehicles reload
    Refill,
    /// Service point with a demand
    #[default]
    Park,
}

impl Category {
    /// Parse a category name, case-insensitive
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "depot" => Some(Category::Depot),
            "refill" => Some(Category::Refill),
            "park" => Some(Category::Park),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Depot => "depot",
            Category::Refill => "refill",
            Category::Park => "park",
        }
    }

    /// Depots and refills are travel stops; parks are service stops
    pub fn is_travel_stop(&self) -> bool {
        matches!(self, Category::Depot | Category::Refill)
    }
}

/// A catalog point in canonical form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: PointId,
    pub name: Option<String>,
    pub coordinate: Coordinate,
    pub category: Category,
    /// Liters required; meaningful only for parks
    pub demand_liters: f64,
    /// Line/area shape replacing the coordinate for rendering
    pub geometry_override: Option<Shape>,
}

impl Point {
    pub fn new(id: impl Into<String>, coordinate: Coordinate, category: Category) -> Self {
        Self {
            id: PointId::new(id),
            name: None,
            coordinate,
            category,
            demand_liters: 0.0,
            geometry_override: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_demand(mut self, liters: f64) -> Self {
        self.demand_liters = liters;
        self
    }

    pub fn with_override(mut self, shape: Shape) -> Self {
        self.geometry_override = Some(shape);
        self
    }

    /// The shape actually rendered for this point
    pub fn effective_geometry(&self) -> Shape {
        match &self.geometry_override {
            Some(shape) => shape.clone(),
            None => Shape::point(self.coordinate),
        }
    }

    /// Whether the effective geometry is a single coordinate
    pub fn is_point_like(&self) -> bool {
        self.geometry_override.as_ref().map_or(true, Shape::is_point)
    }

    /// Name for display, falling back to the id
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }
}
