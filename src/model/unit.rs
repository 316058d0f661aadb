use super::building::FloorType;
use super::element::{Beam, Column, Room, Slab, Wall};
use crate::calibration::Scale;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How a unit's wall and structural quantities are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralMode {
    /// Coefficients on floor area; drawn structure is ignored.
    #[default]
    Global,
    /// Quantities come from the unit's walls, columns, beams and slabs.
    Detailed,
}

impl StructuralMode {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            StructuralMode::Global => StructuralMode::Detailed,
            StructuralMode::Detailed => StructuralMode::Global,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            StructuralMode::Global => "Global",
            StructuralMode::Detailed => "Detailed",
        }
    }
}

/// Which of the two unit collections a unit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pool {
    /// Apartment unit types.
    Architectural,
    /// Structural floor plans.
    Structural,
}

impl Pool {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Pool::Architectural => "Unit types",
            Pool::Structural => "Floor plans",
        }
    }
}

/// One digitized plan, repeated `count` times in the building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialUnit {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub floor_type: FloorType,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub scale: Scale,
    #[serde(default)]
    pub mode: StructuralMode,
    /// Plan raster the elements were traced on.
    #[serde(default)]
    pub image: Option<PathBuf>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub walls: Vec<Wall>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub beams: Vec<Beam>,
    #[serde(default)]
    pub slabs: Vec<Slab>,
}

fn default_count() -> u32 {
    1
}

impl SpatialUnit {
    #[must_use]
    pub fn new(id: u64, name: String) -> Self {
        Self {
            id,
            name,
            floor_type: FloorType::Normal,
            count: 1,
            scale: Scale::UNCALIBRATED,
            mode: StructuralMode::Global,
            image: None,
            rooms: Vec::new(),
            walls: Vec::new(),
            columns: Vec::new(),
            beams: Vec::new(),
            slabs: Vec::new(),
        }
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.rooms.len() + self.walls.len() + self.columns.len() + self.beams.len() + self.slabs.len()
    }

    /// Next free element id within this unit.
    #[must_use]
    pub fn next_element_id(&self) -> u64 {
        let ids = self
            .rooms
            .iter()
            .map(|r| r.id)
            .chain(self.walls.iter().map(|w| w.id))
            .chain(self.columns.iter().map(|c| c.id))
            .chain(self.beams.iter().map(|b| b.id))
            .chain(self.slabs.iter().map(|s| s.id));
        ids.max().map_or(1, |max| max + 1)
    }
}
