use crate::geometry::{Point, Polygon};
use serde::{Deserialize, Serialize};

/// Outline of an area element: traced on the plan or typed in by hand.
///
/// A manual value always wins; there is no way to hold both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outline {
    Drawn { polygon: Polygon },
    Manual {
        area_m2: f64,
        #[serde(default)]
        perimeter_m: Option<f64>,
    },
}

/// Run of a linear element: a segment on the plan or a typed length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Span {
    Drawn { start: Point, end: Point },
    Manual { length_m: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloorFinish {
    /// Laminate parquet, counted as dry area.
    #[serde(alias = "parke")]
    Parquet,
    /// Ceramic tiles, counted as wet area.
    #[serde(alias = "seramik")]
    Ceramic,
    #[serde(alias = "beton")]
    Concrete,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallFinish {
    #[default]
    #[serde(alias = "boya")]
    Paint,
    #[serde(alias = "seramik")]
    Ceramic,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomProperties {
    /// Explicit ceiling height in meters; floor height minus slab otherwise.
    #[serde(default)]
    pub ceiling_height: Option<f64>,
    /// Window openings to deduct from paintable wall, m².
    #[serde(default)]
    pub window_area: f64,
    #[serde(default)]
    pub door_count: u32,
    #[serde(default)]
    pub has_cornice: bool,
    #[serde(default)]
    pub floor_finish: FloorFinish,
    #[serde(default)]
    pub wall_finish: WallFinish,
}

impl Default for RoomProperties {
    fn default() -> Self {
        Self {
            ceiling_height: None,
            window_area: 0.0,
            door_count: 1,
            has_cornice: true,
            floor_finish: FloorFinish::Unknown,
            wall_finish: WallFinish::Paint,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: u64,
    pub name: String,
    pub outline: Outline,
    #[serde(default)]
    pub properties: RoomProperties,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallMaterial {
    /// Autoclaved aerated concrete block; the heuristic default.
    #[default]
    Gazbeton,
    Tugla,
    Briket,
    Alcipan,
}

impl WallMaterial {
    pub const ALL: [WallMaterial; 4] = [
        WallMaterial::Gazbeton,
        WallMaterial::Tugla,
        WallMaterial::Briket,
        WallMaterial::Alcipan,
    ];

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            WallMaterial::Gazbeton => "gazbeton",
            WallMaterial::Tugla => "tugla",
            WallMaterial::Briket => "briket",
            WallMaterial::Alcipan => "alcipan",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.key() == key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallProperties {
    #[serde(default)]
    pub material: WallMaterial,
    /// cm
    #[serde(default = "default_wall_thickness")]
    pub thickness: f64,
    /// Manual height override in meters.
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub under_beam: bool,
    /// Beam drop below the slab soffit, cm.
    #[serde(default)]
    pub beam_drop: f64,
}

fn default_wall_thickness() -> f64 {
    13.5
}

impl Default for WallProperties {
    fn default() -> Self {
        Self {
            material: WallMaterial::default(),
            thickness: default_wall_thickness(),
            height: None,
            under_beam: false,
            beam_drop: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub id: u64,
    pub span: Span,
    #[serde(default)]
    pub properties: WallProperties,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    #[default]
    #[serde(alias = "kolon")]
    Column,
    /// Shear wall.
    #[serde(alias = "perde")]
    ShearWall,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnProperties {
    #[serde(default)]
    pub kind: ColumnKind,
    /// Meters; floor height when unset.
    #[serde(default)]
    pub height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: u64,
    pub outline: Outline,
    #[serde(default)]
    pub properties: ColumnProperties,
}

impl Column {
    /// Rectangular column typed in by section, `width_cm` x `depth_cm`.
    #[must_use]
    pub fn from_section(id: u64, width_cm: f64, depth_cm: f64, height: Option<f64>) -> Self {
        let (w, d) = (width_cm / 100.0, depth_cm / 100.0);
        Self {
            id,
            outline: Outline::Manual {
                area_m2: w * d,
                perimeter_m: Some(2.0 * (w + d)),
            },
            properties: ColumnProperties {
                kind: ColumnKind::Column,
                height,
            },
        }
    }
}

/// Beam section dimensions, all in cm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamProperties {
    pub width: f64,
    pub height: f64,
    pub slab_thickness: f64,
}

impl Default for BeamProperties {
    fn default() -> Self {
        Self {
            width: 25.0,
            height: 50.0,
            slab_thickness: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    pub id: u64,
    pub span: Span,
    #[serde(default)]
    pub properties: BeamProperties,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlabKind {
    #[default]
    #[serde(alias = "plak")]
    Flat,
    #[serde(alias = "asmolen")]
    Ribbed,
    #[serde(alias = "mantar")]
    Mushroom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlabProperties {
    #[serde(default)]
    pub kind: SlabKind,
    /// cm
    pub thickness: f64,
}

impl Default for SlabProperties {
    fn default() -> Self {
        Self {
            kind: SlabKind::Flat,
            thickness: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slab {
    pub id: u64,
    pub outline: Outline,
    #[serde(default)]
    pub properties: SlabProperties,
}

/// Identifies one element inside a unit, e.g. the result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRef {
    Room(u64),
    Wall(u64),
    Column(u64),
    Beam(u64),
    Slab(u64),
}
