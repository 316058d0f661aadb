//! Per-unit quantity takeoff: folds a unit's elements into the stats record
//! and prices the catalog against it.

use crate::calibration::Scale;
use crate::digitize::{
    beam_metrics, column_height, column_metrics, finite_or_zero, room_height, room_metrics, round2,
    slab_metrics, wall_height, wall_length, AreaMetrics,
};
use crate::model::{
    AutoSource, Beam, BuildingStats, Column, CostCatalog, CostItem, DetailedSource, FloorFinish,
    QuantityKind, Room, Slab, SpatialUnit, StructuralMode, Wall, WallFinish, WallMaterial,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Opening deducted per door, m².
pub const DOOR_AREA_M2: f64 = 2.1;

/// Wall surface per m² of floor in the global heuristic.
pub const WALL_TO_FLOOR_RATIO: f64 = 1.2;

/// Semantic quantity totals for one unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Stats {
    pub total_area: f64,
    pub total_perimeter: f64,
    pub wet_area: f64,
    pub dry_area: f64,
    pub dry_perimeter: f64,
    pub net_wall_area: f64,
    pub cornice_length: f64,
    pub wall_areas: BTreeMap<WallMaterial, f64>,
    pub column_concrete_volume: f64,
    pub column_formwork_area: f64,
    pub beam_concrete_volume: f64,
    pub beam_formwork_area: f64,
    pub slab_concrete_volume: f64,
    pub slab_formwork_area: f64,
}

impl Stats {
    #[must_use]
    pub fn get(&self, kind: QuantityKind) -> f64 {
        match kind {
            QuantityKind::TotalArea => self.total_area,
            QuantityKind::TotalPerimeter => self.total_perimeter,
            QuantityKind::WetArea => self.wet_area,
            QuantityKind::DryArea => self.dry_area,
            QuantityKind::DryPerimeter => self.dry_perimeter,
            QuantityKind::NetWallArea => self.net_wall_area,
            QuantityKind::CorniceLength => self.cornice_length,
            QuantityKind::WallArea(material) => self.wall_area(material),
            QuantityKind::ColumnConcreteVolume => self.column_concrete_volume,
            QuantityKind::ColumnFormworkArea => self.column_formwork_area,
            QuantityKind::BeamConcreteVolume => self.beam_concrete_volume,
            QuantityKind::BeamFormworkArea => self.beam_formwork_area,
            QuantityKind::SlabConcreteVolume => self.slab_concrete_volume,
            QuantityKind::SlabFormworkArea => self.slab_formwork_area,
            QuantityKind::TotalConcreteVolume => {
                self.column_concrete_volume + self.beam_concrete_volume + self.slab_concrete_volume
            }
            QuantityKind::TotalFormworkArea => {
                self.column_formwork_area + self.beam_formwork_area + self.slab_formwork_area
            }
            QuantityKind::LandArea => 0.0,
        }
    }

    #[must_use]
    pub fn wall_area(&self, material: WallMaterial) -> f64 {
        self.wall_areas.get(&material).copied().unwrap_or(0.0)
    }

    /// `(key, value)` pairs for every per-unit quantity, in display order.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, f64)> {
        QuantityKind::all()
            .into_iter()
            .filter(|kind| *kind != QuantityKind::LandArea)
            .map(|kind| (kind.key(), self.get(kind)))
            .collect()
    }

    fn add_wall_area(&mut self, material: WallMaterial, area: f64) {
        *self.wall_areas.entry(material).or_insert(0.0) += area;
    }

    /// Floor totals, finish buckets, cornice and paintable wall for one room.
    #[must_use]
    pub fn with_room(mut self, room: &Room, scale: Scale, floor_height: f64) -> Self {
        let m = room_metrics(room, scale);
        self.total_area += m.area;
        self.total_perimeter += m.perimeter;

        match room.properties.floor_finish {
            FloorFinish::Ceramic => self.wet_area += m.area,
            FloorFinish::Parquet => {
                self.dry_area += m.area;
                self.dry_perimeter += m.perimeter;
            }
            FloorFinish::Concrete | FloorFinish::Unknown => {}
        }

        if room.properties.has_cornice {
            self.cornice_length += m.perimeter;
        }

        if room.properties.wall_finish == WallFinish::Paint {
            self.net_wall_area += net_room_wall_area(room, m, floor_height);
        }

        self
    }

    #[must_use]
    pub fn with_wall(mut self, wall: &Wall, scale: Scale, floor_height: f64) -> Self {
        let area = wall_length(wall, scale) * wall_height(wall, floor_height);
        self.add_wall_area(wall.properties.material, area);
        self
    }

    #[must_use]
    pub fn with_column(mut self, column: &Column, scale: Scale, floor_height: f64) -> Self {
        let m = column_metrics(column, scale);
        let height = column_height(column, floor_height);
        self.column_concrete_volume += m.area * height;
        self.column_formwork_area += m.perimeter * height;
        self
    }

    /// Bottom face plus both sides below the slab.
    #[must_use]
    pub fn with_beam(mut self, beam: &Beam, scale: Scale) -> Self {
        let m = beam_metrics(beam, scale);
        let side = (m.height - m.slab_thickness).max(0.0);
        self.beam_concrete_volume += m.width * m.height * m.length;
        self.beam_formwork_area += (m.width + 2.0 * side) * m.length;
        self
    }

    #[must_use]
    pub fn with_slab(mut self, slab: &Slab, scale: Scale) -> Self {
        let m = slab_metrics(slab, scale);
        self.slab_concrete_volume += m.area * m.thickness;
        self.slab_formwork_area += m.area;
        self
    }
}

/// Wall surface around a room less windows and doors, never negative.
fn net_room_wall_area(room: &Room, metrics: AreaMetrics, floor_height: f64) -> f64 {
    let gross = metrics.perimeter * room_height(room, floor_height);
    let openings = finite_or_zero(room.properties.window_area)
        + f64::from(room.properties.door_count) * DOOR_AREA_M2;
    (gross - openings).max(0.0)
}

/// Folds every element of `unit` into its stats record.
///
/// The room pass always runs. The structural pass follows the unit's mode and
/// never mixes the two.
#[must_use]
pub fn derive_stats(unit: &SpatialUnit, building: &BuildingStats) -> Stats {
    let scale = unit.scale;
    let floor_height = building.floor_height(unit.floor_type);

    let stats = unit
        .rooms
        .iter()
        .fold(Stats::default(), |acc, room| acc.with_room(room, scale, floor_height));

    match unit.mode {
        StructuralMode::Detailed => detailed_structure(stats, unit, floor_height),
        StructuralMode::Global => global_structure(stats),
    }
}

fn detailed_structure(stats: Stats, unit: &SpatialUnit, floor_height: f64) -> Stats {
    let scale = unit.scale;

    let mut stats = unit
        .walls
        .iter()
        .fold(stats, |acc, wall| acc.with_wall(wall, scale, floor_height));

    if unit.walls.is_empty() && !unit.rooms.is_empty() {
        let approx: f64 = unit
            .rooms
            .iter()
            .map(|room| net_room_wall_area(room, room_metrics(room, scale), floor_height))
            .sum();
        stats.add_wall_area(WallMaterial::default(), approx);
    }

    let stats = unit
        .columns
        .iter()
        .fold(stats, |acc, column| acc.with_column(column, scale, floor_height));
    let stats = unit.beams.iter().fold(stats, |acc, beam| acc.with_beam(beam, scale));
    unit.slabs.iter().fold(stats, |acc, slab| acc.with_slab(slab, scale))
}

/// Coefficient estimate from floor area. Heavy structure stays at zero here;
/// it is priced from the building's construction area instead.
fn global_structure(mut stats: Stats) -> Stats {
    let wall_area = stats.total_area * WALL_TO_FLOOR_RATIO;
    stats.wall_areas.clear();
    stats.add_wall_area(WallMaterial::default(), wall_area);
    stats.net_wall_area = wall_area * 2.0;
    stats
}

fn source_quantity(source: &AutoSource, multiplier: f64, stats: &Stats) -> f64 {
    match source {
        AutoSource::Quantity(kind) => round2(stats.get(*kind) * finite_or_zero(multiplier)),
        AutoSource::Manual | AutoSource::Unknown(_) => 0.0,
    }
}

/// Automatic quantity for one item against a stats record.
#[must_use]
pub fn item_quantity(item: &CostItem, stats: &Stats) -> f64 {
    source_quantity(&item.auto_source, item.multiplier, stats)
}

/// Quantity a switchable item takes from one unit when its category is
/// detailed.
#[must_use]
pub fn detailed_quantity(source: &DetailedSource, stats: &Stats) -> f64 {
    source_quantity(&source.auto_source, source.multiplier, stats)
}

/// Result of pricing one unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct UnitTakeoff {
    pub stats: Stats,
    /// Item name to automatic quantity.
    pub quantities: BTreeMap<String, f64>,
    /// Catalog-price preview before overrides and repeat count.
    pub total_cost: f64,
}

/// Digitizes a unit and prices every catalog item against it.
#[must_use]
pub fn compute_unit(unit: &SpatialUnit, catalog: &CostCatalog, building: &BuildingStats) -> UnitTakeoff {
    let stats = derive_stats(unit, building);

    let mut quantities = BTreeMap::new();
    let mut total_cost = 0.0;
    for item in catalog.items() {
        let quantity = match &item.detailed {
            Some(source) if unit.mode == StructuralMode::Detailed => detailed_quantity(source, &stats),
            _ => item_quantity(item, &stats),
        };
        total_cost += quantity * finite_or_zero(item.unit_price);
        quantities.insert(item.name.clone(), quantity);
    }

    debug!(
        unit = %unit.name,
        mode = unit.mode.label(),
        total_area = stats.total_area,
        total_cost,
        "unit takeoff computed"
    );

    UnitTakeoff {
        stats,
        quantities,
        total_cost,
    }
}
