//! Staged editing of a single spatial unit.
//!
//! An [`EditSession`] owns a copy of one unit. Nothing reaches the project
//! until [`EditSession::commit`]; dropping the session or calling
//! [`EditSession::cancel`] discards every change.

use crate::calibration::{calibrate_points, Scale};
use crate::error::{CalibrationError, LoadError, SessionError};
use crate::geometry::{closes_polygon, hits_segment, Point, Polygon};
use crate::model::{
    Beam, BeamProperties, BuildingStats, Column, ColumnProperties, CostCatalog, ElementRef,
    Outline, Pool, Project, Room, RoomProperties, Slab, SlabProperties, Span, SpatialUnit,
    StructuralMode, Wall, WallProperties,
};
use crate::region::{extract_region, load_plan};
use crate::takeoff::{compute_unit, UnitTakeoff};
use image::RgbImage;
use std::path::PathBuf;
use tracing::{debug, info};

/// Ceiling height given to rooms created in the editor, m.
pub const DEFAULT_CEILING_HEIGHT: f64 = 2.8;

#[derive(Debug, Clone)]
pub struct EditSession {
    pool: Pool,
    unit: SpatialUnit,
    drawing: Vec<Point>,
    selected: Option<ElementRef>,
}

fn new_room_properties() -> RoomProperties {
    RoomProperties {
        ceiling_height: Some(DEFAULT_CEILING_HEIGHT),
        ..RoomProperties::default()
    }
}

fn polygon(points: Vec<Point>) -> Result<Polygon, SessionError> {
    let count = points.len();
    Polygon::new(points).ok_or(SessionError::DegeneratePolygon { count })
}

impl EditSession {
    /// Stages a copy of the unit, or `None` if it does not exist.
    #[must_use]
    pub fn begin(project: &Project, pool: Pool, id: u64) -> Option<Self> {
        let unit = project.unit(pool, id)?.clone();
        debug!(unit = %unit.name, "edit session started");
        Some(Self {
            pool,
            unit,
            drawing: Vec::new(),
            selected: None,
        })
    }

    #[must_use]
    pub fn unit(&self) -> &SpatialUnit {
        &self.unit
    }

    /// Direct access for property edits on staged elements.
    pub fn unit_mut(&mut self) -> &mut SpatialUnit {
        &mut self.unit
    }

    #[must_use]
    pub fn pool(&self) -> Pool {
        self.pool
    }

    #[must_use]
    pub fn selected(&self) -> Option<ElementRef> {
        self.selected
    }

    #[must_use]
    pub fn drawing(&self) -> &[Point] {
        &self.drawing
    }

    /// Sets the staged unit's scale from two reference points. On error the
    /// previous scale is kept.
    pub fn calibrate(&mut self, points: &[Point], real_meters: f64) -> Result<Scale, CalibrationError> {
        let scale = calibrate_points(points, real_meters)?;
        self.unit.scale = scale;
        debug!(px_per_meter = scale.px_per_meter(), "unit calibrated");
        Ok(scale)
    }

    /// Decodes a plan raster and records it on the staged unit.
    pub fn attach_plan(&mut self, path: PathBuf) -> Result<RgbImage, LoadError> {
        let image = load_plan(&path)?;
        self.unit.image = Some(path);
        Ok(image)
    }

    pub fn set_mode(&mut self, mode: StructuralMode) {
        self.unit.mode = mode;
    }

    pub fn toggle_mode(&mut self) -> StructuralMode {
        self.unit.mode = self.unit.mode.toggled();
        self.unit.mode
    }

    /// Adds a vertex to the polygon being drawn. A click near the first vertex
    /// closes it into a room and returns the new room's id.
    pub fn push_vertex(&mut self, point: Point) -> Option<u64> {
        if closes_polygon(&self.drawing, point) {
            let points = std::mem::take(&mut self.drawing);
            let name = format!("Room {}", self.unit.rooms.len() + 1);
            return self.add_drawn_room(name, points).ok();
        }
        self.drawing.push(point);
        None
    }

    pub fn cancel_drawing(&mut self) {
        self.drawing.clear();
    }

    fn next_id(&self) -> u64 {
        self.unit.next_element_id()
    }

    pub fn add_drawn_room(&mut self, name: String, points: Vec<Point>) -> Result<u64, SessionError> {
        let polygon = polygon(points)?;
        Ok(self.push_room(name, Outline::Drawn { polygon }))
    }

    /// Traces the room around `seed` on the plan. `None` means the caller
    /// should fall back to drawing the outline by hand.
    pub fn add_region_room(&mut self, image: &RgbImage, seed: Point) -> Option<u64> {
        let points = extract_region(image, seed)?;
        let name = format!("Room {}", self.unit.rooms.len() + 1);
        self.add_drawn_room(name, points).ok()
    }

    pub fn add_manual_room(&mut self, name: String, area_m2: f64, perimeter_m: Option<f64>) -> u64 {
        self.push_room(name, Outline::Manual { area_m2, perimeter_m })
    }

    fn push_room(&mut self, name: String, outline: Outline) -> u64 {
        let id = self.next_id();
        self.unit.rooms.push(Room {
            id,
            name,
            outline,
            properties: new_room_properties(),
        });
        id
    }

    pub fn add_drawn_wall(&mut self, start: Point, end: Point, properties: WallProperties) -> u64 {
        self.push_wall(Span::Drawn { start, end }, properties)
    }

    pub fn add_manual_wall(&mut self, length_m: f64, properties: WallProperties) -> u64 {
        self.push_wall(Span::Manual { length_m }, properties)
    }

    fn push_wall(&mut self, span: Span, properties: WallProperties) -> u64 {
        let id = self.next_id();
        self.unit.walls.push(Wall { id, span, properties });
        id
    }

    pub fn add_drawn_column(
        &mut self,
        points: Vec<Point>,
        properties: ColumnProperties,
    ) -> Result<u64, SessionError> {
        let polygon = polygon(points)?;
        Ok(self.push_column(Outline::Drawn { polygon }, properties))
    }

    pub fn add_manual_column(
        &mut self,
        area_m2: f64,
        perimeter_m: Option<f64>,
        properties: ColumnProperties,
    ) -> u64 {
        self.push_column(Outline::Manual { area_m2, perimeter_m }, properties)
    }

    /// Rectangular column by section, in cm.
    pub fn add_column_section(&mut self, width_cm: f64, depth_cm: f64, height: Option<f64>) -> u64 {
        let id = self.next_id();
        self.unit
            .columns
            .push(Column::from_section(id, width_cm, depth_cm, height));
        id
    }

    fn push_column(&mut self, outline: Outline, properties: ColumnProperties) -> u64 {
        let id = self.next_id();
        self.unit.columns.push(Column {
            id,
            outline,
            properties,
        });
        id
    }

    pub fn add_drawn_beam(&mut self, start: Point, end: Point, properties: BeamProperties) -> u64 {
        self.push_beam(Span::Drawn { start, end }, properties)
    }

    pub fn add_manual_beam(&mut self, length_m: f64, properties: BeamProperties) -> u64 {
        self.push_beam(Span::Manual { length_m }, properties)
    }

    fn push_beam(&mut self, span: Span, properties: BeamProperties) -> u64 {
        let id = self.next_id();
        self.unit.beams.push(Beam { id, span, properties });
        id
    }

    pub fn add_drawn_slab(&mut self, points: Vec<Point>, properties: SlabProperties) -> Result<u64, SessionError> {
        let polygon = polygon(points)?;
        Ok(self.push_slab(Outline::Drawn { polygon }, properties))
    }

    pub fn add_manual_slab(&mut self, area_m2: f64, properties: SlabProperties) -> u64 {
        self.push_slab(
            Outline::Manual {
                area_m2,
                perimeter_m: None,
            },
            properties,
        )
    }

    fn push_slab(&mut self, outline: Outline, properties: SlabProperties) -> u64 {
        let id = self.next_id();
        self.unit.slabs.push(Slab {
            id,
            outline,
            properties,
        });
        id
    }

    /// Element under `point`, if any. Segments are tested before areas so a
    /// wall on a room boundary stays pickable; manual elements have no
    /// position and are never hit.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<ElementRef> {
        let segment_hit = |span: &Span| match span {
            Span::Drawn { start, end } => hits_segment(point, *start, *end),
            Span::Manual { .. } => false,
        };
        let area_hit = |outline: &Outline| match outline {
            Outline::Drawn { polygon } => polygon.contains(point),
            Outline::Manual { .. } => false,
        };

        let u = &self.unit;
        u.walls
            .iter()
            .find(|w| segment_hit(&w.span))
            .map(|w| ElementRef::Wall(w.id))
            .or_else(|| u.beams.iter().find(|b| segment_hit(&b.span)).map(|b| ElementRef::Beam(b.id)))
            .or_else(|| {
                u.columns
                    .iter()
                    .find(|c| area_hit(&c.outline))
                    .map(|c| ElementRef::Column(c.id))
            })
            .or_else(|| u.slabs.iter().find(|s| area_hit(&s.outline)).map(|s| ElementRef::Slab(s.id)))
            .or_else(|| u.rooms.iter().find(|r| area_hit(&r.outline)).map(|r| ElementRef::Room(r.id)))
    }

    /// Selects the element under `point`; clicking empty space clears the selection.
    pub fn select_at(&mut self, point: Point) -> Option<ElementRef> {
        self.selected = self.hit_test(point);
        self.selected
    }

    pub fn delete(&mut self, element: ElementRef) -> Result<(), SessionError> {
        fn remove<T>(items: &mut Vec<T>, id: u64, key: impl Fn(&T) -> u64) -> Result<(), SessionError> {
            let before = items.len();
            items.retain(|item| key(item) != id);
            if items.len() == before {
                Err(SessionError::ElementNotFound { id })
            } else {
                Ok(())
            }
        }

        let u = &mut self.unit;
        match element {
            ElementRef::Room(id) => remove(&mut u.rooms, id, |r| r.id),
            ElementRef::Wall(id) => remove(&mut u.walls, id, |w| w.id),
            ElementRef::Column(id) => remove(&mut u.columns, id, |c| c.id),
            ElementRef::Beam(id) => remove(&mut u.beams, id, |b| b.id),
            ElementRef::Slab(id) => remove(&mut u.slabs, id, |s| s.id),
        }?;

        if self.selected == Some(element) {
            self.selected = None;
        }
        Ok(())
    }

    /// Deletes the selected element. Returns whether anything was removed.
    pub fn delete_selected(&mut self) -> bool {
        match self.selected {
            Some(element) => self.delete(element).is_ok(),
            None => false,
        }
    }

    /// In-editor cost preview of the staged unit, before overrides.
    #[must_use]
    pub fn preview(&self, catalog: &CostCatalog, building: &BuildingStats) -> UnitTakeoff {
        compute_unit(&self.unit, catalog, building)
    }

    /// Replaces the committed unit with the staged copy.
    pub fn commit(self, project: &mut Project) -> Result<(), SessionError> {
        let id = self.unit.id;
        let name = self.unit.name.clone();
        if project.replace_unit(self.pool, self.unit) {
            info!(unit = %name, "unit changes saved");
            Ok(())
        } else {
            Err(SessionError::UnitGone { id })
        }
    }

    pub fn cancel(self) {
        debug!(unit = %self.unit.name, "edit session discarded");
    }
}
