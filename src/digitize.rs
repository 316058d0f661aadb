//! Real-world metrics for individual elements.
//!
//! Drawn geometry is converted with the unit's scale; manual values are
//! returned as entered, with negatives clamped to 0. Every numeric input passes through
//! [`finite_or_zero`] first so NaN never reaches a total.

use crate::calibration::Scale;
use crate::model::{Beam, Column, Outline, Room, Slab, Span, Wall};
use serde::Serialize;

/// Height lost to the slab and floor finish when no beam is involved, m.
pub const SLAB_ALLOWANCE_M: f64 = 0.15;

/// Coerces NaN and infinities to 0.
#[must_use]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Parses user input as a number, yielding 0 for anything unparseable.
#[must_use]
pub fn parse_number(input: &str) -> f64 {
    input.trim().parse::<f64>().map_or(0.0, finite_or_zero)
}

/// Rounds to two decimals.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Perimeter of a 4:3 rectangle with the given area: sides 4x and 3x, area 12x².
#[must_use]
pub fn rectangle_perimeter_4_3(area: f64) -> f64 {
    14.0 * (area.max(0.0) / 12.0).sqrt()
}

/// Area (m²) and perimeter (m).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AreaMetrics {
    pub area: f64,
    pub perimeter: f64,
}

fn outline_metrics(outline: &Outline, scale: Scale, default_perimeter: fn(f64) -> f64) -> AreaMetrics {
    match outline {
        Outline::Manual {
            area_m2,
            perimeter_m,
        } => {
            let area = finite_or_zero(*area_m2).max(0.0);
            let perimeter = perimeter_m
                .map(finite_or_zero)
                .filter(|p| *p > 0.0)
                .unwrap_or_else(|| default_perimeter(area));
            AreaMetrics { area, perimeter }
        }
        Outline::Drawn { polygon } => {
            let px = polygon.metrics();
            AreaMetrics {
                area: scale.square_meters(px.area),
                perimeter: scale.meters(px.perimeter),
            }
        }
    }
}

fn span_length(span: &Span, scale: Scale) -> f64 {
    match span {
        Span::Manual { length_m } => finite_or_zero(*length_m).max(0.0),
        Span::Drawn { start, end } => scale.meters(start.distance_to(end)),
    }
}

/// Room floor area and perimeter. A manual area without a perimeter gets the
/// 4:3 rectangle estimate.
#[must_use]
pub fn room_metrics(room: &Room, scale: Scale) -> AreaMetrics {
    outline_metrics(&room.outline, scale, rectangle_perimeter_4_3)
}

/// Height used for a room's wall surface.
#[must_use]
pub fn room_height(room: &Room, floor_height: f64) -> f64 {
    room.properties
        .ceiling_height
        .map(finite_or_zero)
        .filter(|h| *h > 0.0)
        .unwrap_or(finite_or_zero(floor_height) - SLAB_ALLOWANCE_M)
}

#[must_use]
pub fn wall_length(wall: &Wall, scale: Scale) -> f64 {
    span_length(&wall.span, scale)
}

/// Wall height: manual override, else floor height less the beam drop (under
/// a beam) or the slab allowance.
#[must_use]
pub fn wall_height(wall: &Wall, floor_height: f64) -> f64 {
    let props = &wall.properties;
    if let Some(height) = props.height.map(finite_or_zero).filter(|h| *h > 0.0) {
        return height;
    }

    let floor_height = finite_or_zero(floor_height);
    let beam_drop = finite_or_zero(props.beam_drop);
    if props.under_beam && beam_drop > 0.0 {
        floor_height - beam_drop / 100.0
    } else {
        floor_height - SLAB_ALLOWANCE_M
    }
}

/// Column footprint. A manual area without a perimeter is taken as square.
#[must_use]
pub fn column_metrics(column: &Column, scale: Scale) -> AreaMetrics {
    outline_metrics(&column.outline, scale, |area| area.max(0.0).sqrt() * 4.0)
}

#[must_use]
pub fn column_height(column: &Column, floor_height: f64) -> f64 {
    column
        .properties
        .height
        .map(finite_or_zero)
        .filter(|h| *h > 0.0)
        .unwrap_or_else(|| finite_or_zero(floor_height))
}

/// Beam run and section, all in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BeamMetrics {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub slab_thickness: f64,
}

#[must_use]
pub fn beam_metrics(beam: &Beam, scale: Scale) -> BeamMetrics {
    let props = &beam.properties;
    BeamMetrics {
        length: span_length(&beam.span, scale),
        width: finite_or_zero(props.width).max(0.0) / 100.0,
        height: finite_or_zero(props.height).max(0.0) / 100.0,
        slab_thickness: finite_or_zero(props.slab_thickness).max(0.0) / 100.0,
    }
}

/// Slab area (m²) and thickness (m).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SlabMetrics {
    pub area: f64,
    pub thickness: f64,
}

#[must_use]
pub fn slab_metrics(slab: &Slab, scale: Scale) -> SlabMetrics {
    SlabMetrics {
        area: outline_metrics(&slab.outline, scale, |_| 0.0).area,
        thickness: finite_or_zero(slab.properties.thickness).max(0.0) / 100.0,
    }
}
