//! Two-point scale calibration.

use crate::error::CalibrationError;
use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Plan scale in pixels per meter. Zero means the plan is not calibrated yet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scale(f64);

impl Scale {
    pub const UNCALIBRATED: Scale = Scale(0.0);

    /// Wraps a stored px/m value; non-finite or negative values read as uncalibrated.
    #[must_use]
    pub fn from_px_per_meter(value: f64) -> Self {
        if value.is_finite() && value > 0.0 {
            Self(value)
        } else {
            Self::UNCALIBRATED
        }
    }

    #[must_use]
    pub fn px_per_meter(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn is_calibrated(self) -> bool {
        self.0 > 0.0
    }

    /// Pixel length to meters; 0 while uncalibrated.
    #[must_use]
    pub fn meters(self, px: f64) -> f64 {
        if self.is_calibrated() {
            px / self.0
        } else {
            0.0
        }
    }

    /// Pixel area to square meters; 0 while uncalibrated.
    #[must_use]
    pub fn square_meters(self, px2: f64) -> f64 {
        if self.is_calibrated() {
            px2 / (self.0 * self.0)
        } else {
            0.0
        }
    }
}

/// Scale from a measured pixel distance and the real length it represents.
pub fn calibrate(pixel_distance: f64, real_meters: f64) -> Result<Scale, CalibrationError> {
    if !(real_meters.is_finite() && real_meters > 0.0) {
        return Err(CalibrationError::NonPositiveLength {
            meters: real_meters,
        });
    }
    if !(pixel_distance.is_finite() && pixel_distance > 0.0) {
        return Err(CalibrationError::ZeroDistance);
    }

    Ok(Scale(pixel_distance / real_meters))
}

/// Scale from exactly two reference points picked on the plan.
pub fn calibrate_points(points: &[Point], real_meters: f64) -> Result<Scale, CalibrationError> {
    match points {
        [a, b] => calibrate(a.distance_to(b), real_meters),
        _ => Err(CalibrationError::PointCount {
            count: points.len(),
        }),
    }
}
