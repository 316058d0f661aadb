use serde::{Deserialize, Serialize};

/// Which floor height/area a spatial unit defaults to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloorType {
    #[default]
    Normal,
    Ground,
    Basement,
}

impl FloorType {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            FloorType::Normal => "Normal",
            FloorType::Ground => "Ground",
            FloorType::Basement => "Basement",
        }
    }
}

/// Building-wide configuration: floor counts, heights (m) and areas (m²).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingStats {
    pub land_area: f64,
    pub normal_floor_count: u32,
    pub basement_floor_count: u32,
    pub normal_floor_height: f64,
    pub ground_floor_height: f64,
    pub basement_floor_height: f64,
    pub normal_floor_area: f64,
    pub ground_floor_area: f64,
    pub basement_floor_area: f64,
}

impl Default for BuildingStats {
    fn default() -> Self {
        Self {
            land_area: 500.0,
            normal_floor_count: 5,
            basement_floor_count: 1,
            normal_floor_height: 2.9,
            ground_floor_height: 3.5,
            basement_floor_height: 3.0,
            normal_floor_area: 250.0,
            ground_floor_area: 250.0,
            basement_floor_area: 300.0,
        }
    }
}

impl BuildingStats {
    /// Normal floors, one ground floor and the basements.
    #[must_use]
    pub fn total_construction_area(&self) -> f64 {
        f64::from(self.normal_floor_count) * self.normal_floor_area
            + self.ground_floor_area
            + f64::from(self.basement_floor_count) * self.basement_floor_area
    }

    #[must_use]
    pub fn floor_height(&self, floor: FloorType) -> f64 {
        match floor {
            FloorType::Normal => self.normal_floor_height,
            FloorType::Ground => self.ground_floor_height,
            FloorType::Basement => self.basement_floor_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_total_construction_area() {
        let stats = BuildingStats::default();
        // 5 x 250 + 250 + 1 x 300
        assert_relative_eq!(stats.total_construction_area(), 1800.0);

        let stats = BuildingStats {
            normal_floor_count: 6,
            ground_floor_area: 200.0,
            basement_floor_count: 2,
            ..BuildingStats::default()
        };
        assert_relative_eq!(stats.total_construction_area(), 2300.0);
    }

    #[test]
    fn test_floor_height_by_type() {
        let stats = BuildingStats::default();
        assert_relative_eq!(stats.floor_height(FloorType::Ground), 3.5);
        assert_relative_eq!(stats.floor_height(FloorType::Basement), 3.0);
    }
}
