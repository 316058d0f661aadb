use super::building::{BuildingStats, FloorType};
use super::catalog::{CategoryModes, CostCatalog, Overrides};
use super::unit::{Pool, SpatialUnit, StructuralMode};
use serde::{Deserialize, Serialize};

/// Committed project state: both unit pools plus building-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub building: BuildingStats,
    #[serde(default)]
    pub units: Vec<SpatialUnit>,
    #[serde(default)]
    pub structural_units: Vec<SpatialUnit>,
    #[serde(default)]
    pub catalog: CostCatalog,
    #[serde(default)]
    pub overrides: Overrides,
    #[serde(default)]
    pub category_modes: CategoryModes,
}

fn default_name() -> String {
    "Untitled Project".to_string()
}

impl Default for Project {
    fn default() -> Self {
        Self::new(default_name())
    }
}

impl Project {
    #[must_use]
    pub fn new(name: String) -> Self {
        Self {
            name,
            building: BuildingStats::default(),
            units: Vec::new(),
            structural_units: Vec::new(),
            catalog: CostCatalog::default(),
            overrides: Overrides::default(),
            category_modes: CategoryModes::default(),
        }
    }

    #[must_use]
    pub fn pool(&self, pool: Pool) -> &[SpatialUnit] {
        match pool {
            Pool::Architectural => &self.units,
            Pool::Structural => &self.structural_units,
        }
    }

    pub fn pool_mut(&mut self, pool: Pool) -> &mut Vec<SpatialUnit> {
        match pool {
            Pool::Architectural => &mut self.units,
            Pool::Structural => &mut self.structural_units,
        }
    }

    #[must_use]
    pub fn unit(&self, pool: Pool, id: u64) -> Option<&SpatialUnit> {
        self.pool(pool).iter().find(|u| u.id == id)
    }

    fn unit_mut(&mut self, pool: Pool, id: u64) -> Option<&mut SpatialUnit> {
        self.pool_mut(pool).iter_mut().find(|u| u.id == id)
    }

    /// Unit ids are unique across both pools.
    fn next_unit_id(&self) -> u64 {
        self.units
            .iter()
            .chain(&self.structural_units)
            .map(|u| u.id)
            .max()
            .map_or(1, |max| max + 1)
    }

    /// Appends an empty unit. New structural plans follow the mode the rest
    /// of the structural pool is in.
    pub fn add_unit(&mut self, pool: Pool) -> u64 {
        let id = self.next_unit_id();
        let name = match pool {
            Pool::Architectural => format!("Unit Type {}", self.units.len() + 1),
            Pool::Structural => format!("Floor Plan {}", self.structural_units.len() + 1),
        };
        let mut unit = SpatialUnit::new(id, name);
        if pool == Pool::Structural {
            unit.mode = self.pool_mode(pool).unwrap_or_default();
        }
        self.pool_mut(pool).push(unit);
        id
    }

    /// Returns whether a unit was removed.
    pub fn delete_unit(&mut self, pool: Pool, id: u64) -> bool {
        let units = self.pool_mut(pool);
        let before = units.len();
        units.retain(|u| u.id != id);
        units.len() != before
    }

    /// Negative counts clamp to zero.
    pub fn set_unit_count(&mut self, pool: Pool, id: u64, count: i64) -> bool {
        let count = u32::try_from(count.max(0)).unwrap_or(u32::MAX);
        self.unit_mut(pool, id).map(|u| u.count = count).is_some()
    }

    pub fn rename_unit(&mut self, pool: Pool, id: u64, name: String) -> bool {
        self.unit_mut(pool, id).map(|u| u.name = name).is_some()
    }

    pub fn set_unit_floor_type(&mut self, pool: Pool, id: u64, floor_type: FloorType) -> bool {
        self.unit_mut(pool, id)
            .map(|u| u.floor_type = floor_type)
            .is_some()
    }

    /// Mode shared by every unit of the pool, or `None` when empty or mixed.
    #[must_use]
    pub fn pool_mode(&self, pool: Pool) -> Option<StructuralMode> {
        let mut modes = self.pool(pool).iter().map(|u| u.mode);
        let first = modes.next()?;
        modes.all(|m| m == first).then_some(first)
    }

    /// Switches every unit of a pool at once. Overrides are left alone.
    pub fn set_pool_mode(&mut self, pool: Pool, mode: StructuralMode) {
        for unit in self.pool_mut(pool) {
            unit.mode = mode;
        }
    }

    /// Flips the whole pool. A mixed pool goes to detailed.
    pub fn toggle_pool_mode(&mut self, pool: Pool) -> StructuralMode {
        let mode = match self.pool_mode(pool) {
            Some(StructuralMode::Detailed) => StructuralMode::Global,
            Some(StructuralMode::Global) | None => StructuralMode::Detailed,
        };
        self.set_pool_mode(pool, mode);
        mode
    }

    pub(crate) fn replace_unit(&mut self, pool: Pool, unit: SpatialUnit) -> bool {
        match self.unit_mut(pool, unit.id) {
            Some(slot) => {
                *slot = unit;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn total_units(&self) -> usize {
        self.units.len() + self.structural_units.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_add_and_delete_units() {
        let mut project = Project::default();
        let a = project.add_unit(Pool::Architectural);
        let s = project.add_unit(Pool::Structural);
        assert_ne!(a, s);
        assert_eq!(project.total_units(), 2);
        assert_eq!(project.units[0].name, "Unit Type 1");

        assert!(project.delete_unit(Pool::Structural, s));
        assert!(!project.delete_unit(Pool::Structural, s));
        assert!(!project.delete_unit(Pool::Structural, a));
        assert_eq!(project.total_units(), 1);
    }

    #[test]
    fn test_count_clamps_at_zero() {
        let mut project = Project::default();
        let id = project.add_unit(Pool::Architectural);
        assert!(project.set_unit_count(Pool::Architectural, id, -4));
        assert_eq!(project.units[0].count, 0);
        assert!(project.set_unit_count(Pool::Architectural, id, 7));
        assert_eq!(project.units[0].count, 7);
        assert!(!project.set_unit_count(Pool::Structural, id, 7));
    }

    #[test]
    fn test_pool_mode_toggle_is_all_or_nothing() {
        let mut project = Project::default();
        project.add_unit(Pool::Structural);
        project.add_unit(Pool::Structural);
        project.overrides.set_quantity("Şap Atılması", Some(5.0));

        project.set_pool_mode(Pool::Structural, StructuralMode::Detailed);
        assert_eq!(project.pool_mode(Pool::Structural), Some(StructuralMode::Detailed));
        assert_eq!(project.overrides.get("Şap Atılması").manual_quantity, Some(5.0));

        let id = project.add_unit(Pool::Structural);
        assert_eq!(project.unit(Pool::Structural, id).unwrap().mode, StructuralMode::Detailed);
        assert_eq!(project.pool_mode(Pool::Architectural), None);
    }

    #[test]
    fn test_toggle_pool_mode_unifies_mixed_pool() {
        let mut project = Project::default();
        project.add_unit(Pool::Architectural);
        let b = project.add_unit(Pool::Architectural);
        project.pool_mut(Pool::Architectural)[1].mode = StructuralMode::Detailed;
        assert_eq!(project.pool_mode(Pool::Architectural), None);

        assert_eq!(project.toggle_pool_mode(Pool::Architectural), StructuralMode::Detailed);
        assert_eq!(project.pool_mode(Pool::Architectural), Some(StructuralMode::Detailed));
        assert_eq!(project.toggle_pool_mode(Pool::Architectural), StructuralMode::Global);
        assert_eq!(project.unit(Pool::Architectural, b).unwrap().mode, StructuralMode::Global);
    }

    #[test]
    fn test_project_file_defaults() {
        let project: Project = serde_json::from_str(r#"{"units":[{"id":3,"name":"Tip A"}]}"#).unwrap();
        assert_eq!(project.name, "Untitled Project");
        assert_eq!(project.units[0].count, 1);
        assert_eq!(project.units[0].mode, StructuralMode::Global);
        assert_eq!(project.catalog, CostCatalog::default());
        assert_eq!(project.category_modes.get("kaba_insaat"), StructuralMode::Global);

        let project: Project =
            serde_json::from_str(r#"{"category_modes":{"kaba_insaat":"detailed"}}"#).unwrap();
        assert_eq!(project.category_modes.get("kaba_insaat"), StructuralMode::Detailed);
    }
}
