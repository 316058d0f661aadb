//! Cost resolution and project-wide aggregation.

use crate::digitize::{finite_or_zero, round2};
use crate::model::{
    AutoSource, BuildingStats, CategoryModes, CostCatalog, CostItem, ItemScope, Overrides, Project,
    QuantityKind, SpatialUnit, StructuralMode,
};
use crate::takeoff::{derive_stats, detailed_quantity, item_quantity};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// One catalog item after overrides are applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedItem {
    pub name: String,
    pub unit: String,
    pub auto_quantity: f64,
    pub quantity: f64,
    pub unit_price: f64,
    pub total: f64,
    pub manual_quantity: bool,
    pub manual_price: bool,
}

impl ResolvedItem {
    #[must_use]
    pub fn is_overridden(&self) -> bool {
        self.manual_quantity || self.manual_price
    }
}

/// Applies overrides to one item: `manual ?? auto` for quantity (lump sums are
/// always 1) and `manual ?? catalog` for price.
#[must_use]
pub fn resolve_item(item: &CostItem, auto_quantity: f64, overrides: &Overrides) -> ResolvedItem {
    let entry = overrides.get(&item.name);
    let auto_quantity = if item.lump_sum { 1.0 } else { finite_or_zero(auto_quantity) };

    let quantity = if item.lump_sum {
        1.0
    } else {
        entry.manual_quantity.map_or(auto_quantity, finite_or_zero)
    };
    let unit_price = entry
        .manual_price
        .map_or(finite_or_zero(item.unit_price), finite_or_zero);

    ResolvedItem {
        name: item.name.clone(),
        unit: item.unit.clone(),
        auto_quantity,
        quantity,
        unit_price,
        total: quantity * unit_price,
        manual_quantity: entry.manual_quantity.is_some() && !item.lump_sum,
        manual_price: entry.manual_price.is_some(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCost {
    pub id: String,
    pub title: String,
    pub structural: bool,
    pub mode: StructuralMode,
    /// Has items that follow the category's global/detailed switch.
    pub switchable: bool,
    pub items: Vec<ResolvedItem>,
    pub total: f64,
}

/// Whole-project cost report.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProjectCost {
    pub categories: Vec<CategoryCost>,
    pub project_total: f64,
    pub structural_subtotal: f64,
    pub fitout_subtotal: f64,
    pub total_construction_area: f64,
}

impl ProjectCost {
    #[must_use]
    pub fn category(&self, id: &str) -> Option<&CategoryCost> {
        self.categories.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn item(&self, name: &str) -> Option<&ResolvedItem> {
        self.categories
            .iter()
            .flat_map(|c| c.items.iter())
            .find(|i| i.name == name)
    }
}

/// Building-wide quantity for a global-scope item.
#[must_use]
pub fn global_quantity(item: &CostItem, building: &BuildingStats) -> f64 {
    let base = match &item.auto_source {
        AutoSource::Quantity(QuantityKind::TotalArea) => building.total_construction_area(),
        AutoSource::Quantity(QuantityKind::LandArea) => finite_or_zero(building.land_area),
        AutoSource::Manual => 0.0,
        AutoSource::Quantity(_) | AutoSource::Unknown(_) => {
            warn!(
                item = %item.name,
                source = %item.auto_source.as_str(),
                "global item has no building-wide source, resolving to 0"
            );
            0.0
        }
    };
    round2(base * finite_or_zero(item.multiplier))
}

/// Per-item automatic quantities summed over every unit, each weighted by its
/// repeat count.
///
/// Unit-scope items use their own source. Switchable global items use their
/// detailed source, which only units in detailed mode feed. Other global items
/// are not included.
#[must_use]
pub fn unit_quantities(
    units: &[SpatialUnit],
    structural_units: &[SpatialUnit],
    catalog: &CostCatalog,
    building: &BuildingStats,
) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();

    for unit in units.iter().chain(structural_units) {
        let stats = derive_stats(unit, building);
        let count = f64::from(unit.count);
        for item in catalog.items() {
            let quantity = match (item.scope, &item.detailed) {
                (ItemScope::Unit, _) => item_quantity(item, &stats),
                (ItemScope::Global, Some(source)) => detailed_quantity(source, &stats),
                (ItemScope::Global, None) => continue,
            };
            *totals.entry(item.name.clone()).or_insert(0.0) += quantity * count;
        }
    }

    totals
}

/// Prices the whole project.
///
/// A global-scope item takes exactly one source: the building-wide formula,
/// or the summed unit quantities when it is switchable and its category is
/// detailed. Units never add to the building-wide formula.
#[must_use]
pub fn aggregate_project(
    units: &[SpatialUnit],
    structural_units: &[SpatialUnit],
    catalog: &CostCatalog,
    overrides: &Overrides,
    modes: &CategoryModes,
    building: &BuildingStats,
) -> ProjectCost {
    let summed = unit_quantities(units, structural_units, catalog, building);

    let mut report = ProjectCost {
        total_construction_area: building.total_construction_area(),
        ..ProjectCost::default()
    };

    for category in &catalog.categories {
        let mode = modes.get(&category.id);
        let items: Vec<ResolvedItem> = category
            .items
            .iter()
            .map(|item| {
                let from_units = match mode {
                    StructuralMode::Detailed => item.scope == ItemScope::Unit || item.is_switchable(),
                    StructuralMode::Global => item.scope == ItemScope::Unit,
                };
                let auto = if from_units {
                    summed.get(&item.name).copied().unwrap_or(0.0)
                } else {
                    global_quantity(item, building)
                };
                resolve_item(item, auto, overrides)
            })
            .collect();
        let total: f64 = items.iter().map(|i| i.total).sum();

        if category.structural {
            report.structural_subtotal += total;
        } else {
            report.fitout_subtotal += total;
        }
        report.project_total += total;
        report.categories.push(CategoryCost {
            id: category.id.clone(),
            title: category.title.clone(),
            structural: category.structural,
            mode,
            switchable: category.items.iter().any(CostItem::is_switchable),
            items,
            total,
        });
    }

    debug!(
        units = units.len(),
        structural_units = structural_units.len(),
        total = report.project_total,
        "project aggregated"
    );
    report
}

impl Project {
    /// Cost report for the committed project state.
    #[must_use]
    pub fn cost(&self) -> ProjectCost {
        aggregate_project(
            &self.units,
            &self.structural_units,
            &self.catalog,
            &self.overrides,
            &self.category_modes,
            &self.building,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Beam, BeamProperties, Column, Outline, Room, RoomProperties, Span};
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    fn item(name: &str, source: &str, multiplier: f64, scope: ItemScope) -> CostItem {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "unit": "m2",
            "unit_price": 10.0,
            "auto_source": source,
            "multiplier": multiplier,
            "scope": scope,
        }))
        .unwrap()
    }

    fn unit_with_area(id: u64, area: f64, count: u32) -> SpatialUnit {
        let mut unit = SpatialUnit::new(id, format!("Tip {id}"));
        unit.count = count;
        unit.rooms.push(Room {
            id: 1,
            name: "Salon".to_string(),
            outline: Outline::Manual {
                area_m2: area,
                perimeter_m: None,
            },
            properties: RoomProperties::default(),
        });
        unit
    }

    #[test]
    fn test_manual_values_win() {
        let it = item("Şap", "total_area", 1.0, ItemScope::Unit);
        let mut overrides = Overrides::default();

        let r = resolve_item(&it, 40.0, &overrides);
        assert_relative_eq!(r.quantity, 40.0);
        assert_relative_eq!(r.total, 400.0);
        assert!(!r.is_overridden());

        overrides.set_quantity("Şap", Some(12.5));
        overrides.set_price("Şap", Some(8.0));
        let r = resolve_item(&it, 40.0, &overrides);
        assert_relative_eq!(r.auto_quantity, 40.0);
        assert_relative_eq!(r.quantity, 12.5);
        assert_relative_eq!(r.unit_price, 8.0);
        assert_relative_eq!(r.total, 100.0);
        assert!(r.manual_quantity && r.manual_price);
    }

    #[test]
    fn test_lump_sum_counts_once() {
        let mut it = item("Proje", "manual", 1.0, ItemScope::Unit);
        it.lump_sum = true;
        let mut overrides = Overrides::default();
        overrides.set_quantity("Proje", Some(7.0));

        let r = resolve_item(&it, 0.0, &overrides);
        assert_relative_eq!(r.quantity, 1.0);
        assert_relative_eq!(r.total, 10.0);
        assert!(!r.manual_quantity);
    }

    #[test]
    fn test_global_quantity_scenario() {
        let building = BuildingStats {
            normal_floor_count: 6,
            normal_floor_area: 300.0,
            ground_floor_area: 250.0,
            basement_floor_count: 0,
            ..BuildingStats::default()
        };
        assert_relative_eq!(building.total_construction_area(), 2050.0);

        let it = item("Demir", "total_area", 0.045, ItemScope::Global);
        assert_relative_eq!(global_quantity(&it, &building), 92.25);

        let land = item("Peyzaj", "land_area", 0.5, ItemScope::Global);
        assert_relative_eq!(global_quantity(&land, &building), 250.0);

        let bad = item("Sıva", "wet_area", 1.0, ItemScope::Global);
        assert_relative_eq!(global_quantity(&bad, &building), 0.0);
    }

    #[test]
    fn test_units_are_weighted_by_count() {
        let catalog = CostCatalog {
            categories: vec![crate::model::CostCategory {
                id: "zemin".to_string(),
                title: "Zemin".to_string(),
                structural: false,
                items: vec![item("Şap", "total_area", 1.0, ItemScope::Unit)],
            }],
        };
        let units = vec![unit_with_area(1, 80.0, 5), unit_with_area(2, 120.0, 2)];
        let structural = vec![unit_with_area(3, 10.0, 0)];

        let report = aggregate_project(
            &units,
            &structural,
            &catalog,
            &Overrides::default(),
            &CategoryModes::default(),
            &BuildingStats::default(),
        );
        assert_relative_eq!(report.item("Şap").unwrap().quantity, 640.0);
        assert_relative_eq!(report.project_total, 6400.0);
        assert_relative_eq!(report.fitout_subtotal, 6400.0);
        assert_relative_eq!(report.structural_subtotal, 0.0);
    }

    #[test]
    fn test_global_items_ignore_units_and_overrides_elsewhere() {
        let mut project = Project::default();
        project.units.push(unit_with_area(1, 100.0, 3));
        let mut detailed = unit_with_area(2, 200.0, 4);
        detailed.mode = StructuralMode::Detailed;
        project.structural_units.push(detailed);
        project.overrides.set_quantity("Şap Atılması", Some(1.0));

        let area = project.building.total_construction_area();
        let report = project.cost();
        let concrete = report.item("Betonarme Betonu (C30)").unwrap();
        assert_relative_eq!(concrete.quantity, round2(area * 0.38));

        let structure = report.category("kaba_insaat").unwrap();
        assert!(structure.structural);
        assert_relative_eq!(report.structural_subtotal, structure.total);
        assert_relative_eq!(
            report.project_total,
            report.structural_subtotal + report.fitout_subtotal,
            epsilon = 1e-6
        );
        assert_eq!(report.categories.len(), project.catalog.categories.len());
    }

    #[test]
    fn test_empty_project_costs_only_global_items() {
        let project = Project::default();
        let report = project.cost();
        assert_relative_eq!(report.fitout_subtotal, 0.0);
        assert!(report.structural_subtotal > 0.0);
    }

    fn framed_floor_plan(count: u32) -> SpatialUnit {
        let mut unit = SpatialUnit::new(7, "Normal Kat".to_string());
        unit.mode = StructuralMode::Detailed;
        unit.count = count;
        for id in 0..20 {
            unit.columns.push(Column::from_section(id, 50.0, 50.0, Some(3.0)));
        }
        unit.beams.push(Beam {
            id: 20,
            span: Span::Manual { length_m: 200.0 },
            properties: BeamProperties {
                width: 25.0,
                height: 50.0,
                slab_thickness: 15.0,
            },
        });
        unit
    }

    #[test]
    fn test_detailed_category_prices_drawn_structure_once() {
        let mut project = Project::default();
        project.structural_units.push(framed_floor_plan(6));
        let area = project.building.total_construction_area();

        let global = project.cost();
        assert_eq!(global.category("kaba_insaat").unwrap().mode, StructuralMode::Global);
        assert_relative_eq!(
            global.item("Betonarme Betonu (C30)").unwrap().quantity,
            round2(area * 0.38)
        );

        assert_eq!(project.category_modes.toggle("kaba_insaat"), StructuralMode::Detailed);
        let detailed = project.cost();

        // 20 x 0.75 column + 25 beam, six floors; nothing from the area formula.
        let volume = 40.0 * 6.0;
        assert_relative_eq!(detailed.item("Betonarme Betonu (C30)").unwrap().quantity, volume);
        assert_relative_eq!(detailed.item("İnşaat Demiri").unwrap().quantity, 24.0);
        // 20 x 6 column + 200 x 0.95 beam
        assert_relative_eq!(
            detailed.item("Kalıp İşçiliği & Malzeme").unwrap().quantity,
            310.0 * 6.0,
            epsilon = 1e-6
        );

        let expected = 240.0 * 2500.0 + 24.0 * 24000.0 + 1860.0 * 450.0;
        assert_relative_eq!(detailed.structural_subtotal, expected, epsilon = 1e-6);
        assert!((detailed.structural_subtotal - global.structural_subtotal).abs() > 1.0);
        assert_relative_eq!(detailed.fitout_subtotal, global.fitout_subtotal);
    }

    #[test]
    fn test_detailed_category_ignores_units_in_global_mode() {
        let mut project = Project::default();
        let mut plan = framed_floor_plan(3);
        plan.mode = StructuralMode::Global;
        project.structural_units.push(plan);
        project.units.push(unit_with_area(1, 100.0, 2));
        project.category_modes.set("kaba_insaat", StructuralMode::Detailed);

        let report = project.cost();
        assert_relative_eq!(report.structural_subtotal, 0.0);
        assert!(report.category("kaba_insaat").unwrap().switchable);
        assert!(!report.category("zemin_kaplama").unwrap().switchable);
    }

    #[test]
    fn test_detailed_switch_keeps_overrides() {
        let mut project = Project::default();
        project.structural_units.push(framed_floor_plan(1));
        project.category_modes.set("kaba_insaat", StructuralMode::Detailed);
        project.overrides.set_quantity("İnşaat Demiri", Some(12.0));

        let rebar = project.cost().item("İnşaat Demiri").unwrap().clone();
        assert_relative_eq!(rebar.auto_quantity, 4.0);
        assert_relative_eq!(rebar.quantity, 12.0);
    }
}
