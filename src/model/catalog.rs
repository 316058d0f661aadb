//! Cost catalog: categories of priced work items, each bound to one semantic
//! quantity.

use super::element::WallMaterial;
use super::unit::StructuralMode;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Closed set of quantities a unit takeoff produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantityKind {
    TotalArea,
    TotalPerimeter,
    WetArea,
    DryArea,
    DryPerimeter,
    NetWallArea,
    CorniceLength,
    WallArea(WallMaterial),
    ColumnConcreteVolume,
    ColumnFormworkArea,
    BeamConcreteVolume,
    BeamFormworkArea,
    SlabConcreteVolume,
    SlabFormworkArea,
    /// Column, beam and slab concrete together.
    TotalConcreteVolume,
    TotalFormworkArea,
    /// Plot area; only meaningful for building-wide items.
    LandArea,
}

impl QuantityKind {
    /// Every kind, in stats display order.
    #[must_use]
    pub fn all() -> Vec<QuantityKind> {
        let mut kinds = vec![
            QuantityKind::TotalArea,
            QuantityKind::TotalPerimeter,
            QuantityKind::WetArea,
            QuantityKind::DryArea,
            QuantityKind::DryPerimeter,
            QuantityKind::NetWallArea,
            QuantityKind::CorniceLength,
        ];
        kinds.extend(WallMaterial::ALL.into_iter().map(QuantityKind::WallArea));
        kinds.extend([
            QuantityKind::ColumnConcreteVolume,
            QuantityKind::ColumnFormworkArea,
            QuantityKind::BeamConcreteVolume,
            QuantityKind::BeamFormworkArea,
            QuantityKind::SlabConcreteVolume,
            QuantityKind::SlabFormworkArea,
            QuantityKind::TotalConcreteVolume,
            QuantityKind::TotalFormworkArea,
            QuantityKind::LandArea,
        ]);
        kinds
    }

    #[must_use]
    pub fn key(self) -> String {
        match self {
            QuantityKind::WallArea(material) => format!("wall_{}_area", material.key()),
            other => other.fixed_key().to_string(),
        }
    }

    fn fixed_key(self) -> &'static str {
        match self {
            QuantityKind::TotalArea => "total_area",
            QuantityKind::TotalPerimeter => "total_perimeter",
            QuantityKind::WetArea => "wet_area",
            QuantityKind::DryArea => "dry_area",
            QuantityKind::DryPerimeter => "dry_perimeter",
            QuantityKind::NetWallArea => "net_wall_area",
            QuantityKind::CorniceLength => "cornice_length",
            QuantityKind::WallArea(_) => "wall_area",
            QuantityKind::ColumnConcreteVolume => "column_concrete_volume",
            QuantityKind::ColumnFormworkArea => "column_formwork_area",
            QuantityKind::BeamConcreteVolume => "beam_concrete_volume",
            QuantityKind::BeamFormworkArea => "beam_formwork_area",
            QuantityKind::SlabConcreteVolume => "slab_concrete_volume",
            QuantityKind::SlabFormworkArea => "slab_formwork_area",
            QuantityKind::TotalConcreteVolume => "total_concrete_volume",
            QuantityKind::TotalFormworkArea => "total_formwork_area",
            QuantityKind::LandArea => "land_area",
        }
    }

    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        if let Some(material) = key
            .strip_prefix("wall_")
            .and_then(|rest| rest.strip_suffix("_area"))
            .and_then(WallMaterial::from_key)
        {
            return Some(QuantityKind::WallArea(material));
        }
        Self::all()
            .into_iter()
            .filter(|kind| !matches!(kind, QuantityKind::WallArea(_)))
            .find(|kind| kind.fixed_key() == key)
    }
}

impl fmt::Display for QuantityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Where an item's automatic quantity comes from.
///
/// Unrecognised keys are kept so they resolve to zero instead of failing the
/// whole catalog; [`CostCatalog::validate`] reports them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoSource {
    Manual,
    Quantity(QuantityKind),
    Unknown(String),
}

impl AutoSource {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw == "manual" {
            return AutoSource::Manual;
        }
        QuantityKind::parse(raw).map_or_else(|| AutoSource::Unknown(raw.to_string()), AutoSource::Quantity)
    }

    #[must_use]
    pub fn as_str(&self) -> String {
        match self {
            AutoSource::Manual => "manual".to_string(),
            AutoSource::Quantity(kind) => kind.key(),
            AutoSource::Unknown(raw) => raw.clone(),
        }
    }
}

impl Serialize for AutoSource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_str())
    }
}

impl<'de> Deserialize<'de> for AutoSource {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(AutoSource::parse(&raw))
    }
}

/// Whether an item is summed over units or computed once for the building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemScope {
    #[default]
    Unit,
    Global,
}

/// Per-unit source a global item switches to when its category is in
/// detailed mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedSource {
    pub auto_source: AutoSource,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostItem {
    pub name: String,
    pub unit: String,
    pub unit_price: f64,
    pub auto_source: AutoSource,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    #[serde(default)]
    pub scope: ItemScope,
    /// Lump-sum items always count once.
    #[serde(default)]
    pub lump_sum: bool,
    /// Identifier of this item in the external price feed.
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed: Option<DetailedSource>,
}

fn default_multiplier() -> f64 {
    1.0
}

impl CostItem {
    fn new(name: &str, unit: &str, unit_price: f64, source: &str, multiplier: f64) -> Self {
        Self {
            name: name.to_string(),
            unit: unit.to_string(),
            unit_price,
            auto_source: AutoSource::parse(source),
            multiplier,
            scope: ItemScope::Unit,
            lump_sum: false,
            external_id: None,
            detailed: None,
        }
    }

    fn global(mut self) -> Self {
        self.scope = ItemScope::Global;
        self
    }

    fn external(mut self, id: &str) -> Self {
        self.external_id = Some(id.to_string());
        self
    }

    fn detailed(mut self, source: &str, multiplier: f64) -> Self {
        self.detailed = Some(DetailedSource {
            auto_source: AutoSource::parse(source),
            multiplier,
        });
        self
    }

    /// Whether the item follows its category's global/detailed switch.
    #[must_use]
    pub fn is_switchable(&self) -> bool {
        self.scope == ItemScope::Global && self.detailed.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostCategory {
    pub id: String,
    pub title: String,
    /// Counted in the structural subtotal instead of fit-out.
    #[serde(default)]
    pub structural: bool,
    pub items: Vec<CostItem>,
}

/// A problem found by [`CostCatalog::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogIssue {
    UnknownSource { item: String, source: String },
    /// Global items can only use total or land area.
    UnsupportedGlobalSource { item: String, source: String },
    /// Per-unit sources cannot use the plot area.
    UnsupportedUnitSource { item: String, source: String },
    DuplicateItem { item: String },
}

impl fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogIssue::UnknownSource { item, source } => {
                write!(f, "item '{item}' uses unknown quantity '{source}'")
            }
            CatalogIssue::UnsupportedGlobalSource { item, source } => {
                write!(f, "global item '{item}' cannot use per-unit quantity '{source}'")
            }
            CatalogIssue::UnsupportedUnitSource { item, source } => {
                write!(f, "item '{item}' cannot use building-wide quantity '{source}' per unit")
            }
            CatalogIssue::DuplicateItem { item } => write!(f, "item '{item}' is listed twice"),
        }
    }
}

/// Ordered list of cost categories. Treated as immutable during a
/// computation; user overrides are kept in [`Overrides`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostCatalog {
    pub categories: Vec<CostCategory>,
}

impl Default for CostCatalog {
    fn default() -> Self {
        Self {
            categories: vec![
                CostCategory {
                    id: "kaba_insaat".to_string(),
                    title: "1. Kaba İnşaat (Structure)".to_string(),
                    structural: true,
                    items: vec![
                        CostItem::new("Betonarme Betonu (C30)", "m3", 2500.0, "total_area", 0.38)
                            .global()
                            .detailed("total_concrete_volume", 1.0)
                            .external("betonmal"),
                        CostItem::new("İnşaat Demiri", "ton", 24000.0, "total_area", 0.040)
                            .global()
                            .detailed("total_concrete_volume", 0.1)
                            .external("demirmal"),
                        CostItem::new("Kalıp İşçiliği & Malzeme", "m2", 450.0, "total_area", 2.2)
                            .global()
                            .detailed("total_formwork_area", 1.0)
                            .external("kalipdemirbetonisc"),
                    ],
                },
                CostCategory {
                    id: "duvar_tavan".to_string(),
                    title: "2. Duvar ve Tavan İşleri".to_string(),
                    structural: false,
                    items: vec![
                        CostItem::new("Gazbeton Duvar (13.5'luk)", "m2", 850.0, "wall_gazbeton_area", 1.0)
                            .external("ytongmal"),
                        CostItem::new("Tuğla Duvar (13.5'luk)", "m2", 700.0, "wall_tugla_area", 1.0)
                            .external("tuglamal"),
                        CostItem::new("Briket Duvar (15'lik)", "m2", 600.0, "wall_briket_area", 1.0)
                            .external("briketmal"),
                        CostItem::new("İç Sıva (Kara Sıva)", "m2", 250.0, "net_wall_area", 1.0)
                            .external("karasivaisc"),
                        CostItem::new("Saten Alçı ve Boya (Duvar)", "m2", 350.0, "net_wall_area", 1.0)
                            .external("boyamal"),
                        CostItem::new("Tavan Boyası", "m2", 150.0, "total_area", 1.0)
                            .external("tavanboyamal"),
                        CostItem::new("Kartonpiyer / Stropiyer", "mt", 85.0, "cornice_length", 1.0)
                            .external("alcikartonpiyermalisc"),
                    ],
                },
                CostCategory {
                    id: "zemin_kaplama".to_string(),
                    title: "3. Zemin Kaplamaları".to_string(),
                    structural: false,
                    items: vec![
                        CostItem::new("Laminat Parke (Şilte+Süpürgelik Dahil)", "m2", 650.0, "dry_area", 1.0)
                            .external("parkepaket"),
                        CostItem::new("Seramik Kaplama (Banyo/Mutfak)", "m2", 950.0, "wet_area", 1.0)
                            .external("seramikmal"),
                        CostItem::new("Şap Atılması", "m2", 120.0, "total_area", 1.0)
                            .external("sappaket"),
                    ],
                },
                CostCategory {
                    id: "tesisat_diger".to_string(),
                    title: "4. Mekanik, Elektrik & Diğer".to_string(),
                    structural: false,
                    items: vec![
                        CostItem::new("Elektrik Tesisatı (m2 başı)", "m2", 1200.0, "total_area", 1.0)
                            .external("elektriktesisatmal"),
                        CostItem::new("Mutfak Dolabı (Tahmini)", "mt", 15000.0, "manual", 0.0)
                            .external("mutfakdolabipaket"),
                        CostItem::new("İç Kapı (Panel)", "Adet", 4500.0, "manual", 0.0)
                            .external("odakapisipaket"),
                    ],
                },
            ],
        }
    }
}

impl CostCatalog {
    pub fn items(&self) -> impl Iterator<Item = &CostItem> {
        self.categories.iter().flat_map(|c| c.items.iter())
    }

    #[must_use]
    pub fn find_item(&self, name: &str) -> Option<&CostItem> {
        self.items().find(|item| item.name == name)
    }

    /// Lists misconfigured items. An empty list means the catalog is sound.
    #[must_use]
    pub fn validate(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();

        for item in self.items() {
            if !seen.insert(item.name.as_str()) {
                issues.push(CatalogIssue::DuplicateItem {
                    item: item.name.clone(),
                });
            }

            match (&item.auto_source, item.scope) {
                (AutoSource::Unknown(raw), _) => issues.push(CatalogIssue::UnknownSource {
                    item: item.name.clone(),
                    source: raw.clone(),
                }),
                (AutoSource::Quantity(QuantityKind::LandArea), ItemScope::Unit) => {
                    issues.push(CatalogIssue::UnsupportedUnitSource {
                        item: item.name.clone(),
                        source: QuantityKind::LandArea.key(),
                    });
                }
                (
                    AutoSource::Quantity(QuantityKind::TotalArea | QuantityKind::LandArea)
                    | AutoSource::Manual,
                    _,
                )
                | (AutoSource::Quantity(_), ItemScope::Unit) => {}
                (AutoSource::Quantity(kind), ItemScope::Global) => {
                    issues.push(CatalogIssue::UnsupportedGlobalSource {
                        item: item.name.clone(),
                        source: kind.key(),
                    });
                }
            }

            match item.detailed.as_ref().map(|d| &d.auto_source) {
                Some(AutoSource::Unknown(raw)) => issues.push(CatalogIssue::UnknownSource {
                    item: item.name.clone(),
                    source: raw.clone(),
                }),
                Some(AutoSource::Quantity(QuantityKind::LandArea)) => {
                    issues.push(CatalogIssue::UnsupportedUnitSource {
                        item: item.name.clone(),
                        source: QuantityKind::LandArea.key(),
                    });
                }
                Some(AutoSource::Quantity(_) | AutoSource::Manual) | None => {}
            }
        }

        issues
    }
}

/// User-entered quantity/price for one item.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_price: Option<f64>,
}

impl ItemOverride {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.manual_quantity.is_none() && self.manual_price.is_none()
    }
}

/// Overrides keyed by item name, applied only when costs are resolved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Overrides(BTreeMap<String, ItemOverride>);

impl Overrides {
    #[must_use]
    pub fn get(&self, item: &str) -> ItemOverride {
        self.0.get(item).copied().unwrap_or_default()
    }

    /// Sets or clears (`None`) the manual quantity. Non-finite input counts as 0.
    pub fn set_quantity(&mut self, item: &str, quantity: Option<f64>) {
        self.update(item, |o| o.manual_quantity = quantity.map(crate::digitize::finite_or_zero));
    }

    /// Sets or clears (`None`) the manual price. Non-finite input counts as 0.
    pub fn set_price(&mut self, item: &str, price: Option<f64>) {
        self.update(item, |o| o.manual_price = price.map(crate::digitize::finite_or_zero));
    }

    /// Reverts an item to its automatic quantity and catalog price.
    pub fn clear(&mut self, item: &str) {
        self.0.remove(item);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn update(&mut self, item: &str, apply: impl FnOnce(&mut ItemOverride)) {
        let entry = self.0.entry(item.to_string()).or_default();
        apply(entry);
        if entry.is_empty() {
            self.0.remove(item);
        }
    }
}

/// Global/detailed switch per category id. Categories not listed are global.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryModes(BTreeMap<String, StructuralMode>);

impl CategoryModes {
    #[must_use]
    pub fn get(&self, category: &str) -> StructuralMode {
        self.0.get(category).copied().unwrap_or_default()
    }

    pub fn set(&mut self, category: &str, mode: StructuralMode) {
        match mode {
            StructuralMode::Global => {
                self.0.remove(category);
            }
            StructuralMode::Detailed => {
                self.0.insert(category.to_string(), mode);
            }
        }
    }

    pub fn toggle(&mut self, category: &str) -> StructuralMode {
        let mode = self.get(category).toggled();
        self.set(category, mode);
        mode
    }
}
