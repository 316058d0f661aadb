pub mod building;
pub mod catalog;
pub mod element;
pub mod project;
pub mod unit;

pub use building::{BuildingStats, FloorType};
pub use catalog::{
    AutoSource, CatalogIssue, CategoryModes, CostCatalog, CostCategory, CostItem, DetailedSource,
    ItemOverride, ItemScope, Overrides, QuantityKind,
};
pub use element::{
    Beam, BeamProperties, Column, ColumnKind, ColumnProperties, ElementRef, FloorFinish, Outline,
    Room, RoomProperties, Slab, SlabKind, SlabProperties, Span, Wall, WallFinish, WallMaterial,
    WallProperties,
};
pub use project::Project;
pub use unit::{Pool, SpatialUnit, StructuralMode};
