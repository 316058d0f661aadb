//! # Metraj
//!
//! Quantity takeoff and cost estimation for residential buildings from
//! digitized floor plans.
//!
//! ## Features
//!
//! - Calibrate plan rasters and trace rooms, walls, columns, beams and slabs
//! - Extract room outlines from the plan image with a flood fill
//! - Derive semantic quantities per unit in global or detailed mode
//! - Aggregate repeated units and floors into a priced project total
//! - Refresh catalog prices from an external feed snapshot
//! - Export the cost report to CSV and JSON
//!
//! ## Example
//!
//! ```no_run
//! use metraj::loader::load_project;
//!
//! let project = load_project("site.json").expect("Failed to load");
//! let report = project.cost();
//! println!("Project: {}", project.name);
//! println!("Total: {:.2}", report.project_total);
//! ```

pub mod calibration;
pub mod cost;
pub mod digitize;
pub mod error;
pub mod export;
pub mod geometry;
pub mod loader;
pub mod model;
pub mod region;
pub mod session;
pub mod takeoff;
pub mod ui;
