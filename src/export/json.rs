use crate::cost::ProjectCost;
use crate::error::ExportError;
use crate::model::{BuildingStats, Project};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Serialize)]
struct CostDocument<'a> {
    name: &'a str,
    building: &'a BuildingStats,
    units: usize,
    structural_units: usize,
    cost: ProjectCost,
}

pub fn export_json<P: AsRef<Path>>(project: &Project, path: P) -> Result<(), ExportError> {
    let path_ref = path.as_ref();
    let document = CostDocument {
        name: &project.name,
        building: &project.building,
        units: project.units.len(),
        structural_units: project.structural_units.len(),
        cost: project.cost(),
    };
    let json = serde_json::to_string_pretty(&document)?;

    let mut file = File::create(path_ref).map_err(|source| ExportError::FileCreate {
        path: path_ref.to_path_buf(),
        source,
    })?;

    file.write_all(json.as_bytes())
        .map_err(|e| ExportError::WriteError {
            message: e.to_string(),
        })?;

    tracing::info!(path = %path_ref.display(), "cost report exported as JSON");
    Ok(())
}
