use crate::error::LoadError;
use crate::model::{CostCatalog, Project};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::info;

fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, LoadError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads a saved project.
///
/// Every top-level field is optional: a missing `building` gets the default
/// building, a missing `catalog` the built-in cost catalog.
///
/// # Errors
///
/// Returns [`LoadError::FileRead`] if the file cannot be read and
/// [`LoadError::Json`] if it is not a valid project document.
///
/// # Example
///
/// ```no_run
/// use metraj::loader::load_project;
///
/// let project = load_project("site.json")?;
/// println!("{}: {} units", project.name, project.total_units());
/// # Ok::<(), metraj::error::LoadError>(())
/// ```
pub fn load_project<P: AsRef<Path>>(path: P) -> Result<Project, LoadError> {
    let project: Project = read_json(&path)?;
    info!(
        path = %path.as_ref().display(),
        units = project.units.len(),
        structural_units = project.structural_units.len(),
        "project loaded"
    );
    Ok(project)
}

/// Loads a cost catalog: a JSON array of categories.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<CostCatalog, LoadError> {
    let catalog: CostCatalog = read_json(&path)?;
    info!(
        path = %path.as_ref().display(),
        categories = catalog.categories.len(),
        "catalog loaded"
    );
    Ok(catalog)
}
