use crate::cost::ProjectCost;
use crate::error::ExportError;
use crate::model::Project;
use std::fs::File;
use std::io::Write;
use std::path::Path;

fn money(value: f64) -> String {
    format!("{value:.2}")
}

/// Writes the cost report: one row per item, a subtotal row per category and
/// the structural, fit-out and project totals at the end.
pub fn write_report<W: Write>(report: &ProjectCost, out: W) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(out);

    writer.write_record([
        "Category",
        "Item",
        "Unit",
        "Quantity",
        "Unit Price",
        "Total",
        "Override",
    ])?;

    for category in &report.categories {
        for item in &category.items {
            let marker = match (item.manual_quantity, item.manual_price) {
                (true, true) => "quantity+price",
                (true, false) => "quantity",
                (false, true) => "price",
                (false, false) => "",
            };
            writer.write_record([
                category.title.as_str(),
                &item.name,
                &item.unit,
                &money(item.quantity),
                &money(item.unit_price),
                &money(item.total),
                marker,
            ])?;
        }
        writer.write_record([category.title.as_str(), "Subtotal", "", "", "", &money(category.total), ""])?;
    }

    for (label, value) in [
        ("Structural", report.structural_subtotal),
        ("Fit-out", report.fitout_subtotal),
        ("Project Total", report.project_total),
    ] {
        writer.write_record(["", label, "", "", "", &money(value), ""])?;
    }

    writer.flush().map_err(|e| ExportError::WriteError {
        message: e.to_string(),
    })?;

    Ok(())
}

pub fn export_csv<P: AsRef<Path>>(project: &Project, path: P) -> Result<(), ExportError> {
    let path_ref = path.as_ref();
    let file = File::create(path_ref).map_err(|source| ExportError::FileCreate {
        path: path_ref.to_path_buf(),
        source,
    })?;

    write_report(&project.cost(), file)?;
    tracing::info!(path = %path_ref.display(), "cost report exported as CSV");
    Ok(())
}
