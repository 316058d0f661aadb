use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use metraj::export::{export_csv, export_json};
use metraj::loader::{load_catalog, load_project, refresh_prices, FilePriceFeed};
use metraj::model::Project;
use metraj::ui::App;

#[derive(Parser, Debug)]
#[command(name = "metraj")]
#[command(about = "Metraj - quantity takeoff and cost estimate from digitized floor plans")]
#[command(version)]
struct Args {
    /// Path to project JSON file (a new empty project when omitted)
    file: Option<PathBuf>,

    /// Replace the built-in cost catalog
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Apply an external price feed snapshot
    #[arg(long, value_name = "FILE")]
    prices: Option<PathBuf>,

    /// Export the cost report to CSV
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Export the cost report to JSON
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();
    let args = Args::parse();

    let mut project = match &args.file {
        Some(path) => load_project(path)?,
        None => Project::default(),
    };

    if let Some(catalog_path) = &args.catalog {
        project.catalog = load_catalog(catalog_path)?;
    }

    if let Some(prices_path) = &args.prices {
        project.catalog = refresh_prices(&project.catalog, &FilePriceFeed::new(prices_path.clone()));
    }

    for issue in project.catalog.validate() {
        warn!("catalog: {issue}");
    }

    if let Some(csv_path) = &args.csv {
        export_csv(&project, csv_path)?;
        println!("Exported to CSV: {}", csv_path.display());
    }

    if let Some(json_path) = &args.json {
        export_json(&project, json_path)?;
        println!("Exported to JSON: {}", json_path.display());
    }

    if args.csv.is_some() || args.json.is_some() {
        return Ok(());
    }

    let terminal = ratatui::init();
    let result = App::new(project).run(terminal);
    ratatui::restore();
    result
}
