//! External price feed snapshots.
//!
//! A feed maps external item ids to current unit prices. Applying it yields a
//! new catalog; user price overrides live elsewhere and are never touched.

use crate::error::PriceFeedError;
use crate::model::CostCatalog;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// External id to unit price.
pub type PriceTable = HashMap<String, f64>;

/// Source of current prices.
pub trait PriceFeed {
    fn fetch(&self) -> Result<PriceTable, PriceFeedError>;
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    status: String,
    #[serde(default)]
    data: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(rename = "_id", default)]
    id: Option<String>,
    #[serde(default)]
    fiyat: Value,
}

/// Prices arrive either as numbers or as numeric strings.
fn price_of(value: &Value) -> Option<f64> {
    let price = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    (price.is_finite() && price > 0.0).then_some(price)
}

/// Parses a feed snapshot `{"status": "success", "data": [{"_id", "fiyat"}]}`.
/// Entries without an id or a positive price are skipped.
pub fn parse_price_feed(content: &str) -> Result<PriceTable, PriceFeedError> {
    let snapshot: Snapshot = serde_json::from_str(content)?;
    if snapshot.status != "success" {
        return Err(PriceFeedError::Rejected {
            status: snapshot.status,
        });
    }

    let table: PriceTable = snapshot
        .data
        .into_iter()
        .filter_map(|entry| Some((entry.id?, price_of(&entry.fiyat)?)))
        .collect();
    debug!(prices = table.len(), "price feed parsed");
    Ok(table)
}

pub fn load_price_feed<P: AsRef<Path>>(path: P) -> Result<PriceTable, PriceFeedError> {
    let content = std::fs::read_to_string(&path).map_err(|source| PriceFeedError::FileRead {
        path: path.as_ref().to_path_buf(),
        source,
    })?;
    parse_price_feed(&content)
}

/// Snapshot stored on disk.
#[derive(Debug, Clone)]
pub struct FilePriceFeed {
    path: PathBuf,
}

impl FilePriceFeed {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl PriceFeed for FilePriceFeed {
    fn fetch(&self) -> Result<PriceTable, PriceFeedError> {
        load_price_feed(&self.path)
    }
}

/// Copy of `catalog` with feed prices replacing catalog prices. Items without
/// an external id, or whose id the feed does not list, keep their price.
#[must_use]
pub fn apply_price_feed(catalog: &CostCatalog, prices: &PriceTable) -> CostCatalog {
    let mut updated = catalog.clone();
    let mut replaced = 0_usize;

    for item in updated.categories.iter_mut().flat_map(|c| c.items.iter_mut()) {
        if let Some(price) = item.external_id.as_ref().and_then(|id| prices.get(id)) {
            item.unit_price = *price;
            replaced += 1;
        }
    }

    info!(replaced, "price feed applied");
    updated
}

/// Fetches from `feed` and applies it. A failing feed leaves the catalog as is.
#[must_use]
pub fn refresh_prices(catalog: &CostCatalog, feed: &dyn PriceFeed) -> CostCatalog {
    match feed.fetch() {
        Ok(prices) => apply_price_feed(catalog, &prices),
        Err(err) => {
            warn!(error = %err, "price feed unavailable, keeping catalog prices");
            catalog.clone()
        }
    }
}
