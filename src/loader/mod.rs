pub mod price_feed;
pub mod project;

pub use crate::error::{LoadError, PriceFeedError};
pub use price_feed::{
    apply_price_feed, load_price_feed, parse_price_feed, refresh_prices, FilePriceFeed, PriceFeed,
    PriceTable,
};
pub use project::{load_catalog, load_project};
