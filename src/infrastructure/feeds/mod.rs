pub mod csv_market;
pub mod fred;

pub use csv_market::{CsvColumn, CsvMarketFeed};
pub use fred::{FredFeed, FredSeries, default_fred_series};
