pub mod categories;
pub mod clob_client;
pub mod gamma_client;
pub mod history;
pub mod normalize;
pub mod types;

pub use clob_client::{ClobClient, ClobClientError};
pub use gamma_client::{GammaClient, GammaClientError};
pub use history::{fetch_price_history, Interval, PriceSeries, SeriesSource};
pub use normalize::{normalize, Market};
pub use types::{GammaEvent, GammaMarket};
