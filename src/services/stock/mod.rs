//! 股票数据服务模块
//!
//! 上游数据源与数据标准化

pub mod alpha_vantage;
pub mod normalize;

pub use alpha_vantage::{AlphaVantageClient, MarketDataProvider, UpstreamRequest};
pub use normalize::{
    normalize_overview, normalize_quote, normalize_search_match, sanitize_error_message,
};
