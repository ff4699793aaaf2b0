//! 股票数据服务
//!
//! 先查缓存，未命中时请求上游、标准化后写入缓存。
//! 上游失败或返回结构不符时统一按"未找到"处理，不向调用方抛错。

use futures::future::join_all;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::CacheConfig;
use crate::models::{StockOverview, StockQuote, StockSearchResponse};
use crate::services::cache::{CachedRecord, StockCache};
use crate::services::stock::{
    normalize_overview, normalize_quote, normalize_search_match, sanitize_error_message,
    MarketDataProvider, UpstreamRequest,
};

/// 批量行情最多请求的代码数量
pub const MAX_BATCH_SYMBOLS: usize = 5;

/// 股票数据服务
///
/// 缓存与数据源都由外部注入，整个进程共享一个实例
pub struct StockService {
    provider: Arc<dyn MarketDataProvider>,
    cache: Arc<StockCache>,
    ttl: CacheConfig,
}

impl StockService {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        cache: Arc<StockCache>,
        ttl: CacheConfig,
    ) -> Self {
        Self { provider, cache, ttl }
    }

    /// 请求上游，失败时记录日志并返回 None
    async fn fetch_upstream(&self, request: &UpstreamRequest) -> Option<Value> {
        match self.provider.fetch(request).await {
            Ok(data) => Some(data),
            Err(e) => {
                log::error!(
                    "{} 请求失败: {}",
                    request.function(),
                    sanitize_error_message(&e.to_string())
                );
                None
            }
        }
    }

    /// 获取公司概况
    pub async fn fetch_overview(&self, symbol: &str) -> Option<StockOverview> {
        let symbol = symbol.to_uppercase();
        let cache_key = format!("overview_{}", symbol);

        if let Some(CachedRecord::Overview(overview)) = self.cache.get(&cache_key) {
            log::debug!("缓存命中: {}", cache_key);
            return Some(overview);
        }

        let data = self
            .fetch_upstream(&UpstreamRequest::Overview(symbol.clone()))
            .await?;

        let raw = match data.as_object() {
            Some(raw) if raw.contains_key("Symbol") => raw,
            _ => {
                log::warn!("未找到 {} 的公司概况", symbol);
                return None;
            }
        };

        let overview = normalize_overview(raw)?;
        self.cache.set_with_ttl(
            &cache_key,
            CachedRecord::Overview(overview.clone()),
            self.ttl.overview_ttl_secs,
        );
        Some(overview)
    }

    /// 获取实时行情
    pub async fn fetch_quote(&self, symbol: &str) -> Option<StockQuote> {
        let symbol = symbol.to_uppercase();
        let cache_key = format!("quote_{}", symbol);

        if let Some(CachedRecord::Quote(quote)) = self.cache.get(&cache_key) {
            log::debug!("缓存命中: {}", cache_key);
            return Some(quote);
        }

        let data = self
            .fetch_upstream(&UpstreamRequest::GlobalQuote(symbol.clone()))
            .await?;

        // "Global Quote" 缺失或为空对象都视为未找到
        let raw = match data.get("Global Quote").and_then(Value::as_object) {
            Some(raw) if !raw.is_empty() => raw,
            _ => {
                log::warn!("未找到 {} 的实时行情", symbol);
                return None;
            }
        };

        let quote = normalize_quote(raw);
        self.cache.set_with_ttl(
            &cache_key,
            CachedRecord::Quote(quote.clone()),
            self.ttl.quote_ttl_secs,
        );
        Some(quote)
    }

    /// 按关键字搜索股票代码
    ///
    /// 总是返回结果，可能为空；只有上游请求成功时才写入缓存
    pub async fn search(&self, keywords: &str) -> StockSearchResponse {
        let cache_key = format!("search_{}", keywords);

        if let Some(CachedRecord::Search(response)) = self.cache.get(&cache_key) {
            log::debug!("缓存命中: {}", cache_key);
            return response;
        }

        let data = match self
            .fetch_upstream(&UpstreamRequest::SymbolSearch(keywords.to_string()))
            .await
        {
            Some(data) => data,
            None => return StockSearchResponse::empty(keywords),
        };

        let results = data
            .get("bestMatches")
            .and_then(Value::as_array)
            .map(|matches| {
                matches
                    .iter()
                    .filter_map(Value::as_object)
                    .map(normalize_search_match)
                    .collect()
            })
            .unwrap_or_default();

        let response = StockSearchResponse {
            search_term: keywords.to_string(),
            results,
        };
        self.cache.set_with_ttl(
            &cache_key,
            CachedRecord::Search(response.clone()),
            self.ttl.search_ttl_secs,
        );
        response
    }

    /// 批量获取实时行情
    ///
    /// 只处理前 5 个代码，结果以请求时的原始代码为 key，获取失败的值为 None
    pub async fn fetch_batch_quotes(
        &self,
        symbols: &[String],
    ) -> HashMap<String, Option<StockQuote>> {
        if symbols.len() > MAX_BATCH_SYMBOLS {
            log::info!(
                "批量行情请求 {} 个代码，只处理前 {} 个",
                symbols.len(),
                MAX_BATCH_SYMBOLS
            );
        }

        let requested = &symbols[..symbols.len().min(MAX_BATCH_SYMBOLS)];
        let quotes = join_all(requested.iter().map(|symbol| self.fetch_quote(symbol))).await;

        requested.iter().cloned().zip(quotes).collect()
    }

    /// 清空缓存
    pub fn clear_cache(&self) {
        self.cache.clear();
        log::info!("缓存已清空");
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{service_with, MockProvider};
    use super::*;
    use crate::services::cache::test_support::ManualClock;
    use serde_json::json;

    fn ibm_quote() -> Value {
        json!({
            "Global Quote": {
                "01. symbol": "IBM",
                "05. price": "123.45",
                "09. change": "-1.20",
                "06. volume": "1000000"
            }
        })
    }

    #[actix_web::test]
    async fn test_fetch_overview_end_to_end() {
        let provider = Arc::new(MockProvider::default());
        provider.respond(
            UpstreamRequest::Overview("AAPL".to_string()),
            json!({
                "Symbol": "AAPL",
                "Name": "Apple Inc",
                "MarketCapitalization": "2800000000000",
                "52WeekHigh": "199.62"
            }),
        );
        let (service, cache) = service_with(provider.clone());

        let overview = service.fetch_overview("aapl").await.unwrap();
        assert_eq!(
            overview,
            StockOverview {
                symbol: "AAPL".to_string(),
                name: Some("Apple Inc".to_string()),
                market_cap: Some("2800000000000".to_string()),
                week_52_high: Some("199.62".to_string()),
                ..StockOverview::default()
            }
        );
        assert!(cache.contains_key("overview_AAPL"));
        assert_eq!(
            provider.calls(),
            vec![UpstreamRequest::Overview("AAPL".to_string())]
        );
    }

    #[actix_web::test]
    async fn test_fetch_overview_missing_marker() {
        let provider = Arc::new(MockProvider::default());
        for (symbol, payload) in [
            ("AAA", json!({})),
            ("BBB", json!({ "Name": "No Symbol Corp" })),
            ("CCC", json!({ "Note": "Thank you for using Alpha Vantage!" })),
            ("DDD", json!([1, 2, 3])),
        ] {
            provider.respond(UpstreamRequest::Overview(symbol.to_string()), payload);
        }
        let (service, cache) = service_with(provider);

        for symbol in ["AAA", "BBB", "CCC", "DDD"] {
            assert!(service.fetch_overview(symbol).await.is_none());
        }
        assert!(cache.is_empty());
    }

    #[actix_web::test]
    async fn test_fetch_overview_transport_error_is_not_found() {
        let provider = Arc::new(MockProvider::default());
        let (service, cache) = service_with(provider);

        assert!(service.fetch_overview("AAPL").await.is_none());
        assert!(cache.is_empty());
    }

    #[actix_web::test]
    async fn test_fetch_quote_end_to_end() {
        let provider = Arc::new(MockProvider::default());
        provider.respond(UpstreamRequest::GlobalQuote("IBM".to_string()), ibm_quote());
        let (service, _) = service_with(provider);

        let quote = service.fetch_quote("ibm").await.unwrap();
        assert_eq!(
            quote,
            StockQuote {
                symbol: "IBM".to_string(),
                price: Some(123.45),
                change: Some(-1.20),
                volume: Some(1_000_000),
                ..StockQuote::default()
            }
        );
    }

    #[actix_web::test]
    async fn test_fetch_quote_empty_global_quote() {
        let provider = Arc::new(MockProvider::default());
        provider.respond(
            UpstreamRequest::GlobalQuote("XXXX".to_string()),
            json!({ "Global Quote": {} }),
        );
        let (service, _) = service_with(provider);

        assert!(service.fetch_quote("XXXX").await.is_none());
    }

    #[actix_web::test]
    async fn test_cache_hit_skips_upstream() {
        let provider = Arc::new(MockProvider::default());
        provider.respond(UpstreamRequest::GlobalQuote("IBM".to_string()), ibm_quote());
        let (service, _) = service_with(provider.clone());

        let first = service.fetch_quote("IBM").await;
        let second = service.fetch_quote("ibm").await;

        assert_eq!(first, second);
        assert_eq!(provider.calls().len(), 1);
    }

    #[actix_web::test]
    async fn test_expired_quote_refetched() {
        let provider = Arc::new(MockProvider::default());
        provider.respond(UpstreamRequest::GlobalQuote("IBM".to_string()), ibm_quote());
        let clock = Arc::new(ManualClock::new(10_000));
        let cache = Arc::new(StockCache::with_clock(300, clock.clone()));
        let ttl = CacheConfig {
            quote_ttl_secs: 60,
            ..CacheConfig::default()
        };
        let service = StockService::new(provider.clone(), cache, ttl);

        service.fetch_quote("IBM").await.unwrap();
        clock.advance(59);
        service.fetch_quote("IBM").await.unwrap();
        assert_eq!(provider.calls().len(), 1);

        clock.advance(1);
        service.fetch_quote("IBM").await.unwrap();
        assert_eq!(provider.calls().len(), 2);
    }

    #[actix_web::test]
    async fn test_search_preserves_upstream_order() {
        let provider = Arc::new(MockProvider::default());
        provider.respond(
            UpstreamRequest::SymbolSearch("tesco".to_string()),
            json!({
                "bestMatches": [
                    { "1. symbol": "TSCO.LON", "2. name": "Tesco PLC", "9. matchScore": "0.7273" },
                    { "1. symbol": "TSCDF", "2. name": "Tesco plc", "9. matchScore": "0.7143" },
                    { "1. symbol": "TSCDY", "2. name": "Tesco plc", "9. matchScore": "0.7143" }
                ]
            }),
        );
        let (service, cache) = service_with(provider);

        let response = service.search("tesco").await;
        assert_eq!(response.search_term, "tesco");
        let symbols: Vec<&str> = response.results.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["TSCO.LON", "TSCDF", "TSCDY"]);
        assert_eq!(response.results[0].match_score, Some(0.7273));
        assert!(cache.contains_key("search_tesco"));
    }

    #[actix_web::test]
    async fn test_search_without_matches_is_empty() {
        let provider = Arc::new(MockProvider::default());
        provider.respond(
            UpstreamRequest::SymbolSearch("zzzz".to_string()),
            json!({ "bestMatches": [] }),
        );
        let (service, cache) = service_with(provider);

        let response = service.search("zzzz").await;
        assert!(response.results.is_empty());
        assert!(cache.contains_key("search_zzzz"));
    }

    #[actix_web::test]
    async fn test_search_transport_error_not_cached() {
        let provider = Arc::new(MockProvider::default());
        let (service, cache) = service_with(provider.clone());

        let response = service.search("Apple Inc").await;
        assert_eq!(response, StockSearchResponse::empty("Apple Inc"));
        assert!(cache.is_empty());

        service.search("Apple Inc").await;
        assert_eq!(provider.calls().len(), 2);
    }

    #[actix_web::test]
    async fn test_batch_quotes_truncates_to_five() {
        let provider = Arc::new(MockProvider::default());
        provider.respond(UpstreamRequest::GlobalQuote("IBM".to_string()), ibm_quote());
        let (service, _) = service_with(provider.clone());

        let symbols: Vec<String> = ["IBM", "AAPL", "MSFT", "GOOG", "AMZN", "TSLA", "NVDA"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let result = service.fetch_batch_quotes(&symbols).await;

        assert_eq!(result.len(), 5);
        assert_eq!(provider.calls().len(), 5);
        assert!(result["IBM"].is_some());
        for symbol in ["AAPL", "MSFT", "GOOG", "AMZN"] {
            assert_eq!(result.get(symbol), Some(&None));
        }
        assert!(!result.contains_key("TSLA"));
        assert!(!result.contains_key("NVDA"));
    }

    #[actix_web::test]
    async fn test_batch_quotes_keeps_requested_keys() {
        let provider = Arc::new(MockProvider::default());
        provider.respond(UpstreamRequest::GlobalQuote("IBM".to_string()), ibm_quote());
        let (service, _) = service_with(provider);

        let result = service.fetch_batch_quotes(&["ibm".to_string()]).await;
        assert_eq!(result["ibm"].as_ref().map(|q| q.symbol.as_str()), Some("IBM"));
    }

    #[actix_web::test]
    async fn test_clear_cache() {
        let provider = Arc::new(MockProvider::default());
        provider.respond(UpstreamRequest::GlobalQuote("IBM".to_string()), ibm_quote());
        let (service, cache) = service_with(provider.clone());

        service.fetch_quote("IBM").await;
        service.clear_cache();
        assert!(cache.get("quote_IBM").is_none());

        service.fetch_quote("IBM").await;
        assert_eq!(provider.calls().len(), 2);
    }
}
