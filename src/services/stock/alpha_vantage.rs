//! Alpha Vantage 接口实现
//!
//! 对接 https://www.alphavantage.co/query，提供公司概况、实时行情和代码搜索。
//! 每次请求只发一次，不重试，超时按网络错误处理。

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::ApiConfig;

/// 上游请求类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamRequest {
    /// 公司概况，参数为已大写的股票代码
    Overview(String),
    /// 实时行情，参数为已大写的股票代码
    GlobalQuote(String),
    /// 代码搜索，参数为原始关键字
    SymbolSearch(String),
}

impl UpstreamRequest {
    /// 上游 function 参数
    pub fn function(&self) -> &'static str {
        match self {
            UpstreamRequest::Overview(_) => "OVERVIEW",
            UpstreamRequest::GlobalQuote(_) => "GLOBAL_QUOTE",
            UpstreamRequest::SymbolSearch(_) => "SYMBOL_SEARCH",
        }
    }

    /// 除 apikey 外的查询参数
    pub fn params(&self) -> Vec<(&'static str, &str)> {
        match self {
            UpstreamRequest::Overview(symbol) | UpstreamRequest::GlobalQuote(symbol) => {
                vec![("function", self.function()), ("symbol", symbol.as_str())]
            }
            UpstreamRequest::SymbolSearch(keywords) => {
                vec![("function", self.function()), ("keywords", keywords.as_str())]
            }
        }
    }
}

/// 行情数据源
///
/// 返回上游原始 JSON，传输失败、超时或非 2xx 状态均返回错误
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch(&self, request: &UpstreamRequest) -> Result<Value>;
}

/// Alpha Vantage 客户端
///
/// 内部复用同一个 reqwest::Client（连接池）
pub struct AlphaVantageClient {
    /// HTTP 客户端
    client: Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageClient {
    /// 根据配置创建客户端
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| anyhow!("创建 HTTP 客户端失败: {}", e))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

/// 检查上游的限流或错误提示
///
/// Alpha Vantage 在限流时仍返回 200，只在 JSON 中带 Note / Information 字段
fn log_provider_notice(request: &UpstreamRequest, data: &Value) {
    for key in ["Note", "Information", "Error Message"] {
        if let Some(message) = data.get(key).and_then(Value::as_str) {
            log::warn!("Alpha Vantage {} 返回提示 [{}]: {}", request.function(), key, message);
        }
    }
}

#[async_trait]
impl MarketDataProvider for AlphaVantageClient {
    async fn fetch(&self, request: &UpstreamRequest) -> Result<Value> {
        let mut params = request.params();
        params.push(("apikey", self.api_key.as_str()));

        log::debug!("请求 Alpha Vantage: {:?}", request);

        // 错误信息去掉 URL，避免 apikey 进入日志
        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| anyhow!("请求 Alpha Vantage 失败: {}", e.without_url()))?;

        if !response.status().is_success() {
            return Err(anyhow!("Alpha Vantage 返回错误状态: {}", response.status()));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| anyhow!("解析 Alpha Vantage 响应失败: {}", e.without_url()))?;

        log_provider_notice(request, &data);
        Ok(data)
    }
}
