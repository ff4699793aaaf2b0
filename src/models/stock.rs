//! 股票数据模型
//!
//! 定义对外输出的标准化股票数据结构，字段缺失时不输出

use serde::{Deserialize, Serialize};

/// 公司概况
///
/// 上游返回的均为预格式化字符串（如 "1.23B"），不做数值转换
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct StockOverview {
    /// 股票代码
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    // 财务指标
    /// 总市值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<String>,
    /// 市盈率
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pe_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peg_ratio: Option<String>,
    /// 股息率
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dividend_yield: Option<String>,
    /// 每股收益
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eps: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beta: Option<String>,

    // 价格指标
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    /// 52周最高
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_52_high: Option<String>,
    /// 52周最低
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_52_low: Option<String>,
    /// 50日均线
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moving_avg_50: Option<String>,
    /// 200日均线
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moving_avg_200: Option<String>,
}

/// 实时行情
///
/// 数值字段解析失败时直接缺省，不会填充 0
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct StockQuote {
    /// 股票代码
    pub symbol: String,
    /// 当前价格
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// 涨跌额
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    /// 涨跌幅，保留上游原始字符串（如 "-0.97%"）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<String>,
    /// 成交量
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
    /// 最近交易日
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_trading_day: Option<String>,
    /// 昨收价
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
}

/// 代码搜索的单条匹配结果
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct StockSearchResult {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    /// 证券类型（Equity、ETF 等）
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub security_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_open: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_close: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// 匹配度 0~1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f64>,
}

/// 代码搜索响应
///
/// results 保持上游返回顺序
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct StockSearchResponse {
    /// 原始搜索关键字
    pub search_term: String,
    pub results: Vec<StockSearchResult>,
}

impl StockSearchResponse {
    /// 空结果
    pub fn empty(search_term: &str) -> Self {
        Self {
            search_term: search_term.to_string(),
            results: Vec::new(),
        }
    }
}

/// 批量行情查询参数
///
/// symbols 为逗号分隔的代码列表，如 `?symbols=AAPL,MSFT`
#[derive(Debug, Deserialize)]
pub struct BatchQuoteQuery {
    #[serde(default)]
    pub symbols: String,
}

impl BatchQuoteQuery {
    /// 拆分代码列表，忽略空白项
    pub fn symbol_list(&self) -> Vec<String> {
        self.symbols
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect()
    }
}
