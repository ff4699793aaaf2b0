//! 上游数据标准化
//!
//! 将 Alpha Vantage 三种不同结构的返回（公司概况、实时行情、搜索匹配）
//! 转换为统一的数据模型。输入格式异常时只丢弃对应字段，从不报错。

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::models::{StockOverview, StockQuote, StockSearchResult};

/// 浮点数清洗：只保留数字、小数点和负号
static NON_FLOAT_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9.\-]").unwrap());
/// 整数清洗：只保留数字
static NON_DIGIT_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9]").unwrap());

/// 标量转字符串，null 和嵌套结构视为缺失
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// 取出可用的字符串字段：null、空串、"None" 都视为缺失
fn present_str(raw: &Map<String, Value>, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(scalar_to_string)
        .filter(|s| !s.is_empty() && s != "None")
}

/// 取出原始字符串字段，仅 null/缺失视为缺失
fn raw_str(raw: &Map<String, Value>, key: &str) -> Option<String> {
    raw.get(key).and_then(scalar_to_string)
}

/// 数值清洗前的预检查
fn numeric_source(value: Option<&Value>) -> Option<String> {
    value
        .and_then(scalar_to_string)
        .filter(|s| !s.is_empty() && s != "None")
}

/// 解析浮点数字段
///
/// 去掉数字、`.`、`-` 以外的所有字符后再解析，如 "$1,234.56" -> 1234.56，
/// "12.3%" -> 12.3。无法解析时返回 None，不会用 0 代替。
pub fn parse_float(value: Option<&Value>) -> Option<f64> {
    let text = numeric_source(value)?;
    NON_FLOAT_CHARS.replace_all(&text, "").parse::<f64>().ok()
}

/// 解析整数字段（成交量）
///
/// 只保留数字字符，因此小数点和负号也会被去掉
pub fn parse_int(value: Option<&Value>) -> Option<u64> {
    let text = numeric_source(value)?;
    NON_DIGIT_CHARS.replace_all(&text, "").parse::<u64>().ok()
}

/// 标准化公司概况（OVERVIEW）
///
/// 所有字段保持字符串形式。Symbol 缺失时返回 None。
pub fn normalize_overview(raw: &Map<String, Value>) -> Option<StockOverview> {
    let field = |key: &str| present_str(raw, key);

    Some(StockOverview {
        symbol: field("Symbol")?,
        name: field("Name"),
        sector: field("Sector"),
        industry: field("Industry"),
        description: field("Description"),
        exchange: field("Exchange"),
        currency: field("Currency"),
        country: field("Country"),
        market_cap: field("MarketCapitalization"),
        pe_ratio: field("PERatio"),
        peg_ratio: field("PEGRatio"),
        dividend_yield: field("DividendYield"),
        eps: field("EPS"),
        beta: field("Beta"),
        price: field("Price"),
        week_52_high: field("52WeekHigh"),
        week_52_low: field("52WeekLow"),
        moving_avg_50: field("50DayMovingAverage"),
        moving_avg_200: field("200DayMovingAverage"),
    })
}

/// 标准化实时行情（GLOBAL_QUOTE 中的 "Global Quote" 对象）
///
/// 字符串字段只在 null 时丢弃，空串原样保留；symbol 缺失时为空串。
pub fn normalize_quote(raw: &Map<String, Value>) -> StockQuote {
    let num = |key: &str| parse_float(raw.get(key));

    StockQuote {
        symbol: raw_str(raw, "01. symbol").unwrap_or_default(),
        price: num("05. price"),
        change: num("09. change"),
        change_percent: raw_str(raw, "10. change percent"),
        volume: parse_int(raw.get("06. volume")),
        latest_trading_day: raw_str(raw, "07. latest trading day"),
        previous_close: num("08. previous close"),
        open: num("02. open"),
        high: num("03. high"),
        low: num("04. low"),
    }
}

/// 标准化搜索匹配项（SYMBOL_SEARCH 中 bestMatches 的元素）
pub fn normalize_search_match(raw: &Map<String, Value>) -> StockSearchResult {
    let field = |key: &str| present_str(raw, key);

    StockSearchResult {
        symbol: field("1. symbol").unwrap_or_default(),
        name: field("2. name").unwrap_or_default(),
        security_type: field("3. type"),
        region: field("4. region"),
        market_open: field("5. marketOpen"),
        market_close: field("6. marketClose"),
        timezone: field("7. timezone"),
        currency: field("8. currency"),
        match_score: parse_float(raw.get("9. matchScore")),
    }
}

/// 脱敏错误信息，避免 API Key 出现在日志或响应中
pub fn sanitize_error_message(message: &str) -> String {
    if message.to_lowercase().contains("apikey") {
        "API configuration error".to_string()
    } else {
        message.to_string()
    }
}
