//! 股票接口处理器
//!
//! ## API 列表
//! - GET /api/stock/{symbol} - 公司概况
//! - GET /api/quote/{symbol} - 实时行情
//! - GET /api/search/{keywords} - 代码搜索
//! - GET /api/batch/quotes?symbols=AAPL,MSFT - 批量行情（最多 5 个）

use actix_web::{web, HttpResponse, Result};
use std::collections::HashMap;

use crate::models::{ApiResponse, BatchQuoteQuery, StockOverview, StockQuote};
use crate::services::stock_service::{StockService, MAX_BATCH_SYMBOLS};

/// 获取公司概况
///
/// GET /api/stock/{symbol}
pub async fn get_stock_overview(
    service: web::Data<StockService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let symbol = path.into_inner();

    match service.fetch_overview(&symbol).await {
        Some(overview) => Ok(HttpResponse::Ok().json(ApiResponse::success(overview))),
        None => {
            let response = ApiResponse::<StockOverview>::error(format!(
                "Stock information not found for symbol: {}",
                symbol
            ));
            Ok(HttpResponse::NotFound().json(response))
        }
    }
}

/// 获取实时行情
///
/// GET /api/quote/{symbol}
pub async fn get_stock_quote(
    service: web::Data<StockService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let symbol = path.into_inner();

    match service.fetch_quote(&symbol).await {
        Some(quote) => Ok(HttpResponse::Ok().json(ApiResponse::success(quote))),
        None => {
            let response = ApiResponse::<StockQuote>::error(format!(
                "Stock quote not found for symbol: {}",
                symbol
            ));
            Ok(HttpResponse::NotFound().json(response))
        }
    }
}

/// 按关键字搜索
///
/// GET /api/search/{keywords}
pub async fn search_stocks(
    service: web::Data<StockService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let keywords = path.into_inner();
    let response = service.search(&keywords).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

/// 批量获取行情
///
/// GET /api/batch/quotes?symbols=AAPL,MSFT
pub async fn get_batch_quotes(
    service: web::Data<StockService>,
    query: web::Query<BatchQuoteQuery>,
) -> Result<HttpResponse> {
    let symbols = query.symbol_list();

    if symbols.is_empty() {
        let response = ApiResponse::<HashMap<String, Option<StockQuote>>>::error(
            "At least one symbol is required".to_string(),
        );
        return Ok(HttpResponse::BadRequest().json(response));
    }

    if symbols.len() > MAX_BATCH_SYMBOLS {
        let response = ApiResponse::<HashMap<String, Option<StockQuote>>>::error(format!(
            "Maximum {} symbols allowed per request",
            MAX_BATCH_SYMBOLS
        ));
        return Ok(HttpResponse::BadRequest().json(response));
    }

    let quotes = service.fetch_batch_quotes(&symbols).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(quotes)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/stock/{symbol}", web::get().to(get_stock_overview))
        .route("/quote/{symbol}", web::get().to(get_stock_quote))
        .route("/search/{keywords}", web::get().to(search_stocks))
        .route("/batch/quotes", web::get().to(get_batch_quotes));
}
