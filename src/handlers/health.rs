use actix_web::{web, HttpResponse, Result};
use serde_json::json;

use crate::models::{ApiResponse, HealthResponse, SERVICE_VERSION};
use crate::services::stock_service::StockService;

/// 服务信息
pub async fn index() -> Result<HttpResponse> {
    let info = json!({
        "version": SERVICE_VERSION,
        "endpoints": {
            "stock_info": "/api/stock/{symbol}",
            "stock_quote": "/api/quote/{symbol}",
            "search_stocks": "/api/search/{keywords}",
            "batch_quotes": "/api/batch/quotes?symbols=AAPL,MSFT",
            "health": "/health"
        }
    });
    let response = ApiResponse::with_message(info, "Stock Information API is running");
    Ok(HttpResponse::Ok().json(response))
}

pub async fn health_check() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(HealthResponse::healthy()))
}

/// 清空缓存（调试用）
pub async fn clear_cache(service: web::Data<StockService>) -> Result<HttpResponse> {
    service.clear_cache();
    let response = ApiResponse::with_message((), "Cache cleared");
    Ok(HttpResponse::Ok().json(response))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/health", web::get().to(health_check))
        .route("/cache/clear", web::get().to(clear_cache));
}
