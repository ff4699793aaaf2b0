//! 股票信息后端服务
//!
//! 代理 Alpha Vantage 的公司概况、实时行情和代码搜索接口，
//! 统一返回结构并在内存中短时缓存，减少上游调用

mod config;     // 配置
mod handlers;   // HTTP 请求处理器
mod models;     // 数据模型定义
mod services;   // 业务逻辑服务

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::services::cache::{StockCache, DEFAULT_TTL_SECS};
use crate::services::stock::AlphaVantageClient;
use crate::services::stock_service::StockService;

/// 定期清理过期缓存条目
fn spawn_cache_sweeper(cache: Arc<StockCache>, interval_secs: u64) {
    actix_web::rt::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            ticker.tick().await;
            let removed = cache.purge_expired();
            if removed > 0 {
                log::debug!("清理过期缓存 {} 条，剩余 {} 条", removed, cache.len());
            }
        }
    });
}

/// 应用程序入口
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 初始化日志系统，默认日志级别为 info
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::load();

    let provider = AlphaVantageClient::new(&config.api)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let cache = Arc::new(StockCache::new(DEFAULT_TTL_SECS));

    if config.cache.sweep_interval_secs > 0 {
        spawn_cache_sweeper(cache.clone(), config.cache.sweep_interval_secs);
    }

    let service = web::Data::new(StockService::new(
        Arc::new(provider),
        cache,
        config.cache.clone(),
    ));

    let bind_addr = config.bind_addr();
    log::info!("启动股票信息服务，监听 {}", bind_addr);

    // 创建并启动 HTTP 服务器
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())  // 添加请求日志中间件
            .app_data(service.clone())
            .configure(handlers::config)  // 配置路由
    });

    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(bind_addr)?.run().await
}
