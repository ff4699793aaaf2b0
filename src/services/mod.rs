//! 业务逻辑服务模块
//!
//! 封装数据获取、标准化和缓存逻辑

pub mod cache;          // 内存缓存
pub mod stock;          // 上游数据源与标准化
pub mod stock_service;  // 股票数据服务
