//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置，API Key 可由环境变量覆盖

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// 覆盖 API Key 的环境变量名
pub const API_KEY_ENV: &str = "ALPHA_VANTAGE_KEY";

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
}

/// 上游数据源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Alpha Vantage API Key（为空时读取环境变量）
    #[serde(default)]
    pub api_key: String,
    /// 上游接口地址
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// 缓存配置
///
/// 各类数据的过期时间可分别设置，默认统一为 300 秒
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl")]
    pub overview_ttl_secs: u64,
    #[serde(default = "default_ttl")]
    pub quote_ttl_secs: u64,
    #[serde(default = "default_ttl")]
    pub search_ttl_secs: u64,
    /// 过期条目清理周期（秒），0 表示不启用
    #[serde(default)]
    pub sweep_interval_secs: u64,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// 上游配置
    #[serde(default)]
    pub api: ApiConfig,
    /// 缓存配置
    #[serde(default)]
    pub cache: CacheConfig,
}

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }
fn default_base_url() -> String { "https://www.alphavantage.co/query".to_string() }
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_ttl() -> u64 { 300 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            overview_ttl_secs: default_ttl(),
            quote_ttl_secs: default_ttl(),
            search_ttl_secs: default_ttl(),
            sweep_interval_secs: 0,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            api: ApiConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl ApiConfig {
    /// 请求超时
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// 连接超时
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// 确定最终使用的 API Key
    ///
    /// 优先级：环境变量 > 配置文件 > "demo"
    fn resolve_api_key(&mut self, from_env: Option<String>) {
        if let Some(key) = from_env.filter(|k| !k.trim().is_empty()) {
            self.api_key = key;
        }
        if self.api_key.trim().is_empty() {
            log::warn!("未设置 {} 环境变量，使用 demo API Key", API_KEY_ENV);
            self.api_key = "demo".to_string();
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置，优先从文件，失败则使用默认值
    pub fn load() -> Self {
        let mut config = Self::load_file();
        config.api.resolve_api_key(env::var(API_KEY_ENV).ok());
        config
    }

    fn load_file() -> Self {
        let config_paths = ["config.json", "config/config.json"];

        for path in config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        log::info!("从 {} 加载配置成功", path);
                        return config;
                    }
                    Err(e) => {
                        log::warn!("加载配置文件 {} 失败: {}", path, e);
                    }
                }
            }
        }

        log::info!("使用默认配置");
        Self::default()
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
