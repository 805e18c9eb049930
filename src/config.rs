//! Application configuration module / 应用配置模块
//!
//! Manages application configuration loaded from config.json
//! Creates default config file on first run / 首次运行时创建默认配置文件

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

use crate::drivers::s3::S3Options;

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration / 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// Object store configuration / 对象存储配置
    #[serde(default)]
    pub store: StoreConfig,
    /// Token issuer configuration / 令牌签发配置
    #[serde(default)]
    pub issuer: IssuerConfig,
    /// Default context fields, overridden by request query parameters / 默认请求上下文
    #[serde(default)]
    pub context: Map<String, Value>,
}

/// Server configuration / 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address / 服务器监听地址
    pub host: String,
    /// Server port / 服务器端口
    pub port: u16,
}

/// Object store configuration / 对象存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Driver type: "s3" or "memory" / 驱动类型
    pub driver: String,
    /// Endpoint override, empty means AWS regional endpoint / 端点地址
    pub endpoint: String,
    /// Force path-style addressing (MinIO) / 强制路径风格
    pub force_path_style: bool,
    /// Maximum in-flight store transfers / 最大并发传输数
    pub max_connections: usize,
}

/// Token issuer configuration / 令牌签发配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssuerConfig {
    /// Endpoint used when a request carries no issuer_url / 默认签发端点
    #[serde(default)]
    pub endpoint: String,
    /// Bearer token sent to the issuer / 签发服务的访问令牌
    #[serde(default)]
    pub token: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8180,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            driver: "s3".to_string(),
            endpoint: String::new(),
            force_path_style: false,
            max_connections: 5000,
        }
    }
}

impl StoreConfig {
    pub fn s3_options(&self) -> S3Options {
        S3Options {
            endpoint: self.endpoint.clone(),
            force_path_style: self.force_path_style,
            max_connections: self.max_connections,
        }
    }
}

impl AppConfig {
    /// Get the server bind address / 获取服务器绑定地址
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Get the config file path / 获取配置文件路径
fn get_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from file, or create default if not exists / 加载配置文件，不存在则创建默认配置
pub fn load_config() -> Result<AppConfig, String> {
    let config_path = get_config_path();

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config = parse_config(&content)?;

        tracing::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    } else {
        let config = AppConfig::default();
        save_config(&config)?;
        tracing::info!("Created default configuration at {:?}", config_path);
        Ok(config)
    }
}

fn parse_config(content: &str) -> Result<AppConfig, String> {
    serde_json::from_str(content).map_err(|e| format!("Failed to parse config file: {}", e))
}

/// Save configuration to file / 保存配置到文件
pub fn save_config(config: &AppConfig) -> Result<(), String> {
    let config_path = get_config_path();

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    std::fs::write(&config_path, content)
        .map_err(|e| format!("Failed to write config file: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = parse_config(r#"{"store": {"driver": "memory", "max_connections": 8}}"#).unwrap();
        assert_eq!(config.get_bind_address(), "0.0.0.0:8180");
        assert_eq!(config.store.driver, "memory");
        assert_eq!(config.store.max_connections, 8);
        assert!(config.issuer.endpoint.is_empty());
        assert!(config.context.is_empty());
    }

    #[test]
    fn test_store_section_defaults() {
        let config = parse_config(r#"{"store": {"endpoint": "http://localhost:9000"}}"#).unwrap();
        assert_eq!(config.store.driver, "s3");
        assert_eq!(config.store.max_connections, 5000);
        assert_eq!(config.store.s3_options().endpoint, "http://localhost:9000");
    }

    #[test]
    fn test_context_defaults() {
        let config = parse_config(r#"{"context": {"region": "us-west-2", "no_location": true}}"#).unwrap();
        assert_eq!(config.context.get("region"), Some(&Value::from("us-west-2")));
        assert_eq!(config.context.get("no_location"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_invalid_config() {
        assert!(parse_config("{not json").is_err());
    }
}
