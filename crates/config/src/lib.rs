//! ushop-config - 配置加载库

use std::fmt;

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),
}

/// AddReview 事件的处理策略
///
/// 两种策略互斥：一个部署只注册其中之一。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewHandlerMode {
    /// 解析所属商品并写入存储
    #[default]
    Persisting,
    /// 只构造评论并返回，不写入存储
    Transient,
}

impl ReviewHandlerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Persisting => "persisting",
            Self::Transient => "transient",
        }
    }
}

impl fmt::Display for ReviewHandlerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 是否输出 JSON 格式日志
    #[serde(default)]
    pub json: bool,
    /// 是否安装 Prometheus 记录器
    #[serde(default)]
    pub metrics: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
            metrics: false,
        }
    }
}

/// 持久化配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersistenceConfig {
    /// 允许写入的集合；为空时不做限制
    #[serde(default)]
    pub collections: Vec<String>,
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    #[serde(default)]
    pub review_handler: ReviewHandlerMode,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

fn default_app_env() -> String {
    "development".to_string()
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment(config_dir))
    }

    /// 构建默认的配置源：default.toml → {APP_ENV}.toml → USHOP_ 环境变量
    pub fn figment(config_dir: &str) -> Figment {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| default_app_env());

        Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("USHOP_").split("__"))
    }

    /// 从自定义 Figment 提取配置
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        Ok(figment.extract()?)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}
