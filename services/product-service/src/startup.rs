//! 服务启动
//!
//! 加载配置、初始化遥测，并用内存存储和导航路径分析器装配服务

use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use ushop_adapter_memory::InMemoryPersistence;
use ushop_adapter_odata::NavigationPathAnalyzer;
use ushop_config::{AppConfig, ConfigError};
use ushop_errors::AppError;
use ushop_telemetry::{PrometheusHandle, TryInitError};

use crate::ProductService;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    App(#[from] AppError),

    #[error("Failed to initialize tracing: {0}")]
    Telemetry(#[from] TryInitError),
}

/// 启动产物
pub struct Started {
    pub config: AppConfig,
    pub service: ProductService,
    pub store: InMemoryPersistence,
    /// 配置开启 metrics 时的 Prometheus 句柄
    pub metrics: Option<PrometheusHandle>,
}

/// 根据配置创建默认的内存存储
pub fn build_store(config: &AppConfig) -> InMemoryPersistence {
    if config.persistence.collections.is_empty() {
        InMemoryPersistence::new()
    } else {
        InMemoryPersistence::with_collections(config.persistence.collections.iter().cloned())
    }
}

/// 用已加载的配置装配服务（不初始化全局 tracing）
pub fn assemble(config: AppConfig) -> Result<Started, StartupError> {
    let store = build_store(&config);
    let service = ProductService::from_config(
        &config,
        Arc::new(store.clone()),
        Arc::new(NavigationPathAnalyzer::new()),
    )?;

    Ok(Started {
        config,
        service,
        store,
        metrics: None,
    })
}

/// 从配置目录启动
///
/// 全局 tracing subscriber 只能安装一次，重复调用返回 `StartupError::Telemetry`。
pub fn start(config_dir: &str) -> Result<Started, StartupError> {
    let config = AppConfig::load(config_dir)?;

    ushop_telemetry::init_from_config(&config.telemetry)?;

    let metrics = if config.telemetry.metrics {
        let handle = ushop_telemetry::init_metrics().map_err(|e| {
            AppError::internal(format!("Failed to install Prometheus recorder: {}", e))
        })?;
        Some(handle)
    } else {
        None
    };

    info!(
        app_name = %config.app_name,
        app_env = %config.app_env,
        review_handler = %config.review_handler,
        "Starting product service"
    );

    let started = assemble(config)?;
    Ok(Started { metrics, ..started })
}
