//! telemetry - 可观测性库

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use ushop_config::TelemetryConfig;

pub use metrics_exporter_prometheus::PrometheusHandle;
pub use tracing_subscriber::util::TryInitError;

/// 初始化 tracing
///
/// 全局 subscriber 已安装时返回错误。
pub fn init_tracing(log_level: &str) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

/// 初始化 JSON 格式的 tracing（生产环境）
pub fn init_tracing_json(log_level: &str) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
}

/// 按配置初始化 tracing
pub fn init_from_config(config: &TelemetryConfig) -> Result<(), TryInitError> {
    if config.json {
        init_tracing_json(&config.log_level)?;
    } else {
        init_tracing(&config.log_level)?;
    }
    tracing::debug!(log_level = %config.log_level, json = config.json, "Tracing initialized");
    Ok(())
}

/// 初始化 Prometheus metrics
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}
