//! Middleware 定义

use async_trait::async_trait;
use ushop_errors::AppResult;

use crate::EventContext;

/// Event Middleware trait
///
/// `before` 返回错误时中止分发，处理器不会被调用。
#[async_trait]
pub trait EventMiddleware: Send + Sync {
    async fn before(&self, ctx: &EventContext) -> AppResult<()>;
    async fn after(&self, ctx: &EventContext, result: &AppResult<()>);
}

/// 日志中间件
pub struct LoggingMiddleware;

#[async_trait]
impl EventMiddleware for LoggingMiddleware {
    async fn before(&self, ctx: &EventContext) -> AppResult<()> {
        tracing::debug!(event = ctx.event(), target = ?ctx.target(), "Dispatching event");
        Ok(())
    }

    async fn after(&self, ctx: &EventContext, result: &AppResult<()>) {
        match result {
            Ok(_) => tracing::debug!(
                event = ctx.event(),
                completed = ctx.is_completed(),
                "Event handled successfully"
            ),
            Err(e) => tracing::error!(event = ctx.event(), kind = e.kind(), "Event failed: {}", e),
        }
    }
}
