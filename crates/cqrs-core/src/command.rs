//! Command trait 定义

use async_trait::async_trait;
use serde::Serialize;
use ushop_errors::AppResult;

use crate::EventContext;

/// Command trait
///
/// 每个 Command 对应一个具名事件，并能从 [`EventContext`] 中解码出来。
pub trait Command: Sized + Send + Sync + 'static {
    /// 事件名称，作为分发表的键
    const NAME: &'static str;

    type Result: Serialize + Send;

    fn from_context(ctx: &EventContext) -> AppResult<Self>;
}

/// Command Handler trait
#[async_trait]
pub trait CommandHandler<C: Command>: Send + Sync {
    async fn handle(&self, command: C) -> AppResult<C::Result>;
}
