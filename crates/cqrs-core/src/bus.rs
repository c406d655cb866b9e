//! Event Dispatcher
//!
//! 以事件名为键的显式处理器注册表

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use ushop_errors::{AppError, AppResult};

use crate::{Command, CommandHandler, EventContext, EventMiddleware};

#[async_trait]
trait ErasedHandler: Send + Sync {
    async fn call(&self, ctx: &mut EventContext) -> AppResult<()>;
}

struct TypedHandler<C, H> {
    handler: H,
    _command: PhantomData<fn() -> C>,
}

#[async_trait]
impl<C, H> ErasedHandler for TypedHandler<C, H>
where
    C: Command,
    H: CommandHandler<C>,
{
    async fn call(&self, ctx: &mut EventContext) -> AppResult<()> {
        let command = C::from_context(ctx)?;
        let result = self.handler.handle(command).await?;
        ctx.set_result(&result)
    }
}

/// 事件分发器
///
/// 每个事件名最多注册一个处理器。
#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<&'static str, Box<dyn ErasedHandler>>,
    middlewares: Vec<Arc<dyn EventMiddleware>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加中间件，按添加顺序执行
    pub fn with_middleware(mut self, middleware: Arc<dyn EventMiddleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// 为 `C::NAME` 注册处理器
    ///
    /// 同一事件重复注册会返回 `Conflict`，已有的处理器保持不变。
    pub fn register<C, H>(&mut self, handler: H) -> AppResult<&mut Self>
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        if self.handlers.contains_key(C::NAME) {
            return Err(AppError::conflict(format!(
                "A handler for event {} is already registered",
                C::NAME
            )));
        }

        self.handlers.insert(
            C::NAME,
            Box::new(TypedHandler {
                handler,
                _command: PhantomData,
            }),
        );
        tracing::debug!(event = C::NAME, "Registered event handler");
        Ok(self)
    }

    pub fn is_registered(&self, event: &str) -> bool {
        self.handlers.contains_key(event)
    }

    pub fn registered_events(&self) -> Vec<&'static str> {
        let mut events: Vec<_> = self.handlers.keys().copied().collect();
        events.sort_unstable();
        events
    }

    /// 分发事件，返回已处理的上下文
    pub async fn dispatch(&self, mut ctx: EventContext) -> AppResult<EventContext> {
        let handler = self.handlers.get(ctx.event()).ok_or_else(|| {
            AppError::not_found(format!("No handler registered for event {}", ctx.event()))
        })?;

        for middleware in &self.middlewares {
            middleware.before(&ctx).await?;
        }

        let outcome = handler.call(&mut ctx).await;

        for middleware in &self.middlewares {
            middleware.after(&ctx, &outcome).await;
        }

        outcome.map(|_| ctx)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde::Serialize;

    use super::*;
    use crate::LoggingMiddleware;

    struct Shout {
        word: String,
    }

    impl Command for Shout {
        const NAME: &'static str = "Shout";
        type Result = ShoutResult;

        fn from_context(ctx: &EventContext) -> AppResult<Self> {
            Ok(Self {
                word: ctx.param("word")?,
            })
        }
    }

    #[derive(Debug, Serialize, serde::Deserialize, PartialEq)]
    struct ShoutResult {
        loud: String,
    }

    struct ShoutHandler;

    #[async_trait]
    impl CommandHandler<Shout> for ShoutHandler {
        async fn handle(&self, command: Shout) -> AppResult<ShoutResult> {
            Ok(ShoutResult {
                loud: command.word.to_uppercase(),
            })
        }
    }

    struct FailingHandler;

    #[async_trait]
    impl CommandHandler<Shout> for FailingHandler {
        async fn handle(&self, _command: Shout) -> AppResult<ShoutResult> {
            Err(AppError::database("disk full"))
        }
    }

    #[derive(Default)]
    struct RecordingMiddleware {
        calls: Mutex<Vec<String>>,
        reject: bool,
    }

    #[async_trait]
    impl EventMiddleware for RecordingMiddleware {
        async fn before(&self, ctx: &EventContext) -> AppResult<()> {
            self.calls.lock().unwrap().push(format!("before:{}", ctx.event()));
            if self.reject {
                return Err(AppError::validation("rejected"));
            }
            Ok(())
        }

        async fn after(&self, ctx: &EventContext, result: &AppResult<()>) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("after:{}:{}", ctx.event(), result.is_ok()));
        }
    }

    #[tokio::test]
    async fn test_dispatch_runs_registered_handler() {
        let mut dispatcher = EventDispatcher::new().with_middleware(Arc::new(LoggingMiddleware));
        dispatcher.register::<Shout, _>(ShoutHandler).unwrap();

        let ctx = dispatcher
            .dispatch(EventContext::new("Shout").with_param("word", "hi"))
            .await
            .unwrap();

        assert!(ctx.is_completed());
        assert_eq!(
            ctx.result_as::<ShoutResult>().unwrap(),
            ShoutResult {
                loud: "HI".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_unknown_event_is_not_found() {
        let dispatcher = EventDispatcher::new();
        let err = dispatcher
            .dispatch(EventContext::new("Whisper"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_rejected() {
        let mut dispatcher = EventDispatcher::new();
        dispatcher.register::<Shout, _>(ShoutHandler).unwrap();

        let err = dispatcher.register::<Shout, _>(FailingHandler).err();
        assert!(matches!(err, Some(AppError::Conflict(_))));

        // 原处理器仍然生效
        let ctx = dispatcher
            .dispatch(EventContext::new("Shout").with_param("word", "ok"))
            .await
            .unwrap();
        assert!(ctx.is_completed());
        assert_eq!(dispatcher.registered_events(), vec!["Shout"]);
    }

    #[tokio::test]
    async fn test_decode_failure_skips_handler() {
        let mut dispatcher = EventDispatcher::new();
        dispatcher.register::<Shout, _>(FailingHandler).unwrap();

        // 缺少参数时在解码阶段失败，而不是处理器返回的 Database 错误
        let err = dispatcher
            .dispatch(EventContext::new("Shout"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_middleware_observes_outcome() {
        let recorder = Arc::new(RecordingMiddleware::default());
        let mut dispatcher = EventDispatcher::new().with_middleware(recorder.clone());
        dispatcher.register::<Shout, _>(FailingHandler).unwrap();

        let err = dispatcher
            .dispatch(EventContext::new("Shout").with_param("word", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));

        let calls = recorder.calls.lock().unwrap().clone();
        assert_eq!(calls, vec!["before:Shout", "after:Shout:false"]);
    }

    #[tokio::test]
    async fn test_rejecting_middleware_aborts_dispatch() {
        let recorder = Arc::new(RecordingMiddleware {
            reject: true,
            ..Default::default()
        });
        let mut dispatcher = EventDispatcher::new().with_middleware(recorder.clone());
        dispatcher.register::<Shout, _>(ShoutHandler).unwrap();

        let err = dispatcher
            .dispatch(EventContext::new("Shout").with_param("word", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let calls = recorder.calls.lock().unwrap().clone();
        assert_eq!(calls, vec!["before:Shout"]);
    }
}
