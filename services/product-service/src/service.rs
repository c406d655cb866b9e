//! 产品服务
//!
//! 按配置选择 AddReview 的处理策略并注册到分发器

use std::sync::Arc;

use tracing::info;
use ushop_config::{AppConfig, ReviewHandlerMode};
use ushop_cqrs_core::{Command, CommandHandler, EventContext, EventDispatcher, LoggingMiddleware};
use ushop_errors::AppResult;
use ushop_ports::{PersistenceService, QueryAnalyzer, Selector};

use crate::application::commands::AddReviewCommand;
use crate::application::handlers::{PersistingReviewHandler, TransientReviewHandler};
use crate::domain::entities::Review;

pub struct ProductService {
    dispatcher: EventDispatcher,
    mode: ReviewHandlerMode,
}

impl ProductService {
    pub fn from_config(
        config: &AppConfig,
        db: Arc<dyn PersistenceService>,
        analyzer: Arc<dyn QueryAnalyzer>,
    ) -> AppResult<Self> {
        Self::new(config.review_handler, db, analyzer)
    }

    /// 以指定策略创建服务
    ///
    /// `Transient` 策略不会使用 `db` 和 `analyzer`。
    pub fn new(
        mode: ReviewHandlerMode,
        db: Arc<dyn PersistenceService>,
        analyzer: Arc<dyn QueryAnalyzer>,
    ) -> AppResult<Self> {
        match mode {
            ReviewHandlerMode::Persisting => {
                Self::with_handler(mode, PersistingReviewHandler::new(db, analyzer))
            }
            ReviewHandlerMode::Transient => Self::transient(),
        }
    }

    /// 不需要任何存储的服务
    pub fn transient() -> AppResult<Self> {
        Self::with_handler(ReviewHandlerMode::Transient, TransientReviewHandler::new())
    }

    fn with_handler<H>(mode: ReviewHandlerMode, handler: H) -> AppResult<Self>
    where
        H: CommandHandler<AddReviewCommand> + 'static,
    {
        let mut dispatcher = EventDispatcher::new().with_middleware(Arc::new(LoggingMiddleware));
        dispatcher.register::<AddReviewCommand, _>(handler)?;

        info!(
            mode = %mode,
            events = ?dispatcher.registered_events(),
            "Product service handlers registered"
        );

        Ok(Self { dispatcher, mode })
    }

    pub fn mode(&self) -> ReviewHandlerMode {
        self.mode
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// 分发一次 AddReview 事件并返回结果评论
    pub async fn add_review(
        &self,
        target: Option<Selector>,
        title: impl Into<String>,
        rating: i32,
        text: impl Into<String>,
    ) -> AppResult<Review> {
        let mut ctx = EventContext::new(AddReviewCommand::NAME)
            .with_param("title", title.into())
            .with_param("rating", rating)
            .with_param("text", text.into());

        if let Some(target) = target {
            ctx = ctx.with_target(target);
        }

        let ctx = self.dispatcher.dispatch(ctx).await?;
        ctx.result_as()
    }
}
