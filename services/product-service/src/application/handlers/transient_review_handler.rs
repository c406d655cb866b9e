//! 不持久化的添加评论处理器

use async_trait::async_trait;
use tracing::info;
use ushop_cqrs_core::CommandHandler;
use ushop_errors::AppResult;

use crate::application::commands::AddReviewCommand;
use crate::domain::entities::Review;

/// 只构造评论并作为结果返回，不访问任何存储
#[derive(Debug, Default, Clone, Copy)]
pub struct TransientReviewHandler;

impl TransientReviewHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandHandler<AddReviewCommand> for TransientReviewHandler {
    async fn handle(&self, command: AddReviewCommand) -> AppResult<Review> {
        info!(title = %command.title, rating = command.rating, "Handling AddReview (transient)");

        let review = Review::new(command.title, command.rating, command.text);

        metrics::counter!("reviews_created_total", "mode" => "transient").increment(1);

        Ok(review)
    }
}
