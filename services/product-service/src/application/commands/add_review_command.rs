//! 添加评论命令

use ushop_cqrs_core::{Command, EventContext};
use ushop_errors::AppResult;
use ushop_ports::Selector;

use crate::domain::entities::Review;

/// 添加评论命令
#[derive(Debug, Clone, PartialEq)]
pub struct AddReviewCommand {
    /// 绑定的商品（导航上下文）
    pub target: Option<Selector>,
    pub title: String,
    pub rating: i32,
    pub text: String,
}

impl Command for AddReviewCommand {
    const NAME: &'static str = "addReview";
    type Result = Review;

    fn from_context(ctx: &EventContext) -> AppResult<Self> {
        Ok(Self {
            target: ctx.target().cloned(),
            title: ctx.param("title")?,
            rating: ctx.param("rating")?,
            text: ctx.param("text")?,
        })
    }
}
