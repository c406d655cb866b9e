//! 评论实体

use serde::{Deserialize, Serialize};
use ushop_common::{ProductId, ReviewId};

/// 评论存储的集合名
pub const REVIEWS_ENTITY: &str = "ushop.Reviews";

/// 评论
///
/// 标量字段（title、rating、text）总是一次性构造；`id` 只在写入存储后存在。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ReviewId>,
    #[serde(rename = "product_ID", default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    pub title: String,
    pub rating: i32,
    pub text: String,
}

impl Review {
    /// 创建未关联商品的评论
    pub fn new(title: impl Into<String>, rating: i32, text: impl Into<String>) -> Self {
        Self {
            id: None,
            product_id: None,
            title: title.into(),
            rating,
            text: text.into(),
        }
    }

    /// 创建属于某个商品的评论
    pub fn for_product(
        product_id: ProductId,
        title: impl Into<String>,
        rating: i32,
        text: impl Into<String>,
    ) -> Self {
        Self {
            product_id: Some(product_id),
            ..Self::new(title, rating, text)
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
