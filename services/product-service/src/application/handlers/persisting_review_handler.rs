//! 持久化的添加评论处理器

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};
use ushop_common::ProductId;
use ushop_cqrs_core::CommandHandler;
use ushop_errors::{AppError, AppResult};
use ushop_ports::{Insert, PersistenceService, QueryAnalyzer, Selector};

use crate::application::commands::AddReviewCommand;
use crate::domain::entities::Review;
use crate::domain::entities::review::REVIEWS_ENTITY;

/// 商品主键字段名
pub const PRODUCT_KEY: &str = "ID";

/// 解析所属商品、写入存储，并返回存储后的评论
pub struct PersistingReviewHandler {
    db: Arc<dyn PersistenceService>,
    analyzer: Arc<dyn QueryAnalyzer>,
}

impl PersistingReviewHandler {
    pub fn new(db: Arc<dyn PersistenceService>, analyzer: Arc<dyn QueryAnalyzer>) -> Self {
        Self { db, analyzer }
    }

    fn resolve_product_id(&self, target: Option<&Selector>) -> AppResult<ProductId> {
        let selector = target
            .ok_or_else(|| AppError::validation("addReview must be bound to a product"))?;

        let analysis = self.analyzer.analyze(selector)?;

        match analysis.target_key(PRODUCT_KEY) {
            Some(Value::String(id)) => Ok(ProductId::new(id.clone())),
            Some(Value::Number(id)) => Ok(ProductId::new(id.to_string())),
            other => {
                warn!(
                    selector = %selector,
                    key = ?other,
                    "Selector does not address a product key"
                );
                Err(AppError::validation(format!(
                    "Selector {} does not resolve a product {}",
                    selector, PRODUCT_KEY
                )))
            }
        }
    }
}

#[async_trait]
impl CommandHandler<AddReviewCommand> for PersistingReviewHandler {
    async fn handle(&self, command: AddReviewCommand) -> AppResult<Review> {
        let product_id = self.resolve_product_id(command.target.as_ref())?;

        info!(product_id = %product_id, rating = command.rating, "Handling AddReview");

        let review = Review::for_product(product_id, command.title, command.rating, command.text);

        let insert = Insert::into(REVIEWS_ENTITY).entry(&review)?;
        let saved = self.db.run(insert).await?;
        let new_review: Review = saved.single()?;

        metrics::counter!("reviews_created_total", "mode" => "persisting").increment(1);

        info!(
            review_id = ?new_review.id,
            product_id = ?new_review.product_id,
            "Review created"
        );

        Ok(new_review)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use ushop_common::ReviewId;
    use ushop_ports::{AnalysisResult, QueryResult, Row};

    use super::*;
    use crate::application::handlers::mocks::{MockAnalyzer, MockDb};

    fn keys(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    fn command(target: Option<&str>) -> AddReviewCommand {
        AddReviewCommand {
            target: target.map(Selector::new),
            title: "Great".to_string(),
            rating: 5,
            text: "Loved it".to_string(),
        }
    }

    fn analyzer_returning(result: AppResult<AnalysisResult>) -> MockAnalyzer {
        let mut analyzer = MockAnalyzer::new();
        let mut result = Some(result);
        analyzer.expect_analyze().times(1).returning(move |_| {
            result
                .take()
                .unwrap_or_else(|| Err(AppError::internal("called twice")))
        });
        analyzer
    }

    #[tokio::test]
    async fn test_inserts_exactly_once_and_returns_stored_review() {
        let assigned = ReviewId::new();

        let analyzer = analyzer_returning(Ok(AnalysisResult::new(
            "ProductService.Products",
            keys(json!({ "ID": "P100" })),
        )));

        let mut db = MockDb::new();
        db.expect_run()
            .times(1)
            .withf(|insert| {
                insert.into == REVIEWS_ENTITY
                    && insert.entries.len() == 1
                    && insert.entries[0]
                        == keys(json!({
                            "product_ID": "P100",
                            "title": "Great",
                            "rating": 5,
                            "text": "Loved it",
                        }))
            })
            .returning(move |insert| {
                let mut row = insert.entries[0].clone();
                row.insert("ID".to_string(), json!(assigned.to_string()));
                Ok(QueryResult::new(vec![row]))
            });

        let handler = PersistingReviewHandler::new(Arc::new(db), Arc::new(analyzer));
        let review = handler
            .handle(command(Some("ProductService.Products(ID='P100')")))
            .await
            .unwrap();

        assert_eq!(review.id, Some(assigned));
        assert_eq!(review.product_id, Some(ProductId::new("P100")));
        assert_eq!(review.title, "Great");
        assert_eq!(review.rating, 5);
        assert_eq!(review.text, "Loved it");
    }

    #[tokio::test]
    async fn test_numeric_product_key_is_accepted() {
        let analyzer = analyzer_returning(Ok(AnalysisResult::new(
            "Products",
            keys(json!({ "ID": 42 })),
        )));

        let mut db = MockDb::new();
        db.expect_run().times(1).returning(|insert| {
            let mut row = insert.entries[0].clone();
            row.insert("ID".to_string(), json!(ReviewId::new().to_string()));
            Ok(QueryResult::new(vec![row]))
        });

        let handler = PersistingReviewHandler::new(Arc::new(db), Arc::new(analyzer));
        let review = handler.handle(command(Some("Products(ID=42)"))).await.unwrap();

        assert_eq!(review.product_id, Some(ProductId::new("42")));
    }

    #[tokio::test]
    async fn test_analyzer_failure_skips_insert() {
        let analyzer = analyzer_returning(Err(AppError::validation("Unresolvable selector")));

        let mut db = MockDb::new();
        db.expect_run().never();

        let handler = PersistingReviewHandler::new(Arc::new(db), Arc::new(analyzer));
        let err = handler
            .handle(command(Some("Products(")))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_missing_product_key_skips_insert() {
        let analyzer = analyzer_returning(Ok(AnalysisResult::new(
            "Products",
            keys(json!({ "code": "P100" })),
        )));

        let mut db = MockDb::new();
        db.expect_run().never();

        let handler = PersistingReviewHandler::new(Arc::new(db), Arc::new(analyzer));
        let err = handler
            .handle(command(Some("Products(code='P100')")))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unbound_request_is_rejected() {
        let mut analyzer = MockAnalyzer::new();
        analyzer.expect_analyze().never();
        let mut db = MockDb::new();
        db.expect_run().never();

        let handler = PersistingReviewHandler::new(Arc::new(db), Arc::new(analyzer));
        let err = handler.handle(command(None)).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_insert_failure_propagates() {
        let analyzer = analyzer_returning(Ok(AnalysisResult::new(
            "Products",
            keys(json!({ "ID": "P100" })),
        )));

        let mut db = MockDb::new();
        db.expect_run()
            .times(1)
            .returning(|_| Err(AppError::database("constraint violation")));

        let handler = PersistingReviewHandler::new(Arc::new(db), Arc::new(analyzer));
        let err = handler
            .handle(command(Some("Products(ID='P100')")))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Database(ref m) if m.contains("constraint")));
    }

    #[tokio::test]
    async fn test_empty_result_is_database_error() {
        let analyzer = analyzer_returning(Ok(AnalysisResult::new(
            "Products",
            keys(json!({ "ID": "P100" })),
        )));

        let mut db = MockDb::new();
        db.expect_run()
            .times(1)
            .returning(|_| Ok(QueryResult::default()));

        let handler = PersistingReviewHandler::new(Arc::new(db), Arc::new(analyzer));
        let err = handler
            .handle(command(Some("Products(ID='P100')")))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Database(_)));
    }
}
