//! ushop-adapter-memory - 内存持久化适配器
//!
//! 用于本地开发与测试的 PersistenceService 实现

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use ushop_errors::{AppError, AppResult};
use ushop_ports::{Insert, PersistenceService, QueryResult, Row};
use uuid::Uuid;

/// 主键字段名
pub const KEY_FIELD: &str = "ID";

/// 内存持久化服务
///
/// 插入时为缺少 `ID` 的记录分配 UUID v7。
#[derive(Clone, Default)]
pub struct InMemoryPersistence {
    collections: Arc<RwLock<HashMap<String, Vec<Row>>>>,
    allowed: Option<Arc<HashSet<String>>>,
    inserts: Arc<AtomicUsize>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// 只允许写入指定集合
    pub fn with_collections<I, S>(collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: Some(Arc::new(collections.into_iter().map(Into::into).collect())),
            ..Self::default()
        }
    }

    /// 获取某个集合的所有记录（用于测试）
    pub async fn rows(&self, collection: &str) -> Vec<Row> {
        self.collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// 已执行的插入次数
    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    fn check_collection(&self, collection: &str) -> AppResult<()> {
        match &self.allowed {
            Some(allowed) if !allowed.contains(collection) => Err(AppError::not_found(format!(
                "Unknown collection: {}",
                collection
            ))),
            _ => Ok(()),
        }
    }
}

fn assign_key(mut row: Row) -> Row {
    let missing = matches!(row.get(KEY_FIELD), None | Some(Value::Null));
    if missing {
        row.insert(
            KEY_FIELD.to_string(),
            Value::String(Uuid::now_v7().to_string()),
        );
    }
    row
}

#[async_trait]
impl PersistenceService for InMemoryPersistence {
    async fn run(&self, insert: Insert) -> AppResult<QueryResult> {
        self.check_collection(&insert.into)?;
        self.inserts.fetch_add(1, Ordering::SeqCst);

        let stored: Vec<Row> = insert.entries.into_iter().map(assign_key).collect();

        let mut collections = self.collections.write().await;
        let rows = collections.entry(insert.into.clone()).or_default();

        let mut keys: HashSet<String> = rows
            .iter()
            .filter_map(|existing| existing.get(KEY_FIELD))
            .map(Value::to_string)
            .collect();

        for row in &stored {
            let key = row.get(KEY_FIELD).map(Value::to_string).unwrap_or_default();
            if !keys.insert(key.clone()) {
                return Err(AppError::conflict(format!(
                    "Duplicate key in {}: {}",
                    insert.into, key
                )));
            }
        }

        rows.extend(stored.iter().cloned());

        tracing::debug!(
            collection = %insert.into,
            count = stored.len(),
            "Rows inserted"
        );

        Ok(QueryResult::new(stored))
    }
}
