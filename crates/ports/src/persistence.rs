//! Persistence Service trait 定义

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use ushop_errors::{AppError, AppResult};

/// 无类型的记录
pub type Row = Map<String, Value>;

/// 插入语句
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    /// 目标集合
    pub into: String,
    /// 待插入的记录
    pub entries: Vec<Row>,
}

impl Insert {
    /// 创建指向某个集合的插入语句
    pub fn into(collection: impl Into<String>) -> Self {
        Self {
            into: collection.into(),
            entries: Vec::new(),
        }
    }

    /// 追加一条记录
    ///
    /// 记录必须序列化为 JSON 对象。
    pub fn entry<T: Serialize>(mut self, entry: &T) -> AppResult<Self> {
        match serde_json::to_value(entry)? {
            Value::Object(row) => {
                self.entries.push(row);
                Ok(self)
            }
            other => Err(AppError::validation(format!(
                "Insert entry for {} must be an object, got {}",
                self.into, other
            ))),
        }
    }
}

/// 执行结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    rows: Vec<Row>,
}

impl QueryResult {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// 取出唯一的一行并反序列化
    pub fn single<T: DeserializeOwned>(self) -> AppResult<T> {
        if self.rows.len() != 1 {
            return Err(AppError::database(format!(
                "Expected exactly one row, got {}",
                self.rows.len()
            )));
        }
        let row = self.rows.into_iter().next().unwrap_or_default();
        Ok(serde_json::from_value(Value::Object(row))?)
    }
}

/// 持久化服务 trait
#[async_trait]
pub trait PersistenceService: Send + Sync {
    /// 执行插入，返回存储后的记录（含分配的标识）
    async fn run(&self, insert: Insert) -> AppResult<QueryResult>;
}
