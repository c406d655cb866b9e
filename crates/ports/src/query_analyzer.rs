//! Query Analyzer trait 定义

use serde_json::Value;
use ushop_errors::AppResult;

use crate::{Row, Selector};

/// 分析结果
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// 目标实体名称
    pub target_entity: String,
    /// 目标实体的主键字段 → 值
    pub target_keys: Row,
}

impl AnalysisResult {
    pub fn new(target_entity: impl Into<String>, target_keys: Row) -> Self {
        Self {
            target_entity: target_entity.into(),
            target_keys,
        }
    }

    /// 获取某个主键字段的值
    pub fn target_key(&self, name: &str) -> Option<&Value> {
        self.target_keys.get(name)
    }
}

/// 查询分析器 trait
///
/// 将请求的 selector 解析为其目标实体的主键映射。
pub trait QueryAnalyzer: Send + Sync {
    fn analyze(&self, selector: &Selector) -> AppResult<AnalysisResult>;
}
