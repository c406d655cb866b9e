//! Selector 定义

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// 请求的导航上下文
///
/// 对处理器而言是不透明的引用，例如 `ProductService.Products(ID='P100')`，
/// 只能交给 [`crate::QueryAnalyzer`] 解析。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{_0}")]
#[serde(transparent)]
pub struct Selector(String);

impl Selector {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Selector {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}
