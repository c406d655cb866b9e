//! ports - 抽象 trait 层
//!
//! 定义查询分析器与持久化服务的抽象接口

mod persistence;
mod query_analyzer;
mod selector;

pub use persistence::*;
pub use query_analyzer::*;
pub use selector::*;
