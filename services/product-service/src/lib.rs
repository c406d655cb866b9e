//! Product Service Library
//!
//! 模块化架构：
//! - `domain`: Review 实体
//! - `application`: AddReview 命令与两种处理策略
//! - `service`: 按配置组装分发器
//! - `startup`: 加载配置、初始化遥测、装配默认适配器

pub mod application;
pub mod domain;
pub mod service;
pub mod startup;

pub use service::ProductService;
