//! 事件上下文

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use ushop_errors::{AppError, AppResult};
use ushop_ports::{Row, Selector};

/// 一次事件调用的上下文
///
/// 携带事件名、可选的导航上下文和参数；处理完成后保存结果。
#[derive(Debug, Clone, PartialEq)]
pub struct EventContext {
    event: String,
    target: Option<Selector>,
    params: Row,
    result: Option<Value>,
    completed: bool,
}

impl EventContext {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            target: None,
            params: Row::new(),
            result: None,
            completed: false,
        }
    }

    /// 设置事件绑定的目标实体
    pub fn with_target(mut self, selector: Selector) -> Self {
        self.target = Some(selector);
        self
    }

    /// 设置参数
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn target(&self) -> Option<&Selector> {
        self.target.as_ref()
    }

    /// 读取一个必填参数
    pub fn param<T: DeserializeOwned>(&self, name: &str) -> AppResult<T> {
        let value = self.params.get(name).ok_or_else(|| {
            AppError::validation(format!(
                "Missing parameter '{}' for event {}",
                name, self.event
            ))
        })?;

        T::deserialize(value).map_err(|e| {
            AppError::validation(format!(
                "Invalid parameter '{}' for event {}: {}",
                name, self.event, e
            ))
        })
    }

    /// 设置结果，同时标记为已完成
    pub fn set_result<T: Serialize>(&mut self, value: &T) -> AppResult<()> {
        self.result = Some(serde_json::to_value(value)?);
        self.completed = true;
        Ok(())
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// 将结果反序列化为指定类型
    pub fn result_as<T: DeserializeOwned>(&self) -> AppResult<T> {
        let value = self.result.as_ref().ok_or_else(|| {
            AppError::internal(format!("Event {} completed without a result", self.event))
        })?;
        Ok(T::deserialize(value)?)
    }
}
