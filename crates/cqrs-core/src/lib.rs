//! ushop-cqrs-core - CQRS 核心库
//!
//! Command trait、EventContext、按事件名分发的 EventDispatcher、Middleware

mod bus;
mod command;
mod context;
mod middleware;

pub use bus::*;
pub use command::*;
pub use context::*;
pub use middleware::*;
