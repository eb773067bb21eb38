//! 编排层（Orchestration Layer）
//!
//! 持有资源（API 客户端、会话存储、终端），在页面之间调度：
//!
//! ```text
//! app::App (页面路由循环)
//!     ↓
//! workflow (注册 / 答题 / 结果 三个状态机)
//!     ↓
//! services (会话存储、表单校验、结果图表)
//!     ↓
//! clients + infrastructure (HTTP API、键值存储)
//! ```
//!
//! `render` 只负责把状态变成文本，`console` 只负责读写终端

pub mod app;
pub mod console;
pub mod render;

pub use app::{App, Command};
pub use console::{Console, StdConsole};
