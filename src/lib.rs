//! # Prof Test Client
//!
//! 大学职业倾向测试的终端客户端：注册 → 答题 → 查看结果
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 键值存储（对应浏览器 localStorage），只暴露 get / set / remove / clear
//!
//! ### ② 客户端层（Clients）
//! - `clients/` - `AptitudeApi` 描述后端能力，`HttpApiClient` 基于 reqwest 实现
//!
//! ### ③ 业务能力层（Services）
//! - `SessionStore` - 会话标识与缓存结果
//! - `RegistrationForm` - 注册表单校验
//! - `ResultsView` - 结果图表数据与必考科目对照
//!
//! ### ④ 流程层（Workflow）
//! - `RegistrationFlow` / `QuestionnaireFlow` / `ResultsFlow` - 三个页面的状态机
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator::App` - 页面路由循环和终端交互

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{AptitudeApi, HttpApiClient};
pub use config::Config;
pub use error::{ApiError, AppError, AppResult};
pub use infrastructure::{FileStore, KeyValueStore, MemoryStore};
pub use orchestrator::App;
pub use services::SessionStore;
pub use workflow::Route;
