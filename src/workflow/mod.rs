//! 流程层（Workflow）
//!
//! 三个页面各对应一个显式状态机：
//!
//! ```text
//! registration_flow ──(写入会话标识)──▶ questionnaire_flow
//!        ▲                                     │
//!        │                         (提交答案，缓存结果)
//!   (restart 清空会话)                          ▼
//!        └────────────────────────────── results_flow
//! ```
//!
//! 状态转换都是纯函数，网络请求和存储读写由各流程的驱动方法执行

pub mod questionnaire_flow;
pub mod registration_flow;
pub mod results_flow;

pub use questionnaire_flow::{
    Attempt, Effect, QuestionnaireEvent, QuestionnaireFlow, QuestionnaireState,
};
pub use registration_flow::{RegistrationEvent, RegistrationFlow, RegistrationState};
pub use results_flow::{ResultsEvent, ResultsFlow, ResultsState};

use crate::error::AppResult;
use crate::services::SessionStore;

/// 页面路由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Registration,
    Questionnaire,
    Results,
}

/// 重新开始：清空会话标识与缓存结果，回到注册页
///
/// 任何页面、任何状态下都可以调用
pub fn restart(session: &SessionStore) -> AppResult<Route> {
    session.clear()?;
    Ok(Route::Registration)
}
