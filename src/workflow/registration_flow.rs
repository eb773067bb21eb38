//! 注册流程
//!
//! Editing → Submitting → Success | Failed，Failed 在用户再次编辑时回到 Editing

use tracing::{error, info, warn};

use crate::clients::AptitudeApi;
use crate::error::{AppError, AppResult};
use crate::models::ExamScore;
use crate::services::{RegistrationForm, SessionStore};
use crate::workflow::Route;

/// 注册页状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationState {
    /// 正在填写表单，`error` 为上一次失败的提示
    Editing { error: Option<String> },
    /// 请求进行中，表单不可再次提交
    Submitting,
    /// 已拿到会话标识，跳转到下一页
    Success(Route),
    /// 请求失败
    Failed { message: String },
}

impl Default for RegistrationState {
    fn default() -> Self {
        RegistrationState::Editing { error: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationEvent {
    /// 表单校验通过，开始提交
    Submit,
    /// 请求成功，跳转到指定页面
    Succeeded(Route),
    /// 请求失败
    RequestFailed(String),
    /// 用户重新编辑表单
    Edit,
}

impl RegistrationState {
    pub fn name(&self) -> &'static str {
        match self {
            RegistrationState::Editing { .. } => "Editing",
            RegistrationState::Submitting => "Submitting",
            RegistrationState::Success(_) => "Success",
            RegistrationState::Failed { .. } => "Failed",
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, RegistrationState::Submitting)
    }

    /// 状态转换，不接受的事件保持原状态
    pub fn transition(self, event: RegistrationEvent) -> Self {
        use RegistrationEvent as E;
        use RegistrationState as S;

        match (self, event) {
            (S::Editing { .. }, E::Submit) => S::Submitting,
            // 老用户直接跳转
            (S::Editing { .. } | S::Submitting, E::Succeeded(route)) => S::Success(route),
            (S::Editing { .. }, E::RequestFailed(message)) => S::Editing {
                error: Some(message),
            },
            (S::Submitting, E::RequestFailed(message)) => S::Failed { message },
            (S::Failed { message }, E::Edit) => S::Editing {
                error: Some(message),
            },
            (S::Editing { error }, E::Edit) => S::Editing { error },
            (state, event) => {
                warn!("注册流程: 状态 {} 忽略事件 {:?}", state.name(), event);
                state
            }
        }
    }
}

/// 注册流程驱动
pub struct RegistrationFlow<'a> {
    api: &'a dyn AptitudeApi,
    session: &'a SessionStore,
    state: RegistrationState,
}

impl<'a> RegistrationFlow<'a> {
    pub fn new(api: &'a dyn AptitudeApi, session: &'a SessionStore) -> Self {
        Self {
            api,
            session,
            state: RegistrationState::default(),
        }
    }

    pub fn state(&self) -> &RegistrationState {
        &self.state
    }

    fn apply(&mut self, event: RegistrationEvent) {
        let current = std::mem::take(&mut self.state);
        self.state = current.transition(event);
    }

    /// 进入注册页时检查已保存的会话
    ///
    /// - 服务端已有结果：缓存结果并跳转到结果页
    /// - 服务端没有结果：跳转到答题页
    /// - 服务端不认识该标识（404 / 422）：清除会话，显示表单
    /// - 其他错误：保留会话，显示表单和错误提示
    pub async fn resume(&mut self) -> AppResult<Option<Route>> {
        let Some(session_id) = self.session.load()? else {
            return Ok(None);
        };

        info!("🔁 发现已保存的会话 {}，检查测试进度", session_id);

        match self.api.fetch_applicant(&session_id).await {
            Ok(record) => {
                let route = match record.completed_result() {
                    Some(result) => {
                        self.session.cache_result(&result)?;
                        Route::Results
                    }
                    None => Route::Questionnaire,
                };
                info!("✓ 会话有效，跳转到 {:?}", route);
                self.apply(RegistrationEvent::Succeeded(route));
                Ok(Some(route))
            }
            Err(e) if e.is_unknown_session() => {
                warn!("⚠️ 服务端不认识会话 {}，需要重新注册: {}", session_id, e);
                self.session.clear()?;
                Ok(None)
            }
            Err(e) => {
                error!("检查会话失败: {}", e);
                self.apply(RegistrationEvent::RequestFailed(e.user_message().to_string()));
                Ok(None)
            }
        }
    }

    /// 考试目录，用于填写成绩
    pub async fn exam_catalog(&self) -> AppResult<Vec<ExamScore>> {
        let catalog = self.api.list_exam_catalog().await?;
        info!("✓ 考试目录共 {} 项", catalog.len());
        Ok(catalog)
    }

    /// 校验并提交表单
    ///
    /// # 返回
    /// - `Ok(Some(route))`: 注册成功，会话标识已保存
    /// - `Ok(None)`: 请求失败，提示在 `Failed` 状态中
    /// - `Err(AppError::Validation)`: 校验失败，没有发出任何请求
    pub async fn submit(&mut self, form: &RegistrationForm) -> AppResult<Option<Route>> {
        if matches!(self.state, RegistrationState::Failed { .. }) {
            self.apply(RegistrationEvent::Edit);
        }
        if !matches!(self.state, RegistrationState::Editing { .. }) {
            return Err(AppError::invalid_transition(self.state.name(), "Submit"));
        }

        let applicant = form.to_applicant()?;

        self.apply(RegistrationEvent::Submit);
        info!("📤 提交注册信息: {} {}", applicant.surname, applicant.name);

        match self.api.register_applicant(&applicant).await {
            Ok(session_id) => {
                self.session.save(&session_id)?;
                info!("✓ 注册成功，会话标识 {}", session_id);
                self.apply(RegistrationEvent::Succeeded(Route::Questionnaire));
                Ok(Some(Route::Questionnaire))
            }
            Err(e) => {
                error!("注册失败: {}", e);
                self.apply(RegistrationEvent::RequestFailed(e.user_message().to_string()));
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_then_success() {
        let state = RegistrationState::default()
            .transition(RegistrationEvent::Submit)
            .transition(RegistrationEvent::Succeeded(Route::Questionnaire));
        assert_eq!(state, RegistrationState::Success(Route::Questionnaire));
    }

    #[test]
    fn test_second_submit_is_ignored() {
        let state = RegistrationState::default().transition(RegistrationEvent::Submit);
        let state = state.transition(RegistrationEvent::Submit);
        assert!(state.is_submitting());
    }

    #[test]
    fn test_failure_returns_to_editing_with_message() {
        let state = RegistrationState::default()
            .transition(RegistrationEvent::Submit)
            .transition(RegistrationEvent::RequestFailed("Ошибка".to_string()));
        assert_eq!(
            state,
            RegistrationState::Failed {
                message: "Ошибка".to_string()
            }
        );

        let state = state.transition(RegistrationEvent::Edit);
        assert_eq!(
            state,
            RegistrationState::Editing {
                error: Some("Ошибка".to_string())
            }
        );
    }

    #[test]
    fn test_success_is_terminal() {
        let state = RegistrationState::Success(Route::Results).transition(RegistrationEvent::Submit);
        assert_eq!(state, RegistrationState::Success(Route::Results));
    }
}
