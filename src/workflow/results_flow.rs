//! 结果流程
//!
//! 结果只从本地缓存读取，不会重新提交答案

use tracing::{error, info, warn};

use crate::clients::AptitudeApi;
use crate::error::AppResult;
use crate::services::{ResultsView, SessionStore};
use crate::workflow::{restart, Route};

/// 读取本地数据失败
pub const LOAD_FAILED_MESSAGE: &str = "Произошла ошибка при загрузке данных";

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResultsState {
    #[default]
    Loading,
    Ready(ResultsView),
    /// 没有缓存结果
    Empty,
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResultsEvent {
    Loaded(ResultsView),
    NoResult,
    LoadFailed(String),
    /// 重新读取缓存
    Reload,
}

impl ResultsState {
    pub fn name(&self) -> &'static str {
        match self {
            ResultsState::Loading => "Loading",
            ResultsState::Ready(_) => "Ready",
            ResultsState::Empty => "Empty",
            ResultsState::Error(_) => "Error",
        }
    }

    pub fn transition(self, event: ResultsEvent) -> Self {
        match (self, event) {
            (ResultsState::Loading, ResultsEvent::Loaded(view)) => ResultsState::Ready(view),
            (ResultsState::Loading, ResultsEvent::NoResult) => ResultsState::Empty,
            (ResultsState::Loading, ResultsEvent::LoadFailed(message)) => {
                ResultsState::Error(message)
            }
            (_, ResultsEvent::Reload) => ResultsState::Loading,
            (state, event) => {
                warn!("结果流程: 状态 {} 忽略事件 {:?}", state.name(), event);
                state
            }
        }
    }
}

/// 结果流程驱动
pub struct ResultsFlow<'a> {
    api: &'a dyn AptitudeApi,
    session: &'a SessionStore,
    state: ResultsState,
}

impl<'a> ResultsFlow<'a> {
    pub fn new(api: &'a dyn AptitudeApi, session: &'a SessionStore) -> Self {
        Self {
            api,
            session,
            state: ResultsState::Loading,
        }
    }

    pub fn state(&self) -> &ResultsState {
        &self.state
    }

    fn apply(&mut self, event: ResultsEvent) {
        let current = std::mem::take(&mut self.state);
        self.state = current.transition(event);
    }

    /// 读取缓存结果并生成结果页
    ///
    /// 没有会话标识时返回 `Some(Route::Registration)`。
    /// 必考科目获取失败不影响结果显示，只是不做对照
    pub async fn load(&mut self) -> AppResult<Option<Route>> {
        self.apply(ResultsEvent::Reload);

        let session_id = match self.session.load() {
            Ok(Some(id)) => id,
            Ok(None) => {
                warn!("⚠️ 未找到会话标识，返回注册页");
                return Ok(Some(Route::Registration));
            }
            Err(e) => {
                error!("读取会话失败: {}", e);
                self.apply(ResultsEvent::LoadFailed(LOAD_FAILED_MESSAGE.to_string()));
                return Ok(None);
            }
        };

        let cached = match self.session.load_cached_result() {
            Ok(cached) => cached,
            Err(e) => {
                error!("读取缓存结果失败: {}", e);
                self.apply(ResultsEvent::LoadFailed(LOAD_FAILED_MESSAGE.to_string()));
                return Ok(None);
            }
        };

        let Some(result) = cached.filter(|r| !r.is_empty()) else {
            info!("会话 {} 没有缓存的测试结果", session_id);
            self.apply(ResultsEvent::NoResult);
            return Ok(None);
        };

        let required = match self.api.list_required_exams().await {
            Ok(required) => required,
            Err(e) => {
                warn!("⚠️ 获取必考科目失败，跳过对照: {}", e);
                Vec::new()
            }
        };

        let view = ResultsView::build(&result, &required);
        info!("📊 结果页共 {} 个职业类型", view.bars.len());
        self.apply(ResultsEvent::Loaded(view));
        Ok(None)
    }

    /// 重新测试：清空会话并回到注册页
    pub fn restart(&mut self) -> AppResult<Route> {
        self.state = ResultsState::Loading;
        restart(self.session)
    }
}
