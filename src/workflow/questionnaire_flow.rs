//! 答题流程
//!
//! Loading → Answering → Submitting → Completed | Failed
//!
//! 全部题目作答完毕的那一刻自动进入 Submitting，与当前停留在第几题无关

use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::clients::AptitudeApi;
use crate::error::AppResult;
use crate::models::{AnswerSelection, Question, ScoringResult, SessionId, UserAnswer};
use crate::services::SessionStore;
use crate::utils::logging::truncate_text;
use crate::workflow::{restart, Route};

/// 加载题目失败
pub const LOAD_FAILED_MESSAGE: &str = "Произошла ошибка при загрузке вопросов";
/// 题目列表为空
pub const NO_QUESTIONS_MESSAGE: &str = "Нет доступных вопросов";
/// 提交答案失败
pub const SUBMIT_FAILED_MESSAGE: &str = "Произошла ошибка при отправке результатов";

/// 一次答题：题目、当前题号、已选答案
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub questions: Vec<Question>,
    /// 当前题目的下标（从 0 开始）
    pub current: usize,
    pub selection: AnswerSelection,
}

impl Attempt {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            current: 0,
            selection: AnswerSelection::new(),
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn answered(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| self.selection.is_answered(&q.id))
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.selection.covers(&self.questions)
    }

    fn is_last(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }
}

/// 答题页状态
#[derive(Debug, Clone, Default, PartialEq)]
pub enum QuestionnaireState {
    #[default]
    Loading,
    Answering(Attempt),
    Submitting(Attempt),
    Completed(ScoringResult),
    /// `attempt` 为空表示题目没有加载成功；否则保留已选答案以便重试
    Failed {
        attempt: Option<Attempt>,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuestionnaireEvent {
    Loaded(Vec<Question>),
    LoadFailed(String),
    /// 为当前题目选择答案
    Select(String),
    /// 延迟后的自动跳题，`from` 为选择答案时所在的题号
    Advance { from: usize },
    GoTo(usize),
    Next,
    Previous,
    Submitted(ScoringResult),
    SubmitFailed(String),
    /// 用户手动重试提交
    Retry,
}

/// 状态转换产生的副作用，由驱动执行
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// 延迟后发送 `Advance { from }`
    ScheduleAdvance { from: usize },
    /// 提交答案
    Submit(Vec<UserAnswer>),
}

impl QuestionnaireState {
    pub fn name(&self) -> &'static str {
        match self {
            QuestionnaireState::Loading => "Loading",
            QuestionnaireState::Answering(_) => "Answering",
            QuestionnaireState::Submitting(_) => "Submitting",
            QuestionnaireState::Completed(_) => "Completed",
            QuestionnaireState::Failed { .. } => "Failed",
        }
    }

    /// 状态转换，不接受的事件保持原状态
    pub fn transition(self, event: QuestionnaireEvent) -> (Self, Option<Effect>) {
        use QuestionnaireEvent as E;
        use QuestionnaireState as S;

        match (self, event) {
            (S::Loading, E::Loaded(questions)) => {
                if questions.is_empty() {
                    (
                        S::Failed {
                            attempt: None,
                            message: NO_QUESTIONS_MESSAGE.to_string(),
                        },
                        None,
                    )
                } else {
                    (S::Answering(Attempt::new(questions)), None)
                }
            }
            (S::Loading, E::LoadFailed(message)) => (
                S::Failed {
                    attempt: None,
                    message,
                },
                None,
            ),
            (S::Answering(attempt), E::Select(answer_id)) => select(attempt, answer_id),
            (S::Answering(mut attempt), E::Advance { from }) => {
                if attempt.current == from && !attempt.is_last() {
                    attempt.current += 1;
                }
                (S::Answering(attempt), None)
            }
            (S::Answering(mut attempt), E::GoTo(index)) => {
                if index < attempt.total() {
                    attempt.current = index;
                }
                (S::Answering(attempt), None)
            }
            (S::Answering(mut attempt), E::Next) => {
                if !attempt.is_last() {
                    attempt.current += 1;
                }
                (S::Answering(attempt), None)
            }
            (S::Answering(mut attempt), E::Previous) => {
                attempt.current = attempt.current.saturating_sub(1);
                (S::Answering(attempt), None)
            }
            (S::Submitting(_), E::Submitted(result)) => (S::Completed(result), None),
            (S::Submitting(attempt), E::SubmitFailed(message)) => (
                S::Failed {
                    attempt: Some(attempt),
                    message,
                },
                None,
            ),
            (
                S::Failed {
                    attempt: Some(attempt),
                    message,
                },
                E::Retry,
            ) => {
                if attempt.is_complete() {
                    let answers = attempt.selection.to_user_answers(&attempt.questions);
                    (S::Submitting(attempt), Some(Effect::Submit(answers)))
                } else {
                    (
                        S::Failed {
                            attempt: Some(attempt),
                            message,
                        },
                        None,
                    )
                }
            }
            (state, event) => {
                debug!("答题流程: 状态 {} 忽略事件 {:?}", state.name(), event);
                (state, None)
            }
        }
    }
}

/// 记录当前题目的选择，决定跳题或提交
fn select(mut attempt: Attempt, answer_id: String) -> (QuestionnaireState, Option<Effect>) {
    let Some(question) = attempt.current_question() else {
        return (QuestionnaireState::Answering(attempt), None);
    };
    if !question.has_answer(&answer_id) {
        warn!("答案 {} 不属于题目 {}", answer_id, question.id);
        return (QuestionnaireState::Answering(attempt), None);
    }

    let question_id = question.id.clone();
    attempt.selection.select(question_id, answer_id);

    if attempt.is_complete() {
        let answers = attempt.selection.to_user_answers(&attempt.questions);
        return (
            QuestionnaireState::Submitting(attempt),
            Some(Effect::Submit(answers)),
        );
    }

    if attempt.is_last() {
        (QuestionnaireState::Answering(attempt), None)
    } else {
        let from = attempt.current;
        (
            QuestionnaireState::Answering(attempt),
            Some(Effect::ScheduleAdvance { from }),
        )
    }
}

/// 答题流程驱动
pub struct QuestionnaireFlow<'a> {
    api: &'a dyn AptitudeApi,
    session: &'a SessionStore,
    advance_delay: Duration,
    session_id: Option<SessionId>,
    state: QuestionnaireState,
}

impl<'a> QuestionnaireFlow<'a> {
    pub fn new(api: &'a dyn AptitudeApi, session: &'a SessionStore, advance_delay: Duration) -> Self {
        Self {
            api,
            session,
            advance_delay,
            session_id: None,
            state: QuestionnaireState::Loading,
        }
    }

    pub fn state(&self) -> &QuestionnaireState {
        &self.state
    }

    /// 进入答题页：没有会话标识时直接回到注册页，不发任何请求
    pub async fn start(&mut self) -> AppResult<Option<Route>> {
        let Some(session_id) = self.session.load()? else {
            warn!("⚠️ 未找到会话标识，返回注册页");
            return Ok(Some(Route::Registration));
        };
        self.session_id = Some(session_id);
        self.state = QuestionnaireState::Loading;

        info!("📋 正在加载题目...");
        let event = match self.api.list_questions().await {
            Ok(questions) => {
                info!("✓ 共加载 {} 道题", questions.len());
                QuestionnaireEvent::Loaded(questions)
            }
            Err(e) => {
                error!("加载题目失败: {}", e);
                QuestionnaireEvent::LoadFailed(LOAD_FAILED_MESSAGE.to_string())
            }
        };
        self.dispatch(event).await
    }

    /// 处理用户事件并执行产生的副作用
    ///
    /// 返回 `Some(route)` 表示需要离开答题页
    pub async fn dispatch(&mut self, event: QuestionnaireEvent) -> AppResult<Option<Route>> {
        let current = std::mem::take(&mut self.state);
        let (next, effect) = current.transition(event);
        self.state = next;

        match effect {
            None => Ok(None),
            Some(Effect::ScheduleAdvance { from }) => {
                tokio::time::sleep(self.advance_delay).await;
                let current = std::mem::take(&mut self.state);
                self.state = current.transition(QuestionnaireEvent::Advance { from }).0;
                Ok(None)
            }
            Some(Effect::Submit(answers)) => self.submit(answers).await,
        }
    }

    async fn submit(&mut self, answers: Vec<UserAnswer>) -> AppResult<Option<Route>> {
        let Some(session_id) = self.session_id.clone() else {
            return Ok(Some(Route::Registration));
        };

        info!("📤 提交 {} 道题的答案", answers.len());
        for answer in &answers {
            debug!("  {} → {:?}", truncate_text(&answer.question_id, 12), answer.answer_ids);
        }

        match self.api.submit_answers(&session_id, &answers).await {
            Ok(result) => {
                self.session.cache_result(&result)?;
                info!("✓ 提交成功，共 {} 个职业类型", result.faculty_type.len());
                let current = std::mem::take(&mut self.state);
                self.state = current.transition(QuestionnaireEvent::Submitted(result)).0;
                Ok(Some(Route::Results))
            }
            Err(e) => {
                error!("提交答案失败: {}", e);
                let current = std::mem::take(&mut self.state);
                self.state = current
                    .transition(QuestionnaireEvent::SubmitFailed(SUBMIT_FAILED_MESSAGE.to_string()))
                    .0;
                Ok(None)
            }
        }
    }

    /// 放弃本次答题并清空会话
    pub fn restart(&mut self) -> AppResult<Route> {
        self.state = QuestionnaireState::Loading;
        self.session_id = None;
        restart(self.session)
    }
}
