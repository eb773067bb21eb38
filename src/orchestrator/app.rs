//! 应用主循环 - 编排层
//!
//! 持有 API 客户端、会话存储和终端，按页面路由依次运行三个流程。
//! 每个页面返回下一个路由；返回 `None` 表示用户退出

use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{error, info};

use crate::clients::{AptitudeApi, HttpApiClient};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::FileStore;
use crate::models::ExamScore;
use crate::orchestrator::console::{Console, StdConsole, EXIT_COMMAND};
use crate::orchestrator::render::{
    render_progress, render_question, render_question_list, render_results,
};
use crate::services::validation::field_messages;
use crate::services::{RegistrationForm, SessionStore};
use crate::utils::logging::{log_shutdown, log_startup};
use crate::workflow::{
    QuestionnaireEvent, QuestionnaireFlow, QuestionnaireState, RegistrationFlow,
    RegistrationState, ResultsFlow, ResultsState, Route,
};

/// 读取一行，用户退出时让当前函数返回 `Ok(None)`
macro_rules! ask_or_exit {
    ($console:expr, $prompt:expr) => {
        match $console.ask($prompt).await? {
            Some(line) => line,
            None => return Ok(None),
        }
    };
}

/// 答题页命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 选择第 N 个答案（从 1 开始）
    Answer(usize),
    Previous,
    Next,
    /// 跳到第 N 题（从 1 开始）
    GoTo(usize),
    List,
    Retry,
    Restart,
    Unknown,
}

impl Command {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if let Ok(n) = input.parse::<usize>() {
            return Command::Answer(n);
        }
        match input.to_lowercase().as_str() {
            "<" => Command::Previous,
            ">" => Command::Next,
            "с" => Command::List,
            "п" => Command::Retry,
            "з" => Command::Restart,
            other => match other.strip_prefix("к") {
                Some(rest) => rest
                    .trim()
                    .parse::<usize>()
                    .map(Command::GoTo)
                    .unwrap_or(Command::Unknown),
                None => Command::Unknown,
            },
        }
    }
}

const QUESTIONNAIRE_HELP: &str = "Номер ответа - выбрать, < и > - предыдущий / следующий вопрос, \
к N - перейти к вопросу N, с - список вопросов, з - начать заново";

/// 应用主结构
pub struct App<R, W> {
    config: Config,
    api: Arc<dyn AptitudeApi>,
    session: SessionStore,
    console: Console<R, W>,
}

impl App<tokio::io::BufReader<tokio::io::Stdin>, tokio::io::Stdout> {
    /// 使用 HTTP 客户端、会话文件和标准输入输出初始化应用
    pub fn initialize(config: Config) -> AppResult<Self> {
        log_startup(&config);

        let store = FileStore::open(&config.session_file)?;
        let api = HttpApiClient::new(&config);

        Ok(Self::new(
            config,
            Arc::new(api),
            SessionStore::new(Arc::new(store)),
            StdConsole::stdio(),
        ))
    }
}

impl<R, W> App<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(
        config: Config,
        api: Arc<dyn AptitudeApi>,
        session: SessionStore,
        console: Console<R, W>,
    ) -> Self {
        Self {
            config,
            api,
            session,
            console,
        }
    }

    pub fn console(&self) -> &Console<R, W> {
        &self.console
    }

    /// 运行应用主逻辑，直到用户退出
    pub async fn run(&mut self) -> AppResult<()> {
        self.console
            .say(&format!(
                "Тест профориентации. Введите «{}», чтобы выйти.",
                EXIT_COMMAND
            ))
            .await?;

        let mut route = Route::Registration;
        loop {
            info!("➡️ 进入页面 {:?}", route);
            let next = match route {
                Route::Registration => self.run_registration().await?,
                Route::Questionnaire => self.run_questionnaire().await?,
                Route::Results => self.run_results().await?,
            };
            match next {
                Some(next) => route = next,
                None => break,
            }
        }

        log_shutdown();
        Ok(())
    }

    // ========== 注册页 ==========

    async fn run_registration(&mut self) -> AppResult<Option<Route>> {
        let console = &mut self.console;
        let mut flow = RegistrationFlow::new(self.api.as_ref(), &self.session);

        if let Some(route) = flow.resume().await? {
            return Ok(Some(route));
        }

        console.say("\n=== Регистрация ===").await?;
        if let RegistrationState::Editing {
            error: Some(message),
        } = flow.state()
        {
            console.say(&format!("⚠ {}", message)).await?;
        }

        let catalog = loop {
            match flow.exam_catalog().await {
                Ok(catalog) => break catalog,
                Err(e) => {
                    error!("加载考试目录失败: {}", e);
                    console
                        .say("Не удалось загрузить список экзаменов.")
                        .await?;
                    ask_or_exit!(console, "Нажмите Enter, чтобы повторить");
                }
            }
        };

        loop {
            let Some(form) = read_form(console, &catalog).await? else {
                return Ok(None);
            };

            match flow.submit(&form).await {
                Ok(Some(route)) => {
                    console.say("Регистрация прошла успешно.").await?;
                    return Ok(Some(route));
                }
                Ok(None) => {
                    if let RegistrationState::Failed { message } = flow.state() {
                        console.say(&format!("⚠ {}", message)).await?;
                    }
                }
                Err(AppError::Validation(errors)) => {
                    console.say("Исправьте ошибки в форме:").await?;
                    for (label, message) in field_messages(&errors) {
                        console.say(&format!("  {}: {}", label, message)).await?;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    // ========== 答题页 ==========

    async fn run_questionnaire(&mut self) -> AppResult<Option<Route>> {
        let console = &mut self.console;
        let mut flow =
            QuestionnaireFlow::new(self.api.as_ref(), &self.session, self.config.advance_delay());

        if let Some(route) = flow.start().await? {
            return Ok(Some(route));
        }

        console.say(QUESTIONNAIRE_HELP).await?;

        loop {
            // 先根据当前状态生成事件，释放对状态的借用后再分发
            let event = match flow.state() {
                QuestionnaireState::Answering(attempt) => {
                    console.say(&render_question(attempt)).await?;
                    let input = ask_or_exit!(console, "Ваш выбор");
                    match Command::parse(&input) {
                        Command::Answer(n) => {
                            let answer_id = attempt
                                .current_question()
                                .and_then(|q| q.answers.get(n.wrapping_sub(1)))
                                .map(|a| a.id.clone());
                            match answer_id {
                                Some(id) => QuestionnaireEvent::Select(id),
                                None => {
                                    console.say("Нет такого варианта ответа.").await?;
                                    continue;
                                }
                            }
                        }
                        Command::Previous => QuestionnaireEvent::Previous,
                        Command::Next => QuestionnaireEvent::Next,
                        Command::GoTo(n) if (1..=attempt.total()).contains(&n) => {
                            QuestionnaireEvent::GoTo(n - 1)
                        }
                        Command::GoTo(_) => {
                            console.say("Нет такого вопроса.").await?;
                            continue;
                        }
                        Command::List => {
                            console.say(&render_question_list(attempt)).await?;
                            console.say(&render_progress(attempt)).await?;
                            continue;
                        }
                        Command::Restart => return Ok(Some(flow.restart()?)),
                        Command::Retry | Command::Unknown => {
                            console.say(QUESTIONNAIRE_HELP).await?;
                            continue;
                        }
                    }
                }
                QuestionnaireState::Failed { attempt, message } => {
                    console.say(&format!("⚠ {}", message)).await?;
                    let can_retry = attempt.is_some();
                    let prompt = if can_retry {
                        "п - отправить ещё раз, з - начать заново"
                    } else {
                        "п - загрузить вопросы ещё раз, з - начать заново"
                    };
                    let input = ask_or_exit!(console, prompt);
                    match Command::parse(&input) {
                        Command::Retry if can_retry => QuestionnaireEvent::Retry,
                        Command::Retry => {
                            if let Some(route) = flow.start().await? {
                                return Ok(Some(route));
                            }
                            continue;
                        }
                        Command::Restart => return Ok(Some(flow.restart()?)),
                        _ => continue,
                    }
                }
                QuestionnaireState::Completed(_) => return Ok(Some(Route::Results)),
                state @ (QuestionnaireState::Loading | QuestionnaireState::Submitting(_)) => {
                    return Err(AppError::invalid_transition(state.name(), "Input"));
                }
            };

            if let Some(route) = flow.dispatch(event).await? {
                return Ok(Some(route));
            }
        }
    }

    // ========== 结果页 ==========

    async fn run_results(&mut self) -> AppResult<Option<Route>> {
        let console = &mut self.console;
        let mut flow = ResultsFlow::new(self.api.as_ref(), &self.session);

        if let Some(route) = flow.load().await? {
            return Ok(Some(route));
        }

        match flow.state() {
            ResultsState::Ready(view) => console.say(&render_results(view)).await?,
            ResultsState::Empty => {
                console
                    .say("Результаты не найдены. Пройдите тест заново.")
                    .await?
            }
            ResultsState::Error(message) => console.say(&format!("⚠ {}", message)).await?,
            ResultsState::Loading => {}
        }

        loop {
            let input = ask_or_exit!(console, "з - пройти тест заново");
            if Command::parse(&input) == Command::Restart {
                return Ok(Some(flow.restart()?));
            }
        }
    }
}

// ========== 表单输入 ==========

/// 逐项读取注册表单
async fn read_form<R, W>(
    console: &mut Console<R, W>,
    catalog: &[ExamScore],
) -> AppResult<Option<RegistrationForm>>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    let surname = ask_or_exit!(console, "Фамилия");
    let name = ask_or_exit!(console, "Имя");
    let patronymic = ask_or_exit!(console, "Отчество (или «-», если нет)");
    let phone_number = ask_or_exit!(console, "Номер телефона");
    let city = ask_or_exit!(console, "Город");

    console.say("Экзамены:").await?;
    for (index, exam) in catalog.iter().enumerate() {
        console
            .say(&format!("  {}) {}", index + 1, exam.exam_name))
            .await?;
    }

    let mut exams = Vec::new();
    loop {
        let choice = ask_or_exit!(console, "Номер экзамена (пусто - закончить)");
        if choice.is_empty() {
            break;
        }
        let Some(exam) = choice
            .parse::<usize>()
            .ok()
            .and_then(|n| catalog.get(n.wrapping_sub(1)))
        else {
            console.say("Нет такого экзамена.").await?;
            continue;
        };

        let score = ask_or_exit!(console, "Баллы");
        match score.parse::<i32>() {
            Ok(score) => exams.push(exam.with_score(score)),
            Err(_) => console.say("Баллы должны быть числом.").await?,
        }
    }

    let no_patronymic = patronymic == "-";
    Ok(Some(RegistrationForm {
        surname,
        name,
        patronymic: if no_patronymic {
            String::new()
        } else {
            patronymic
        },
        no_patronymic,
        phone_number,
        city,
        exams,
    }))
}
