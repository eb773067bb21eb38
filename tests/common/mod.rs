//! 集成测试共用的假后端与样例数据
#![allow(dead_code)]

use async_trait::async_trait;
use prof_test_client::error::{ApiError, ApiResult};
use prof_test_client::models::{
    Answer, Applicant, ApplicantRecord, ExamScore, Faculty, FacultyType, Question, RequiredExam,
    ScoringResult, SessionId, UserAnswer,
};
use prof_test_client::services::RegistrationForm;
use prof_test_client::{AptitudeApi, MemoryStore, SessionStore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const LIST_QUESTIONS: &str = "list_questions";
pub const REGISTER: &str = "register_applicant";
pub const FETCH_APPLICANT: &str = "fetch_applicant";
pub const SUBMIT: &str = "submit_answers";
pub const EXAM_CATALOG: &str = "list_exam_catalog";
pub const REQUIRED_EXAMS: &str = "list_required_exams";

/// 内存中的假后端，记录每次调用
#[derive(Default)]
pub struct FakeApi {
    pub questions: Vec<Question>,
    /// `fetch_applicant` 的返回值；为空时返回 404
    pub record: Option<ApplicantRecord>,
    pub result: ScoringResult,
    pub catalog: Vec<ExamScore>,
    pub required: Vec<RequiredExam>,
    pub session_id: String,
    calls: Mutex<Vec<&'static str>>,
    failures: Mutex<HashMap<&'static str, u16>>,
    registered: Mutex<Vec<Applicant>>,
    submitted: Mutex<Vec<Vec<UserAnswer>>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            questions: two_questions(),
            result: engineering_result(),
            catalog: exam_catalog(),
            session_id: "sess-1".to_string(),
            ..Default::default()
        }
    }

    /// 之后对 `operation` 的调用都返回给定状态码
    pub fn fail(&self, operation: &'static str, status: u16) {
        self.failures.lock().unwrap().insert(operation, status);
    }

    pub fn recover(&self, operation: &'static str) {
        self.failures.lock().unwrap().remove(operation);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls().iter().filter(|c| **c == operation).count()
    }

    pub fn registered(&self) -> Vec<Applicant> {
        self.registered.lock().unwrap().clone()
    }

    pub fn submitted(&self) -> Vec<Vec<UserAnswer>> {
        self.submitted.lock().unwrap().clone()
    }

    fn enter(&self, operation: &'static str) -> ApiResult<()> {
        self.calls.lock().unwrap().push(operation);
        match self.failures.lock().unwrap().get(operation) {
            Some(&status) => Err(ApiError::Server {
                endpoint: operation.to_string(),
                status,
                body: String::new(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AptitudeApi for FakeApi {
    async fn list_questions(&self) -> ApiResult<Vec<Question>> {
        self.enter(LIST_QUESTIONS)?;
        Ok(self.questions.clone())
    }

    async fn register_applicant(&self, applicant: &Applicant) -> ApiResult<SessionId> {
        self.enter(REGISTER)?;
        self.registered.lock().unwrap().push(applicant.clone());
        Ok(SessionId::new(self.session_id.clone()))
    }

    async fn fetch_applicant(&self, _session: &SessionId) -> ApiResult<ApplicantRecord> {
        self.enter(FETCH_APPLICANT)?;
        self.record.clone().ok_or_else(|| ApiError::Server {
            endpoint: FETCH_APPLICANT.to_string(),
            status: 404,
            body: String::new(),
        })
    }

    async fn submit_answers(
        &self,
        _session: &SessionId,
        answers: &[UserAnswer],
    ) -> ApiResult<ScoringResult> {
        self.enter(SUBMIT)?;
        self.submitted.lock().unwrap().push(answers.to_vec());
        Ok(self.result.clone())
    }

    async fn list_exam_catalog(&self) -> ApiResult<Vec<ExamScore>> {
        self.enter(EXAM_CATALOG)?;
        Ok(self.catalog.clone())
    }

    async fn list_required_exams(&self) -> ApiResult<Vec<RequiredExam>> {
        self.enter(REQUIRED_EXAMS)?;
        Ok(self.required.clone())
    }
}

// ========== 样例数据 ==========

/// 内存存储上的会话存储，同时返回底层存储以便检查
pub fn memory_session() -> (Arc<MemoryStore>, SessionStore) {
    let raw = Arc::new(MemoryStore::new());
    let session = SessionStore::new(raw.clone());
    (raw, session)
}

pub fn question(id: &str, answers: &[&str]) -> Question {
    Question {
        id: id.to_string(),
        question: format!("Вопрос {}", id),
        answers: answers
            .iter()
            .map(|a| Answer {
                id: a.to_string(),
                text: format!("Ответ {}", a),
            })
            .collect(),
    }
}

pub fn two_questions() -> Vec<Question> {
    vec![question("q1", &["a1", "a2"]), question("q2", &["a1", "a2"])]
}

pub fn exam(id: &str, name: &str, code: &str, score: i32) -> ExamScore {
    ExamScore {
        exam_id: id.to_string(),
        exam_name: name.to_string(),
        exam_code: code.to_string(),
        score,
    }
}

pub fn exam_catalog() -> Vec<ExamScore> {
    vec![
        exam("e-rus", "Русский язык", "rus", 0),
        exam("e-math", "Математика", "math", 0),
        exam("e-phys", "Физика", "phys", 0),
    ]
}

/// 只有一个职业类型的结果
pub fn engineering_result() -> ScoringResult {
    ScoringResult {
        faculty_type: vec![FacultyType {
            name: "Человек-техника".to_string(),
            compliance: 85.0,
            faculties: vec![Faculty {
                name: "Инженерный".to_string(),
                url: "https://example.org/eng".to_string(),
            }],
        }],
        exams: vec![
            exam("e-rus", "Русский язык", "rus", 80),
            exam("e-math", "Математика", "math", 72),
        ],
    }
}

pub fn required(faculty: &str, code: &str) -> RequiredExam {
    RequiredExam {
        faculty_id: format!("f-{}", faculty),
        faculty_name: faculty.to_string(),
        exam_id: format!("e-{}", code),
        exam_code: code.to_string(),
        min_score: 40,
    }
}

pub fn valid_form() -> RegistrationForm {
    RegistrationForm {
        surname: "Иванов".to_string(),
        name: "Иван".to_string(),
        patronymic: "Иванович".to_string(),
        no_patronymic: false,
        phone_number: "8 (900) 123-45-67".to_string(),
        city: "Краснодар".to_string(),
        exams: vec![
            exam("e-rus", "Русский язык", "rus", 80),
            exam("e-math", "Математика", "math", 72),
        ],
    }
}
