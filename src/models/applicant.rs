use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::null_as_empty;
use crate::models::result::{FacultyType, ScoringResult};

/// 会话标识（注册后服务端返回的 uuid）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 考试成绩
///
/// 从服务端考试目录中选择（目录项的 score 为 0），用户填写分数后提交
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamScore {
    pub exam_id: String,
    #[serde(default)]
    pub exam_name: String,
    #[serde(default)]
    pub exam_code: String,
    #[serde(default)]
    pub score: i32,
}

impl ExamScore {
    /// 由目录模板创建带分数的成绩
    pub fn with_score(&self, score: i32) -> Self {
        Self {
            score,
            ..self.clone()
        }
    }
}

/// 已通过校验的报名者信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applicant {
    pub surname: String,
    pub name: String,
    pub patronymic: Option<String>,
    /// 11 位，以 7 开头
    pub phone_number: String,
    pub city: String,
    pub exams: Vec<ExamScore>,
}

/// 注册请求体
#[derive(Debug, Serialize)]
pub struct RegisterPayload<'a> {
    pub surname: &'a str,
    pub name: &'a str,
    pub patronymic: Option<&'a str>,
    pub phone_number: &'a str,
    pub city: &'a str,
    pub exams: Vec<ExamEntry<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ExamEntry<'a> {
    pub exam_id: &'a str,
    pub score: i32,
}

impl Applicant {
    pub fn to_payload(&self) -> RegisterPayload<'_> {
        RegisterPayload {
            surname: &self.surname,
            name: &self.name,
            patronymic: self.patronymic.as_deref(),
            phone_number: &self.phone_number,
            city: &self.city,
            exams: self
                .exams
                .iter()
                .map(|e| ExamEntry {
                    exam_id: &e.exam_id,
                    score: e.score,
                })
                .collect(),
        }
    }
}

/// 服务端返回的报名者记录
///
/// 已完成测试的报名者会带有 `faculty_type`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicantRecord {
    pub surname: String,
    pub name: String,
    pub patronymic: Option<String>,
    pub phone_number: String,
    pub city: Option<String>,
    pub uuid: Option<String>,
    /// 尚未完成测试时服务端可能返回 `null`
    #[serde(deserialize_with = "null_as_empty")]
    pub faculty_type: Vec<FacultyType>,
    #[serde(deserialize_with = "null_as_empty")]
    pub exams: Vec<ExamScore>,
}

impl ApplicantRecord {
    /// 已有测试结果时返回结果
    pub fn completed_result(&self) -> Option<ScoringResult> {
        if self.faculty_type.is_empty() {
            return None;
        }
        Some(ScoringResult {
            faculty_type: self.faculty_type.clone(),
            exams: self.exams.clone(),
        })
    }
}
