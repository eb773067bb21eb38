use serde::{Deserialize, Serialize};

use crate::models::applicant::ExamScore;
use crate::models::null_as_empty;

/// 推荐的院系
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faculty {
    pub name: String,
    pub url: String,
}

/// 职业类型（如 "Человек-техника"）及其匹配度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacultyType {
    pub name: String,
    pub compliance: f64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub faculties: Vec<Faculty>,
}

/// 测试结果
///
/// 服务端在 `/results/` 的响应中还会回显报名者信息，这里只保留结果页需要的部分
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub faculty_type: Vec<FacultyType>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub exams: Vec<ExamScore>,
}

impl ScoringResult {
    pub fn is_empty(&self) -> bool {
        self.faculty_type.is_empty()
    }

    /// 所有类型中的最大匹配度
    pub fn max_compliance(&self) -> f64 {
        self.faculty_type
            .iter()
            .map(|t| t.compliance)
            .fold(0.0, f64::max)
    }

    pub fn has_exam_code(&self, code: &str) -> bool {
        self.exams.iter().any(|e| e.exam_code == code)
    }
}

/// 院系对考试的要求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredExam {
    pub faculty_id: String,
    pub faculty_name: String,
    pub exam_id: String,
    pub exam_code: String,
    #[serde(default)]
    pub min_score: i32,
}
