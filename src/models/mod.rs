pub mod applicant;
pub mod question;
pub mod result;

pub use applicant::{Applicant, ApplicantRecord, ExamScore, SessionId};
pub use question::{Answer, AnswerSelection, Question, UserAnswer};
pub use result::{Faculty, FacultyType, RequiredExam, ScoringResult};

use serde::{Deserialize, Deserializer};

/// 把 `null` 当作空列表（缺失的键由 `#[serde(default)]` 处理）
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
