use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 答案选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// 不同版本的接口分别使用 `id` 与 `uuid`
    #[serde(alias = "uuid")]
    pub id: String,
    pub text: String,
}

/// 单选题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    /// 题干
    pub question: String,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

impl Question {
    pub fn has_answer(&self, answer_id: &str) -> bool {
        self.answers.iter().any(|a| a.id == answer_id)
    }
}

/// 提交给服务端的单题答案
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAnswer {
    pub question_id: String,
    pub answer_ids: Vec<String>,
}

/// 当前作答记录：题目 ID → 选中的答案 ID
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSelection {
    chosen: HashMap<String, String>,
}

impl AnswerSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录选择，同一题再次选择会覆盖
    pub fn select(&mut self, question_id: impl Into<String>, answer_id: impl Into<String>) {
        self.chosen.insert(question_id.into(), answer_id.into());
    }

    pub fn get(&self, question_id: &str) -> Option<&str> {
        self.chosen.get(question_id).map(String::as_str)
    }

    pub fn is_answered(&self, question_id: &str) -> bool {
        self.chosen.contains_key(question_id)
    }

    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    /// 是否每道题都已作答
    pub fn covers(&self, questions: &[Question]) -> bool {
        !questions.is_empty() && questions.iter().all(|q| self.is_answered(&q.id))
    }

    /// 按题目顺序转换为提交格式
    pub fn to_user_answers(&self, questions: &[Question]) -> Vec<UserAnswer> {
        questions
            .iter()
            .filter_map(|q| {
                self.get(&q.id).map(|answer_id| UserAnswer {
                    question_id: q.id.clone(),
                    answer_ids: vec![answer_id.to_string()],
                })
            })
            .collect()
    }
}
