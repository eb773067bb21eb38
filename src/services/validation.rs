//! 注册表单校验 - 业务能力层
//!
//! 同步、按字段校验；校验失败的数据不会发往服务端

use crate::models::{Applicant, ExamScore};
use once_cell::sync::Lazy;
use phf::phf_map;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashSet;
use validator::{Validate, ValidationError, ValidationErrors};

/// 至少需要的考试数量
pub const MIN_EXAMS: usize = 2;
/// 单门考试的最高分
pub const MAX_SCORE: i32 = 100;

/// 姓、名、父称：西里尔字母，可用连字符连接
static PERSON_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[А-ЯЁа-яё]+(?:-[А-ЯЁа-яё]+)*$").expect("person name regex"));

/// 城市：西里尔字母单词，以空格或连字符分隔
static CITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[А-ЯЁа-яё]+(?:[ -][А-ЯЁа-яё]+)*$").expect("city regex"));

/// 字段名 → 表单上显示的名称
static FIELD_LABELS: phf::Map<&'static str, &'static str> = phf_map! {
    "surname" => "Фамилия",
    "name" => "Имя",
    "patronymic" => "Отчество",
    "phone_number" => "Номер телефона",
    "city" => "Город",
    "exams" => "Экзамены",
};

/// 注册表单（用户输入的原始值）
#[derive(Debug, Clone, Default, Validate)]
pub struct RegistrationForm {
    #[validate(
        length(max = 50, message = "Максимальное количество символов: 50"),
        custom(function = validate_person_name)
    )]
    pub surname: String,

    #[validate(
        length(max = 50, message = "Максимальное количество символов: 50"),
        custom(function = validate_person_name)
    )]
    pub name: String,

    /// 为空且 `no_patronymic` 为假时报错
    #[validate(
        length(max = 50, message = "Максимальное количество символов: 50"),
        custom(function = validate_optional_person_name)
    )]
    pub patronymic: String,

    /// 对应表单上的"没有父称"复选框
    pub no_patronymic: bool,

    #[validate(custom(function = validate_phone))]
    pub phone_number: String,

    #[validate(
        length(max = 50, message = "Максимальное количество символов: 50"),
        custom(function = validate_city)
    )]
    pub city: String,

    #[validate(custom(function = validate_exams))]
    pub exams: Vec<ExamScore>,
}

impl RegistrationForm {
    /// 去掉各文本字段首尾空白
    pub fn trimmed(&self) -> Self {
        Self {
            surname: self.surname.trim().to_string(),
            name: self.name.trim().to_string(),
            patronymic: if self.no_patronymic {
                String::new()
            } else {
                self.patronymic.trim().to_string()
            },
            no_patronymic: self.no_patronymic,
            phone_number: self.phone_number.trim().to_string(),
            city: self.city.trim().to_string(),
            exams: self.exams.clone(),
        }
    }

    /// 校验全部字段，成功时返回规范化后的报名者
    pub fn to_applicant(&self) -> Result<Applicant, ValidationErrors> {
        let form = self.trimmed();

        let mut errors = match form.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        if !form.no_patronymic && form.patronymic.is_empty() {
            errors.add("patronymic", required());
        }
        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(Applicant {
            surname: form.surname,
            name: form.name,
            patronymic: Some(form.patronymic).filter(|p| !p.is_empty()),
            phone_number: normalize_phone(&form.phone_number).unwrap_or_default(),
            city: form.city,
            exams: form.exams,
        })
    }
}

/// 规范化手机号
///
/// 允许空格、`+`、`-`、括号；11 位且以 8 开头时改为 7。
/// 结果必须是以 7 开头的 11 位数字
pub fn normalize_phone(input: &str) -> Option<String> {
    if !input
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
    {
        return None;
    }

    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 11 {
        return None;
    }

    match digits.as_bytes()[0] {
        b'7' => Some(digits),
        b'8' => Some(format!("7{}", &digits[1..])),
        _ => None,
    }
}

/// 按表单顺序列出 (字段名称, 错误提示)
pub fn field_messages(errors: &ValidationErrors) -> Vec<(String, String)> {
    const ORDER: [&str; 6] = ["surname", "name", "patronymic", "phone_number", "city", "exams"];

    let field_errors = errors.field_errors();
    let mut messages = Vec::new();
    for field in ORDER {
        let Some(list) = field_errors.get(field) else {
            continue;
        };
        for error in list.iter() {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| error.code.to_string());
            messages.push((field_label(field).to_string(), message));
        }
    }
    messages
}

pub fn field_label(field: &str) -> &'static str {
    FIELD_LABELS.get(field).copied().unwrap_or("Поле")
}

// ========== 自定义校验函数 ==========

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn required() -> ValidationError {
    error("required", "Это обязательное поле")
}

fn validate_person_name(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(required());
    }
    validate_optional_person_name(value)
}

fn validate_optional_person_name(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || PERSON_NAME_RE.is_match(value) {
        Ok(())
    } else {
        Err(error("cyrillic", "Допустимы только русские буквы и дефис"))
    }
}

fn validate_city(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(required());
    }
    if CITY_RE.is_match(value) {
        Ok(())
    } else {
        Err(error("cyrillic", "Допустимы только русские буквы, пробел и дефис"))
    }
}

fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(required());
    }
    match normalize_phone(value) {
        Some(_) => Ok(()),
        None => Err(error("phone", "Введите номер из 11 цифр, начиная с 7")),
    }
}

fn validate_exams(exams: &[ExamScore]) -> Result<(), ValidationError> {
    if exams.len() < MIN_EXAMS {
        return Err(error("min_exams", "Укажите результаты минимум двух экзаменов"));
    }

    let mut seen = HashSet::new();
    if !exams.iter().all(|e| seen.insert(e.exam_id.as_str())) {
        return Err(error("duplicate_exam", "Каждый экзамен можно указать только один раз"));
    }

    if exams.iter().any(|e| !(0..=MAX_SCORE).contains(&e.score)) {
        return Err(error("score_range", "Баллы должны быть от 0 до 100"));
    }

    Ok(())
}
