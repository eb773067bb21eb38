//! 结果图表 - 业务能力层
//!
//! 把测试结果换算成柱状图数据，并对照各院系的必考科目

use crate::models::{RequiredExam, ScoringResult};
use phf::phf_map;

/// 每种职业类型固定的颜色
static TYPE_COLORS: phf::Map<&'static str, &'static str> = phf_map! {
    "Человек-искусство" => "#FF6384",
    "Человек-знаковая система" => "#36A2EB",
    "Человек-человек" => "#FFCE56",
    "Человек-природа" => "#4BC0C0",
    "Человек-техника" => "#9966FF",
};

/// 未知类型按位置轮流取色
const FALLBACK_COLORS: [&str; 5] = ["#FF6384", "#36A2EB", "#FFCE56", "#4BC0C0", "#9966FF"];

/// 院系对必考科目的满足情况
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementStatus {
    /// 所有必考科目都已提交
    Satisfied,
    /// 缺少的科目代码
    Missing(Vec<String>),
    /// 没有该院系的要求数据
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FacultyLink {
    pub name: String,
    pub url: String,
    pub requirements: RequirementStatus,
}

/// 柱状图中的一根柱子及其图例
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub name: String,
    pub compliance: f64,
    /// 相对最大匹配度的高度，0–100
    pub height_percent: f64,
    pub color: &'static str,
    pub faculties: Vec<FacultyLink>,
}

/// 结果页的完整数据
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsView {
    pub bars: Vec<Bar>,
}

impl ResultsView {
    /// 生成结果页数据
    ///
    /// # 参数
    /// - `result`: 测试结果
    /// - `required`: 必考科目表，获取失败时传空切片
    pub fn build(result: &ScoringResult, required: &[RequiredExam]) -> Self {
        let max = result.max_compliance();

        let bars = result
            .faculty_type
            .iter()
            .enumerate()
            .map(|(index, faculty_type)| Bar {
                name: faculty_type.name.clone(),
                compliance: faculty_type.compliance,
                height_percent: if max > 0.0 {
                    faculty_type.compliance / max * 100.0
                } else {
                    0.0
                },
                color: color_for(&faculty_type.name, index),
                faculties: faculty_type
                    .faculties
                    .iter()
                    .map(|faculty| FacultyLink {
                        name: faculty.name.clone(),
                        url: faculty.url.clone(),
                        requirements: requirement_status(&faculty.name, result, required),
                    })
                    .collect(),
            })
            .collect();

        Self { bars }
    }

    /// 满足全部必考科目的院系
    pub fn satisfied_faculties(&self) -> impl Iterator<Item = &FacultyLink> {
        self.bars
            .iter()
            .flat_map(|bar| bar.faculties.iter())
            .filter(|f| f.requirements == RequirementStatus::Satisfied)
    }
}

pub fn color_for(type_name: &str, index: usize) -> &'static str {
    TYPE_COLORS
        .get(type_name)
        .copied()
        .unwrap_or(FALLBACK_COLORS[index % FALLBACK_COLORS.len()])
}

/// 按院系名称对照必考科目
fn requirement_status(
    faculty_name: &str,
    result: &ScoringResult,
    required: &[RequiredExam],
) -> RequirementStatus {
    let mut codes: Vec<&str> = required
        .iter()
        .filter(|r| r.faculty_name == faculty_name)
        .map(|r| r.exam_code.as_str())
        .collect();

    if codes.is_empty() {
        return RequirementStatus::Unknown;
    }
    codes.sort_unstable();
    codes.dedup();

    let missing: Vec<String> = codes
        .into_iter()
        .filter(|code| !result.has_exam_code(code))
        .map(str::to_string)
        .collect();

    if missing.is_empty() {
        RequirementStatus::Satisfied
    } else {
        RequirementStatus::Missing(missing)
    }
}
