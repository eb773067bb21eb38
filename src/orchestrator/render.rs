//! 终端页面渲染
//!
//! 只把流程状态转换成文本，不做任何读写

use crate::services::{RequirementStatus, ResultsView};
use crate::workflow::Attempt;

/// 柱状图满格宽度（字符数）
const BAR_WIDTH: usize = 30;

/// 当前题目及其答案选项
pub fn render_question(attempt: &Attempt) -> String {
    let Some(question) = attempt.current_question() else {
        return String::new();
    };
    let selected = attempt.selection.get(&question.id);

    let mut out = format!(
        "\nВопрос {} / {}\n{}\n",
        attempt.current + 1,
        attempt.total(),
        question.question
    );
    for (index, answer) in question.answers.iter().enumerate() {
        let mark = if selected == Some(answer.id.as_str()) {
            "●"
        } else {
            "○"
        };
        out.push_str(&format!("  {} {}) {}\n", mark, index + 1, answer.text));
    }
    out.push_str(&render_progress(attempt));
    out
}

pub fn render_progress(attempt: &Attempt) -> String {
    format!("Завершено: {} / {}", attempt.answered(), attempt.total())
}

/// 题目列表，标出已答和当前题
pub fn render_question_list(attempt: &Attempt) -> String {
    attempt
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let answered = if attempt.selection.is_answered(&question.id) {
                "✓"
            } else {
                " "
            };
            let cursor = if index == attempt.current { ">" } else { " " };
            format!("{}{} {}", cursor, answered, index + 1)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// 结果页：柱状图、图例和院系链接
pub fn render_results(view: &ResultsView) -> String {
    let mut out = String::from("Результаты теста\n\n");

    let name_width = view
        .bars
        .iter()
        .map(|bar| bar.name.chars().count())
        .max()
        .unwrap_or(0);

    for bar in &view.bars {
        let filled = (bar.height_percent / 100.0 * BAR_WIDTH as f64).round() as usize;
        let padding = name_width - bar.name.chars().count();
        out.push_str(&format!(
            "{}{} │{}{} {:.1}%\n",
            bar.name,
            " ".repeat(padding),
            "█".repeat(filled.min(BAR_WIDTH)),
            " ".repeat(BAR_WIDTH - filled.min(BAR_WIDTH)),
            bar.compliance
        ));
    }

    for bar in &view.bars {
        out.push_str(&format!("\n■ {} ({})\n", bar.name, bar.color));
        for faculty in &bar.faculties {
            out.push_str(&format!("  • {} - {}", faculty.name, faculty.url));
            match &faculty.requirements {
                RequirementStatus::Satisfied => out.push_str("  ✓ подходит по экзаменам"),
                RequirementStatus::Missing(codes) => {
                    out.push_str(&format!("  (не хватает: {})", codes.join(", ")))
                }
                RequirementStatus::Unknown => {}
            }
            out.push('\n');
        }
    }

    out
}
