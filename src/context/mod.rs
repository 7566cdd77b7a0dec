//! Assistant context assembly.
//!
//! Serialises the catalog into the plain-text block the assistant is
//! grounded on and splices it into the instruction template. Pure string
//! work: the same tools, template and date always give the same output.

use chrono::{Datelike, NaiveDate};

use crate::catalog::Tool;

/// Placeholder replaced with the rendered tool list.
pub const TOOLS_PLACEHOLDER: &str = "{tools}";
/// Placeholder replaced with the current month, e.g. "Ноябрь 2025 года".
pub const DATE_PLACEHOLDER: &str = "{date}";

pub const UNKNOWN_PRICING: &str = "Unknown";
pub const UNKNOWN_SCORE: &str = "N/A";
pub const UNKNOWN_STATUS: &str = "Inactive";

/// Built-in instruction template.
pub const DEFAULT_INSTRUCTION: &str = "\
Ты — дружелюбный и детальный AI-эксперт по технологическому стеку (Tech Stack).

ТЕКУЩАЯ ДАТА: {date}.

Твоя цель: Максимально помочь пользователю выбрать инструмент, объяснив нюансы.

ПРАВИЛА ОФОРМЛЕНИЯ И ТИПОГРАФИКИ (СТРОГО):
1. ВИЗУАЛ: Запрещено выдавать сплошной текст (\"простыню\"). Обязательно разделяй смысловые блоки и абзацы ДВОЙНЫМ переносом строки.
2. MARKDOWN: ЗАПРЕЩЕНО использовать Markdown (звездочки **, курсив *, решетки #). Текст должен быть чистым.
3. КАВЫЧКИ: используй только типографские «елочки». Пример: инструмент «Midjourney».
4. ТИРЕ: используй только длинное тире (—) с пробелами. Не используй дефис (-) вместо тире.
5. ДВОЕТОЧИЕ: после двоеточия всегда пиши с маленькой буквы (кроме имен собственных). Пример: «функции: генерация, поиск, анализ».
6. СПИСКИ: оформляй каждый пункт с новой строки, используя эмодзи или дефис.

Структура идеального ответа:
1. Прямой ответ или вступление.
(Пустая строка)
2. Детальный разбор или список.
(Пустая строка)
3. Вывод или совет.

Контекст (список инструментов пользователя):
{tools}

Правила логики:
1. Отвечай ТОЛЬКО на основе информации из списка.
2. Если инструмент помечен как Status: active — это означает, что пользователь его использует.
3. Отвечай развернуто, экспертно, на русском языке.
";

const MONTHS_RU: [&str; 12] = [
    "Январь", "Февраль", "Март", "Апрель", "Май", "Июнь", "Июль", "Август", "Сентябрь",
    "Октябрь", "Ноябрь", "Декабрь",
];

/// "Ноябрь 2025 года" for any day in November 2025.
pub fn month_label(date: NaiveDate) -> String {
    format!("{} {} года", MONTHS_RU[date.month0() as usize], date.year())
}

/// Render one tool as an indented entry.
///
/// Absent optional fields get the fixed placeholders [`UNKNOWN_PRICING`],
/// [`UNKNOWN_SCORE`] and [`UNKNOWN_STATUS`].
pub fn render_tool_entry(tool: &Tool) -> String {
    let pricing = tool
        .pricing
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(UNKNOWN_PRICING);
    let score = tool
        .score
        .map(|s| format!("{s}/10"))
        .unwrap_or_else(|| UNKNOWN_SCORE.to_string());
    let status = tool.status.map(|s| s.as_str()).unwrap_or(UNKNOWN_STATUS);

    format!(
        "- Name: {}\n  Category: {}\n  Description: {}\n  Pricing: {}\n  Score: {}\n  Status: {}\n  Link: {}",
        tool.name, tool.category, tool.description, pricing, score, status, tool.link
    )
}

/// Every tool, one entry each, separated by a blank line.
pub fn render_tools_context(tools: &[Tool]) -> String {
    tools
        .iter()
        .map(render_tool_entry)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Fill `template` with the rendered catalog and the month of `today`.
pub fn build_system_instruction(tools: &[Tool], template: &str, today: NaiveDate) -> String {
    template
        .replace(DATE_PLACEHOLDER, &month_label(today))
        .replace(TOOLS_PLACEHOLDER, &render_tools_context(tools))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ToolStatus;

    fn tool(name: &str) -> Tool {
        Tool {
            id: name.to_lowercase(),
            name: name.into(),
            category: "Генеративные LLM".into(),
            description: "Чат-бот".into(),
            link: format!("https://{}.example", name.to_lowercase()),
            use_cases: String::new(),
            image_url: None,
            pricing: None,
            score: None,
            status: None,
            payment_link: None,
        }
    }

    fn nov_2025() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 14).unwrap()
    }

    #[test]
    fn missing_fields_use_placeholders() {
        let entry = render_tool_entry(&tool("Claude"));
        assert!(entry.contains("Pricing: Unknown"));
        assert!(entry.contains("Score: N/A"));
        assert!(entry.contains("Status: Inactive"));
        assert!(entry.starts_with("- Name: Claude\n  Category: Генеративные LLM"));
        assert!(entry.ends_with("Link: https://claude.example"));
    }

    #[test]
    fn present_fields_rendered() {
        let mut t = tool("Cursor");
        t.pricing = Some("Pro: $20".into());
        t.score = Some(9);
        t.status = Some(ToolStatus::Active);
        let entry = render_tool_entry(&t);
        assert!(entry.contains("Pricing: Pro: $20"));
        assert!(entry.contains("Score: 9/10"));
        assert!(entry.contains("Status: active"));
    }

    #[test]
    fn entries_separated_by_blank_line() {
        let ctx = render_tools_context(&[tool("A"), tool("B"), tool("C")]);
        assert_eq!(ctx.matches("\n\n").count(), 2);
        assert_eq!(ctx.matches("- Name: ").count(), 3);
        assert!(render_tools_context(&[]).is_empty());
    }

    #[test]
    fn instruction_fills_placeholders_deterministically() {
        let tools = vec![tool("Perplexity")];
        let a = build_system_instruction(&tools, DEFAULT_INSTRUCTION, nov_2025());
        let b = build_system_instruction(&tools, DEFAULT_INSTRUCTION, nov_2025());
        assert_eq!(a, b);
        assert!(a.contains("ТЕКУЩАЯ ДАТА: Ноябрь 2025 года."));
        assert!(a.contains("- Name: Perplexity"));
        assert!(a.contains("Status: active — это означает"));
        assert!(!a.contains(TOOLS_PLACEHOLDER));
        assert!(!a.contains(DATE_PLACEHOLDER));
    }

    #[test]
    fn custom_template() {
        let out = build_system_instruction(&[tool("X")], "Tools:\n{tools}", nov_2025());
        assert_eq!(out, format!("Tools:\n{}", render_tool_entry(&tool("X"))));
    }

    #[test]
    fn month_labels() {
        assert_eq!(
            month_label(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()),
            "Январь 2026 года"
        );
        assert_eq!(month_label(nov_2025()), "Ноябрь 2025 года");
    }
}
