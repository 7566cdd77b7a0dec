//! CLI subcommand handlers extracted from `main.rs`.
//!
//! Keeps `main.rs` slim: clap parsing stays there, rendering lives here.
//! The `render_*` functions return strings so they can be tested without
//! capturing stdout.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::assistant::{self, AssistantSettings, Chat};
use crate::catalog::{plural, Catalog, Tool, ToolDetail, ALL_CATEGORIES};
use crate::context;
use crate::utils::{one_line, truncate_chars};

/// Width of the description column in `list` output.
const DESCRIPTION_WIDTH: usize = 60;

// ── Rendering ────────────────────────────────────────────────────────────────

fn render_row(out: &mut String, tool: &Tool) {
    let score = tool
        .score
        .map(|s| format!("{s}/10"))
        .unwrap_or_else(|| "-".to_string());
    let marker = match tool.status {
        Some(crate::catalog::ToolStatus::Active) => "●",
        _ => " ",
    };
    let _ = writeln!(
        out,
        "{marker} {:<10} {:<24} {:<22} {:>5}  {}",
        tool.id,
        truncate_chars(&tool.name, 24),
        truncate_chars(&tool.category, 22),
        score,
        truncate_chars(&one_line(&tool.description), DESCRIPTION_WIDTH),
    );
}

/// The filtered grid as a table, or a "nothing found" notice.
pub fn render_tool_list(catalog: &Catalog, query: &str, category: &str) -> String {
    let tools = catalog.search(query, category);
    let mut out = String::new();

    if tools.is_empty() {
        let _ = writeln!(
            out,
            "Ничего не найдено: по запросу «{query}» ничего не нашлось в категории «{category}»."
        );
        return out;
    }

    for tool in &tools {
        render_row(&mut out, tool);
    }
    let _ = writeln!(out, "\n{} of {}", tools.len(), catalog.len());
    out
}

/// Detail view: description, pricing plans, use cases and links.
pub fn render_tool_detail(detail: &ToolDetail) -> String {
    let tool = &detail.tool;
    let mut out = String::new();

    let _ = write!(out, "{}  [{}]", tool.name, tool.category);
    if let Some(score) = tool.score {
        let _ = write!(out, "  ★ {score}/10");
    }
    if let Some(status) = tool.status {
        let _ = write!(out, "  ({status})");
    }
    let _ = writeln!(out);

    if !tool.description.is_empty() {
        let _ = writeln!(out, "\n{}", tool.description);
    }

    if !detail.pricing_plans.is_empty() {
        let _ = writeln!(out, "\nТарифные планы:");
        for plan in &detail.pricing_plans {
            let free = if plan.free { " (free)" } else { "" };
            match &plan.details {
                Some(details) => {
                    let _ = writeln!(out, "  - {}: {}{free}", plan.name, details);
                }
                None => {
                    let _ = writeln!(out, "  - {}{free}", plan.name);
                }
            }
        }
    }

    if !detail.use_case_list.is_empty() {
        let _ = writeln!(out, "\nКейсы использования:");
        for use_case in &detail.use_case_list {
            let _ = writeln!(out, "  • {use_case}");
        }
    }

    let _ = writeln!(out, "\nСайт:   {}", tool.link);
    let _ = writeln!(out, "Оплата: {}", detail.checkout_link);
    out
}

/// Category selector rows with counts and, where configured, definitions.
pub fn render_categories(catalog: &Catalog, definitions: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for row in catalog.index().rows() {
        let _ = writeln!(out, "{:>4}  {}", row.count, row.name);
        if let Some(def) = definitions.get(&row.name) {
            let _ = writeln!(out, "      {}", one_line(def));
        }
    }
    let total = catalog.len() as u64;
    let _ = writeln!(
        out,
        "\n{} в {} категориях",
        plural::tool_count_label(total),
        catalog.index().distinct()
    );
    out
}

// ── Commands ─────────────────────────────────────────────────────────────────

/// `toolshelf list`
pub fn list_tools(catalog: &Catalog, query: &str, category: &str) -> anyhow::Result<()> {
    if category != ALL_CATEGORIES && !catalog.index().contains(category) {
        anyhow::bail!(
            "unknown category '{category}'; known: {}",
            catalog.index().categories().join(", ")
        );
    }
    print!("{}", render_tool_list(catalog, query, category));
    Ok(())
}

/// `toolshelf show <id>`
pub fn show_tool(catalog: &Catalog, id: &str, default_payment_link: &str) -> anyhow::Result<()> {
    let tool = catalog
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("tool not found: {id}"))?;
    print!(
        "{}",
        render_tool_detail(&ToolDetail::new(tool, default_payment_link))
    );
    Ok(())
}

/// `toolshelf categories`
pub fn list_categories(catalog: &Catalog, definitions: &BTreeMap<String, String>) {
    print!("{}", render_categories(catalog, definitions));
}

/// `toolshelf context`: print the instruction the assistant would be
/// seeded with.
pub fn print_context(catalog: &Catalog, settings: &AssistantSettings) {
    let today = chrono::Local::now().date_naive();
    println!(
        "{}",
        context::build_system_instruction(catalog.tools(), &settings.instruction_template, today)
    );
}

/// `toolshelf ask <message>`: one assistant round-trip.
pub async fn ask(
    catalog: &Catalog,
    settings: AssistantSettings,
    message: &str,
) -> anyhow::Result<()> {
    if !settings.is_configured() {
        eprintln!(
            "Warning: no assistant credential configured (set API_KEY or assistant.api_key)."
        );
    }
    let mut chat = Chat::new(settings);
    match chat.send(message, catalog.tools()).await {
        Some(reply) => {
            println!("{reply}");
            if reply == assistant::MISSING_KEY_REPLY || reply == assistant::TRANSPORT_ERROR_REPLY {
                anyhow::bail!("assistant unavailable");
            }
            Ok(())
        }
        None => anyhow::bail!("message is empty"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogSource, ToolStatus, DEFAULT_PAYMENT_LINK};

    fn catalog() -> Catalog {
        let mut cursor = Tool {
            id: "cursor".into(),
            name: "Cursor".into(),
            category: "Разработка и код".into(),
            description: "AI-редактор\nкода".into(),
            link: "https://cursor.com".into(),
            use_cases: "Рефакторинг • Ревью".into(),
            image_url: None,
            pricing: Some("Free: 2000 completions\nPro: $20/mo".into()),
            score: Some(10),
            status: Some(ToolStatus::Active),
            payment_link: None,
        };
        let mut suno = cursor.clone();
        suno.id = "suno".into();
        suno.name = "Suno".into();
        suno.category = "Аудио и звук".into();
        suno.description = "Музыка из текста".into();
        suno.pricing = None;
        suno.score = None;
        suno.status = None;
        cursor.payment_link = Some("https://pay.example".into());
        Catalog::new(vec![cursor, suno], CatalogSource::Empty)
    }

    #[test]
    fn list_flattens_descriptions_and_marks_active() {
        let out = render_tool_list(&catalog(), "", ALL_CATEGORIES);
        assert!(out.contains("● cursor"));
        assert!(out.contains("AI-редактор кода"));
        assert!(out.contains("10/10"));
        assert!(out.contains("2 of 2"));
    }

    #[test]
    fn list_columns_align_for_cyrillic_text() {
        let mut long = catalog().tools()[0].clone();
        long.id = "long".into();
        long.name = "Очень длинное название инструмента".into();
        long.category = "Генерация изображений и видео".into();
        let cat = Catalog::new(
            vec![catalog().tools()[0].clone(), long],
            CatalogSource::Empty,
        );

        let out = render_tool_list(&cat, "", ALL_CATEGORIES);
        let rows: Vec<&str> = out.lines().take(2).collect();
        assert!(rows[1].contains("Очень длинное название …"));
        assert!(rows[1].contains("Генерация изображений…"));
        // The score column starts at the same char offset on every row.
        let score_col = |row: &str| row.find("10/10").map(|b| row[..b].chars().count());
        assert_eq!(score_col(rows[0]), score_col(rows[1]));
    }

    #[test]
    fn list_empty_result_notice() {
        let out = render_tool_list(&catalog(), "blockchain", ALL_CATEGORIES);
        assert!(out.starts_with("Ничего не найдено"));
        assert!(out.contains("«blockchain»"));
    }

    #[test]
    fn detail_lists_plans_and_use_cases() {
        let cat = catalog();
        let detail = ToolDetail::new(cat.get("cursor").unwrap(), DEFAULT_PAYMENT_LINK);
        let out = render_tool_detail(&detail);
        assert!(out.starts_with("Cursor  [Разработка и код]  ★ 10/10  (active)"));
        assert!(out.contains("  - Free: 2000 completions (free)"));
        assert!(out.contains("  - Pro: $20/mo\n"));
        assert!(out.contains("  • Ревью"));
        assert!(out.contains("Оплата: https://pay.example"));
    }

    #[test]
    fn categories_with_definitions_and_footer() {
        let mut defs = BTreeMap::new();
        defs.insert("Аудио и звук".to_string(), "Синтез речи и музыки".to_string());
        let out = render_categories(&catalog(), &defs);
        assert!(out.starts_with("   2  All\n"));
        assert!(out.contains("      Синтез речи и музыки"));
        assert!(out.contains("2 активных инструмента в 2 категориях"));
    }

    #[test]
    fn unknown_category_is_an_error() {
        assert!(list_tools(&catalog(), "", "Видео").is_err());
    }

    #[test]
    fn missing_tool_is_an_error() {
        assert!(show_tool(&catalog(), "nope", DEFAULT_PAYMENT_LINK).is_err());
    }
}
