//! Splitting helpers for the free-text `use_cases` and `pricing` fields.
//!
//! Both fields arrive from spreadsheets as one cell holding several
//! items. These helpers turn them into lists for display.

use serde::Serialize;

/// Marker some sheets use instead of line breaks between use cases.
const BULLET: char = '•';

/// Split a use-case cell on newlines and bullet markers.
///
/// Items are trimmed; empty items are dropped.
pub fn split_use_cases(raw: &str) -> Vec<String> {
    raw.split(|c| c == '\n' || c == BULLET)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// One pricing line, e.g. `Pro: $20/mo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricingPlan {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Plan name mentions "free" / "бесплатно".
    pub free: bool,
}

impl PricingPlan {
    /// Parse one line. Only the first colon separates name from details,
    /// so `Team: $30: billed yearly` keeps `$30: billed yearly` intact.
    pub fn parse(line: &str) -> Self {
        let (name, details) = match line.split_once(':') {
            Some((name, details)) => {
                let details = details.trim();
                (
                    name.trim(),
                    (!details.is_empty()).then(|| details.to_string()),
                )
            }
            None => (line.trim(), None),
        };
        let lower = name.to_lowercase();
        Self {
            name: name.to_string(),
            details,
            free: lower.contains("бесплатно") || lower.contains("free"),
        }
    }
}

/// Split a pricing cell into plans, one per non-blank line.
pub fn split_pricing_plans(raw: &str) -> Vec<PricingPlan> {
    raw.lines()
        .filter(|l| !l.trim().is_empty())
        .map(PricingPlan::parse)
        .collect()
}
