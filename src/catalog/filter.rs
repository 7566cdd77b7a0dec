//! Search, filtering and category aggregation over a tool slice.
//!
//! Everything here is pure: same input, same output, no caching. The
//! [`CategoryIndex`] is the one derived structure, built once per
//! snapshot by [`super::Catalog::new`].

use std::collections::HashMap;

use serde::Serialize;

use super::Tool;

/// Synthetic category that selects every tool.
pub const ALL_CATEGORIES: &str = "All";

/// Whether `tool` passes the category and search predicates.
///
/// `query_lower` must already be lowercased.
fn matches(tool: &Tool, query_lower: &str, category: &str) -> bool {
    let in_category = category == ALL_CATEGORIES || tool.category == category;
    if !in_category {
        return false;
    }
    query_lower.is_empty()
        || tool.name.to_lowercase().contains(query_lower)
        || tool.description.to_lowercase().contains(query_lower)
}

/// Return the tools in `category` (or all, for [`ALL_CATEGORIES`]) whose
/// name or description contains `query`, case-insensitively.
///
/// Plain substring match, no ranking: the result keeps input order.
pub fn filter<'a>(tools: &'a [Tool], query: &str, category: &str) -> Vec<&'a Tool> {
    let query_lower = query.to_lowercase();
    tools
        .iter()
        .filter(|t| matches(t, &query_lower, category))
        .collect()
}

/// Count tools per category. [`ALL_CATEGORIES`] maps to the total.
pub fn category_counts(tools: &[Tool]) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for tool in tools {
        *counts.entry(tool.category.clone()).or_insert(0) += 1;
    }
    counts.insert(ALL_CATEGORIES.to_string(), tools.len());
    counts
}

/// Distinct non-empty categories, most populated first, behind a leading
/// [`ALL_CATEGORIES`] entry.
///
/// Ties keep first-seen order (the sort is stable).
pub fn category_list(tools: &[Tool], counts: &HashMap<String, usize>) -> Vec<String> {
    let mut unique: Vec<&str> = Vec::new();
    for tool in tools {
        let cat = tool.category.as_str();
        if cat.is_empty() || cat == ALL_CATEGORIES || unique.contains(&cat) {
            continue;
        }
        unique.push(cat);
    }

    unique.sort_by(|a, b| {
        let ca = counts.get(*a).copied().unwrap_or(0);
        let cb = counts.get(*b).copied().unwrap_or(0);
        cb.cmp(&ca)
    });

    std::iter::once(ALL_CATEGORIES)
        .chain(unique)
        .map(str::to_string)
        .collect()
}

/// One row of the category selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Category counts and display order for one catalog snapshot.
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    counts: HashMap<String, usize>,
    order: Vec<String>,
}

impl CategoryIndex {
    pub fn build(tools: &[Tool]) -> Self {
        let counts = category_counts(tools);
        let order = category_list(tools, &counts);
        Self { counts, order }
    }

    /// Number of tools in `category`; zero for unknown categories.
    pub fn count(&self, category: &str) -> usize {
        self.counts.get(category).copied().unwrap_or(0)
    }

    /// Categories in display order, [`ALL_CATEGORIES`] first.
    pub fn categories(&self) -> &[String] {
        &self.order
    }

    /// Number of real categories (excluding [`ALL_CATEGORIES`]).
    pub fn distinct(&self) -> usize {
        self.order.len().saturating_sub(1)
    }

    /// Whether `category` can be selected: [`ALL_CATEGORIES`] or a listed one.
    pub fn contains(&self, category: &str) -> bool {
        self.order.iter().any(|c| c == category)
    }

    pub fn rows(&self) -> Vec<CategoryCount> {
        self.order
            .iter()
            .map(|name| CategoryCount {
                name: name.clone(),
                count: self.count(name),
            })
            .collect()
    }
}
