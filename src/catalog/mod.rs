//! Tool catalog: the record model, the immutable snapshot, and the
//! derived views the presentation layers read from it.
//!
//! A [`Catalog`] is built once from a seed file or a spreadsheet export
//! and never mutated afterwards; refreshing means building a new one and
//! swapping it into the [`CatalogStore`].

pub mod filter;
pub mod plural;
pub mod store;
pub mod text;

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub use filter::{CategoryIndex, ALL_CATEGORIES};
pub use store::CatalogStore;
pub use text::PricingPlan;

/// Category assigned to records whose source leaves it blank.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Payment link shown when a record has none of its own.
pub const DEFAULT_PAYMENT_LINK: &str = "https://t.me/paymentserv_bot";

// ---------------------------------------------------------------------------
// Tool record
// ---------------------------------------------------------------------------

/// Usage status of a tool from the catalog owner's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    /// Currently in use (paid or subscribed).
    Active,
    Cancelled,
    Inactive,
}

impl ToolStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolStatus::Active => "active",
            ToolStatus::Cancelled => "cancelled",
            ToolStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolStatus {
    type Err = anyhow::Error;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(ToolStatus::Active),
            "cancelled" => Ok(ToolStatus::Cancelled),
            "inactive" => Ok(ToolStatus::Inactive),
            other => anyhow::bail!("unknown tool status '{other}'"),
        }
    }
}

/// One catalog entry describing an external product or service.
///
/// Field names serialise in camelCase so the JSON shape matches what
/// dashboard frontends already consume (`useCases`, `imageUrl`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_link")]
    pub link: String,
    /// Several use cases in one string, separated by newlines or `•`.
    /// Split with [`text::split_use_cases`].
    #[serde(default)]
    pub use_cases: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// One pricing plan per line, `Plan: details`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<String>,
    /// Informal 0–10 rating. Not clamped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ToolStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_link: Option<String>,
}

fn default_link() -> String {
    "#".to_string()
}

/// A tool together with the presentation-ready parse of its weakly
/// structured fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDetail {
    #[serde(flatten)]
    pub tool: Tool,
    pub use_case_list: Vec<String>,
    pub pricing_plans: Vec<PricingPlan>,
    /// The tool's own payment link, or the configured default.
    pub checkout_link: String,
}

impl ToolDetail {
    pub fn new(tool: &Tool, default_payment_link: &str) -> Self {
        let checkout_link = tool
            .payment_link
            .clone()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| default_payment_link.to_string());
        Self {
            use_case_list: text::split_use_cases(&tool.use_cases),
            pricing_plans: tool
                .pricing
                .as_deref()
                .map(text::split_pricing_plans)
                .unwrap_or_default(),
            checkout_link,
            tool: tool.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Where the current snapshot came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "location", rename_all = "lowercase")]
pub enum CatalogSource {
    Seed(String),
    Sheet(String),
    Empty,
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::Seed(path) => write!(f, "seed file {path}"),
            CatalogSource::Sheet(url) => write!(f, "sheet {url}"),
            CatalogSource::Empty => f.write_str("empty"),
        }
    }
}

/// Immutable catalog snapshot plus its category index.
///
/// The index is computed once here and reused by every query against
/// the snapshot.
#[derive(Debug, Clone)]
pub struct Catalog {
    tools: Vec<Tool>,
    index: CategoryIndex,
    source: CatalogSource,
}

impl Catalog {
    pub fn new(tools: Vec<Tool>, source: CatalogSource) -> Self {
        let index = CategoryIndex::build(&tools);
        Self {
            tools,
            index,
            source,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), CatalogSource::Empty)
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn index(&self) -> &CategoryIndex {
        &self.index
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.id == id)
    }

    /// Tools matching `query` within `category` (see [`filter::filter`]).
    pub fn search(&self, query: &str, category: &str) -> Vec<&Tool> {
        filter::filter(&self.tools, query, category)
    }
}

// ---------------------------------------------------------------------------
// Seed files
// ---------------------------------------------------------------------------

/// Parse a YAML list of tools.
///
/// Blank categories are replaced with [`DEFAULT_CATEGORY`]; duplicate ids
/// are rejected.
pub fn parse_seed(contents: &str) -> anyhow::Result<Vec<Tool>> {
    let mut tools: Vec<Tool> =
        serde_yaml_ng::from_str(contents).context("failed to parse catalog seed YAML")?;

    let mut seen = HashSet::new();
    for tool in &mut tools {
        if !seen.insert(tool.id.clone()) {
            anyhow::bail!("catalog seed: duplicate tool id: {}", tool.id);
        }
        if tool.category.trim().is_empty() {
            tool.category = DEFAULT_CATEGORY.to_string();
        }
    }
    Ok(tools)
}

/// Read and parse a seed file into a catalog snapshot.
pub async fn load_seed(path: &Path) -> anyhow::Result<Catalog> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read catalog seed: {}", path.display()))?;
    let tools = parse_seed(&contents)?;
    tracing::debug!(path = %path.display(), tools = tools.len(), "catalog seed loaded");
    Ok(Catalog::new(
        tools,
        CatalogSource::Seed(path.display().to_string()),
    ))
}
