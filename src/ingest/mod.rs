//! Spreadsheet CSV ingestion.
//!
//! Turns a published sheet export (header row + one tool per row) into
//! [`Tool`] records. Column names vary between sheets, so each field is
//! looked up through an ordered alias list; the first alias present with
//! a non-blank value wins. See [`Field::aliases`] for the accepted names.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::{Tool, ToolStatus, DEFAULT_CATEGORY};

/// Ingestion failures. Ingestion is all-or-nothing: any of these rejects
/// the whole sheet.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to fetch catalog sheet {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("catalog sheet {url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to parse catalog CSV: {0}")]
    Parse(#[from] csv::Error),
}

// ---------------------------------------------------------------------------
// Field aliases
// ---------------------------------------------------------------------------

/// A tool field that can be read from a sheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Category,
    Description,
    Link,
    UseCases,
    ImageUrl,
    Pricing,
    Score,
    Status,
    PaymentLink,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Name,
        Field::Category,
        Field::Description,
        Field::Link,
        Field::UseCases,
        Field::ImageUrl,
        Field::Pricing,
        Field::Score,
        Field::Status,
        Field::PaymentLink,
    ];

    /// Accepted header names, in priority order. Matching is exact and
    /// case-sensitive.
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::Name => &["Name", "name", "Инструмент"],
            Field::Category => &["Category", "category", "Категория"],
            Field::Description => &["Description", "description", "Описание"],
            Field::Link => &["Link", "link", "Ссылка"],
            Field::UseCases => &["Use Cases", "use cases", "Кейсы"],
            Field::ImageUrl => &["Image URL", "image", "Картинка"],
            Field::Pricing => &["Pricing", "pricing", "Цена", "Стоимость"],
            Field::Score => &["Score", "score", "Рейтинг", "Оценка"],
            Field::Status => &["Status", "status", "Статус"],
            Field::PaymentLink => &["Payment Link", "payment_link", "Оплата"],
        }
    }
}

/// Column positions for each field, ordered by alias priority.
#[derive(Debug, Default)]
struct ColumnMap {
    columns: HashMap<Field, Vec<usize>>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let mut columns = HashMap::new();
        for field in Field::ALL {
            let positions: Vec<usize> = field
                .aliases()
                .iter()
                .filter_map(|alias| headers.iter().position(|h| h == *alias))
                .collect();
            if !positions.is_empty() {
                columns.insert(field, positions);
            }
        }
        Self { columns }
    }

    /// First non-blank value for `field` in `record`, trimmed.
    fn resolve<'r>(&self, field: Field, record: &'r csv::StringRecord) -> Option<&'r str> {
        self.columns
            .get(&field)?
            .iter()
            .filter_map(|&i| record.get(i))
            .map(str::trim)
            .find(|v| !v.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse the leading integer of `raw`, the way spreadsheet scores are
/// usually written ("7", " 9 ", "8/10", "7.5").
///
/// Returns `None` when no digits lead the value.
pub fn parse_score(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    let value: i64 = rest[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

fn build_tool(index: usize, columns: &ColumnMap, record: &csv::StringRecord) -> Tool {
    let get = |field| columns.resolve(field, record);
    let owned = |field| get(field).map(str::to_string);

    let status = get(Field::Status).and_then(|raw| match raw.parse::<ToolStatus>() {
        Ok(s) => Some(s),
        Err(e) => {
            debug!(row = index, error = %e, "ignoring unrecognised status");
            None
        }
    });

    Tool {
        id: format!("sheet-{index}"),
        name: get(Field::Name).unwrap_or("Untitled").to_string(),
        category: get(Field::Category).unwrap_or(DEFAULT_CATEGORY).to_string(),
        description: get(Field::Description).unwrap_or_default().to_string(),
        link: get(Field::Link).unwrap_or("#").to_string(),
        use_cases: get(Field::UseCases).unwrap_or_default().to_string(),
        image_url: owned(Field::ImageUrl),
        pricing: owned(Field::Pricing),
        score: get(Field::Score).and_then(parse_score),
        status,
        payment_link: owned(Field::PaymentLink),
    }
}

/// Parse a CSV body (header row first) into tools, in row order.
///
/// Empty lines are skipped by the reader; every other data row becomes a
/// tool, including rows of bare delimiters. Ids follow the data-row index.
/// A header-only body yields an empty list.
pub fn parse_tools(data: &[u8]) -> Result<Vec<Tool>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let columns = ColumnMap::from_headers(&headers);
    debug!(
        headers = headers.len(),
        mapped = columns.columns.len(),
        "catalog sheet headers resolved"
    );

    let mut tools = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        tools.push(build_tool(index, &columns, &record));
    }
    Ok(tools)
}

/// Download `url` and parse it with [`parse_tools`].
pub async fn fetch_tools(client: &reqwest::Client, url: &str) -> Result<Vec<Tool>, IngestError> {
    info!(url, "fetching catalog sheet");

    let fetch_err = |source| IngestError::Fetch {
        url: url.to_string(),
        source,
    };

    let resp = client.get(url).send().await.map_err(fetch_err)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(IngestError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = resp.bytes().await.map_err(fetch_err)?;
    let tools = parse_tools(&body)?;
    debug!(url, tools = tools.len(), bytes = body.len(), "catalog sheet parsed");
    Ok(tools)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_headers_map_directly() {
        let csv = "Name,Category,Description,Link,Use Cases,Pricing,Score,Status\n\
                   Cursor,Code,AI editor,https://cursor.sh,Refactoring,Pro: $20,9,active\n";
        let tools = parse_tools(csv.as_bytes()).unwrap();
        assert_eq!(tools.len(), 1);
        let t = &tools[0];
        assert_eq!(t.id, "sheet-0");
        assert_eq!(t.name, "Cursor");
        assert_eq!(t.category, "Code");
        assert_eq!(t.link, "https://cursor.sh");
        assert_eq!(t.pricing.as_deref(), Some("Pro: $20"));
        assert_eq!(t.score, Some(9));
        assert_eq!(t.status, Some(ToolStatus::Active));
        assert!(t.image_url.is_none());
    }

    #[test]
    fn localized_headers_are_accepted() {
        let csv = "Инструмент,Категория,Описание,Ссылка,Кейсы,Стоимость,Оценка,Статус,Оплата\n\
                   Suno,Аудио и звук,Музыка,https://suno.com,Песни • Джинглы,Бесплатно,8,cancelled,https://pay\n";
        let tools = parse_tools(csv.as_bytes()).unwrap();
        let t = &tools[0];
        assert_eq!(t.name, "Suno");
        assert_eq!(t.category, "Аудио и звук");
        assert_eq!(t.use_cases, "Песни • Джинглы");
        assert_eq!(t.pricing.as_deref(), Some("Бесплатно"));
        assert_eq!(t.score, Some(8));
        assert_eq!(t.status, Some(ToolStatus::Cancelled));
        assert_eq!(t.payment_link.as_deref(), Some("https://pay"));
    }

    #[test]
    fn earlier_alias_wins_but_blank_falls_through() {
        let csv = "Name,name,Инструмент\nPrimary,secondary,third\n,secondary,third\n , ,third\n";
        let tools = parse_tools(csv.as_bytes()).unwrap();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Primary", "secondary", "third"]);
    }

    #[test]
    fn header_matching_is_case_sensitive() {
        let csv = "NAME,CATEGORY\nShouty,Loud\n";
        let tools = parse_tools(csv.as_bytes()).unwrap();
        assert_eq!(tools[0].name, "Untitled");
        assert_eq!(tools[0].category, DEFAULT_CATEGORY);
    }

    #[test]
    fn missing_fields_get_defaults() {
        let csv = "Name\nLonely\n";
        let t = &parse_tools(csv.as_bytes()).unwrap()[0];
        assert_eq!(t.category, DEFAULT_CATEGORY);
        assert_eq!(t.description, "");
        assert_eq!(t.link, "#");
        assert_eq!(t.use_cases, "");
        assert!(t.score.is_none());
        assert!(t.status.is_none());
        assert!(t.pricing.is_none());
    }

    #[test]
    fn score_absent_when_blank_or_garbage() {
        let csv = "Name,Score\nA,\nB,n/a\nC,7\nD,8/10\nE,0\n";
        let scores: Vec<Option<i64>> = parse_tools(csv.as_bytes())
            .unwrap()
            .into_iter()
            .map(|t| t.score)
            .collect();
        assert_eq!(scores, vec![None, None, Some(7), Some(8), Some(0)]);
    }

    #[test]
    fn unknown_status_is_dropped() {
        let csv = "Name,Status\nA,paused\nB,Inactive\n";
        let tools = parse_tools(csv.as_bytes()).unwrap();
        assert!(tools[0].status.is_none());
        assert_eq!(tools[1].status, Some(ToolStatus::Inactive));
    }

    #[test]
    fn header_only_sheet_is_empty_not_error() {
        let tools = parse_tools(b"Name,Category,Description\n").unwrap();
        assert!(tools.is_empty());
        assert!(parse_tools(b"").unwrap().is_empty());
    }

    #[test]
    fn delimiter_rows_are_kept_and_ids_follow_data_rows() {
        let csv = "Name,Category\nA,X\n,\n\nB,Y\n";
        let tools = parse_tools(csv.as_bytes()).unwrap();
        let ids: Vec<&str> = tools.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["sheet-0", "sheet-1", "sheet-2"]);
        assert_eq!(tools[1].name, "Untitled");
        assert_eq!(tools[1].category, DEFAULT_CATEGORY);
        assert_eq!(tools[2].name, "B");
    }

    #[test]
    fn quoted_multiline_cells_survive() {
        let csv = "Name,Pricing\n\"Claude\",\"Free: limited\nPro: $20/mo\"\n";
        let t = &parse_tools(csv.as_bytes()).unwrap()[0];
        assert_eq!(t.pricing.as_deref(), Some("Free: limited\nPro: $20/mo"));
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let data = b"Name\n\xff\xfe\n";
        assert!(matches!(parse_tools(data), Err(IngestError::Parse(_))));
    }

    #[test]
    fn parse_score_forms() {
        assert_eq!(parse_score("7"), Some(7));
        assert_eq!(parse_score(" 9 "), Some(9));
        assert_eq!(parse_score("7.5"), Some(7));
        assert_eq!(parse_score("-2"), Some(-2));
        assert_eq!(parse_score("12"), Some(12));
        assert_eq!(parse_score("abc"), None);
        assert_eq!(parse_score(""), None);
        assert_eq!(parse_score("-"), None);
    }
}
