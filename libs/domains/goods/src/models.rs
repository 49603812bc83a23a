use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{GoodError, GoodResult};

/// Rendered as `category_name` when a good points at a category that no longer exists.
pub const NO_CATEGORY_LABEL: &str = "No category";

/// Page size of the by-category listing.
pub const CATEGORY_PAGE_SIZE: u64 = 10;

/// Namespace (sub-directory) uploaded good images are stored under.
pub const IMAGE_NAMESPACE: &str = "goods";

/// A good as it is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Good {
    pub id: Uuid,
    /// Display name, at most 50 characters
    pub name: String,
    /// Description, at most 255 characters
    pub content: String,
    pub price: f64,
    /// May reference a category that has since been deleted
    pub category_id: Uuid,
    /// Public URLs of the good's images, in display order
    pub img_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Read projection returned by every listing, lookup and search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GoodView {
    pub id: Uuid,
    pub name: String,
    pub content: String,
    pub price: f64,
    pub category_id: Uuid,
    /// Category name, or "No category" when the category is gone
    pub category_name: String,
    pub created_at: DateTime<Utc>,
    pub img_urls: Vec<String>,
    /// Number of reviews left for the good
    #[serde(rename = "reviewCount")]
    pub review_count: i64,
    /// Mean review stars, `null` when the good has no reviews
    #[serde(rename = "starAvg")]
    pub star_avg: Option<f64>,
}

impl GoodView {
    /// Rounds `starAvg` to two decimals, as the by-category listing reports it.
    pub fn with_rounded_average(mut self) -> Self {
        self.star_avg = self.star_avg.map(round_two);
        self
    }
}

/// Rounds half away from zero at two decimals.
///
/// The scaled value is first cut to 15 significant digits, so a mean such as
/// 1.005 rounds as the decimal it prints as (1.01) rather than as its binary
/// neighbour just below.
pub fn round_two(value: f64) -> f64 {
    let scaled = value * 100.0;
    let settled: f64 = format!("{:.14e}", scaled).parse().unwrap_or(scaled);
    settled.round() / 100.0
}

/// Validated fields for a new good; `img_urls` are already uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGood {
    pub name: String,
    pub content: String,
    pub price: f64,
    pub category_id: Uuid,
    pub img_urls: Vec<String>,
}

/// Full replacement of a good's editable fields.
#[derive(Debug, Clone, PartialEq)]
pub struct GoodChanges {
    pub name: String,
    pub content: String,
    pub price: f64,
    pub category_id: Uuid,
    pub img_urls: Vec<String>,
}

/// One page of a listing together with the numbers a client needs to page through it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    pub data: Vec<T>,
    /// 1-based page number
    pub current_page: u64,
    pub per_page: u64,
    pub total: u64,
    pub last_page: u64,
    /// 1-based position of the first item on this page
    pub from: Option<u64>,
    /// 1-based position of the last item on this page
    pub to: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, current_page: u64, per_page: u64, total: u64) -> Self {
        let last_page = if per_page == 0 {
            1
        } else {
            total.div_ceil(per_page).max(1)
        };
        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            let first = current_page.saturating_sub(1) * per_page + 1;
            (Some(first), Some(first + data.len() as u64 - 1))
        };

        Self {
            data,
            current_page,
            per_page,
            total,
            last_page,
            from,
            to,
        }
    }
}

/// Query string of the by-category listing.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number; missing, unparsable or values below 1 mean page 1
    #[param(value_type = Option<u64>)]
    pub page: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> u64 {
        self.page
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(1)
            .max(1)
    }
}

/// Query string of the search endpoint.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Text matched case-insensitively against name and content
    pub search: Option<String>,
}

/// A non-blank search term, matched exactly as submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    pub fn parse(raw: Option<&str>) -> GoodResult<Self> {
        match raw {
            Some(term) if !term.trim().is_empty() => Ok(Self(term.to_string())),
            _ => Err(GoodError::InvalidInput(
                "Please enter a search term".to_string(),
            )),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `%term%` with LIKE wildcards in the term escaped.
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.0.len() + 2);
        pattern.push('%');
        for ch in self.0.chars() {
            if matches!(ch, '\\' | '%' | '_') {
                pattern.push('\\');
            }
            pattern.push(ch);
        }
        pattern.push('%');
        pattern
    }

    /// Case-insensitive containment check used by the in-memory repository.
    pub fn matches(&self, text: &str) -> bool {
        text.to_lowercase().contains(&self.0.to_lowercase())
    }
}

/// Decodes the stored JSON text of `img_urls`; a missing or blank value is an empty list.
pub fn decode_img_urls(raw: Option<&str>) -> Result<Vec<String>, serde_json::Error> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(text) => serde_json::from_str(text),
    }
}

pub fn encode_img_urls(urls: &[String]) -> Result<String, serde_json::Error> {
    serde_json::to_string(urls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_two() {
        assert_eq!(round_two(3.666_666), 3.67);
        assert_eq!(round_two(4.0), 4.0);
        assert_eq!(round_two(2.125), 2.13);
        assert_eq!(round_two(4.875), 4.88);
    }

    #[test]
    fn test_round_two_uses_printed_decimal() {
        assert_eq!(round_two(1.005), 1.01);
        assert_eq!(round_two(2.675), 2.68);
        assert_eq!(round_two(41.0 / 40.0), 1.03);
        assert_eq!(round_two(1.004_999), 1.0);
    }

    #[test]
    fn test_page_math() {
        let page = Page::new(vec![1, 2, 3], 2, 10, 13);
        assert_eq!(page.last_page, 2);
        assert_eq!(page.from, Some(11));
        assert_eq!(page.to, Some(13));

        let empty: Page<i32> = Page::new(vec![], 1, 10, 0);
        assert_eq!(empty.last_page, 1);
        assert_eq!(empty.from, None);
    }

    #[test]
    fn test_page_query_clamps_to_first_page() {
        let query = |raw: Option<&str>| PageQuery {
            page: raw.map(str::to_string),
        };
        assert_eq!(query(None).page(), 1);
        assert_eq!(query(Some("0")).page(), 1);
        assert_eq!(query(Some("-1")).page(), 1);
        assert_eq!(query(Some("abc")).page(), 1);
        assert_eq!(query(Some("")).page(), 1);
        assert_eq!(query(Some("4")).page(), 4);
    }

    #[test]
    fn test_search_term_rejects_blank() {
        assert!(matches!(
            SearchTerm::parse(None),
            Err(GoodError::InvalidInput(_))
        ));
        assert!(matches!(
            SearchTerm::parse(Some("   ")),
            Err(GoodError::InvalidInput(_))
        ));
        assert_eq!(SearchTerm::parse(Some(" shirt")).unwrap().as_str(), " shirt");
        assert_eq!(SearchTerm::parse(Some(" shirt")).unwrap().like_pattern(), "% shirt%");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        let term = SearchTerm::parse(Some("50%_off\\")).unwrap();
        assert_eq!(term.like_pattern(), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn test_search_term_matches_case_insensitively() {
        let term = SearchTerm::parse(Some("CoTTon")).unwrap();
        assert!(term.matches("Organic cotton shirt"));
        assert!(!term.matches("Linen shirt"));
    }

    #[test]
    fn test_decode_img_urls() {
        assert!(decode_img_urls(None).unwrap().is_empty());
        assert!(decode_img_urls(Some("")).unwrap().is_empty());
        assert_eq!(
            decode_img_urls(Some(r#"["/storage/goods/a.png","/storage/goods/b.png"]"#)).unwrap(),
            vec!["/storage/goods/a.png", "/storage/goods/b.png"]
        );
        assert!(decode_img_urls(Some("not json")).is_err());
    }

    #[test]
    fn test_view_serializes_camel_case_aggregates() {
        let view = GoodView {
            id: Uuid::nil(),
            name: "Mug".to_string(),
            content: "Ceramic".to_string(),
            price: 9.5,
            category_id: Uuid::nil(),
            category_name: NO_CATEGORY_LABEL.to_string(),
            created_at: Utc::now(),
            img_urls: vec![],
            review_count: 0,
            star_avg: None,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["reviewCount"], 0);
        assert!(json["starAvg"].is_null());
        assert_eq!(json["category_name"], "No category");
    }
}
