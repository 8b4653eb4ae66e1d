//! Catalog search query construction
//!
//! Validates the raw `/courses/search` query parameters into a typed filter
//! before the course repository turns it into SQL. All criteria compose with
//! logical AND over published courses; the only OR is inside the free-text
//! search itself (title, description, or instructor).

use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::models::course::Level;

/// Raw query parameters accepted by the course search endpoint
///
/// Numeric bounds arrive as text so that malformed values can be rejected
/// explicitly instead of disappearing inside deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSearchParams {
    /// Free-text search over title, description, and instructor
    pub query: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort_by: Option<String>,
}

/// Sort orderings supported by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    PriceLowToHigh,
    PriceHighToLow,
    /// Lexicographic over the free-text duration column ("8 weeks")
    Duration,
    Newest,
}

impl SortKey {
    /// Map the `sortBy` parameter to an ordering; unknown or missing values
    /// fall back to newest-first
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("price-low") => SortKey::PriceLowToHigh,
            Some("price-high") => SortKey::PriceHighToLow,
            Some("duration") => SortKey::Duration,
            _ => SortKey::Newest,
        }
    }

    /// ORDER BY fragment applied by the course repository
    pub fn order_by_sql(&self) -> &'static str {
        match self {
            SortKey::PriceLowToHigh => "price ASC",
            SortKey::PriceHighToLow => "price DESC",
            SortKey::Duration => "duration ASC",
            SortKey::Newest => "created_at DESC",
        }
    }
}

/// Validated course search filter
#[derive(Debug, Clone, PartialEq)]
pub struct CourseFilter {
    pub text: Option<String>,
    pub category: Option<String>,
    pub level: Option<Level>,
    /// Inclusive lower price bound
    pub min_price: Option<f64>,
    /// Inclusive upper price bound
    pub max_price: Option<f64>,
    pub sort: SortKey,
}

impl CourseFilter {
    /// Validate raw search parameters into a filter.
    ///
    /// Omitted or empty fields and the sentinel value `"all"` mean "no
    /// restriction". Non-numeric or negative price bounds are rejected with
    /// `InvalidInput`; they are never coerced into a number.
    pub fn from_params(params: &CourseSearchParams) -> ApiResult<Self> {
        let text = params
            .query
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        let category = normalize_choice(params.category.as_deref());

        let level = match normalize_choice(params.level.as_deref()) {
            Some(value) => Some(value.parse::<Level>().map_err(ApiError::InvalidInput)?),
            None => None,
        };

        let min_price = parse_price_bound("minPrice", params.min_price.as_deref())?;
        let max_price = parse_price_bound("maxPrice", params.max_price.as_deref())?;

        Ok(Self {
            text,
            category,
            level,
            min_price,
            max_price,
            sort: SortKey::from_param(params.sort_by.as_deref()),
        })
    }
}

/// Treat omitted, empty, and the sentinel `"all"` as "no restriction"
fn normalize_choice(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
        .map(String::from)
}

fn parse_price_bound(field: &str, value: Option<&str>) -> ApiResult<Option<f64>> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    let bound: f64 = raw
        .parse()
        .map_err(|_| ApiError::InvalidInput(format!("{} must be a number", field)))?;

    if !bound.is_finite() || bound < 0.0 {
        return Err(ApiError::InvalidInput(format!(
            "{} must be a non-negative number",
            field
        )));
    }

    Ok(Some(bound))
}

/// Escape ILIKE metacharacters and wrap the text in wildcards, so the
/// free-text search stays a plain substring match
pub fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_params_mean_no_restrictions() {
        let filter = CourseFilter::from_params(&CourseSearchParams::default()).unwrap();
        assert_eq!(filter.text, None);
        assert_eq!(filter.category, None);
        assert_eq!(filter.level, None);
        assert_eq!(filter.min_price, None);
        assert_eq!(filter.max_price, None);
        assert_eq!(filter.sort, SortKey::Newest);
    }

    #[test]
    fn test_all_sentinel_means_no_restriction() {
        let params = CourseSearchParams {
            category: Some("all".to_string()),
            level: Some("all".to_string()),
            ..Default::default()
        };

        let filter = CourseFilter::from_params(&params).unwrap();
        assert_eq!(filter.category, None);
        assert_eq!(filter.level, None);
    }

    #[test]
    fn test_blank_text_matches_all() {
        let params = CourseSearchParams {
            query: Some("   ".to_string()),
            ..Default::default()
        };

        let filter = CourseFilter::from_params(&params).unwrap();
        assert_eq!(filter.text, None);
    }

    #[test]
    fn test_supplied_criteria_are_kept() {
        let params = CourseSearchParams {
            query: Some("react".to_string()),
            category: Some("Web Development".to_string()),
            level: Some("beginner".to_string()),
            min_price: Some("50".to_string()),
            max_price: Some("150.5".to_string()),
            sort_by: Some("price-low".to_string()),
        };

        let filter = CourseFilter::from_params(&params).unwrap();
        assert_eq!(filter.text.as_deref(), Some("react"));
        assert_eq!(filter.category.as_deref(), Some("Web Development"));
        assert_eq!(filter.level, Some(Level::Beginner));
        assert_eq!(filter.min_price, Some(50.0));
        assert_eq!(filter.max_price, Some(150.5));
        assert_eq!(filter.sort, SortKey::PriceLowToHigh);
    }

    #[test]
    fn test_malformed_price_bound_is_rejected() {
        for bad in ["abc", "12abc", "NaN", "inf"] {
            let params = CourseSearchParams {
                min_price: Some(bad.to_string()),
                ..Default::default()
            };
            assert!(
                CourseFilter::from_params(&params).is_err(),
                "expected rejection for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_negative_price_bound_is_rejected() {
        let params = CourseSearchParams {
            max_price: Some("-5".to_string()),
            ..Default::default()
        };
        assert!(CourseFilter::from_params(&params).is_err());
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        let params = CourseSearchParams {
            level: Some("ninja".to_string()),
            ..Default::default()
        };
        assert!(CourseFilter::from_params(&params).is_err());
    }

    #[test]
    fn test_sort_key_mapping() {
        assert_eq!(
            SortKey::from_param(Some("price-low")),
            SortKey::PriceLowToHigh
        );
        assert_eq!(
            SortKey::from_param(Some("price-high")),
            SortKey::PriceHighToLow
        );
        assert_eq!(SortKey::from_param(Some("duration")), SortKey::Duration);
        assert_eq!(SortKey::from_param(Some("newest")), SortKey::Newest);
        assert_eq!(SortKey::from_param(None), SortKey::Newest);
    }

    #[test]
    fn test_price_sort_orders_are_exact_opposites() {
        assert_eq!(SortKey::PriceLowToHigh.order_by_sql(), "price ASC");
        assert_eq!(SortKey::PriceHighToLow.order_by_sql(), "price DESC");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("react"), "%react%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("snake_case"), "%snake\\_case%");
    }
}
