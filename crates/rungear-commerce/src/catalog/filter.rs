//! Shop page filter selections.

use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Price ceiling applied when the shopper picks none, in whole pesos.
pub const DEFAULT_MAX_PRICE_MAJOR: i64 = 10_000;

/// Sort orders the store understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
    Newest,
    Rating,
}

impl SortKey {
    /// Wire name of the sort key.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Relevance => "relevance",
            SortKey::PriceAsc => "price_asc",
            SortKey::PriceDesc => "price_desc",
            SortKey::Newest => "newest",
            SortKey::Rating => "rating",
        }
    }

    /// Parse a wire name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "relevance" => Some(SortKey::Relevance),
            "price_asc" => Some(SortKey::PriceAsc),
            "price_desc" => Some(SortKey::PriceDesc),
            "newest" => Some(SortKey::Newest),
            "rating" => Some(SortKey::Rating),
            _ => None,
        }
    }
}

/// Filter selections from the shop page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFilter {
    /// Selected categories.
    pub categories: Vec<String>,
    /// Selected brands.
    pub brands: Vec<String>,
    /// Selected sizes.
    pub sizes: Vec<String>,
    /// Price ceiling.
    pub max_price: Money,
    /// Requested sort; blank means relevance.
    pub sort_by: String,
}

impl Default for CatalogFilter {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            brands: Vec::new(),
            sizes: Vec::new(),
            max_price: Money::from_major(DEFAULT_MAX_PRICE_MAJOR, Currency::PHP),
            sort_by: SortKey::Relevance.as_str().to_string(),
        }
    }
}

impl CatalogFilter {
    /// Effective sort key. Unknown keys pass through unchanged.
    pub fn sort_key(&self) -> &str {
        let trimmed = self.sort_by.trim();
        if trimmed.is_empty() {
            SortKey::Relevance.as_str()
        } else {
            trimmed
        }
    }

    /// Flatten the selections into the gateway's product query.
    pub fn to_query(&self) -> ProductQuery {
        ProductQuery {
            categories: to_csv(&self.categories),
            brands: to_csv(&self.brands),
            sizes: to_csv(&self.sizes),
            max_price: self.max_price,
            sort_by: self.sort_key().to_string(),
        }
    }
}

/// Arguments of one product lookup.
///
/// Empty selections are `None`; non-empty ones are comma-joined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductQuery {
    pub categories: Option<String>,
    pub brands: Option<String>,
    pub sizes: Option<String>,
    pub max_price: Money,
    pub sort_by: String,
}

impl ProductQuery {
    /// Split a CSV selection back into its values.
    pub fn values(csv: &Option<String>) -> Vec<&str> {
        csv.as_deref()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn to_csv(values: &[String]) -> Option<String> {
    let kept: Vec<&str> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect();
    if kept.is_empty() {
        None
    } else {
        Some(kept.join(","))
    }
}
