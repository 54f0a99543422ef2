//! Shop page view model and navigation facets.

use crate::catalog::{CatalogFilter, Product};
use serde::{Deserialize, Serialize};

/// A brand entry in the filter sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandFacet {
    pub name: String,
    pub count: u32,
}

/// Navigation facets shown beside the product grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFacets {
    /// Page heading.
    pub category_title: String,
    /// Category choices.
    pub categories: Vec<String>,
    /// Brand choices with their product counts.
    pub brands: Vec<BrandFacet>,
}

impl Default for CatalogFacets {
    fn default() -> Self {
        Self {
            category_title: "Running Gear".to_string(),
            categories: vec![
                "Running Shoes".to_string(),
                "Apparel".to_string(),
                "Accessories".to_string(),
            ],
            brands: vec![
                BrandFacet {
                    name: "Nike".to_string(),
                    count: 24,
                },
                BrandFacet {
                    name: "Adidas".to_string(),
                    count: 18,
                },
                BrandFacet {
                    name: "On Running".to_string(),
                    count: 9,
                },
            ],
        }
    }
}

/// Everything the shop page renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    pub products: Vec<Product>,
    /// Selections echoed back so the sidebar can show them.
    pub filter: CatalogFilter,
    #[serde(flatten)]
    pub facets: CatalogFacets,
    /// Items in the member's cart; zero for guests.
    pub cart_count: i64,
}
