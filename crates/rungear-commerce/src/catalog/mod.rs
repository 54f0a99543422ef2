//! Catalog types: products, filter selections and the shop page.

mod filter;
mod page;
mod product;

pub use filter::{CatalogFilter, ProductQuery, SortKey, DEFAULT_MAX_PRICE_MAJOR};
pub use page::{BrandFacet, CatalogFacets, CatalogPage};
pub use product::Product;
