use crate::catalog::{CatalogFacets, CatalogFilter, CatalogPage, Product};
use crate::context::ShopContext;
use crate::error::CommerceError;
use crate::gateway::ShopGateway;
use crate::service::member_cart_count;
use std::sync::Arc;

/// Product listing for the shop page.
#[derive(Clone)]
pub struct CatalogService {
    gateway: Arc<dyn ShopGateway>,
    facets: CatalogFacets,
}

impl CatalogService {
    pub fn new(gateway: Arc<dyn ShopGateway>, facets: CatalogFacets) -> Self {
        Self { gateway, facets }
    }

    /// Products matching `filter`, in one gateway call.
    pub async fn list_products(&self, filter: &CatalogFilter) -> Result<Vec<Product>, CommerceError> {
        let query = filter.to_query();
        tracing::debug!(?query, "listing products");
        self.gateway.get_products(query).await
    }

    /// Products plus navigation facets and the member's cart count.
    pub async fn catalog_page(
        &self,
        ctx: &ShopContext,
        filter: CatalogFilter,
    ) -> Result<CatalogPage, CommerceError> {
        let products = self.list_products(&filter).await?;
        let cart_count = member_cart_count(self.gateway.as_ref(), ctx.member_id).await?;
        Ok(CatalogPage {
            products,
            filter,
            facets: self.facets.clone(),
            cart_count,
        })
    }
}
