//! Shared handler state.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rungear_auth::SessionManager;
use rungear_cache::{Cache, TicketStore};
use rungear_commerce::checkout::OrderConfirmation;
use rungear_commerce::dates::{Clock, SystemClock};
use rungear_commerce::gateway::{MemoryGateway, ShopGateway, SqliteGateway};
use rungear_commerce::money::Money;
use rungear_commerce::service::{CartService, CatalogService, CheckoutService};

use crate::config::{Backend, ShopConfig, StoreConfig};

/// Services and stores shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub carts: CartService,
    pub checkout: CheckoutService,
    pub sessions: SessionManager,
    /// Order snapshots waiting for the confirmation page.
    pub confirmations: TicketStore<OrderConfirmation>,
    /// Price ceiling applied when a request names none.
    pub default_max_price: Money,
    cache: Cache,
}

impl AppState {
    pub fn new(gateway: Arc<dyn ShopGateway>, config: &ShopConfig) -> Self {
        Self::with_clock(gateway, Arc::new(SystemClock), config)
    }

    pub fn with_clock(
        gateway: Arc<dyn ShopGateway>,
        clock: Arc<dyn Clock>,
        config: &ShopConfig,
    ) -> Self {
        let cache = Cache::new();
        Self {
            catalog: CatalogService::new(gateway.clone(), config.catalog.facets()),
            carts: CartService::new(gateway.clone(), clock.clone()),
            checkout: CheckoutService::new(gateway, clock),
            sessions: SessionManager::new(cache.clone(), config.session_config()),
            confirmations: TicketStore::new(
                cache.clone(),
                "confirmation",
                config.confirmation_ttl(),
            ),
            default_max_price: config.catalog.default_max_price(),
            cache,
        }
    }

    /// Drop expired sessions and confirmations, returning how many went.
    pub fn purge_expired(&self) -> usize {
        match self.cache.purge_expired() {
            Ok(purged) => purged,
            Err(err) => {
                tracing::warn!(error = %err, "cache sweep failed");
                0
            }
        }
    }

    /// Sweep expired entries every `every` until the runtime shuts down.
    pub fn spawn_cache_sweeper(&self, every: Duration) -> tokio::task::JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let purged = state.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, "expired cache entries dropped");
                }
            }
        })
    }
}

/// Open the gateway named by the store settings.
pub fn open_gateway(store: &StoreConfig) -> Result<Arc<dyn ShopGateway>> {
    match store.backend {
        Backend::Memory => {
            let gateway = if store.seed_demo_data {
                MemoryGateway::with_demo_data()
            } else {
                MemoryGateway::new()
            };
            tracing::info!(seeded = store.seed_demo_data, "using in-memory store");
            Ok(Arc::new(gateway.with_quantity_floor(store.quantity_floor)))
        }
        Backend::Sqlite => {
            let gateway = SqliteGateway::open(&store.database)
                .with_context(|| {
                    format!("Failed to open database: {}", store.database.display())
                })?
                .with_quantity_floor(store.quantity_floor);
            if store.seed_demo_data {
                let seeded = gateway
                    .seed_demo_data()
                    .context("Failed to seed demo data")?;
                tracing::info!(products = seeded, "demo data seeded");
            }
            tracing::info!(database = %store.database.display(), "using sqlite store");
            Ok(Arc::new(gateway))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rungear_commerce::catalog::{CatalogFilter, ProductQuery};
    use rungear_commerce::checkout::{CheckoutForm, PaymentMethod, PlaceOrderOutcome};
    use rungear_commerce::context::ShopContext;
    use rungear_commerce::ids::ProductId;

    async fn placed_order(state: &AppState) -> OrderConfirmation {
        let mut ctx = ShopContext::default();
        state
            .carts
            .add_item(&ctx, ProductId::new(1), 1)
            .await
            .unwrap();
        let form = CheckoutForm {
            full_name: "Maria Santos".into(),
            email: "maria@example.ph".into(),
            phone: "0917 555 0101".into(),
            address: "12 Katipunan Ave".into(),
            city: "Quezon City".into(),
            postal_code: "1108".into(),
            payment_method: PaymentMethod::Cod.as_str().into(),
            ..CheckoutForm::default()
        };
        match state.checkout.place_order(&mut ctx, form).await.unwrap() {
            PlaceOrderOutcome::Placed(confirmation) => confirmation,
            other => panic!("order not placed: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_sweeper_drops_unredeemed_confirmations() {
        let mut config = ShopConfig::default();
        config.server.confirmation_ttl_secs = 0;
        let state = AppState::new(Arc::new(MemoryGateway::with_demo_data()), &config);

        let confirmation = placed_order(&state).await;
        for _ in 0..10 {
            state.confirmations.issue(&confirmation).unwrap();
        }
        assert_eq!(state.cache.len().unwrap(), 10);

        let sweeper = state.spawn_cache_sweeper(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        sweeper.abort();
        assert!(state.cache.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_page_views_store_nothing() {
        let state = AppState::new(Arc::new(MemoryGateway::new()), &ShopConfig::default());
        for _ in 0..50 {
            let loaded = state.sessions.load(None).unwrap();
            state
                .sessions
                .save_changes(&loaded.id, &loaded.data, &loaded.data)
                .unwrap();
        }
        assert_eq!(state.purge_expired(), 0);
        assert!(state.cache.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_open_memory_gateway() {
        let gateway = open_gateway(&StoreConfig::default()).unwrap();
        let query = CatalogFilter::default().to_query();
        assert_eq!(gateway.get_products(query).await.unwrap().len(), 12);
    }

    #[tokio::test]
    async fn test_open_sqlite_gateway() {
        let dir = tempfile::tempdir().unwrap();
        let store = StoreConfig {
            backend: Backend::Sqlite,
            database: dir.path().join("shop.db"),
            ..StoreConfig::default()
        };
        let gateway = open_gateway(&store).unwrap();
        let query = ProductQuery {
            categories: Some("Apparel".to_string()),
            ..CatalogFilter::default().to_query()
        };
        let products = gateway.get_products(query).await.unwrap();
        assert_eq!(products.len(), 3);
        assert!(products.iter().all(|p| p.category == "Apparel"));
    }
}
