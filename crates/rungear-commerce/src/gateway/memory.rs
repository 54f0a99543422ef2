//! In-process gateway backed by a mutex-guarded store.

use crate::cart::CartItem;
use crate::catalog::{Product, ProductQuery, SortKey};
use crate::checkout::{DeliveryOption, NewOrder, OrderItem, PaymentMethod};
use crate::dates::{Clock, SystemClock};
use crate::error::CommerceError;
use crate::gateway::{
    demo_products, demo_promos, format_order_id, QuantityChange, QuantityFloor, ShopGateway,
    MAX_QUANTITY_PER_ITEM,
};
use crate::ids::{CartItemId, MemberId, OrderId, ProductId};
use crate::money::Money;
use async_trait::async_trait;
use chrono::Datelike;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
struct StoredLine {
    id: CartItemId,
    member_id: MemberId,
    product_id: ProductId,
    quantity: i64,
}

/// A recorded order. Card details are kept masked; expiry and CVV are
/// never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredOrder {
    pub order_id: OrderId,
    pub member_id: MemberId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub delivery_option: DeliveryOption,
    pub payment_method: PaymentMethod,
    /// Masked card number, e.g. `****4242`.
    pub card_last4: Option<String>,
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub discount: Money,
    pub total: Money,
    pub items: Vec<OrderItem>,
}

impl StoredOrder {
    fn new(order_id: OrderId, order: NewOrder, items: Vec<OrderItem>) -> Self {
        Self {
            card_last4: order.masked_card(),
            order_id,
            member_id: order.member_id,
            full_name: order.full_name,
            email: order.email,
            phone: order.phone,
            address: order.address,
            city: order.city,
            postal_code: order.postal_code,
            delivery_option: order.delivery_option,
            payment_method: order.payment_method,
            subtotal: order.subtotal,
            shipping_fee: order.shipping_fee,
            discount: order.discount,
            total: order.total,
            items,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    products: Vec<Product>,
    lines: Vec<StoredLine>,
    promos: HashMap<String, Money>,
    orders: Vec<StoredOrder>,
    next_line_id: i64,
}

impl State {
    fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}

/// Gateway that keeps everything in memory.
///
/// Cloning yields another handle to the same store.
#[derive(Clone)]
pub struct MemoryGateway {
    state: Arc<Mutex<State>>,
    floor: QuantityFloor,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    /// An empty store.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                next_line_id: 1,
                ..State::default()
            })),
            floor: QuantityFloor::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// A store seeded with the demo catalog and promo codes.
    pub fn with_demo_data() -> Self {
        let gateway = Self::new().with_products(demo_products());
        for (code, amount) in demo_promos() {
            gateway.insert_promo(code, amount);
        }
        gateway
    }

    /// Set the below-one policy.
    pub fn with_quantity_floor(mut self, floor: QuantityFloor) -> Self {
        self.floor = floor;
        self
    }

    /// Use `clock` for order-number years.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the catalog.
    pub fn with_products(self, products: Vec<Product>) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.products = products;
        }
        self
    }

    /// Register (or replace) a promo code.
    pub fn insert_promo(&self, code: &str, amount: Money) {
        if let Ok(mut state) = self.state.lock() {
            state.promos.insert(code.to_ascii_uppercase(), amount);
        }
    }

    /// Orders recorded so far, oldest first.
    pub fn orders(&self) -> Vec<StoredOrder> {
        self.state
            .lock()
            .map(|s| s.orders.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, CommerceError> {
        self.state
            .lock()
            .map_err(|e| CommerceError::Gateway(e.to_string()))
    }
}

fn matches(product: &Product, query: &ProductQuery) -> bool {
    let categories = ProductQuery::values(&query.categories);
    let brands = ProductQuery::values(&query.brands);
    let sizes = ProductQuery::values(&query.sizes);

    (categories.is_empty() || categories.contains(&product.category.as_str()))
        && (brands.is_empty() || brands.contains(&product.brand.as_str()))
        && (sizes.is_empty() || product.sizes().iter().any(|s| sizes.contains(s)))
        && product.price.amount_cents <= query.max_price.amount_cents
}

fn sort(products: &mut [Product], sort_by: &str) {
    match SortKey::parse(sort_by).unwrap_or_default() {
        SortKey::Relevance => {}
        SortKey::PriceAsc => products.sort_by_key(|p| p.price.amount_cents),
        SortKey::PriceDesc => products.sort_by_key(|p| std::cmp::Reverse(p.price.amount_cents)),
        SortKey::Newest => products.sort_by_key(|p| (!p.is_new, std::cmp::Reverse(p.id))),
        SortKey::Rating => products.sort_by(|a, b| {
            b.rating
                .total_cmp(&a.rating)
                .then(b.review_count.cmp(&a.review_count))
        }),
    }
}

#[async_trait]
impl ShopGateway for MemoryGateway {
    async fn get_products(&self, query: ProductQuery) -> Result<Vec<Product>, CommerceError> {
        let state = self.lock()?;
        let mut products: Vec<Product> = state
            .products
            .iter()
            .filter(|p| matches(p, &query))
            .cloned()
            .collect();
        sort(&mut products, &query.sort_by);
        Ok(products)
    }

    async fn add_to_cart(
        &self,
        member_id: MemberId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<(), CommerceError> {
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        let mut state = self.lock()?;
        if state.product(product_id).is_none() {
            return Err(CommerceError::ProductNotFound(product_id.get()));
        }

        if let Some(line) = state
            .lines
            .iter_mut()
            .find(|l| l.member_id == member_id && l.product_id == product_id)
        {
            line.quantity = line
                .quantity
                .saturating_add(quantity)
                .min(MAX_QUANTITY_PER_ITEM);
            return Ok(());
        }

        let id = CartItemId::new(state.next_line_id);
        state.next_line_id += 1;
        state.lines.push(StoredLine {
            id,
            member_id,
            product_id,
            quantity: quantity.min(MAX_QUANTITY_PER_ITEM),
        });
        Ok(())
    }

    async fn get_cart_by_member(&self, member_id: MemberId) -> Result<Vec<CartItem>, CommerceError> {
        let state = self.lock()?;
        let items = state
            .lines
            .iter()
            .filter(|l| l.member_id == member_id)
            .filter_map(|line| {
                state.product(line.product_id).map(|product| CartItem {
                    id: line.id,
                    product_id: product.id,
                    product_name: product.name.clone(),
                    image_url: product.image_url.clone(),
                    size: String::new(),
                    color: String::new(),
                    unit_price: product.price,
                    quantity: line.quantity,
                    in_stock: product.in_stock,
                })
            })
            .collect();
        Ok(items)
    }

    async fn remove_from_cart(&self, cart_item_id: CartItemId) -> Result<(), CommerceError> {
        self.lock()?.lines.retain(|l| l.id != cart_item_id);
        Ok(())
    }

    async fn update_cart_qty(
        &self,
        cart_item_id: CartItemId,
        change: i64,
    ) -> Result<(), CommerceError> {
        let mut state = self.lock()?;
        let Some(index) = state.lines.iter().position(|l| l.id == cart_item_id) else {
            return Ok(());
        };
        match self.floor.apply(state.lines[index].quantity, change) {
            QuantityChange::Set(quantity) => state.lines[index].quantity = quantity,
            QuantityChange::Remove => {
                state.lines.remove(index);
            }
        }
        Ok(())
    }

    async fn validate_promo(&self, code: &str) -> Result<Option<Money>, CommerceError> {
        let state = self.lock()?;
        Ok(state.promos.get(&code.trim().to_ascii_uppercase()).copied())
    }

    async fn place_order(&self, order: NewOrder) -> Result<OrderId, CommerceError> {
        let year = self.clock.today().year();
        let mut state = self.lock()?;

        let items: Vec<OrderItem> = state
            .lines
            .iter()
            .filter(|l| l.member_id == order.member_id)
            .filter_map(|line| {
                state.product(line.product_id).map(|product| OrderItem {
                    product_id: product.id,
                    product_name: product.name.clone(),
                    image_url: product.image_url.clone(),
                    size: String::new(),
                    color: String::new(),
                    unit_price: product.price,
                    quantity: line.quantity,
                })
            })
            .collect();

        let sequence = state.orders.len() as i64 + 1;
        let order_id = format_order_id(year, sequence);
        state.lines.retain(|l| l.member_id != order.member_id);
        state
            .orders
            .push(StoredOrder::new(order_id.clone(), order, items));
        Ok(order_id)
    }
}
