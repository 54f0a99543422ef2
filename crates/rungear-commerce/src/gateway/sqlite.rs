//! SQLite gateway.
//!
//! Each call runs on a blocking worker with a connection scoped to that
//! call, so a failed call never leaks a connection.

use crate::cart::CartItem;
use crate::catalog::{Product, ProductQuery, SortKey};
use crate::checkout::NewOrder;
use crate::dates::{Clock, SystemClock};
use crate::error::CommerceError;
use crate::gateway::{
    demo_products, demo_promos, format_order_id, QuantityChange, QuantityFloor, ShopGateway,
    MAX_QUANTITY_PER_ITEM,
};
use crate::ids::{CartItemId, MemberId, OrderId, ProductId};
use crate::money::{Currency, Money};
use async_trait::async_trait;
use chrono::Datelike;
use rungear_db::{params, Db, DbError, FromRow, Row, Value};
use std::path::Path;
use std::sync::Arc;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    product_id           INTEGER PRIMARY KEY,
    name                 TEXT    NOT NULL,
    image_url            TEXT    NOT NULL DEFAULT '',
    category             TEXT    NOT NULL,
    brand                TEXT    NOT NULL,
    size                 TEXT    NOT NULL DEFAULT '',
    price_cents          INTEGER NOT NULL,
    original_price_cents INTEGER,
    rating               REAL    NOT NULL DEFAULT 0,
    review_count         INTEGER NOT NULL DEFAULT 0,
    in_stock             INTEGER NOT NULL DEFAULT 1,
    is_new               INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS cart_items (
    cart_item_id INTEGER PRIMARY KEY AUTOINCREMENT,
    member_id    INTEGER NOT NULL,
    product_id   INTEGER NOT NULL REFERENCES products(product_id),
    size         TEXT,
    color        TEXT,
    quantity     INTEGER NOT NULL CHECK (quantity >= 1),
    UNIQUE (member_id, product_id)
);

CREATE TABLE IF NOT EXISTS promo_codes (
    code           TEXT PRIMARY KEY COLLATE NOCASE,
    discount_cents INTEGER,
    expires_on     TEXT
);

CREATE TABLE IF NOT EXISTS orders (
    order_id           TEXT    PRIMARY KEY,
    sequence           INTEGER NOT NULL UNIQUE,
    member_id          INTEGER NOT NULL,
    full_name          TEXT    NOT NULL,
    email              TEXT    NOT NULL,
    phone              TEXT    NOT NULL,
    address            TEXT    NOT NULL,
    city               TEXT    NOT NULL,
    postal_code        TEXT    NOT NULL,
    delivery_option    TEXT    NOT NULL,
    payment_method     TEXT    NOT NULL,
    card_last4         TEXT,
    subtotal_cents     INTEGER NOT NULL,
    shipping_fee_cents INTEGER NOT NULL,
    discount_cents     INTEGER NOT NULL,
    total_cents        INTEGER NOT NULL,
    status             TEXT    NOT NULL DEFAULT 'Placed',
    created_at         TEXT    NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS order_items (
    order_item_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id         TEXT    NOT NULL REFERENCES orders(order_id),
    product_id       INTEGER NOT NULL,
    product_name     TEXT    NOT NULL,
    image_url        TEXT    NOT NULL,
    size             TEXT,
    color            TEXT,
    unit_price_cents INTEGER NOT NULL,
    quantity         INTEGER NOT NULL
);
"#;

const CART_SELECT: &str = "SELECT c.cart_item_id, c.product_id, p.name, p.image_url, c.size, \
     c.color, p.price_cents, c.quantity, p.in_stock \
     FROM cart_items c JOIN products p ON p.product_id = c.product_id";

impl FromRow for Product {
    fn from_row(row: &Row) -> Result<Self, DbError> {
        Ok(Self {
            id: ProductId::new(row.integer("product_id")?),
            name: row.text("name")?,
            image_url: row.text_or_empty("image_url")?,
            category: row.text("category")?,
            brand: row.text("brand")?,
            size: row.text_or_empty("size")?,
            price: Money::php(row.integer("price_cents")?),
            original_price: row.opt_integer("original_price_cents")?.map(Money::php),
            rating: row.real("rating")?,
            review_count: row.integer("review_count")?,
            in_stock: row.boolean("in_stock")?,
            is_new: row.boolean("is_new")?,
        })
    }
}

impl FromRow for CartItem {
    fn from_row(row: &Row) -> Result<Self, DbError> {
        Ok(Self {
            id: CartItemId::new(row.integer("cart_item_id")?),
            product_id: ProductId::new(row.integer("product_id")?),
            product_name: row.text("name")?,
            image_url: row.text_or_empty("image_url")?,
            size: row.text_or_empty("size")?,
            color: row.text_or_empty("color")?,
            unit_price: Money::php(row.integer("price_cents")?),
            quantity: row.integer("quantity")?,
            in_stock: row.boolean("in_stock")?,
        })
    }
}

/// Gateway over a SQLite database file.
#[derive(Clone)]
pub struct SqliteGateway {
    db: Db,
    floor: QuantityFloor,
    clock: Arc<dyn Clock>,
}

impl SqliteGateway {
    /// Open the database at `path`, creating the schema if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CommerceError> {
        let db = Db::open(path)?;
        db.execute_batch(SCHEMA)?;
        tracing::debug!(path = %db.path().display(), "sqlite schema ready");
        Ok(Self {
            db,
            floor: QuantityFloor::default(),
            clock: Arc::new(SystemClock),
        })
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

    /// Load the demo catalog and promo codes into an empty store.
    ///
    /// Returns how many products were inserted.
    pub fn seed_demo_data(&self) -> Result<usize, CommerceError> {
        let inserted = self.db.transaction(|c| {
            let existing = c.query("SELECT product_id FROM products LIMIT 1", params![])?;
            if !existing.is_empty() {
                return Ok(0);
            }
            let products = demo_products();
            for p in &products {
                c.execute(
                    "INSERT INTO products (product_id, name, image_url, category, brand, size, \
                     price_cents, original_price_cents, rating, review_count, in_stock, is_new) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    params![
                        p.id.get(),
                        &p.name,
                        &p.image_url,
                        &p.category,
                        &p.brand,
                        &p.size,
                        p.price.amount_cents,
                        p.original_price.map(|m| m.amount_cents),
                        p.rating,
                        p.review_count,
                        p.in_stock,
                        p.is_new,
                    ],
                )?;
            }
            for (code, amount) in demo_promos() {
                c.execute(
                    "INSERT OR IGNORE INTO promo_codes (code, discount_cents) VALUES (?, ?)",
                    params![code, amount.amount_cents],
                )?;
            }
            Ok(products.len())
        })?;
        if inserted > 0 {
            tracing::info!(products = inserted, "seeded demo catalog");
        }
        Ok(inserted)
    }

    /// Run `f` on a blocking worker.
    async fn run<R, F>(&self, f: F) -> Result<R, CommerceError>
    where
        F: FnOnce(&Db) -> Result<R, CommerceError> + Send + 'static,
        R: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| CommerceError::Gateway(format!("blocking task failed: {e}")))?
    }
}

/// WHERE clause and parameters for a product query.
fn product_sql(query: &ProductQuery) -> (String, Vec<Value>) {
    let mut clauses = vec!["price_cents <= ?".to_string()];
    let mut values = vec![Value::from(query.max_price.amount_cents)];

    for (column, csv) in [("category", &query.categories), ("brand", &query.brands)] {
        let selected = ProductQuery::values(csv);
        if !selected.is_empty() {
            let placeholders = vec!["?"; selected.len()].join(", ");
            clauses.push(format!("{} IN ({})", column, placeholders));
            values.extend(selected.into_iter().map(Value::from));
        }
    }

    let sizes = ProductQuery::values(&query.sizes);
    if !sizes.is_empty() {
        let any_size =
            vec!["instr(',' || REPLACE(size, ' ', '') || ',', ?) > 0"; sizes.len()].join(" OR ");
        clauses.push(format!("({})", any_size));
        values.extend(sizes.into_iter().map(|s| Value::from(format!(",{},", s))));
    }

    let order_by = match SortKey::parse(&query.sort_by).unwrap_or_default() {
        SortKey::Relevance => "product_id",
        SortKey::PriceAsc => "price_cents ASC, product_id",
        SortKey::PriceDesc => "price_cents DESC, product_id",
        SortKey::Newest => "is_new DESC, product_id DESC",
        SortKey::Rating => "rating DESC, review_count DESC, product_id",
    };

    let sql = format!(
        "SELECT * FROM products WHERE {} ORDER BY {}",
        clauses.join(" AND "),
        order_by
    );
    (sql, values)
}

#[async_trait]
impl ShopGateway for SqliteGateway {
    async fn get_products(&self, query: ProductQuery) -> Result<Vec<Product>, CommerceError> {
        self.run(move |db| {
            let (sql, values) = product_sql(&query);
            Ok(db.query_as(&sql, &values)?)
        })
        .await
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
        self.run(move |db| {
            let found = db.transaction(|c| {
                let exists = !c
                    .query(
                        "SELECT product_id FROM products WHERE product_id = ?",
                        params![product_id.get()],
                    )?
                    .is_empty();
                if exists {
                    c.execute(
                        "INSERT INTO cart_items (member_id, product_id, quantity) VALUES (?, ?, MIN(?, ?)) \
                         ON CONFLICT (member_id, product_id) \
                         DO UPDATE SET quantity = MIN(quantity + excluded.quantity, ?)",
                        params![
                            member_id.get(),
                            product_id.get(),
                            quantity,
                            MAX_QUANTITY_PER_ITEM,
                            MAX_QUANTITY_PER_ITEM,
                        ],
                    )?;
                }
                Ok(exists)
            })?;
            if found {
                Ok(())
            } else {
                Err(CommerceError::ProductNotFound(product_id.get()))
            }
        })
        .await
    }

    async fn get_cart_by_member(&self, member_id: MemberId) -> Result<Vec<CartItem>, CommerceError> {
        self.run(move |db| {
            let sql = format!("{} WHERE c.member_id = ? ORDER BY c.cart_item_id", CART_SELECT);
            Ok(db.query_as(&sql, params![member_id.get()])?)
        })
        .await
    }

    async fn remove_from_cart(&self, cart_item_id: CartItemId) -> Result<(), CommerceError> {
        self.run(move |db| {
            db.execute(
                "DELETE FROM cart_items WHERE cart_item_id = ?",
                params![cart_item_id.get()],
            )?;
            Ok(())
        })
        .await
    }

    async fn update_cart_qty(
        &self,
        cart_item_id: CartItemId,
        change: i64,
    ) -> Result<(), CommerceError> {
        let floor = self.floor;
        self.run(move |db| {
            db.transaction(|c| {
                let current = c.query(
                    "SELECT quantity FROM cart_items WHERE cart_item_id = ?",
                    params![cart_item_id.get()],
                )?;
                let Some(row) = current.first() else {
                    return Ok(());
                };
                match floor.apply(row.integer("quantity")?, change) {
                    QuantityChange::Set(quantity) => c.execute(
                        "UPDATE cart_items SET quantity = ? WHERE cart_item_id = ?",
                        params![quantity, cart_item_id.get()],
                    )?,
                    QuantityChange::Remove => c.execute(
                        "DELETE FROM cart_items WHERE cart_item_id = ?",
                        params![cart_item_id.get()],
                    )?,
                };
                Ok(())
            })?;
            Ok(())
        })
        .await
    }

    async fn validate_promo(&self, code: &str) -> Result<Option<Money>, CommerceError> {
        let code = code.trim().to_string();
        self.run(move |db| {
            let result = db.query(
                "SELECT discount_cents FROM promo_codes \
                 WHERE code = ? AND (expires_on IS NULL OR expires_on >= date('now'))",
                params![code],
            )?;
            let amount = match result.first() {
                Some(row) => row.opt_integer("discount_cents")?,
                None => None,
            };
            Ok(amount.map(|cents| Money::new(cents, Currency::PHP)))
        })
        .await
    }

    async fn place_order(&self, order: NewOrder) -> Result<OrderId, CommerceError> {
        let year = self.clock.today().year();
        self.run(move |db| {
            let order_id = db.transaction(|c| {
                let next = c.query(
                    "SELECT COALESCE(MAX(sequence), 0) + 1 AS next FROM orders",
                    params![],
                )?;
                let sequence = next.first().ok_or(DbError::NotFound)?.integer("next")?;
                let order_id = format_order_id(year, sequence);

                c.execute(
                    "INSERT INTO orders (order_id, sequence, member_id, full_name, email, phone, \
                     address, city, postal_code, delivery_option, payment_method, card_last4, \
                     subtotal_cents, shipping_fee_cents, discount_cents, total_cents) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    params![
                        order_id.as_str(),
                        sequence,
                        order.member_id.get(),
                        &order.full_name,
                        &order.email,
                        &order.phone,
                        &order.address,
                        &order.city,
                        &order.postal_code,
                        order.delivery_option.as_str(),
                        order.payment_method.as_str(),
                        order.masked_card(),
                        order.subtotal.amount_cents,
                        order.shipping_fee.amount_cents,
                        order.discount.amount_cents,
                        order.total.amount_cents,
                    ],
                )?;
                c.execute(
                    "INSERT INTO order_items (order_id, product_id, product_name, image_url, size, \
                     color, unit_price_cents, quantity) \
                     SELECT ?, c.product_id, p.name, p.image_url, c.size, c.color, p.price_cents, c.quantity \
                     FROM cart_items c JOIN products p ON p.product_id = c.product_id \
                     WHERE c.member_id = ? ORDER BY c.cart_item_id",
                    params![order_id.as_str(), order.member_id.get()],
                )?;
                c.execute(
                    "DELETE FROM cart_items WHERE member_id = ?",
                    params![order.member_id.get()],
                )?;
                Ok(order_id)
            })?;
            Ok(order_id)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogFilter;
    use crate::checkout::{DeliveryOption, PaymentMethod};
    use crate::dates::FixedClock;
    use chrono::NaiveDate;

    const MEMBER: MemberId = MemberId::new(9);

    fn gateway() -> (tempfile::TempDir, SqliteGateway) {
        let dir = tempfile::tempdir().unwrap();
        let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 11, 20).unwrap());
        let gateway = SqliteGateway::open(dir.path().join("shop.db"))
            .unwrap()
            .with_clock(Arc::new(clock));
        assert_eq!(gateway.seed_demo_data().unwrap(), demo_products().len());
        (dir, gateway)
    }

    fn order() -> NewOrder {
        NewOrder {
            member_id: MEMBER,
            full_name: "Ana Reyes".into(),
            email: "ana@example.ph".into(),
            phone: "0918".into(),
            address: "5 Osmena Blvd".into(),
            city: "Cebu City".into(),
            postal_code: "6000".into(),
            delivery_option: DeliveryOption::Standard,
            payment_method: PaymentMethod::Card,
            card_number: "4111 1111 1111 4242".into(),
            card_expiry: "01/28".into(),
            card_cvv: "999".into(),
            subtotal: Money::php(749_500),
            shipping_fee: Money::php(15_000),
            discount: Money::php(0),
            total: Money::php(764_500),
        }
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let (_dir, gateway) = gateway();
        assert_eq!(gateway.seed_demo_data().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_products_filtered_and_sorted() {
        let (_dir, gateway) = gateway();
        let filter = CatalogFilter {
            categories: vec!["Running Shoes".into()],
            sizes: vec!["10".into()],
            sort_by: "price_desc".into(),
            ..CatalogFilter::default()
        };
        let products = gateway.get_products(filter.to_query()).await.unwrap();

        assert!(!products.is_empty());
        assert!(products.iter().all(|p| p.category == "Running Shoes"));
        assert!(products.iter().all(|p| p.sizes().contains(&"10")));
        assert!(products
            .windows(2)
            .all(|w| w[0].price.amount_cents >= w[1].price.amount_cents));
    }

    #[tokio::test]
    async fn test_size_filter_matches_whole_sizes_only() {
        let (_dir, gateway) = gateway();
        let by_size = |size: &str| CatalogFilter {
            sizes: vec![size.to_string()],
            ..CatalogFilter::default()
        };

        for wildcard in ["%", "_", "%L%"] {
            let products = gateway
                .get_products(by_size(wildcard).to_query())
                .await
                .unwrap();
            assert!(products.is_empty(), "{wildcard} matched {}", products.len());
        }

        let large = gateway.get_products(by_size("L").to_query()).await.unwrap();
        let ids: Vec<i64> = large.iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![7, 8, 9, 12]);

        let extra_large = gateway.get_products(by_size("XL").to_query()).await.unwrap();
        assert_eq!(extra_large.len(), 2);
    }

    #[tokio::test]
    async fn test_cart_lifecycle() {
        let (_dir, gateway) = gateway();
        gateway.add_to_cart(MEMBER, ProductId::new(1), 1).await.unwrap();
        gateway.add_to_cart(MEMBER, ProductId::new(1), 1).await.unwrap();
        gateway.add_to_cart(MEMBER, ProductId::new(10), 1).await.unwrap();

        let items = gateway.get_cart_by_member(MEMBER).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[1].size, "");

        gateway.update_cart_qty(items[0].id, 1).await.unwrap();
        gateway.update_cart_qty(items[1].id, -1).await.unwrap();
        let items = gateway.get_cart_by_member(MEMBER).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);

        gateway.remove_from_cart(items[0].id).await.unwrap();
        assert!(gateway.get_cart_by_member(MEMBER).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_unknown_product() {
        let (_dir, gateway) = gateway();
        let result = gateway.add_to_cart(MEMBER, ProductId::new(404), 1).await;
        assert!(matches!(result, Err(CommerceError::ProductNotFound(404))));
    }

    #[tokio::test]
    async fn test_validate_promo() {
        let (_dir, gateway) = gateway();
        assert_eq!(
            gateway.validate_promo("run10").await.unwrap(),
            Some(Money::php(50_000))
        );
        assert_eq!(
            gateway.validate_promo("EXPIRED").await.unwrap(),
            Some(Money::php(0))
        );
        assert_eq!(gateway.validate_promo("MISSING").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_place_order_copies_lines_and_clears_cart() {
        let (_dir, gateway) = gateway();
        gateway.add_to_cart(MEMBER, ProductId::new(1), 1).await.unwrap();

        let first = gateway.place_order(order()).await.unwrap();
        assert_eq!(first.as_str(), "RG-2024-000001");
        assert!(gateway.get_cart_by_member(MEMBER).await.unwrap().is_empty());

        let copied = gateway
            .db
            .query(
                "SELECT quantity FROM order_items WHERE order_id = ?",
                params![first.as_str()],
            )
            .unwrap();
        assert_eq!(copied.len(), 1);

        let stored = gateway
            .db
            .query(
                "SELECT card_last4 FROM orders WHERE order_id = ?",
                params![first.as_str()],
            )
            .unwrap();
        let card = stored.first().unwrap().text("card_last4").unwrap();
        assert_eq!(card, "****4242");

        let second = gateway.place_order(order()).await.unwrap();
        assert_eq!(second.as_str(), "RG-2024-000002");
    }
}
