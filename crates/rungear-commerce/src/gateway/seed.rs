//! Demo catalog shared by the in-memory and SQLite stores.

use crate::catalog::Product;
use crate::ids::ProductId;
use crate::money::{Currency, Money};

fn pesos(amount: i64) -> Money {
    Money::from_major(amount, Currency::PHP)
}

#[allow(clippy::too_many_arguments)]
fn product(
    id: i64,
    name: &str,
    category: &str,
    brand: &str,
    size: &str,
    price: i64,
    original: Option<i64>,
    rating: f64,
    reviews: i64,
    in_stock: bool,
    is_new: bool,
) -> Product {
    let slug = name.to_ascii_lowercase().replace(' ', "-");
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        image_url: format!("/images/products/{}.jpg", slug),
        category: category.to_string(),
        brand: brand.to_string(),
        size: size.to_string(),
        price: pesos(price),
        original_price: original.map(pesos),
        rating,
        review_count: reviews,
        in_stock,
        is_new,
    }
}

/// Products listed by a freshly seeded store.
pub fn demo_products() -> Vec<Product> {
    const SHOE_SIZES: &str = "7,8,9,10,11";
    const APPAREL_SIZES: &str = "S,M,L,XL";
    vec![
        product(1, "Pegasus 41", "Running Shoes", "Nike", SHOE_SIZES, 7_495, None, 4.7, 312, true, true),
        product(2, "Vomero 17", "Running Shoes", "Nike", SHOE_SIZES, 6_995, Some(8_495), 4.5, 188, true, false),
        product(3, "Ultraboost Light", "Running Shoes", "Adidas", SHOE_SIZES, 9_500, Some(11_000), 4.6, 240, true, false),
        product(4, "Adizero SL", "Running Shoes", "Adidas", "8,9,10", 5_800, None, 4.3, 97, true, true),
        product(5, "Cloudmonster", "Running Shoes", "On Running", SHOE_SIZES, 9_990, None, 4.8, 156, true, false),
        product(6, "Cloudsurfer", "Running Shoes", "On Running", "7,8,9", 8_490, Some(9_990), 4.4, 71, false, false),
        product(7, "Dri-FIT Miler Tee", "Apparel", "Nike", APPAREL_SIZES, 1_495, None, 4.5, 420, true, false),
        product(8, "Own The Run Shorts", "Apparel", "Adidas", APPAREL_SIZES, 1_800, Some(2_200), 4.2, 133, true, false),
        product(9, "Performance-T", "Apparel", "On Running", "S,M,L", 2_990, None, 4.6, 58, true, true),
        product(10, "Swoosh Run Cap", "Accessories", "Nike", "", 1_195, None, 4.4, 204, true, false),
        product(11, "Running Belt", "Accessories", "Adidas", "", 990, Some(1_290), 4.0, 45, true, false),
        product(12, "Ultralight Socks", "Accessories", "On Running", "S,M,L", 890, None, 4.7, 112, true, true),
    ]
}

/// Promo codes and the flat discount each is worth.
///
/// `EXPIRED` is stored with no value so it is always rejected.
pub fn demo_promos() -> Vec<(&'static str, Money)> {
    vec![
        ("RUN10", pesos(500)),
        ("RUNGEAR1500", pesos(1_500)),
        ("FREESHIP", pesos(150)),
        ("EXPIRED", pesos(0)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_demo_ids_unique() {
        let products = demo_products();
        let ids: HashSet<_> = products.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), products.len());
    }

    #[test]
    fn test_demo_prices_under_default_ceiling() {
        let ceiling = pesos(crate::catalog::DEFAULT_MAX_PRICE_MAJOR);
        assert!(demo_products()
            .iter()
            .all(|p| p.price.amount_cents <= ceiling.amount_cents));
    }
}
