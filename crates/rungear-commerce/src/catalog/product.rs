//! Product types.

use crate::ids::ProductId;
use crate::money::Money;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// A catalog product as listed on the shop page.
///
/// Serializes with its derived `discountPercent` alongside the stored fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Image URL.
    pub image_url: String,
    /// Category name (e.g. "Running Shoes").
    pub category: String,
    /// Brand name.
    pub brand: String,
    /// Available sizes as CSV, e.g. `"S,M,L,XL"`.
    pub size: String,
    /// Current selling price.
    pub price: Money,
    /// Price before markdown, if the product is on sale.
    pub original_price: Option<Money>,
    /// Average review rating.
    pub rating: f64,
    /// Number of reviews.
    pub review_count: i64,
    /// Whether the product can be ordered.
    pub in_stock: bool,
    /// Whether the product carries the "new" badge.
    pub is_new: bool,
}

impl Product {
    /// Markdown as a whole percentage of the original price.
    ///
    /// Zero when there is no positive original price. Midpoints round to
    /// the even neighbour, so 12.5% reports as 12.
    pub fn discount_percent(&self) -> i64 {
        match self.original_price {
            Some(original) if original.is_positive() => {
                discount_percent(self.price.amount_cents, original.amount_cents)
            }
            _ => 0,
        }
    }

    /// Individual sizes, with blanks dropped.
    pub fn sizes(&self) -> Vec<&str> {
        self.size
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Whether the product is marked down.
    pub fn is_on_sale(&self) -> bool {
        self.discount_percent() > 0
    }
}

impl Serialize for Product {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Product", 13)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("imageUrl", &self.image_url)?;
        state.serialize_field("category", &self.category)?;
        state.serialize_field("brand", &self.brand)?;
        state.serialize_field("size", &self.size)?;
        state.serialize_field("price", &self.price)?;
        state.serialize_field("originalPrice", &self.original_price)?;
        state.serialize_field("discountPercent", &self.discount_percent())?;
        state.serialize_field("rating", &self.rating)?;
        state.serialize_field("reviewCount", &self.review_count)?;
        state.serialize_field("inStock", &self.in_stock)?;
        state.serialize_field("isNew", &self.is_new)?;
        state.end()
    }
}

/// `round((1 - price / original) * 100)` with ties to even, in exact
/// integer arithmetic. `original` must be positive.
fn discount_percent(price: i64, original: i64) -> i64 {
    let num = (i128::from(original) - i128::from(price)) * 100;
    let den = i128::from(original);
    let quotient = num.div_euclid(den);
    let twice_rem = num.rem_euclid(den) * 2;
    let rounded = match twice_rem.cmp(&den) {
        std::cmp::Ordering::Less => quotient,
        std::cmp::Ordering::Greater => quotient + 1,
        std::cmp::Ordering::Equal if quotient % 2 == 0 => quotient,
        std::cmp::Ordering::Equal => quotient + 1,
    };
    rounded.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: i64, original: Option<i64>) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Pegasus 41".into(),
            image_url: "/img/pegasus.jpg".into(),
            category: "Running Shoes".into(),
            brand: "Nike".into(),
            size: "8, 9,,10 ".into(),
            price: Money::php(price),
            original_price: original.map(Money::php),
            rating: 4.6,
            review_count: 212,
            in_stock: true,
            is_new: false,
        }
    }

    #[test]
    fn test_discount_percent() {
        assert_eq!(product(8_000, Some(10_000)).discount_percent(), 20);
        assert_eq!(product(8_000, None).discount_percent(), 0);
        assert_eq!(product(8_000, Some(0)).discount_percent(), 0);
    }

    #[test]
    fn test_discount_percent_rounds_half_to_even() {
        assert_eq!(product(8_750, Some(10_000)).discount_percent(), 12);
        assert_eq!(product(8_650, Some(10_000)).discount_percent(), 14);
        assert_eq!(product(6_667, Some(10_000)).discount_percent(), 33);
    }

    #[test]
    fn test_price_above_original_is_negative() {
        assert_eq!(product(11_000, Some(10_000)).discount_percent(), -10);
        assert!(!product(11_000, Some(10_000)).is_on_sale());
    }

    #[test]
    fn test_sizes_split() {
        assert_eq!(product(1, None).sizes(), vec!["8", "9", "10"]);
    }

    #[test]
    fn test_serializes_camel_case_with_discount() {
        let json = serde_json::to_value(product(8_000, Some(10_000))).unwrap();
        assert_eq!(json["discountPercent"], 20);
        assert_eq!(json["imageUrl"], "/img/pegasus.jpg");
        assert_eq!(json["originalPrice"]["amountCents"], 10_000);
        assert_eq!(json["reviewCount"], 212);
        assert_eq!(json["inStock"], true);
        assert!(json.get("image_url").is_none());

        let back: Product = serde_json::from_value(json).unwrap();
        assert_eq!(back, product(8_000, Some(10_000)));
    }
}
