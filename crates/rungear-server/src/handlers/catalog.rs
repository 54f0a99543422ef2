//! Shop page.

use axum::extract::{Query, State};
use axum::response::Response;
use rungear_commerce::catalog::CatalogFilter;
use rungear_commerce::money::{Currency, Money};

use crate::error::AppError;
use crate::session::CurrentSession;
use crate::state::AppState;

/// `GET /` and `GET /shop`.
pub(crate) async fn shop_page(
    State(state): State<AppState>,
    mut session: CurrentSession,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let filter = filter_from_query(&params, state.default_max_price);
    let ctx = session.data.context();
    let page = state.catalog.catalog_page(&ctx, filter).await?;
    let view = session.render(&state, page);
    session.commit(&state, view)
}

/// Build a filter from query pairs.
///
/// List parameters may repeat, hold comma-separated values, or both. An
/// unparseable `maxPrice` keeps `default_max_price`.
pub(crate) fn filter_from_query(params: &[(String, String)], default_max_price: Money) -> CatalogFilter {
    let mut filter = CatalogFilter {
        max_price: default_max_price,
        ..CatalogFilter::default()
    };

    for (key, value) in params {
        match key.as_str() {
            "categories" => push_csv(&mut filter.categories, value),
            "brands" => push_csv(&mut filter.brands, value),
            "sizes" => push_csv(&mut filter.sizes, value),
            "maxPrice" => match value.trim().parse::<f64>() {
                Ok(amount) if amount.is_finite() && amount >= 0.0 => {
                    filter.max_price = Money::from_decimal(amount, Currency::PHP);
                }
                _ => tracing::debug!(value = %value, "ignoring unparseable maxPrice"),
            },
            "sortBy" => filter.sort_by = value.trim().to_string(),
            _ => {}
        }
    }
    filter
}

fn push_csv(target: &mut Vec<String>, value: &str) {
    target.extend(
        value
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(ToString::to_string),
    );
}
