//! Per-request session extraction and write-back.

use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::{async_trait, Json};
use rungear_auth::{FlashMessage, SessionId, ShopSession};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

/// Header a client may use instead of the `csrfToken` form field.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// The shopper's session for this request.
///
/// Handlers mutate `data` and hand their response to [`CurrentSession::commit`],
/// which stores what changed and sets the cookie.
#[derive(Debug)]
pub struct CurrentSession {
    pub id: SessionId,
    pub data: ShopSession,
    loaded: ShopSession,
    csrf_header: Option<String>,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let cookie = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|header| state.sessions.cookie_value(header));
        let loaded = state.sessions.load(cookie)?;
        let csrf_header = parts
            .headers
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);

        Ok(Self {
            id: loaded.id,
            loaded: loaded.data.clone(),
            data: loaded.data,
            csrf_header,
        })
    }
}

/// A JSON view plus the session fields every page shows.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView<T> {
    #[serde(flatten)]
    pub body: T,
    pub csrf_token: String,
    pub flash: Vec<FlashMessage>,
}

impl CurrentSession {
    /// Check the form token, or the header when the form has none.
    pub fn verify_csrf(&self, state: &AppState, form_token: Option<&str>) -> Result<(), AppError> {
        if !state.sessions.config().csrf_enabled {
            return Ok(());
        }
        let token = form_token
            .filter(|t| !t.is_empty())
            .or(self.csrf_header.as_deref());
        state.sessions.verify_csrf(&self.id, token)?;
        Ok(())
    }

    /// Wrap `body` for display, consuming pending flash messages.
    pub fn render<T: Serialize>(&mut self, state: &AppState, body: T) -> Json<PageView<T>> {
        Json(PageView {
            body,
            csrf_token: state.sessions.csrf_token(&self.id),
            flash: self.data.take_flash(),
        })
    }

    /// Store what this request changed and attach the cookie to `response`.
    pub fn commit(self, state: &AppState, response: impl IntoResponse) -> Result<Response, AppError> {
        state
            .sessions
            .save_changes(&self.id, &self.loaded, &self.data)?;
        let cookie = HeaderValue::from_str(&state.sessions.set_cookie(&self.id))?;
        let mut response = response.into_response();
        response.headers_mut().append(SET_COOKIE, cookie);
        Ok(response)
    }
}
