pub mod admin;
pub mod health;
pub mod league;
pub mod profile;
pub mod registration;
pub mod session;

use axum::{
    Json,
    response::{IntoResponse, Redirect, Response},
};

use crate::domain::workflow::{LoadError, RedirectTarget};
use crate::error::PortalError;
use crate::state::AppState;

/// Where a registrant can pick another league after a fatal load error.
pub const LEAGUE_LISTING_PATH: &str = "/league";

/// `303 See Other` to a gate's target.
pub(crate) fn redirect(state: &AppState, target: &RedirectTarget) -> Response {
    Redirect::to(&target.location(&state.landing_path)).into_response()
}

/// Fatal load errors stay on the page with a way back to the listing.
pub(crate) fn load_error(reason: LoadError) -> Response {
    let error = PortalError::from(reason);
    let body = serde_json::json!({
        "kind": error.kind(),
        "message": error.to_string(),
        "recovery": LEAGUE_LISTING_PATH,
    });
    (error.status(), Json(body)).into_response()
}
