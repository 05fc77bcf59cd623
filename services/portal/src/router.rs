use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use skateleague_core::health::healthz;
use skateleague_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    admin::{create_league, delete_league, list_league_registrants, update_league},
    health::readyz,
    league::{get_league, list_leagues},
    profile::{complete_profile, get_profile_form, remove_profile_picture},
    registration::{load_registration, submit_registration},
    session::{create_session, delete_session, signup},
};
use crate::state::AppState;
use crate::usecase::profile::MAX_PICTURE_BYTES;

/// Room for the text fields and multipart framing around a full-size picture.
const PROFILE_FORM_LIMIT: usize = MAX_PICTURE_BYTES + 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Session
        .route("/session", post(create_session).delete(delete_session))
        .route("/signup", post(signup))
        // Leagues
        .route("/league", get(list_leagues))
        .route("/league/{league_id}", get(get_league))
        .route(
            "/league/{league_id}/register",
            get(load_registration).post(submit_registration),
        )
        // Profile completion
        .route(
            "/complete-profile",
            get(get_profile_form)
                .post(complete_profile)
                .layer(DefaultBodyLimit::max(PROFILE_FORM_LIMIT)),
        )
        .route("/complete-profile/picture", delete(remove_profile_picture))
        // Admin
        .route("/admin/leagues", post(create_league))
        .route(
            "/admin/leagues/{league_id}",
            patch(update_league).delete(delete_league),
        )
        .route(
            "/admin/leagues/{league_id}/registrations",
            get(list_league_registrants),
        )
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(propagate_request_id_layer()),
        )
}
