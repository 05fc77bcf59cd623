use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use skateleague_auth_types::cookie::{clear_id_token_cookie, set_id_token_cookie};
use skateleague_auth_types::identity::Identity;

use crate::error::PortalError;
use crate::handlers::redirect;
use crate::state::AppState;
use crate::usecase::session::ProvisionProfileUseCase;

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

// ── POST /session ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub id_token: String,
}

/// Exchange an identity-provider ID token for the identity cookie.
pub async fn create_session(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, PortalError> {
    let identity = state.verifier.verify(&body.id_token).map_err(|e| {
        tracing::debug!(error = %e, "rejected id token");
        PortalError::Unauthenticated
    })?;
    let exp = state
        .verifier
        .expiry(&body.id_token)
        .map_err(|_| PortalError::Unauthenticated)?;

    let max_age = exp.saturating_sub(unix_now());
    let jar = set_id_token_cookie(jar, body.id_token, state.cookie_domain.clone(), max_age);
    tracing::info!(user_id = %identity.user_id, "session started");
    Ok((StatusCode::CREATED, jar))
}

// ── DELETE /session ──────────────────────────────────────────────────────────

pub async fn delete_session(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = clear_id_token_cookie(jar, state.cookie_domain.clone());
    (StatusCode::NO_CONTENT, jar)
}

// ── POST /signup ─────────────────────────────────────────────────────────────

pub async fn signup(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Response, PortalError> {
    let usecase = ProvisionProfileUseCase {
        profiles: state.profile_repo(),
    };
    let target = usecase.execute(identity).await?;
    Ok(redirect(&state, &target))
}
