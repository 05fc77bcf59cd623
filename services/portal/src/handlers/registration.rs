use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use skateleague_auth_types::identity::CurrentIdentity;
use skateleague_domain::id::{LeagueId, RegistrationId, UserId};
use skateleague_domain::registration::RegistrationStatus;

use crate::domain::types::Registration;
use crate::domain::workflow::Outcome;
use crate::error::PortalError;
use crate::handlers::league::LeagueResponse;
use crate::handlers::{load_error, redirect};
use crate::state::AppState;
use crate::usecase::registration::{LoadRegistrationUseCase, SubmitRegistrationUseCase};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub id: RegistrationId,
    pub league_id: LeagueId,
    pub user_id: UserId,
    #[serde(serialize_with = "skateleague_core::serde::to_rfc3339_ms")]
    pub registered_at: DateTime<Utc>,
    pub status: RegistrationStatus,
}

impl From<Registration> for RegistrationResponse {
    fn from(registration: Registration) -> Self {
        Self {
            id: registration.id,
            league_id: registration.league_id,
            user_id: registration.user_id,
            registered_at: registration.registered_at,
            status: registration.status,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyResponse {
    pub state: &'static str,
    pub league: LeagueResponse,
    pub already_registered: bool,
    pub can_submit: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessResponse {
    pub state: &'static str,
    pub registration: RegistrationResponse,
    pub can_submit: bool,
}

// ── GET /league/{league_id}/register ─────────────────────────────────────────

pub async fn load_registration(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(league_id): Path<String>,
) -> Result<Response, PortalError> {
    let usecase = LoadRegistrationUseCase {
        profiles: state.profile_repo(),
        leagues: state.league_repo(),
        registrations: state.registration_repo(),
        flows: state.flow_store(),
    };

    let response = match usecase.execute(identity, league_id.parse().ok()).await? {
        Outcome::Continue(view) => Json(ReadyResponse {
            state: "ready",
            league: view.league.into(),
            already_registered: view.already_registered,
            can_submit: view.can_submit,
        })
        .into_response(),
        Outcome::RedirectTo(target) => redirect(&state, &target),
        Outcome::Fatal(reason) => load_error(reason),
    };
    Ok(response)
}

// ── POST /league/{league_id}/register ────────────────────────────────────────

pub async fn submit_registration(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(league_id): Path<String>,
) -> Result<Response, PortalError> {
    let usecase = SubmitRegistrationUseCase {
        profiles: state.profile_repo(),
        leagues: state.league_repo(),
        registrations: state.registration_repo(),
        flows: state.flow_store(),
        lock: state.submission_lock(),
    };

    let response = match usecase.execute(identity, league_id.parse().ok()).await? {
        Outcome::Continue(registration) => (
            StatusCode::CREATED,
            Json(SuccessResponse {
                state: "success",
                registration: registration.into(),
                can_submit: false,
            }),
        )
            .into_response(),
        Outcome::RedirectTo(target) => redirect(&state, &target),
        Outcome::Fatal(reason) => load_error(reason),
    };
    Ok(response)
}
