use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use skateleague_auth_types::identity::Identity;
use skateleague_domain::id::{RegistrationId, UserId};
use skateleague_domain::registration::RegistrationStatus;

use crate::domain::types::Registrant;
use crate::error::PortalError;
use crate::handlers::league::{LeagueResponse, parse_league_id};
use crate::handlers::profile::ProfileResponse;
use crate::state::AppState;
use crate::usecase::league::{
    CreateLeagueInput, CreateLeagueUseCase, DeleteLeagueUseCase, ListLeagueRegistrantsUseCase,
    UpdateLeagueInput, UpdateLeagueUseCase,
};

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ── POST /admin/leagues ──────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeagueRequest {
    pub name: String,
    pub date: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub banner_image_url: Option<String>,
}

pub async fn create_league(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateLeagueRequest>,
) -> Result<(StatusCode, Json<LeagueResponse>), PortalError> {
    let usecase = CreateLeagueUseCase {
        profiles: state.profile_repo(),
        leagues: state.league_repo(),
    };
    let league = usecase
        .execute(
            &identity.user_id,
            CreateLeagueInput {
                name: body.name,
                date: body.date,
                location: body.location,
                description: body.description,
                banner_image_url: body.banner_image_url,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(league.into())))
}

// ── PATCH /admin/leagues/{league_id} ─────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeagueRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub banner_image_url: Option<Option<String>>,
}

pub async fn update_league(
    identity: Identity,
    State(state): State<AppState>,
    Path(league_id): Path<String>,
    Json(body): Json<UpdateLeagueRequest>,
) -> Result<StatusCode, PortalError> {
    let league_id = parse_league_id(&league_id)?;
    let usecase = UpdateLeagueUseCase {
        profiles: state.profile_repo(),
        leagues: state.league_repo(),
    };
    usecase
        .execute(
            &identity.user_id,
            &league_id,
            UpdateLeagueInput {
                name: body.name,
                date: body.date,
                location: body.location,
                description: body.description,
                banner_image_url: body.banner_image_url,
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── DELETE /admin/leagues/{league_id} ────────────────────────────────────────

pub async fn delete_league(
    identity: Identity,
    State(state): State<AppState>,
    Path(league_id): Path<String>,
) -> Result<StatusCode, PortalError> {
    let league_id = parse_league_id(&league_id)?;
    let usecase = DeleteLeagueUseCase {
        profiles: state.profile_repo(),
        leagues: state.league_repo(),
    };
    usecase.execute(&identity.user_id, &league_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /admin/leagues/{league_id}/registrations ─────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrantResponse {
    pub registration_id: RegistrationId,
    pub user_id: UserId,
    pub status: RegistrationStatus,
    #[serde(serialize_with = "skateleague_core::serde::to_rfc3339_ms")]
    pub registered_at: DateTime<Utc>,
    pub profile: Option<ProfileResponse>,
}

impl From<Registrant> for RegistrantResponse {
    fn from(Registrant { registration, profile }: Registrant) -> Self {
        Self {
            registration_id: registration.id,
            user_id: registration.user_id,
            status: registration.status,
            registered_at: registration.registered_at,
            profile: profile.map(ProfileResponse::from),
        }
    }
}

pub async fn list_league_registrants(
    identity: Identity,
    State(state): State<AppState>,
    Path(league_id): Path<String>,
) -> Result<Json<Vec<RegistrantResponse>>, PortalError> {
    let league_id = parse_league_id(&league_id)?;
    let usecase = ListLeagueRegistrantsUseCase {
        profiles: state.profile_repo(),
        leagues: state.league_repo(),
        registrations: state.registration_repo(),
    };
    let registrants = usecase.execute(&identity.user_id, &league_id).await?;
    Ok(Json(registrants.into_iter().map(RegistrantResponse::from).collect()))
}
