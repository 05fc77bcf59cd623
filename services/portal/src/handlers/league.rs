use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use skateleague_domain::id::LeagueId;
use skateleague_domain::pagination::PageRequest;

use crate::domain::types::League;
use crate::error::PortalError;
use crate::state::AppState;
use crate::usecase::league::{GetLeagueUseCase, ListLeaguesUseCase};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueResponse {
    pub id: LeagueId,
    pub name: String,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub banner_image_url: Option<String>,
    #[serde(serialize_with = "skateleague_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<League> for LeagueResponse {
    fn from(league: League) -> Self {
        Self {
            id: league.id,
            name: league.name,
            date: league.date,
            location: league.location,
            description: league.description,
            banner_image_url: league.banner_image_url,
            created_at: league.created_at,
        }
    }
}

/// A blank path segment can never name a league.
pub(crate) fn parse_league_id(raw: &str) -> Result<LeagueId, PortalError> {
    raw.parse().map_err(|_| PortalError::LeagueNotFound)
}

// ── GET /league ──────────────────────────────────────────────────────────────

pub async fn list_leagues(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<LeagueResponse>>, PortalError> {
    let usecase = ListLeaguesUseCase {
        leagues: state.league_repo(),
    };
    let leagues = usecase.execute(page).await?;
    Ok(Json(leagues.into_iter().map(LeagueResponse::from).collect()))
}

// ── GET /league/{league_id} ──────────────────────────────────────────────────

pub async fn get_league(
    State(state): State<AppState>,
    Path(league_id): Path<String>,
) -> Result<Json<LeagueResponse>, PortalError> {
    let league_id = parse_league_id(&league_id)?;
    let usecase = GetLeagueUseCase {
        leagues: state.league_repo(),
    };
    Ok(Json(usecase.execute(&league_id).await?.into()))
}
