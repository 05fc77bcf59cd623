use axum::{
    Json,
    extract::{Multipart, Query, State, multipart::MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use skateleague_auth_types::identity::{CurrentIdentity, Identity};
use skateleague_domain::id::{LeagueId, UserId};
use skateleague_domain::user::UserRole;

use crate::domain::types::{PictureUpload, UserProfile};
use crate::domain::workflow::{Outcome, RedirectTarget};
use crate::error::PortalError;
use crate::handlers::{load_error, redirect};
use crate::state::AppState;
use crate::usecase::profile::{
    CompleteProfileInput, CompleteProfileUseCase, GetProfileFormUseCase,
    RemoveProfilePictureUseCase,
};

/// Multipart field carrying the picture file.
const PICTURE_FIELD: &str = "profilePicture";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub stance: Option<String>,
    pub sponsor: Option<String>,
    pub phone_number: Option<String>,
    pub other_notes: Option<String>,
    pub instagram: Option<String>,
    pub profile_picture_url: Option<String>,
    pub role: UserRole,
    #[serde(serialize_with = "skateleague_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<UserProfile> for ProfileResponse {
    fn from(p: UserProfile) -> Self {
        Self {
            id: p.id,
            email: p.email,
            name: p.name,
            date_of_birth: p.date_of_birth,
            stance: p.stance,
            sponsor: p.sponsor,
            phone_number: p.phone_number,
            other_notes: p.other_notes,
            instagram: p.instagram,
            profile_picture_url: p.profile_picture_url,
            role: p.role,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ContinuationQuery {
    pub redirect: Option<String>,
}

impl ContinuationQuery {
    /// A blank `redirect` is the same as none.
    fn league_id(&self) -> Option<LeagueId> {
        self.redirect.as_deref().and_then(|raw| raw.parse().ok())
    }
}

// ── GET /complete-profile ────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileFormResponse {
    pub email: String,
    pub profile: Option<ProfileResponse>,
    pub redirect: Option<LeagueId>,
}

pub async fn get_profile_form(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Query(query): Query<ContinuationQuery>,
) -> Result<Response, PortalError> {
    let usecase = GetProfileFormUseCase {
        profiles: state.profile_repo(),
    };
    let response = match usecase.execute(identity, query.league_id()).await? {
        Outcome::Continue(form) => Json(ProfileFormResponse {
            email: form.email,
            profile: form.profile.map(ProfileResponse::from),
            redirect: form.continuation,
        })
        .into_response(),
        Outcome::RedirectTo(target) => redirect(&state, &target),
        Outcome::Fatal(reason) => load_error(reason),
    };
    Ok(response)
}

// ── POST /complete-profile ───────────────────────────────────────────────────

pub async fn complete_profile(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Query(query): Query<ContinuationQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, PortalError> {
    // Signed-out visitors are sent to login whatever the body holds.
    if identity.is_none() {
        return Ok(redirect(&state, &RedirectTarget::Login));
    }
    let multipart = multipart.map_err(|e| PortalError::InvalidUpload(e.body_text()))?;
    let mut input = read_profile_form(multipart).await?;
    input.continuation = query.league_id();

    let usecase = CompleteProfileUseCase {
        profiles: state.profile_repo(),
        blobs: state.blob_store(),
    };
    let target = usecase.execute(identity, input).await?;
    Ok(redirect(&state, &target))
}

async fn read_profile_form(mut multipart: Multipart) -> Result<CompleteProfileInput, PortalError> {
    let mut input = CompleteProfileInput::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PortalError::InvalidUpload(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == PICTURE_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let content_type = field.content_type().map(str::to_owned);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| PortalError::InvalidUpload(e.body_text()))?;
            // Browsers send an empty, unnamed part when no file was chosen.
            if file_name.is_empty() && bytes.is_empty() {
                continue;
            }
            input.picture = Some(PictureUpload {
                file_name,
                content_type,
                bytes,
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| PortalError::InvalidUpload(e.body_text()))?;
        let slot = match name.as_str() {
            "name" => &mut input.name,
            "dateOfBirth" => &mut input.date_of_birth,
            "stance" => &mut input.stance,
            "sponsor" => &mut input.sponsor,
            "phoneNumber" => &mut input.phone_number,
            "otherNotes" => &mut input.other_notes,
            "instagram" => &mut input.instagram,
            other => {
                tracing::debug!(field = other, "ignoring unknown profile form field");
                continue;
            }
        };
        *slot = Some(value);
    }
    Ok(input)
}

// ── DELETE /complete-profile/picture ─────────────────────────────────────────

pub async fn remove_profile_picture(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<StatusCode, PortalError> {
    let usecase = RemoveProfilePictureUseCase {
        profiles: state.profile_repo(),
        blobs: state.blob_store(),
    };
    usecase.execute(identity).await?;
    Ok(StatusCode::NO_CONTENT)
}
