use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Portal service error variants.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("forbidden")]
    Forbidden,
    #[error("league not found")]
    LeagueNotFound,
    #[error("profile not found")]
    ProfileNotFound,
    #[error("league id missing")]
    LeagueIdMissing,
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),
    #[error("date of birth must be a YYYY-MM-DD date")]
    InvalidDateOfBirth,
    #[error("invalid upload: {0}")]
    InvalidUpload(String),
    #[error("invalid league: {0}")]
    InvalidLeague(String),
    #[error("already registered for this league")]
    AlreadyRegistered,
    #[error("a registration for this league is already being submitted")]
    SubmissionInProgress,
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("failed to load league data")]
    LeagueUnavailable,
    /// Registration write failure; carries the store's message verbatim.
    #[error("{0}")]
    SubmitFailed(String),
    #[error("stored document is invalid: {0}")]
    InvalidDocument(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl PortalError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden => "FORBIDDEN",
            Self::LeagueNotFound => "LEAGUE_NOT_FOUND",
            Self::ProfileNotFound => "PROFILE_NOT_FOUND",
            Self::LeagueIdMissing => "LEAGUE_ID_MISSING",
            Self::MissingRequiredField(_) => "MISSING_REQUIRED_FIELD",
            Self::InvalidDateOfBirth => "INVALID_DATE_OF_BIRTH",
            Self::InvalidUpload(_) => "INVALID_UPLOAD",
            Self::InvalidLeague(_) => "INVALID_LEAGUE",
            Self::AlreadyRegistered => "ALREADY_REGISTERED",
            Self::SubmissionInProgress => "SUBMISSION_IN_PROGRESS",
            Self::UploadFailed(_) => "UPLOAD_FAILED",
            Self::LeagueUnavailable => "LEAGUE_UNAVAILABLE",
            Self::SubmitFailed(_) => "SUBMIT_FAILED",
            Self::InvalidDocument(_) | Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::LeagueNotFound | Self::ProfileNotFound => StatusCode::NOT_FOUND,
            Self::LeagueIdMissing
            | Self::MissingRequiredField(_)
            | Self::InvalidDateOfBirth
            | Self::InvalidUpload(_)
            | Self::InvalidLeague(_) => StatusCode::BAD_REQUEST,
            Self::AlreadyRegistered | Self::SubmissionInProgress => StatusCode::CONFLICT,
            Self::UploadFailed(_) => StatusCode::BAD_GATEWAY,
            Self::LeagueUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::SubmitFailed(_) | Self::InvalidDocument(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Internal(e) => tracing::error!(error = %e, kind = "INTERNAL", "internal error"),
            Self::InvalidDocument(detail) => {
                tracing::error!(detail = %detail, kind = "INTERNAL", "invalid stored document")
            }
            _ => {}
        }
        // Store-shape details stay in the log.
        let message = match &self {
            Self::InvalidDocument(_) => "internal error".to_owned(),
            other => other.to_string(),
        };
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": message,
        });
        (status, axum::Json(body)).into_response()
    }
}
