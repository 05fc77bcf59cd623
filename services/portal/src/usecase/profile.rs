use chrono::{NaiveDate, Utc};

use skateleague_auth_types::identity::Identity;
use skateleague_domain::id::{LeagueId, UserId};

use crate::domain::repository::{BlobStore, ProfileRepository};
use crate::domain::types::{FieldPatch, PictureUpload, ProfilePatch, UserProfile};
use crate::domain::workflow::{Outcome, RedirectTarget};
use crate::error::PortalError;

/// Largest accepted profile picture.
pub const MAX_PICTURE_BYTES: usize = 10 * 1024 * 1024;

// ── GetProfileForm ───────────────────────────────────────────────────────────

/// Pre-filled profile form. `email` always comes from the identity provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileForm {
    pub email: String,
    pub profile: Option<UserProfile>,
    pub continuation: Option<LeagueId>,
}

pub struct GetProfileFormUseCase<P: ProfileRepository> {
    pub profiles: P,
}

impl<P: ProfileRepository> GetProfileFormUseCase<P> {
    pub async fn execute(
        &self,
        identity: Option<Identity>,
        continuation: Option<LeagueId>,
    ) -> Result<Outcome<ProfileForm>, PortalError> {
        let Some(identity) = identity else {
            return Ok(Outcome::RedirectTo(RedirectTarget::Login));
        };
        let profile = self.profiles.find_by_id(&identity.user_id).await?;
        Ok(Outcome::Continue(ProfileForm {
            email: identity.email,
            profile,
            continuation,
        }))
    }
}

// ── CompleteProfile ──────────────────────────────────────────────────────────

/// Raw form fields. `None` means the field was not submitted at all.
#[derive(Debug, Clone, Default)]
pub struct CompleteProfileInput {
    pub name: Option<String>,
    pub date_of_birth: Option<String>,
    pub stance: Option<String>,
    pub sponsor: Option<String>,
    pub phone_number: Option<String>,
    pub other_notes: Option<String>,
    pub instagram: Option<String>,
    pub picture: Option<PictureUpload>,
    pub continuation: Option<LeagueId>,
}

pub struct CompleteProfileUseCase<P: ProfileRepository, B: BlobStore> {
    pub profiles: P,
    pub blobs: B,
}

impl<P: ProfileRepository, B: BlobStore> CompleteProfileUseCase<P, B> {
    /// Validate, upload the picture (if any), then write the profile.
    ///
    /// The upload finishes before the profile write starts; a failed upload
    /// means no write at all.
    pub async fn execute(
        &self,
        identity: Option<Identity>,
        input: CompleteProfileInput,
    ) -> Result<RedirectTarget, PortalError> {
        let Some(identity) = identity else {
            return Ok(RedirectTarget::Login);
        };

        let name = required(input.name, "name")?;
        let date_of_birth = parse_date_of_birth(&required(input.date_of_birth, "dateOfBirth")?)?;

        let picture_url = match input.picture {
            Some(picture) => Some(self.upload_picture(&identity.user_id, picture).await?),
            None => None,
        };

        let patch = ProfilePatch {
            name: FieldPatch::Set(name),
            date_of_birth: FieldPatch::Set(date_of_birth),
            stance: FieldPatch::from_option(input.stance),
            sponsor: FieldPatch::from_option(input.sponsor),
            phone_number: FieldPatch::from_option(input.phone_number),
            other_notes: FieldPatch::from_option(input.other_notes),
            instagram: FieldPatch::from_option(input.instagram),
            profile_picture_url: FieldPatch::from_option(picture_url),
        };
        self.profiles
            .upsert(&identity.user_id, &identity.email, &patch)
            .await?;
        tracing::info!(user_id = %identity.user_id, "profile completed");

        Ok(match input.continuation {
            Some(league_id) => RedirectTarget::LeagueRegistration(league_id),
            None => RedirectTarget::Landing,
        })
    }

    async fn upload_picture(
        &self,
        user_id: &UserId,
        picture: PictureUpload,
    ) -> Result<String, PortalError> {
        validate_picture(&picture)?;
        let path = picture_path(user_id, Utc::now().timestamp_millis(), &picture.file_name);
        self.blobs
            .upload(&path, &picture)
            .await
            .map_err(|e| match e {
                PortalError::Internal(inner) => PortalError::UploadFailed(inner.root_cause().to_string()),
                other => other,
            })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, PortalError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_owned()),
        _ => Err(PortalError::MissingRequiredField(field)),
    }
}

fn parse_date_of_birth(raw: &str) -> Result<NaiveDate, PortalError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| PortalError::InvalidDateOfBirth)
}

fn validate_picture(picture: &PictureUpload) -> Result<(), PortalError> {
    if picture.bytes.is_empty() {
        return Err(PortalError::InvalidUpload("file is empty".into()));
    }
    if picture.bytes.len() > MAX_PICTURE_BYTES {
        return Err(PortalError::InvalidUpload("file is too large".into()));
    }
    if let Some(content_type) = &picture.content_type {
        if !content_type.starts_with("image/") {
            return Err(PortalError::InvalidUpload(format!(
                "expected an image, got {content_type}"
            )));
        }
    }
    Ok(())
}

/// `profile_pictures/{user}/{millis}_{file}` with the file name reduced to a safe basename.
pub fn picture_path(user_id: &UserId, millis: i64, file_name: &str) -> String {
    let base = file_name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default();
    let safe: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe = if safe.trim_matches('.').is_empty() {
        "picture".to_owned()
    } else {
        safe
    };
    format!("profile_pictures/{user_id}/{millis}_{safe}")
}

// ── RemoveProfilePicture ─────────────────────────────────────────────────────

pub struct RemoveProfilePictureUseCase<P: ProfileRepository, B: BlobStore> {
    pub profiles: P,
    pub blobs: B,
}

impl<P: ProfileRepository, B: BlobStore> RemoveProfilePictureUseCase<P, B> {
    /// Delete the stored blob, then write an explicit null to the profile.
    pub async fn execute(&self, identity: Identity) -> Result<(), PortalError> {
        let profile = self
            .profiles
            .find_by_id(&identity.user_id)
            .await?
            .ok_or(PortalError::ProfileNotFound)?;
        let Some(url) = profile.profile_picture_url else {
            return Ok(());
        };

        self.blobs.delete(&url).await?;
        let patch = ProfilePatch {
            profile_picture_url: FieldPatch::Clear,
            ..Default::default()
        };
        self.profiles
            .upsert(&identity.user_id, &identity.email, &patch)
            .await
    }
}
