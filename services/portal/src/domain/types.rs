use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use skateleague_domain::id::{LeagueId, RegistrationId, UserId};
use skateleague_domain::registration::RegistrationStatus;
use skateleague_domain::user::UserRole;

/// A registrant's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
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
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Profile as created at signup: identity fields only.
    pub fn stub(id: UserId, email: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            email,
            name: None,
            date_of_birth: None,
            stance: None,
            sponsor: None,
            phone_number: None,
            other_notes: None,
            instagram: None,
            profile_picture_url: None,
            role: UserRole::User,
            created_at: now,
        }
    }

    /// Registration is blocked until a name and a date of birth are on file.
    pub fn is_complete(&self) -> bool {
        let has_name = self.name.as_deref().is_some_and(|n| !n.trim().is_empty());
        has_name && self.date_of_birth.is_some()
    }
}

/// A competition event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub id: LeagueId,
    pub name: String,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub banner_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A registrant's entry into a league.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub league_id: LeagueId,
    pub user_id: UserId,
    pub registered_at: DateTime<Utc>,
    pub status: RegistrationStatus,
}

impl Registration {
    pub fn pending(league_id: LeagueId, user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: RegistrationId::generate(),
            league_id,
            user_id,
            registered_at: now,
            status: RegistrationStatus::Pending,
        }
    }
}

/// One row of a league's registrant list.
///
/// `profile` is `None` when the registration points at a user without a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Registrant {
    pub registration: Registration,
    pub profile: Option<UserProfile>,
}

/// How a single field is treated by a partial write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldPatch<T> {
    /// Leave the stored value untouched.
    #[default]
    Omit,
    Set(T),
    /// Write an explicit null.
    Clear,
}

impl<T> FieldPatch<T> {
    pub fn is_omitted(&self) -> bool {
        matches!(self, Self::Omit)
    }

    /// `Some(v)` becomes `Set(v)`, `None` stays omitted.
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::Omit, Self::Set)
    }
}

/// Partial profile write. Omitted fields are never sent to the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilePatch {
    pub name: FieldPatch<String>,
    pub date_of_birth: FieldPatch<NaiveDate>,
    pub stance: FieldPatch<String>,
    pub sponsor: FieldPatch<String>,
    pub phone_number: FieldPatch<String>,
    pub other_notes: FieldPatch<String>,
    pub instagram: FieldPatch<String>,
    pub profile_picture_url: FieldPatch<String>,
}

/// Partial league write from the admin API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaguePatch {
    pub name: FieldPatch<String>,
    pub date: FieldPatch<NaiveDate>,
    pub location: FieldPatch<String>,
    pub description: FieldPatch<String>,
    pub banner_image_url: FieldPatch<String>,
}

/// Upload handed over by the profile form.
#[derive(Debug, Clone)]
pub struct PictureUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: bytes::Bytes,
}
