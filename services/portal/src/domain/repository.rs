#![allow(async_fn_in_trait)]

use skateleague_domain::id::{LeagueId, UserId};
use skateleague_domain::pagination::PageRequest;

use crate::domain::types::{League, LeaguePatch, PictureUpload, ProfilePatch, Registration, UserProfile};
use crate::domain::workflow::RegistrationFlow;
use crate::error::PortalError;

/// Profile documents keyed by user id.
pub trait ProfileRepository: Send + Sync {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, PortalError>;

    /// Profiles for the given ids. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<UserProfile>, PortalError>;

    /// Insert a signup stub. Returns `false` when a profile already exists.
    async fn create_stub(&self, profile: &UserProfile) -> Result<bool, PortalError>;

    /// Upsert. Omitted fields are left untouched; `email` is only written on insert.
    async fn upsert(
        &self,
        id: &UserId,
        email: &str,
        patch: &ProfilePatch,
    ) -> Result<(), PortalError>;
}

/// League documents.
pub trait LeagueRepository: Send + Sync {
    async fn find_by_id(&self, id: &LeagueId) -> Result<Option<League>, PortalError>;

    async fn list(&self, page: PageRequest) -> Result<Vec<League>, PortalError>;

    async fn create(&self, league: &League) -> Result<(), PortalError>;

    /// Returns `false` if no league has this id.
    async fn update(&self, id: &LeagueId, patch: &LeaguePatch) -> Result<bool, PortalError>;

    /// Returns `false` if no league has this id.
    async fn delete(&self, id: &LeagueId) -> Result<bool, PortalError>;
}

/// Registration records.
pub trait RegistrationRepository: Send + Sync {
    async fn find_by_league_and_user(
        &self,
        league_id: &LeagueId,
        user_id: &UserId,
    ) -> Result<Vec<Registration>, PortalError>;

    /// Every registration for a league, oldest first.
    async fn list_by_league(&self, league_id: &LeagueId) -> Result<Vec<Registration>, PortalError>;

    /// Returns `false` when a registration for the same (league, user) already exists.
    async fn create(&self, registration: &Registration) -> Result<bool, PortalError>;
}

/// Uploaded images.
pub trait BlobStore: Send + Sync {
    /// Store `upload` under `path` and return its public URL.
    async fn upload(&self, path: &str, upload: &PictureUpload) -> Result<String, PortalError>;

    /// Delete the object behind a URL previously returned by [`BlobStore::upload`].
    async fn delete(&self, url: &str) -> Result<(), PortalError>;
}

/// Workflow records carried between requests, keyed by (user, league).
pub trait FlowStore: Send + Sync {
    async fn load(
        &self,
        user_id: &UserId,
        league_id: &LeagueId,
    ) -> Result<Option<RegistrationFlow>, PortalError>;

    async fn save(
        &self,
        user_id: &UserId,
        league_id: &LeagueId,
        flow: &RegistrationFlow,
    ) -> Result<(), PortalError>;
}

/// Proof of holding a [`SubmissionLock`]; only its holder can release it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockToken(pub String);

impl LockToken {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// Cross-request guard against concurrent submissions for the same (user, league).
pub trait SubmissionLock: Send + Sync {
    /// Returns `None` if another submission holds the lock.
    async fn acquire(
        &self,
        user_id: &UserId,
        league_id: &LeagueId,
    ) -> Result<Option<LockToken>, PortalError>;

    /// Release the lock if it is still held under `token`. A lock that expired
    /// and was taken by another submission is left alone.
    async fn release(
        &self,
        user_id: &UserId,
        league_id: &LeagueId,
        token: &LockToken,
    ) -> Result<(), PortalError>;
}
