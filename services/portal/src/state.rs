use axum::extract::FromRef;
use deadpool_redis::Pool as RedisPool;
use sea_orm::DatabaseConnection;

use skateleague_auth_types::identity::IdTokenVerifier;

use crate::infra::blob::ObjectStoreBlobStore;
use crate::infra::db::{DbLeagueRepository, DbProfileRepository, DbRegistrationRepository};
use crate::infra::flow::{RedisFlowStore, RedisSubmissionLock};

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: RedisPool,
    pub blobs: ObjectStoreBlobStore,
    pub verifier: IdTokenVerifier,
    pub cookie_domain: String,
    pub landing_path: String,
    pub flow_ttl_secs: u64,
    pub submission_lock_secs: u64,
}

impl AppState {
    pub fn profile_repo(&self) -> DbProfileRepository {
        DbProfileRepository {
            db: self.db.clone(),
        }
    }

    pub fn league_repo(&self) -> DbLeagueRepository {
        DbLeagueRepository {
            db: self.db.clone(),
        }
    }

    pub fn registration_repo(&self) -> DbRegistrationRepository {
        DbRegistrationRepository {
            db: self.db.clone(),
        }
    }

    pub fn blob_store(&self) -> ObjectStoreBlobStore {
        self.blobs.clone()
    }

    pub fn flow_store(&self) -> RedisFlowStore {
        RedisFlowStore {
            pool: self.redis.clone(),
            ttl_secs: self.flow_ttl_secs,
        }
    }

    pub fn submission_lock(&self) -> RedisSubmissionLock {
        RedisSubmissionLock {
            pool: self.redis.clone(),
            ttl_secs: self.submission_lock_secs,
        }
    }
}

impl FromRef<AppState> for IdTokenVerifier {
    fn from_ref(state: &AppState) -> Self {
        state.verifier.clone()
    }
}
