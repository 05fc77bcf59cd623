use deadpool_redis::Pool;
use deadpool_redis::redis::{self, AsyncCommands};

use skateleague_domain::id::{LeagueId, UserId};

use crate::domain::repository::{FlowStore, LockToken, SubmissionLock};
use crate::domain::workflow::RegistrationFlow;
use crate::error::PortalError;

fn flow_key(user_id: &UserId, league_id: &LeagueId) -> String {
    format!("registration_flow:{user_id}:{league_id}")
}

fn lock_key(user_id: &UserId, league_id: &LeagueId) -> String {
    format!("registration_submit:{user_id}:{league_id}")
}

/// Delete `KEYS[1]` only while it still holds `ARGV[1]`.
const RELEASE_SCRIPT: &str = r#"if redis.call("GET", KEYS[1]) == ARGV[1] then return redis.call("DEL", KEYS[1]) else return 0 end"#;

fn release_cmd(key: &str, token: &LockToken) -> redis::Cmd {
    let mut cmd = redis::cmd("EVAL");
    cmd.arg(RELEASE_SCRIPT).arg(1).arg(key).arg(&token.0);
    cmd
}

/// Gate results for an in-progress registration, kept for `ttl_secs`.
#[derive(Clone)]
pub struct RedisFlowStore {
    pub pool: Pool,
    pub ttl_secs: u64,
}

impl FlowStore for RedisFlowStore {
    async fn load(
        &self,
        user_id: &UserId,
        league_id: &LeagueId,
    ) -> Result<Option<RegistrationFlow>, PortalError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| PortalError::Internal(e.into()))?;
        let value: Option<String> = conn
            .get(flow_key(user_id, league_id))
            .await
            .map_err(|e| PortalError::Internal(e.into()))?;
        let Some(json) = value else {
            return Ok(None);
        };
        match serde_json::from_str(&json) {
            Ok(flow) => Ok(Some(flow)),
            Err(e) => {
                tracing::warn!(error = %e, user_id = %user_id, league_id = %league_id, "discarding unreadable flow record");
                Ok(None)
            }
        }
    }

    async fn save(
        &self,
        user_id: &UserId,
        league_id: &LeagueId,
        flow: &RegistrationFlow,
    ) -> Result<(), PortalError> {
        let json = serde_json::to_string(flow).map_err(|e| PortalError::Internal(e.into()))?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| PortalError::Internal(e.into()))?;
        let (): () = conn
            .set_ex(flow_key(user_id, league_id), json, self.ttl_secs)
            .await
            .map_err(|e: redis::RedisError| PortalError::Internal(e.into()))?;
        Ok(())
    }
}

/// `SET NX EX` lock holding a random token. Expiry bounds how long a crashed
/// submission blocks retries.
#[derive(Clone)]
pub struct RedisSubmissionLock {
    pub pool: Pool,
    pub ttl_secs: u64,
}

impl SubmissionLock for RedisSubmissionLock {
    async fn acquire(
        &self,
        user_id: &UserId,
        league_id: &LeagueId,
    ) -> Result<Option<LockToken>, PortalError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| PortalError::Internal(e.into()))?;
        let token = LockToken::generate();
        let reply: Option<String> = redis::cmd("SET")
            .arg(lock_key(user_id, league_id))
            .arg(&token.0)
            .arg("NX")
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async(&mut conn)
            .await
            .map_err(|e: redis::RedisError| PortalError::Internal(e.into()))?;
        Ok(reply.map(|_| token))
    }

    async fn release(
        &self,
        user_id: &UserId,
        league_id: &LeagueId,
        token: &LockToken,
    ) -> Result<(), PortalError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| PortalError::Internal(e.into()))?;
        let deleted: i64 = release_cmd(&lock_key(user_id, league_id), token)
            .query_async(&mut conn)
            .await
            .map_err(|e: redis::RedisError| PortalError::Internal(e.into()))?;
        if deleted == 0 {
            tracing::warn!(user_id = %user_id, league_id = %league_id, "submission lock expired before release");
        }
        Ok(())
    }
}

/// `PING` over a pooled connection.
pub async fn ping(pool: &Pool) -> anyhow::Result<()> {
    let mut conn = pool.get().await?;
    let _: String = redis::cmd("PING").query_async(&mut conn).await?;
    Ok(())
}
