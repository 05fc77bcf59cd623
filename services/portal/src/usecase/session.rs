use chrono::Utc;

use skateleague_auth_types::identity::Identity;

use crate::domain::repository::ProfileRepository;
use crate::domain::types::UserProfile;
use crate::domain::workflow::{RedirectTarget, SessionContext};
use crate::error::PortalError;

// ── ResolveSession ───────────────────────────────────────────────────────────

/// Look up the stored profile for the caller.
///
/// A failed profile read is logged and treated as "no stored profile", which
/// routes the registrant to profile completion rather than failing the page.
pub async fn resolve_session<P: ProfileRepository>(
    identity: Option<Identity>,
    profiles: &P,
) -> SessionContext {
    let Some(identity) = identity else {
        return SessionContext::default();
    };
    let profile = match profiles.find_by_id(&identity.user_id).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(error = %e, user_id = %identity.user_id, "profile lookup failed; treating as absent");
            None
        }
    };
    SessionContext {
        identity: Some(identity),
        profile,
    }
}

// ── ProvisionProfile ─────────────────────────────────────────────────────────

pub struct ProvisionProfileUseCase<P: ProfileRepository> {
    pub profiles: P,
}

impl<P: ProfileRepository> ProvisionProfileUseCase<P> {
    /// Create the signup stub (id, email, role, created_at) and send the new
    /// registrant on to profile completion. Repeating signup is harmless.
    pub async fn execute(&self, identity: Identity) -> Result<RedirectTarget, PortalError> {
        let stub = UserProfile::stub(identity.user_id, identity.email, Utc::now());
        if self.profiles.create_stub(&stub).await? {
            tracing::info!(user_id = %stub.id, "profile provisioned");
        }
        Ok(RedirectTarget::CompleteProfile { continuation: None })
    }
}
