use chrono::Utc;

use skateleague_auth_types::identity::Identity;
use skateleague_domain::id::{LeagueId, UserId};

use crate::domain::repository::{
    FlowStore, LeagueRepository, ProfileRepository, RegistrationRepository, SubmissionLock,
};
use crate::domain::types::{League, Registration};
use crate::domain::workflow::{FlowState, Outcome, RegistrationFlow};
use crate::error::PortalError;
use crate::usecase::session::resolve_session;

/// What a registrant sees once every gate has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyView {
    pub league: League,
    pub already_registered: bool,
    pub can_submit: bool,
}

/// Load the stored flow for (user, league), or start fresh.
///
/// Every request is a new page load, so remembered gate results are dropped
/// and the league and registration stores are always read again. A flow that
/// cannot be read is replaced by a fresh one.
async fn load_flow<F: FlowStore>(
    flows: &F,
    identity: Option<&Identity>,
    league_id: Option<&LeagueId>,
) -> RegistrationFlow {
    let (Some(identity), Some(league_id)) = (identity, league_id) else {
        return RegistrationFlow::new();
    };
    let mut flow = match flows.load(&identity.user_id, league_id).await {
        Ok(flow) => flow.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "flow store read failed; starting a fresh flow");
            RegistrationFlow::new()
        }
    };
    flow.forget_gate_results();
    flow
}

async fn save_flow<F: FlowStore>(
    flows: &F,
    user_id: &UserId,
    league_id: &LeagueId,
    flow: &RegistrationFlow,
) {
    if let Err(e) = flows.save(user_id, league_id, flow).await {
        tracing::warn!(error = %e, "flow store write failed");
    }
}

fn ready_view(flow: &RegistrationFlow) -> Result<ReadyView, PortalError> {
    match flow.state() {
        FlowState::Ready {
            league,
            already_registered,
        } => Ok(ReadyView {
            league: league.clone(),
            already_registered: *already_registered,
            can_submit: flow.can_submit(),
        }),
        other => Err(PortalError::Internal(anyhow::anyhow!(
            "gates passed but flow is in state {}",
            other.name()
        ))),
    }
}

// ── LoadRegistration ─────────────────────────────────────────────────────────

pub struct LoadRegistrationUseCase<P, L, R, F>
where
    P: ProfileRepository,
    L: LeagueRepository,
    R: RegistrationRepository,
    F: FlowStore,
{
    pub profiles: P,
    pub leagues: L,
    pub registrations: R,
    pub flows: F,
}

impl<P, L, R, F> LoadRegistrationUseCase<P, L, R, F>
where
    P: ProfileRepository,
    L: LeagueRepository,
    R: RegistrationRepository,
    F: FlowStore,
{
    pub async fn execute(
        &self,
        identity: Option<Identity>,
        league_id: Option<LeagueId>,
    ) -> Result<Outcome<ReadyView>, PortalError> {
        let mut flow = load_flow(&self.flows, identity.as_ref(), league_id.as_ref()).await;
        let session = resolve_session(identity, &self.profiles).await;

        match flow
            .evaluate(&session, league_id.as_ref(), &self.leagues, &self.registrations)
            .await
        {
            Outcome::Continue(()) => {}
            Outcome::RedirectTo(target) => return Ok(Outcome::RedirectTo(target)),
            Outcome::Fatal(reason) => return Ok(Outcome::Fatal(reason)),
        }

        if let (Some(identity), Some(league_id)) = (&session.identity, &league_id) {
            save_flow(&self.flows, &identity.user_id, league_id, &flow).await;
        }
        Ok(Outcome::Continue(ready_view(&flow)?))
    }
}

// ── SubmitRegistration ───────────────────────────────────────────────────────

pub struct SubmitRegistrationUseCase<P, L, R, F, K>
where
    P: ProfileRepository,
    L: LeagueRepository,
    R: RegistrationRepository,
    F: FlowStore,
    K: SubmissionLock,
{
    pub profiles: P,
    pub leagues: L,
    pub registrations: R,
    pub flows: F,
    pub lock: K,
}

impl<P, L, R, F, K> SubmitRegistrationUseCase<P, L, R, F, K>
where
    P: ProfileRepository,
    L: LeagueRepository,
    R: RegistrationRepository,
    F: FlowStore,
    K: SubmissionLock,
{
    /// Re-run the gates, then create exactly one pending registration.
    pub async fn execute(
        &self,
        identity: Option<Identity>,
        league_id: Option<LeagueId>,
    ) -> Result<Outcome<Registration>, PortalError> {
        let mut flow = load_flow(&self.flows, identity.as_ref(), league_id.as_ref()).await;
        let session = resolve_session(identity, &self.profiles).await;

        match flow
            .evaluate(&session, league_id.as_ref(), &self.leagues, &self.registrations)
            .await
        {
            Outcome::Continue(()) => {}
            Outcome::RedirectTo(target) => return Ok(Outcome::RedirectTo(target)),
            Outcome::Fatal(reason) => return Ok(Outcome::Fatal(reason)),
        }
        // Gates only pass with both present.
        let (Some(identity), Some(league_id)) = (&session.identity, &league_id) else {
            return Err(PortalError::Internal(anyhow::anyhow!(
                "registration gates passed without identity or league"
            )));
        };
        let user_id = &identity.user_id;

        flow.begin_submit()?;

        let token = match self.lock.acquire(user_id, league_id).await {
            Ok(Some(token)) => Some(token),
            Ok(None) => return Err(PortalError::SubmissionInProgress),
            // The unique index still rejects a racing duplicate.
            Err(e) => {
                tracing::warn!(error = %e, "submission lock unavailable; continuing");
                None
            }
        };

        let result = self.submit(&mut flow, user_id, league_id).await;

        save_flow(&self.flows, user_id, league_id, &flow).await;
        if let Some(token) = token {
            if let Err(e) = self.lock.release(user_id, league_id, &token).await {
                tracing::warn!(error = %e, "submission lock release failed");
            }
        }
        result.map(Outcome::Continue)
    }

    async fn submit(
        &self,
        flow: &mut RegistrationFlow,
        user_id: &UserId,
        league_id: &LeagueId,
    ) -> Result<Registration, PortalError> {
        let registration = Registration::pending(league_id.clone(), user_id.clone(), Utc::now());

        match self.registrations.create(&registration).await {
            Ok(true) => {
                flow.finish_submit(Ok(registration.clone()))?;
                tracing::info!(
                    registration_id = %registration.id,
                    league_id = %league_id,
                    user_id = %user_id,
                    "registration created"
                );
                Ok(registration)
            }
            Ok(false) => {
                flow.mark_already_registered()?;
                Err(PortalError::AlreadyRegistered)
            }
            Err(e) => {
                let message = store_message(e);
                tracing::warn!(error = %message, league_id = %league_id, "registration write failed");
                flow.finish_submit(Err(message.clone()))?;
                Err(PortalError::SubmitFailed(message))
            }
        }
    }
}

/// The underlying store's own wording, without our context prefixes.
fn store_message(error: PortalError) -> String {
    match error {
        PortalError::Internal(e) => e.root_cause().to_string(),
        other => other.to_string(),
    }
}
