//! Registration workflow state machine.
//!
//! A registrant moves through four gates in strict order:
//!
//! ```text
//! AuthCheck -> ProfileCheck -> LeagueLoad -> RegistrationCheck -> Ready
//! Ready --submit--> Submitting --ok--> Success
//!                   Submitting --err--> SubmitError (retry allowed)
//! any gate --fatal--> LoadError
//! ```
//!
//! Each gate yields an [`Outcome`]. Redirects and fatal errors are returned as
//! values; the caller decides how to surface them. Apart from the two store
//! reads in `LeagueLoad` and `RegistrationCheck`, every transition here is pure.

use serde::{Deserialize, Serialize};

use skateleague_auth_types::identity::Identity;
use skateleague_domain::id::{LeagueId, UserId};

use crate::domain::repository::{LeagueRepository, RegistrationRepository};
use crate::domain::types::{League, Registration, UserProfile};
use crate::error::PortalError;

/// Identity and stored profile, resolved once per request.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub identity: Option<Identity>,
    pub profile: Option<UserProfile>,
}

/// Where a gate sends the registrant instead of continuing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectTarget {
    SignUp,
    Login,
    CompleteProfile { continuation: Option<LeagueId> },
    LeagueRegistration(LeagueId),
    Landing,
}

impl RedirectTarget {
    pub fn location(&self, landing_path: &str) -> String {
        match self {
            Self::SignUp => "/signup".to_owned(),
            Self::Login => "/login".to_owned(),
            Self::CompleteProfile { continuation: None } => "/complete-profile".to_owned(),
            Self::CompleteProfile {
                continuation: Some(league_id),
            } => format!("/complete-profile?redirect={}", encode(league_id.as_str())),
            Self::LeagueRegistration(league_id) => {
                format!("/league/{}/register", encode(league_id.as_str()))
            }
            Self::Landing => landing_path.to_owned(),
        }
    }
}

// Form encoding writes spaces as '+', which is literal in a path segment.
fn encode(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Fatal conditions that end the flow in-page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadError {
    LeagueIdMissing,
    LeagueNotFound,
    /// A store read failed while loading gate data.
    Unavailable,
}

impl From<LoadError> for PortalError {
    fn from(reason: LoadError) -> Self {
        match reason {
            LoadError::LeagueIdMissing => PortalError::LeagueIdMissing,
            LoadError::LeagueNotFound => PortalError::LeagueNotFound,
            LoadError::Unavailable => PortalError::LeagueUnavailable,
        }
    }
}

/// Result of one gate, or of the whole gate sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Continue(T),
    RedirectTo(RedirectTarget),
    Fatal(LoadError),
}

/// AUTH_CHECK: signed-out visitors go to sign-up.
pub fn auth_gate(identity: Option<&Identity>) -> Outcome<&Identity> {
    match identity {
        Some(identity) => Outcome::Continue(identity),
        None => Outcome::RedirectTo(RedirectTarget::SignUp),
    }
}

/// PROFILE_CHECK: incomplete or missing profiles go to profile completion,
/// carrying the league id so the registrant comes back here afterwards.
pub fn profile_gate(profile: Option<&UserProfile>, league_id: Option<&LeagueId>) -> Outcome<()> {
    if profile.is_some_and(UserProfile::is_complete) {
        Outcome::Continue(())
    } else {
        Outcome::RedirectTo(RedirectTarget::CompleteProfile {
            continuation: league_id.cloned(),
        })
    }
}

/// Current position in the workflow.
///
/// `Submitting` has no `already_registered` flag: a registrant who is already
/// registered can never be submitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FlowState {
    AuthCheck,
    ProfileCheck,
    LeagueLoad,
    RegistrationCheck,
    Ready {
        league: League,
        already_registered: bool,
    },
    Submitting {
        league: League,
    },
    Success {
        league: League,
        registration: Registration,
    },
    SubmitError {
        league: League,
        message: String,
    },
    LoadError {
        reason: LoadError,
    },
}

impl FlowState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AuthCheck => "auth_check",
            Self::ProfileCheck => "profile_check",
            Self::LeagueLoad => "league_load",
            Self::RegistrationCheck => "registration_check",
            Self::Ready { .. } => "ready",
            Self::Submitting { .. } => "submitting",
            Self::Success { .. } => "success",
            Self::SubmitError { .. } => "submit_error",
            Self::LoadError { .. } => "load_error",
        }
    }
}

/// Why a submission could not start or finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitBlocked {
    #[error("already registered")]
    AlreadyRegistered,
    #[error("submission in flight")]
    InFlight,
    #[error("workflow is not ready")]
    NotReady,
}

impl From<SubmitBlocked> for PortalError {
    fn from(blocked: SubmitBlocked) -> Self {
        match blocked {
            SubmitBlocked::AlreadyRegistered => PortalError::AlreadyRegistered,
            SubmitBlocked::InFlight => PortalError::SubmissionInProgress,
            SubmitBlocked::NotReady => {
                PortalError::Internal(anyhow::anyhow!("registration workflow is not ready"))
            }
        }
    }
}

/// Gate results worth keeping across evaluations for the same (league, user).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct GateMemo {
    league_id: LeagueId,
    user_id: UserId,
    league: League,
    already_registered: bool,
}

/// One registrant's pass through the workflow for one league.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationFlow {
    state: FlowState,
    memo: Option<GateMemo>,
}

impl Default for RegistrationFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationFlow {
    pub fn new() -> Self {
        Self {
            state: FlowState::AuthCheck,
            memo: None,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Whether the submit action is offered.
    pub fn can_submit(&self) -> bool {
        matches!(
            self.state,
            FlowState::Ready {
                already_registered: false,
                ..
            } | FlowState::SubmitError { .. }
        )
    }

    /// Drop remembered league and registration lookups.
    ///
    /// The next evaluation reads both stores again. Call this at the start of
    /// every page load so a deleted league or an existing registration is seen.
    pub fn forget_gate_results(&mut self) {
        self.memo = None;
    }

    /// Run the gate sequence from the top.
    ///
    /// Within one page load, league and registration lookups are reused from
    /// the previous evaluation when neither the league id nor the user id changed.
    pub async fn evaluate<L, R>(
        &mut self,
        session: &SessionContext,
        league_id: Option<&LeagueId>,
        leagues: &L,
        registrations: &R,
    ) -> Outcome<()>
    where
        L: LeagueRepository,
        R: RegistrationRepository,
    {
        self.state = FlowState::AuthCheck;
        let identity = match auth_gate(session.identity.as_ref()) {
            Outcome::Continue(identity) => identity,
            other => return self.halt(other),
        };

        self.state = FlowState::ProfileCheck;
        if let outcome @ (Outcome::RedirectTo(_) | Outcome::Fatal(_)) =
            profile_gate(session.profile.as_ref(), league_id)
        {
            return self.halt(outcome);
        }

        self.state = FlowState::LeagueLoad;
        let Some(league_id) = league_id else {
            return self.fail(LoadError::LeagueIdMissing);
        };
        let user_id = &identity.user_id;

        let memo = self
            .memo
            .take()
            .filter(|m| &m.league_id == league_id && &m.user_id == user_id);

        let memo = match memo {
            Some(memo) => memo,
            None => {
                let league = match leagues.find_by_id(league_id).await {
                    Ok(Some(league)) => league,
                    Ok(None) => return self.fail(LoadError::LeagueNotFound),
                    Err(e) => {
                        tracing::warn!(error = %e, league_id = %league_id, "league lookup failed");
                        return self.fail(LoadError::Unavailable);
                    }
                };

                self.state = FlowState::RegistrationCheck;
                let already_registered = match registrations
                    .find_by_league_and_user(league_id, user_id)
                    .await
                {
                    Ok(existing) => !existing.is_empty(),
                    Err(e) => {
                        tracing::warn!(error = %e, league_id = %league_id, "registration lookup failed");
                        return self.fail(LoadError::Unavailable);
                    }
                };

                GateMemo {
                    league_id: league_id.clone(),
                    user_id: user_id.clone(),
                    league,
                    already_registered,
                }
            }
        };

        self.state = FlowState::Ready {
            league: memo.league.clone(),
            already_registered: memo.already_registered,
        };
        self.memo = Some(memo);
        tracing::info!(league_id = %league_id, user_id = %user_id, state = self.state.name(), "registration gates passed");
        Outcome::Continue(())
    }

    /// Enter `Submitting`. Refused while already registered or already submitting.
    pub fn begin_submit(&mut self) -> Result<(), SubmitBlocked> {
        let league = match &self.state {
            FlowState::Ready {
                already_registered: true,
                ..
            }
            | FlowState::Success { .. } => return Err(SubmitBlocked::AlreadyRegistered),
            FlowState::Submitting { .. } => return Err(SubmitBlocked::InFlight),
            FlowState::Ready { league, .. } | FlowState::SubmitError { league, .. } => {
                league.clone()
            }
            _ => return Err(SubmitBlocked::NotReady),
        };
        self.state = FlowState::Submitting { league };
        Ok(())
    }

    /// Leave `Submitting` with the store's answer.
    ///
    /// Success makes `already_registered` sticky for the rest of the flow; a
    /// failure keeps the message and leaves the action enabled.
    pub fn finish_submit(&mut self, result: Result<Registration, String>) -> Result<(), SubmitBlocked> {
        let league = self.take_submitting()?;
        self.state = match result {
            Ok(registration) => {
                self.set_registered();
                FlowState::Success {
                    league,
                    registration,
                }
            }
            Err(message) => FlowState::SubmitError { league, message },
        };
        Ok(())
    }

    /// Leave `Submitting` because the store already holds a registration.
    pub fn mark_already_registered(&mut self) -> Result<(), SubmitBlocked> {
        let league = self.take_submitting()?;
        self.set_registered();
        self.state = FlowState::Ready {
            league,
            already_registered: true,
        };
        Ok(())
    }

    fn take_submitting(&mut self) -> Result<League, SubmitBlocked> {
        match std::mem::replace(&mut self.state, FlowState::AuthCheck) {
            FlowState::Submitting { league } => Ok(league),
            other => {
                self.state = other;
                Err(SubmitBlocked::NotReady)
            }
        }
    }

    fn set_registered(&mut self) {
        if let Some(memo) = self.memo.as_mut() {
            memo.already_registered = true;
        }
    }

    fn halt<T>(&mut self, outcome: Outcome<T>) -> Outcome<()> {
        match outcome {
            Outcome::RedirectTo(target) => {
                tracing::debug!(gate = self.state.name(), target = ?target, "registration gate redirect");
                Outcome::RedirectTo(target)
            }
            Outcome::Fatal(reason) => self.fail(reason),
            Outcome::Continue(_) => Outcome::Continue(()),
        }
    }

    fn fail(&mut self, reason: LoadError) -> Outcome<()> {
        tracing::info!(gate = self.state.name(), reason = ?reason, "registration flow failed to load");
        self.state = FlowState::LoadError { reason };
        Outcome::Fatal(reason)
    }
}
