use std::collections::HashMap;

use chrono::{NaiveDate, Utc};

use skateleague_domain::id::{LeagueId, UserId};
use skateleague_domain::pagination::PageRequest;

use crate::domain::repository::{LeagueRepository, ProfileRepository, RegistrationRepository};
use crate::domain::types::{FieldPatch, League, LeaguePatch, Registrant, UserProfile};
use crate::error::PortalError;

/// Only profiles with the admin role may change leagues.
async fn require_admin<P: ProfileRepository>(
    profiles: &P,
    user_id: &UserId,
) -> Result<(), PortalError> {
    match profiles.find_by_id(user_id).await? {
        Some(profile) if profile.role.is_admin() => Ok(()),
        _ => Err(PortalError::Forbidden),
    }
}

fn league_name(raw: String) -> Result<String, PortalError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(PortalError::InvalidLeague("name must not be blank".into()));
    }
    Ok(name.to_owned())
}

fn league_date(raw: &str) -> Result<NaiveDate, PortalError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| PortalError::InvalidLeague(format!("date {raw:?} is not YYYY-MM-DD")))
}

// ── ListLeagues ──────────────────────────────────────────────────────────────

pub struct ListLeaguesUseCase<L: LeagueRepository> {
    pub leagues: L,
}

impl<L: LeagueRepository> ListLeaguesUseCase<L> {
    pub async fn execute(&self, page: PageRequest) -> Result<Vec<League>, PortalError> {
        self.leagues.list(page.clamped()).await
    }
}

// ── GetLeague ────────────────────────────────────────────────────────────────

pub struct GetLeagueUseCase<L: LeagueRepository> {
    pub leagues: L,
}

impl<L: LeagueRepository> GetLeagueUseCase<L> {
    pub async fn execute(&self, id: &LeagueId) -> Result<League, PortalError> {
        self.leagues
            .find_by_id(id)
            .await?
            .ok_or(PortalError::LeagueNotFound)
    }
}

// ── CreateLeague ─────────────────────────────────────────────────────────────

pub struct CreateLeagueInput {
    pub name: String,
    pub date: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub banner_image_url: Option<String>,
}

pub struct CreateLeagueUseCase<P: ProfileRepository, L: LeagueRepository> {
    pub profiles: P,
    pub leagues: L,
}

impl<P: ProfileRepository, L: LeagueRepository> CreateLeagueUseCase<P, L> {
    pub async fn execute(
        &self,
        user_id: &UserId,
        input: CreateLeagueInput,
    ) -> Result<League, PortalError> {
        require_admin(&self.profiles, user_id).await?;
        let league = League {
            id: LeagueId::generate(),
            name: league_name(input.name)?,
            date: input.date.as_deref().map(league_date).transpose()?,
            location: input.location,
            description: input.description,
            banner_image_url: input.banner_image_url,
            created_at: Utc::now(),
        };
        self.leagues.create(&league).await?;
        tracing::info!(league_id = %league.id, admin = %user_id, "league created");
        Ok(league)
    }
}

// ── UpdateLeague ─────────────────────────────────────────────────────────────

/// `None` leaves a field alone; `Some(None)` clears an optional field.
#[derive(Default)]
pub struct UpdateLeagueInput {
    pub name: Option<String>,
    pub date: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub banner_image_url: Option<Option<String>>,
}

fn optional_patch<T>(value: Option<Option<T>>) -> FieldPatch<T> {
    match value {
        None => FieldPatch::Omit,
        Some(None) => FieldPatch::Clear,
        Some(Some(v)) => FieldPatch::Set(v),
    }
}

pub struct UpdateLeagueUseCase<P: ProfileRepository, L: LeagueRepository> {
    pub profiles: P,
    pub leagues: L,
}

impl<P: ProfileRepository, L: LeagueRepository> UpdateLeagueUseCase<P, L> {
    pub async fn execute(
        &self,
        user_id: &UserId,
        id: &LeagueId,
        input: UpdateLeagueInput,
    ) -> Result<(), PortalError> {
        require_admin(&self.profiles, user_id).await?;
        let date = match input.date {
            Some(Some(raw)) => FieldPatch::Set(league_date(&raw)?),
            Some(None) => FieldPatch::Clear,
            None => FieldPatch::Omit,
        };
        let patch = LeaguePatch {
            name: input.name.map(league_name).transpose()?.map_or(FieldPatch::Omit, FieldPatch::Set),
            date,
            location: optional_patch(input.location),
            description: optional_patch(input.description),
            banner_image_url: optional_patch(input.banner_image_url),
        };
        if !self.leagues.update(id, &patch).await? {
            return Err(PortalError::LeagueNotFound);
        }
        tracing::info!(league_id = %id, admin = %user_id, "league updated");
        Ok(())
    }
}

// ── DeleteLeague ─────────────────────────────────────────────────────────────

pub struct DeleteLeagueUseCase<P: ProfileRepository, L: LeagueRepository> {
    pub profiles: P,
    pub leagues: L,
}

impl<P: ProfileRepository, L: LeagueRepository> DeleteLeagueUseCase<P, L> {
    /// Registrations for the league go with it.
    pub async fn execute(&self, user_id: &UserId, id: &LeagueId) -> Result<(), PortalError> {
        require_admin(&self.profiles, user_id).await?;
        if !self.leagues.delete(id).await? {
            return Err(PortalError::LeagueNotFound);
        }
        tracing::info!(league_id = %id, admin = %user_id, "league deleted");
        Ok(())
    }
}

// ── ListLeagueRegistrants ────────────────────────────────────────────────────

pub struct ListLeagueRegistrantsUseCase<P, L, R>
where
    P: ProfileRepository,
    L: LeagueRepository,
    R: RegistrationRepository,
{
    pub profiles: P,
    pub leagues: L,
    pub registrations: R,
}

impl<P, L, R> ListLeagueRegistrantsUseCase<P, L, R>
where
    P: ProfileRepository,
    L: LeagueRepository,
    R: RegistrationRepository,
{
    /// Each registration for the league joined with its registrant's profile.
    pub async fn execute(
        &self,
        user_id: &UserId,
        id: &LeagueId,
    ) -> Result<Vec<Registrant>, PortalError> {
        require_admin(&self.profiles, user_id).await?;
        if self.leagues.find_by_id(id).await?.is_none() {
            return Err(PortalError::LeagueNotFound);
        }

        let registrations = self.registrations.list_by_league(id).await?;
        let user_ids: Vec<UserId> = registrations.iter().map(|r| r.user_id.clone()).collect();
        let mut profiles: HashMap<UserId, UserProfile> = self
            .profiles
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        Ok(registrations
            .into_iter()
            .map(|registration| {
                let profile = profiles.remove(&registration.user_id);
                if profile.is_none() {
                    tracing::warn!(
                        registration_id = %registration.id,
                        user_id = %registration.user_id,
                        "registrant has no profile"
                    );
                }
                Registrant {
                    registration,
                    profile,
                }
            })
            .collect())
    }
}
