#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, TimeZone, Utc};

use skateleague_auth_types::identity::Identity;
use skateleague_domain::id::{LeagueId, UserId};
use skateleague_domain::pagination::PageRequest;
use skateleague_portal::domain::repository::{
    BlobStore, FlowStore, LeagueRepository, LockToken, ProfileRepository,
    RegistrationRepository, SubmissionLock,
};
use skateleague_portal::domain::types::{
    FieldPatch, League, LeaguePatch, PictureUpload, ProfilePatch, Registration, UserProfile,
};
use skateleague_portal::domain::workflow::RegistrationFlow;
use skateleague_portal::error::PortalError;

pub fn identity(user_id: &str) -> Identity {
    Identity {
        user_id: user_id.parse().unwrap(),
        email: format!("{}@example.com", user_id.to_lowercase()),
    }
}

pub fn league_id(raw: &str) -> LeagueId {
    raw.parse().unwrap()
}

pub fn spring_open() -> League {
    League {
        id: league_id("L1"),
        name: "Spring Open".into(),
        date: NaiveDate::from_ymd_opt(2026, 5, 2),
        location: Some("Venice Beach".into()),
        description: None,
        banner_image_url: None,
        created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
    }
}

pub fn complete_profile(user_id: &str) -> UserProfile {
    let identity = identity(user_id);
    UserProfile {
        name: Some("Kim".into()),
        date_of_birth: NaiveDate::from_ymd_opt(2012, 4, 1),
        ..UserProfile::stub(identity.user_id, identity.email, Utc::now())
    }
}

fn apply<T: Clone>(slot: &mut Option<T>, patch: &FieldPatch<T>) {
    match patch {
        FieldPatch::Omit => {}
        FieldPatch::Set(v) => *slot = Some(v.clone()),
        FieldPatch::Clear => *slot = None,
    }
}

// ── MockProfileRepo ──────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockProfileRepo {
    pub profiles: Arc<Mutex<HashMap<UserId, UserProfile>>>,
    /// Every patch passed to `upsert`, in call order.
    pub upserts: Arc<Mutex<Vec<ProfilePatch>>>,
    pub reads: Arc<Mutex<u32>>,
}

impl MockProfileRepo {
    pub fn new(profiles: Vec<UserProfile>) -> Self {
        let repo = Self::default();
        {
            let mut stored = repo.profiles.lock().unwrap();
            for p in profiles {
                stored.insert(p.id.clone(), p);
            }
        }
        repo
    }

    pub fn get(&self, user_id: &str) -> Option<UserProfile> {
        self.profiles
            .lock()
            .unwrap()
            .get(&user_id.parse::<UserId>().unwrap())
            .cloned()
    }
}

impl ProfileRepository for MockProfileRepo {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, PortalError> {
        *self.reads.lock().unwrap() += 1;
        Ok(self.profiles.lock().unwrap().get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<UserProfile>, PortalError> {
        let stored = self.profiles.lock().unwrap();
        Ok(ids.iter().filter_map(|id| stored.get(id).cloned()).collect())
    }

    async fn create_stub(&self, profile: &UserProfile) -> Result<bool, PortalError> {
        let mut stored = self.profiles.lock().unwrap();
        if stored.contains_key(&profile.id) {
            return Ok(false);
        }
        stored.insert(profile.id.clone(), profile.clone());
        Ok(true)
    }

    async fn upsert(
        &self,
        id: &UserId,
        email: &str,
        patch: &ProfilePatch,
    ) -> Result<(), PortalError> {
        self.upserts.lock().unwrap().push(patch.clone());
        let mut stored = self.profiles.lock().unwrap();
        let profile = stored
            .entry(id.clone())
            .or_insert_with(|| UserProfile::stub(id.clone(), email.to_owned(), Utc::now()));
        apply(&mut profile.name, &patch.name);
        apply(&mut profile.date_of_birth, &patch.date_of_birth);
        apply(&mut profile.stance, &patch.stance);
        apply(&mut profile.sponsor, &patch.sponsor);
        apply(&mut profile.phone_number, &patch.phone_number);
        apply(&mut profile.other_notes, &patch.other_notes);
        apply(&mut profile.instagram, &patch.instagram);
        apply(&mut profile.profile_picture_url, &patch.profile_picture_url);
        Ok(())
    }
}

// ── MockLeagueRepo ───────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockLeagueRepo {
    pub leagues: Arc<Mutex<Vec<League>>>,
    pub reads: Arc<Mutex<u32>>,
    pub fail_reads: bool,
}

impl MockLeagueRepo {
    pub fn new(leagues: Vec<League>) -> Self {
        Self {
            leagues: Arc::new(Mutex::new(leagues)),
            ..Self::default()
        }
    }

    pub fn read_count(&self) -> u32 {
        *self.reads.lock().unwrap()
    }
}

impl LeagueRepository for MockLeagueRepo {
    async fn find_by_id(&self, id: &LeagueId) -> Result<Option<League>, PortalError> {
        *self.reads.lock().unwrap() += 1;
        if self.fail_reads {
            return Err(PortalError::Internal(anyhow::anyhow!("connection reset")));
        }
        Ok(self.leagues.lock().unwrap().iter().find(|l| &l.id == id).cloned())
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<League>, PortalError> {
        Ok(self
            .leagues
            .lock()
            .unwrap()
            .iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect())
    }

    async fn create(&self, league: &League) -> Result<(), PortalError> {
        self.leagues.lock().unwrap().push(league.clone());
        Ok(())
    }

    async fn update(&self, id: &LeagueId, patch: &LeaguePatch) -> Result<bool, PortalError> {
        let mut leagues = self.leagues.lock().unwrap();
        let Some(league) = leagues.iter_mut().find(|l| &l.id == id) else {
            return Ok(false);
        };
        if let FieldPatch::Set(name) = &patch.name {
            league.name = name.clone();
        }
        apply(&mut league.date, &patch.date);
        apply(&mut league.location, &patch.location);
        apply(&mut league.description, &patch.description);
        apply(&mut league.banner_image_url, &patch.banner_image_url);
        Ok(true)
    }

    async fn delete(&self, id: &LeagueId) -> Result<bool, PortalError> {
        let mut leagues = self.leagues.lock().unwrap();
        let before = leagues.len();
        leagues.retain(|l| &l.id != id);
        Ok(leagues.len() < before)
    }
}

// ── MockRegistrationRepo ─────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockRegistrationRepo {
    pub registrations: Arc<Mutex<Vec<Registration>>>,
    pub fail_writes: Option<String>,
}

impl MockRegistrationRepo {
    pub fn new(registrations: Vec<Registration>) -> Self {
        Self {
            registrations: Arc::new(Mutex::new(registrations)),
            fail_writes: None,
        }
    }

    pub fn all(&self) -> Vec<Registration> {
        self.registrations.lock().unwrap().clone()
    }
}

impl RegistrationRepository for MockRegistrationRepo {
    async fn find_by_league_and_user(
        &self,
        league_id: &LeagueId,
        user_id: &UserId,
    ) -> Result<Vec<Registration>, PortalError> {
        Ok(self
            .registrations
            .lock()
            .unwrap()
            .iter()
            .filter(|r| &r.league_id == league_id && &r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_by_league(&self, league_id: &LeagueId) -> Result<Vec<Registration>, PortalError> {
        Ok(self
            .registrations
            .lock()
            .unwrap()
            .iter()
            .filter(|r| &r.league_id == league_id)
            .cloned()
            .collect())
    }

    async fn create(&self, registration: &Registration) -> Result<bool, PortalError> {
        if let Some(message) = &self.fail_writes {
            return Err(PortalError::Internal(
                anyhow::anyhow!(message.clone()).context("insert registration"),
            ));
        }
        let mut stored = self.registrations.lock().unwrap();
        if stored
            .iter()
            .any(|r| r.league_id == registration.league_id && r.user_id == registration.user_id)
        {
            return Ok(false);
        }
        stored.push(registration.clone());
        Ok(true)
    }
}

// ── MockBlobStore ────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockBlobStore {
    pub uploads: Arc<Mutex<Vec<String>>>,
    pub deletes: Arc<Mutex<Vec<String>>>,
    pub fail_uploads: bool,
}

impl MockBlobStore {
    pub fn failing() -> Self {
        Self {
            fail_uploads: true,
            ..Self::default()
        }
    }
}

impl BlobStore for MockBlobStore {
    async fn upload(&self, path: &str, _upload: &PictureUpload) -> Result<String, PortalError> {
        if self.fail_uploads {
            return Err(PortalError::Internal(
                anyhow::anyhow!("bucket quota exceeded").context(format!("put {path}")),
            ));
        }
        self.uploads.lock().unwrap().push(path.to_owned());
        Ok(format!("https://cdn.example.com/{path}"))
    }

    async fn delete(&self, url: &str) -> Result<(), PortalError> {
        self.deletes.lock().unwrap().push(url.to_owned());
        Ok(())
    }
}

// ── MockFlowStore ────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockFlowStore {
    pub flows: Arc<Mutex<HashMap<(UserId, LeagueId), RegistrationFlow>>>,
    pub unavailable: bool,
}

impl FlowStore for MockFlowStore {
    async fn load(
        &self,
        user_id: &UserId,
        league_id: &LeagueId,
    ) -> Result<Option<RegistrationFlow>, PortalError> {
        if self.unavailable {
            return Err(PortalError::Internal(anyhow::anyhow!("redis down")));
        }
        Ok(self
            .flows
            .lock()
            .unwrap()
            .get(&(user_id.clone(), league_id.clone()))
            .cloned())
    }

    async fn save(
        &self,
        user_id: &UserId,
        league_id: &LeagueId,
        flow: &RegistrationFlow,
    ) -> Result<(), PortalError> {
        if self.unavailable {
            return Err(PortalError::Internal(anyhow::anyhow!("redis down")));
        }
        self.flows
            .lock()
            .unwrap()
            .insert((user_id.clone(), league_id.clone()), flow.clone());
        Ok(())
    }
}

// ── MockSubmissionLock ───────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockSubmissionLock {
    /// Current holder's token per (user, league).
    pub held: Arc<Mutex<HashMap<(UserId, LeagueId), String>>>,
    /// Hand the lock to another submission right after it is granted, as if it expired.
    pub taken_over: bool,
}

impl MockSubmissionLock {
    /// Simulate another request that is mid-submission.
    pub fn hold(&self, user_id: &UserId, league_id: &LeagueId) {
        self.held
            .lock()
            .unwrap()
            .insert((user_id.clone(), league_id.clone()), "other".into());
    }

    pub fn holder(&self, user_id: &UserId, league_id: &LeagueId) -> Option<String> {
        self.held
            .lock()
            .unwrap()
            .get(&(user_id.clone(), league_id.clone()))
            .cloned()
    }
}

impl SubmissionLock for MockSubmissionLock {
    async fn acquire(
        &self,
        user_id: &UserId,
        league_id: &LeagueId,
    ) -> Result<Option<LockToken>, PortalError> {
        let key = (user_id.clone(), league_id.clone());
        let mut held = self.held.lock().unwrap();
        if held.contains_key(&key) {
            return Ok(None);
        }
        let token = LockToken::generate();
        let stored = if self.taken_over {
            "other".to_owned()
        } else {
            token.0.clone()
        };
        held.insert(key, stored);
        Ok(Some(token))
    }

    async fn release(
        &self,
        user_id: &UserId,
        league_id: &LeagueId,
        token: &LockToken,
    ) -> Result<(), PortalError> {
        let key = (user_id.clone(), league_id.clone());
        let mut held = self.held.lock().unwrap();
        if held.get(&key) == Some(&token.0) {
            held.remove(&key);
        }
        Ok(())
    }
}
