use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveValue::{self, NotSet, Set, Unchanged},
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::OnConflict,
};

use skateleague_domain::id::{LeagueId, UserId};
use skateleague_domain::pagination::PageRequest;
use skateleague_domain::registration::RegistrationStatus;
use skateleague_domain::user::UserRole;
use skateleague_portal_schema::{leagues, profiles, registrations};

use crate::domain::repository::{LeagueRepository, ProfileRepository, RegistrationRepository};
use crate::domain::types::{FieldPatch, League, LeaguePatch, ProfilePatch, Registration, UserProfile};
use crate::error::PortalError;

/// Translate one patched field into an active value, recording touched columns.
fn patch_value<T, C>(field: &FieldPatch<T>, column: C, touched: &mut Vec<C>) -> ActiveValue<Option<T>>
where
    T: Clone,
    Option<T>: Into<sea_orm::Value>,
{
    match field {
        FieldPatch::Omit => NotSet,
        FieldPatch::Set(v) => {
            touched.push(column);
            Set(Some(v.clone()))
        }
        FieldPatch::Clear => {
            touched.push(column);
            Set(None)
        }
    }
}

// ── Profile repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbProfileRepository {
    pub db: DatabaseConnection,
}

impl ProfileRepository for DbProfileRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, PortalError> {
        let model = profiles::Entity::find_by_id(id.as_str())
            .one(&self.db)
            .await
            .context("find profile by id")?;
        model.map(UserProfile::try_from).transpose()
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<UserProfile>, PortalError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = profiles::Entity::find()
            .filter(profiles::Column::Id.is_in(ids.iter().map(UserId::as_str)))
            .all(&self.db)
            .await
            .context("find profiles by ids")?;
        models.into_iter().map(UserProfile::try_from).collect()
    }

    async fn create_stub(&self, profile: &UserProfile) -> Result<bool, PortalError> {
        let am = profiles::ActiveModel {
            id: Set(profile.id.to_string()),
            email: Set(profile.email.clone()),
            role: Set(profile.role.as_str().to_owned()),
            created_at: Set(profile.created_at),
            updated_at: Set(profile.created_at),
            ..Default::default()
        };
        let inserted = profiles::Entity::insert(am)
            .on_conflict(OnConflict::column(profiles::Column::Id).do_nothing().to_owned())
            .exec_without_returning(&self.db)
            .await;
        match inserted {
            Ok(rows) => Ok(rows > 0),
            Err(DbErr::RecordNotInserted) => Ok(false),
            Err(e) => Err(anyhow::Error::new(e).context("create profile stub").into()),
        }
    }

    async fn upsert(
        &self,
        id: &UserId,
        email: &str,
        patch: &ProfilePatch,
    ) -> Result<(), PortalError> {
        let now = Utc::now();
        let mut touched = vec![profiles::Column::UpdatedAt];
        let am = profiles::ActiveModel {
            id: Set(id.to_string()),
            // Only used when the row is inserted; never in the update set.
            email: Set(email.to_owned()),
            role: Set(UserRole::User.as_str().to_owned()),
            created_at: Set(now),
            updated_at: Set(now),
            name: patch_value(&patch.name, profiles::Column::Name, &mut touched),
            date_of_birth: patch_value(&patch.date_of_birth, profiles::Column::DateOfBirth, &mut touched),
            stance: patch_value(&patch.stance, profiles::Column::Stance, &mut touched),
            sponsor: patch_value(&patch.sponsor, profiles::Column::Sponsor, &mut touched),
            phone_number: patch_value(&patch.phone_number, profiles::Column::PhoneNumber, &mut touched),
            other_notes: patch_value(&patch.other_notes, profiles::Column::OtherNotes, &mut touched),
            instagram: patch_value(&patch.instagram, profiles::Column::Instagram, &mut touched),
            profile_picture_url: patch_value(
                &patch.profile_picture_url,
                profiles::Column::ProfilePictureUrl,
                &mut touched,
            ),
        };
        profiles::Entity::insert(am)
            .on_conflict(
                OnConflict::column(profiles::Column::Id)
                    .update_columns(touched)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("upsert profile")?;
        Ok(())
    }
}

impl TryFrom<profiles::Model> for UserProfile {
    type Error = PortalError;

    fn try_from(model: profiles::Model) -> Result<Self, Self::Error> {
        let id = model
            .id
            .parse()
            .map_err(|_| PortalError::InvalidDocument("profile with blank id".into()))?;
        let role = model
            .role
            .parse::<UserRole>()
            .map_err(|e| PortalError::InvalidDocument(format!("profile {}: {e}", model.id)))?;
        Ok(Self {
            id,
            email: model.email,
            name: model.name,
            date_of_birth: model.date_of_birth,
            stance: model.stance,
            sponsor: model.sponsor,
            phone_number: model.phone_number,
            other_notes: model.other_notes,
            instagram: model.instagram,
            profile_picture_url: model.profile_picture_url,
            role,
            created_at: model.created_at,
        })
    }
}

// ── League repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbLeagueRepository {
    pub db: DatabaseConnection,
}

impl LeagueRepository for DbLeagueRepository {
    async fn find_by_id(&self, id: &LeagueId) -> Result<Option<League>, PortalError> {
        let model = leagues::Entity::find_by_id(id.as_str())
            .one(&self.db)
            .await
            .context("find league by id")?;
        model.map(League::try_from).transpose()
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<League>, PortalError> {
        let models = leagues::Entity::find()
            .order_by_desc(leagues::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list leagues")?;
        models.into_iter().map(League::try_from).collect()
    }

    async fn create(&self, league: &League) -> Result<(), PortalError> {
        leagues::Entity::insert(leagues::ActiveModel {
            id: Set(league.id.to_string()),
            name: Set(league.name.clone()),
            date: Set(league.date),
            location: Set(league.location.clone()),
            description: Set(league.description.clone()),
            banner_image_url: Set(league.banner_image_url.clone()),
            created_at: Set(league.created_at),
        })
        .exec_without_returning(&self.db)
        .await
        .context("create league")?;
        Ok(())
    }

    async fn update(&self, id: &LeagueId, patch: &LeaguePatch) -> Result<bool, PortalError> {
        let mut touched = Vec::new();
        let name = match &patch.name {
            FieldPatch::Set(name) => {
                touched.push(leagues::Column::Name);
                Set(name.clone())
            }
            FieldPatch::Omit | FieldPatch::Clear => NotSet,
        };
        let am = leagues::ActiveModel {
            id: Unchanged(id.to_string()),
            name,
            date: patch_value(&patch.date, leagues::Column::Date, &mut touched),
            location: patch_value(&patch.location, leagues::Column::Location, &mut touched),
            description: patch_value(&patch.description, leagues::Column::Description, &mut touched),
            banner_image_url: patch_value(
                &patch.banner_image_url,
                leagues::Column::BannerImageUrl,
                &mut touched,
            ),
            created_at: NotSet,
        };

        if touched.is_empty() {
            return Ok(self.find_by_id(id).await?.is_some());
        }
        let result = leagues::Entity::update_many()
            .set(am)
            .filter(leagues::Column::Id.eq(id.as_str()))
            .exec(&self.db)
            .await
            .context("update league")?;
        Ok(result.rows_affected > 0)
    }

    async fn delete(&self, id: &LeagueId) -> Result<bool, PortalError> {
        let result = leagues::Entity::delete_by_id(id.as_str())
            .exec(&self.db)
            .await
            .context("delete league")?;
        Ok(result.rows_affected > 0)
    }
}

impl TryFrom<leagues::Model> for League {
    type Error = PortalError;

    fn try_from(model: leagues::Model) -> Result<Self, Self::Error> {
        let id = model
            .id
            .parse()
            .map_err(|_| PortalError::InvalidDocument("league with blank id".into()))?;
        if model.name.trim().is_empty() {
            return Err(PortalError::InvalidDocument(format!(
                "league {} has a blank name",
                model.id
            )));
        }
        Ok(Self {
            id,
            name: model.name,
            date: model.date,
            location: model.location,
            description: model.description,
            banner_image_url: model.banner_image_url,
            created_at: model.created_at,
        })
    }
}

// ── Registration repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRegistrationRepository {
    pub db: DatabaseConnection,
}

impl RegistrationRepository for DbRegistrationRepository {
    async fn find_by_league_and_user(
        &self,
        league_id: &LeagueId,
        user_id: &UserId,
    ) -> Result<Vec<Registration>, PortalError> {
        let models = registrations::Entity::find()
            .filter(registrations::Column::LeagueId.eq(league_id.as_str()))
            .filter(registrations::Column::UserId.eq(user_id.as_str()))
            .all(&self.db)
            .await
            .context("find registrations by league and user")?;
        models.into_iter().map(Registration::try_from).collect()
    }

    async fn list_by_league(&self, league_id: &LeagueId) -> Result<Vec<Registration>, PortalError> {
        let models = registrations::Entity::find()
            .filter(registrations::Column::LeagueId.eq(league_id.as_str()))
            .order_by_asc(registrations::Column::RegisteredAt)
            .all(&self.db)
            .await
            .context("list registrations by league")?;
        models.into_iter().map(Registration::try_from).collect()
    }

    async fn create(&self, registration: &Registration) -> Result<bool, PortalError> {
        let am = registrations::ActiveModel {
            id: Set(registration.id.0),
            league_id: Set(registration.league_id.to_string()),
            user_id: Set(registration.user_id.to_string()),
            status: Set(registration.status.as_str().to_owned()),
            registered_at: Set(registration.registered_at),
        };
        let inserted = registrations::Entity::insert(am)
            .on_conflict(
                OnConflict::columns([
                    registrations::Column::LeagueId,
                    registrations::Column::UserId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await;
        match inserted {
            Ok(rows) => Ok(rows > 0),
            Err(DbErr::RecordNotInserted) => Ok(false),
            Err(e) => Err(anyhow::Error::new(e).context("insert registration").into()),
        }
    }
}

impl TryFrom<registrations::Model> for Registration {
    type Error = PortalError;

    fn try_from(model: registrations::Model) -> Result<Self, Self::Error> {
        let invalid = |what: &str| {
            PortalError::InvalidDocument(format!("registration {}: {what}", model.id))
        };
        let league_id = model.league_id.parse().map_err(|_| invalid("blank league id"))?;
        let user_id = model.user_id.parse().map_err(|_| invalid("blank user id"))?;
        let status = model
            .status
            .parse::<RegistrationStatus>()
            .map_err(|e| invalid(&format!("{e}")))?;
        Ok(Self {
            id: model.id.into(),
            league_id,
            user_id,
            registered_at: model.registered_at,
            status,
        })
    }
}
