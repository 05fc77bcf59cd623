use sea_orm::entity::prelude::*;

/// Registrant profile, keyed by the identity provider's user id.
/// Everything except `email`, `role` and `created_at` is filled in by profile completion.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub date_of_birth: Option<Date>,
    pub stance: Option<String>,
    pub sponsor: Option<String>,
    pub phone_number: Option<String>,
    pub other_notes: Option<String>,
    pub instagram: Option<String>,
    pub profile_picture_url: Option<String>,
    /// "user" or "admin".
    pub role: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::registrations::Entity")]
    Registrations,
}

impl Related<super::registrations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Registrations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
