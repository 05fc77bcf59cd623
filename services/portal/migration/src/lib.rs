use sea_orm_migration::prelude::*;

mod m20260601_000001_create_profiles;
mod m20260601_000002_create_leagues;
mod m20260601_000003_create_registrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260601_000001_create_profiles::Migration),
            Box::new(m20260601_000002_create_leagues::Migration),
            Box::new(m20260601_000003_create_registrations::Migration),
        ]
    }
}
