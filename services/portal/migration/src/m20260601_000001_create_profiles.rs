use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Profiles::Id).text().not_null().primary_key())
                    .col(ColumnDef::new(Profiles::Email).text().not_null())
                    .col(ColumnDef::new(Profiles::Name).text().null())
                    .col(ColumnDef::new(Profiles::DateOfBirth).date().null())
                    .col(ColumnDef::new(Profiles::Stance).text().null())
                    .col(ColumnDef::new(Profiles::Sponsor).text().null())
                    .col(ColumnDef::new(Profiles::PhoneNumber).text().null())
                    .col(ColumnDef::new(Profiles::OtherNotes).text().null())
                    .col(ColumnDef::new(Profiles::Instagram).text().null())
                    .col(ColumnDef::new(Profiles::ProfilePictureUrl).text().null())
                    .col(
                        ColumnDef::new(Profiles::Role)
                            .text()
                            .not_null()
                            .default("user"),
                    )
                    .col(
                        ColumnDef::new(Profiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Profiles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Profiles {
    Table,
    Id,
    Email,
    Name,
    DateOfBirth,
    Stance,
    Sponsor,
    PhoneNumber,
    OtherNotes,
    Instagram,
    ProfilePictureUrl,
    Role,
    CreatedAt,
    UpdatedAt,
}
