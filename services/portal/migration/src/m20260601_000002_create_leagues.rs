use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Leagues::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Leagues::Id).text().not_null().primary_key())
                    .col(ColumnDef::new(Leagues::Name).text().not_null())
                    .col(ColumnDef::new(Leagues::Date).date().null())
                    .col(ColumnDef::new(Leagues::Location).text().null())
                    .col(ColumnDef::new(Leagues::Description).text().null())
                    .col(ColumnDef::new(Leagues::BannerImageUrl).text().null())
                    .col(
                        ColumnDef::new(Leagues::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Leagues::Table)
                    .col(Leagues::CreatedAt)
                    .name("idx_leagues_created_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Leagues::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Leagues {
    Table,
    Id,
    Name,
    Date,
    Location,
    Description,
    BannerImageUrl,
    CreatedAt,
}
