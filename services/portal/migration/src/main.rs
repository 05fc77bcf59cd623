use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(skateleague_portal_migration::Migrator).await;
}
