use anyhow::Context as _;
use sea_orm::Database;
use tracing::info;

use skateleague_auth_types::identity::IdTokenVerifier;
use skateleague_core::config::Config as _;
use skateleague_core::tracing::init_tracing;
use skateleague_portal::config::PortalConfig;
use skateleague_portal::infra::blob::ObjectStoreBlobStore;
use skateleague_portal::router::build_router;
use skateleague_portal::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = PortalConfig::from_env().context("load portal configuration")?;

    let db = Database::connect(&config.database_url)
        .await
        .context("connect to database")?;

    let redis = deadpool_redis::Config::from_url(&config.redis_url)
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .context("create Redis pool")?;

    let blobs = ObjectStoreBlobStore::from_url(&config.blob_store_url, &config.blob_public_base_url)
        .context("open blob store")?;

    let state = AppState {
        db,
        redis,
        blobs,
        verifier: IdTokenVerifier::new(config.id_token_secret),
        cookie_domain: config.cookie_domain,
        landing_path: config.landing_path,
        flow_ttl_secs: config.flow_ttl_secs,
        submission_lock_secs: config.submission_lock_secs,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.portal_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;

    info!("portal listening on {addr}");
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
