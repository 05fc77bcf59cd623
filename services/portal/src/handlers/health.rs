use anyhow::Context as _;
use axum::{extract::State, http::StatusCode};

use skateleague_core::health::readiness;

use crate::infra::flow;
use crate::state::AppState;

// ── GET /readyz ──────────────────────────────────────────────────────────────

pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    let probe = async {
        state.db.ping().await.context("database")?;
        flow::ping(&state.redis).await.context("redis")?;
        state.blobs.ping().await.context("blob store")?;
        anyhow::Ok(())
    }
    .await;
    readiness(probe.map_err(|e| format!("{e:#}")))
}
