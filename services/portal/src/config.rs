use serde::Deserialize;

use skateleague_core::config::Config;

/// Portal service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct PortalConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis connection URL.
    pub redis_url: String,
    /// HMAC secret the identity provider signs ID tokens with.
    pub id_token_secret: String,
    /// Cookie domain attribute (root domain, e.g. "example.com").
    pub cookie_domain: String,
    /// `s3://bucket/prefix`, `file:///dir` or `memory://`.
    pub blob_store_url: String,
    /// Public URL prefix uploaded pictures are served from.
    pub blob_public_base_url: String,
    /// TCP port to listen on. Env var: `PORTAL_PORT`.
    #[serde(default = "default_port")]
    pub portal_port: u16,
    #[serde(default = "default_flow_ttl")]
    pub flow_ttl_secs: u64,
    #[serde(default = "default_lock_secs")]
    pub submission_lock_secs: u64,
    /// Where registrants go after profile completion without a league in hand.
    #[serde(default = "default_landing_path")]
    pub landing_path: String,
}

fn default_port() -> u16 {
    3114
}

fn default_flow_ttl() -> u64 {
    900
}

fn default_lock_secs() -> u64 {
    30
}

fn default_landing_path() -> String {
    "/".to_owned()
}

impl Config for PortalConfig {}
