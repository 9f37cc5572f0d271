use std::path::PathBuf;

use anyhow::Context;

use crate::auth::AdminIdentity;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub admin: AdminIdentity,
    pub seed_sample_data: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env_or("DATABASE_URL", "sqlite://productos.db"),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", "5")
                .parse()
                .context("DB_MAX_CONNECTIONS must be a valid number")?,
            host: env_or("HOST", "127.0.0.1"),
            port: env_or("PORT", "3000")
                .parse()
                .context("PORT must be a valid number")?,
            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "uploads")),
            admin: AdminIdentity {
                username: env_or("ADMIN_USERNAME", "admin"),
                password: env_or("ADMIN_PASSWORD", "1234"),
                token: env_or("ADMIN_TOKEN", "admin-token-123"),
            },
            seed_sample_data: parse_flag(&env_or("SEED_SAMPLE_DATA", "false"))
                .context("SEED_SAMPLE_DATA must be true/false")?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("unrecognised flag value {:?}", other),
    }
}
