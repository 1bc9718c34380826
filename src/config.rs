use anyhow::Context;

const DEFAULT_TTL_MINUTES: i64 = 7 * 24 * 60;
const MAX_TTL_MINUTES: i64 = 365 * 24 * 60;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process env.
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = get("DATABASE_URL").context("DATABASE_URL must be set")?;

        let secret = get("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .context("JWT_SECRET must be set to a non-empty value")?;

        let jwt = JwtConfig {
            secret,
            issuer: get("JWT_ISSUER").unwrap_or_else(|| "spendwise".into()),
            audience: get("JWT_AUDIENCE").unwrap_or_else(|| "spendwise-users".into()),
            ttl_minutes: match get("JWT_TTL_MINUTES") {
                Some(raw) => parse_ttl(&raw)?,
                None => DEFAULT_TTL_MINUTES,
            },
        };

        let port = match get("APP_PORT").or_else(|| get("PORT")) {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("invalid port {raw:?}"))?,
            None => 3001,
        };

        Ok(Self {
            database_url,
            max_connections: get("DATABASE_MAX_CONNECTIONS")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            jwt,
        })
    }
}

/// Token lifetime in minutes, between one minute and one year.
fn parse_ttl(raw: &str) -> anyhow::Result<i64> {
    let minutes = raw
        .trim()
        .parse::<i64>()
        .with_context(|| format!("invalid JWT_TTL_MINUTES {raw:?}"))?;
    anyhow::ensure!(
        (1..=MAX_TTL_MINUTES).contains(&minutes),
        "JWT_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}, got {minutes}"
    );
    Ok(minutes)
}
