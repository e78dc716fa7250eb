use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub uploads_dir: String,
    pub db_max_connections: u32,
    pub db_connect_attempts: u32,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    /// Load configuration from the environment. `DATABASE_URL` is required
    /// and has no fallback; everything else defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL is not set"))?;
        Ok(Self {
            database_url,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
            uploads_dir: std::env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".into()),
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            db_connect_attempts: std::env::var("DB_CONNECT_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            bcrypt_cost: std::env::var("BCRYPT_COST")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .map(clamp_bcrypt_cost)
                .unwrap_or(12),
        })
    }
}

/// Keep the configured cost inside the sane band for interactive logins.
/// Anything below 10 is too cheap for production hashes.
fn clamp_bcrypt_cost(cost: u32) -> u32 {
    cost.clamp(10, 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bcrypt_cost_floor_is_ten() {
        assert_eq!(clamp_bcrypt_cost(4), 10);
        assert_eq!(clamp_bcrypt_cost(9), 10);
        assert_eq!(clamp_bcrypt_cost(12), 12);
        assert_eq!(clamp_bcrypt_cost(31), 16);
    }
}
