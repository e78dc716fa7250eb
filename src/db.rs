use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::config::AppConfig;

const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(8);

/// Delay before the next attempt after `attempt` failures (1-based),
/// doubling from half a second up to a cap.
pub fn backoff_delay(attempt: u32) -> Duration {
    let exp = attempt.saturating_sub(1).min(30);
    let delay = INITIAL_BACKOFF.saturating_mul(1u32 << exp.min(4));
    delay.min(MAX_BACKOFF)
}

/// Connect to Postgres, retrying with bounded exponential backoff.
/// Exhausting the attempts is fatal; the caller is expected to let the
/// error terminate the process.
pub async fn connect_with_retry(config: &AppConfig) -> anyhow::Result<PgPool> {
    let attempts = config.db_connect_attempts.max(1);
    for attempt in 1..=attempts {
        match PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => {
                info!(attempt, "database connected");
                return Ok(pool);
            }
            Err(e) => {
                warn!(attempt, attempts, error = %e, "database connect failed");
                if attempt < attempts {
                    tokio::time::sleep(backoff_delay(attempt)).await;
                }
            }
        }
    }
    anyhow::bail!("database unreachable after {} attempts", attempts)
}

/// Trivial round-trip used by the health endpoint.
pub async fn ping(db: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(db).await?;
    Ok(())
}
