use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::config::{EngineConfig, RATE_LIMIT_MAX_REQUESTS, RATE_LIMIT_WINDOW_SECS};
use crate::history::HistoryDb;
use crate::pagespeed::PageSpeedClient;
use crate::rate_limit::{RateLimitStore, SlidingWindowLimiter};

pub type SharedState = Arc<AppState>;

/// Wiring only: the engine is stateless, so nothing here is mutated per
/// request except the rate-limit store's own interior.
pub struct AppState {
    pub config: EngineConfig,
    pub pagespeed: PageSpeedClient,
    pub rate_limiter: Arc<dyn RateLimitStore>,
    pub history: Option<Arc<HistoryDb>>,
}

impl AppState {
    pub fn new(config: EngineConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .build()
            .expect("Failed to create HTTP client");
        let pagespeed = PageSpeedClient::new(
            http_client,
            config.pagespeed_url.clone(),
            config.api_key.clone(),
        );

        let rate_limiter: Arc<dyn RateLimitStore> = Arc::new(SlidingWindowLimiter::new(
            RATE_LIMIT_MAX_REQUESTS,
            Duration::from_secs(RATE_LIMIT_WINDOW_SECS),
        ));

        // History is best-effort from the start: a broken data dir degrades
        // to no-history mode instead of refusing to serve.
        let history = config.data_dir.as_ref().and_then(|dir| {
            match HistoryDb::new(dir) {
                Ok(db) => Some(Arc::new(db)),
                Err(e) => {
                    warn!("History database unavailable, continuing without: {}", e);
                    None
                }
            }
        });

        Self {
            config,
            pagespeed,
            rate_limiter,
            history,
        }
    }

    /// Assemble state from pre-built parts. Lets tests inject a permissive
    /// or exhausted rate limiter and a temp-dir database.
    pub fn with_parts(
        config: EngineConfig,
        pagespeed: PageSpeedClient,
        rate_limiter: Arc<dyn RateLimitStore>,
        history: Option<Arc<HistoryDb>>,
    ) -> Self {
        Self {
            config,
            pagespeed,
            rate_limiter,
            history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CliArgs, DEFAULT_PORT, PAGESPEED_BASE_URL};
    use clap::Parser;

    fn test_config() -> EngineConfig {
        EngineConfig {
            port: DEFAULT_PORT,
            data_dir: None,
            api_key: None,
            pagespeed_url: PAGESPEED_BASE_URL.to_string(),
        }
    }

    #[test]
    fn test_state_without_data_dir_has_no_history() {
        let state = AppState::new(test_config());
        assert!(state.history.is_none());
    }

    #[test]
    fn test_state_with_data_dir_opens_history() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config();
        config.data_dir = Some(dir.path().to_path_buf());
        let state = AppState::new(config);
        assert!(state.history.is_some());
    }

    #[test]
    fn test_cli_args_defaults() {
        let args = CliArgs::parse_from(["arco-impact"]);
        assert_eq!(args.port, DEFAULT_PORT);
        assert!(args.data_dir.is_none());
        assert_eq!(args.pagespeed_url, PAGESPEED_BASE_URL);
    }
}
