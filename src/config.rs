use clap::Parser;
use std::path::PathBuf;

/// ARCO impact analyzer: converts page-speed diagnostics into revenue impact.
#[derive(Parser, Debug, Clone)]
#[command(name = "arco-impact")]
pub struct CliArgs {
    /// HTTP port to listen on
    #[arg(long = "port", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Directory for the analysis history database (omit to disable history)
    #[arg(long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// PageSpeed API key (falls back to PAGESPEED_API_KEY env var)
    #[arg(long = "api-key", env = "PAGESPEED_API_KEY")]
    pub api_key: Option<String>,

    /// Override the PageSpeed API base URL (for local stubs)
    #[arg(long = "pagespeed-url", default_value = PAGESPEED_BASE_URL)]
    pub pagespeed_url: String,
}

pub struct EngineConfig {
    pub port: u16,
    pub data_dir: Option<PathBuf>,
    pub api_key: Option<String>,
    pub pagespeed_url: String,
}

// Server constants
pub const DEFAULT_PORT: u16 = 8787;

// Upstream diagnostic API constants
pub const PAGESPEED_BASE_URL: &str =
    "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";
pub const PAGESPEED_TIMEOUT_SECS: u64 = 30;

// Rate limit constants (fixed request count per fixed window, per client)
pub const RATE_LIMIT_MAX_REQUESTS: usize = 10;
pub const RATE_LIMIT_WINDOW_SECS: u64 = 600; // 10 minutes

// Opportunity ranker constants
pub const MAX_OPPORTUNITIES: usize = 10;
pub const OPPORTUNITY_HIGH_IMPACT_MS: f64 = 1000.0;
pub const OPPORTUNITY_MEDIUM_IMPACT_MS: f64 = 500.0;

// Revenue model constants
pub const MOBILE_TRAFFIC_SHARE: f64 = 0.5;
pub const UNIQUE_VISITOR_CAP: f64 = 0.6;
pub const RECOVERABLE_LOSS_SHARE: f64 = 0.5;
// Assumed one-time remediation cost, in the same currency unit as the
// average ticket. Tuning knob, not a derived quantity.
pub const IMPLEMENTATION_COST: f64 = 5_000.0;

// Default business assumptions applied when the caller supplies none
pub const DEFAULT_MONTHLY_TRAFFIC: u64 = 5_000;
pub const DEFAULT_CONVERSION_RATE: f64 = 2.5;
pub const DEFAULT_AVERAGE_TICKET: f64 = 150.0;

impl EngineConfig {
    pub fn from_args(args: CliArgs) -> Self {
        EngineConfig {
            port: args.port,
            data_dir: args.data_dir,
            api_key: args.api_key,
            pagespeed_url: args.pagespeed_url,
        }
    }
}
