use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import modules from the library crate
use samudra_monitor::api_key::ApiKeySource;
use samudra_monitor::config::{FileConfig, GatewayCliConfig, GatewaySettings};
use samudra_monitor::server::{self, run_server, RequestsLoggingLevel, UpstreamClient};

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(long, default_value_t = 5002)]
    pub port: u16,

    /// The port for the Prometheus metrics listener.
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// Search source exposed under /api/{source}.
    #[clap(long, default_value = "twitter")]
    pub source: String,

    /// URL of the upstream search API.
    #[clap(long)]
    pub upstream_url: Option<String>,

    /// Bearer token for the upstream search API.
    #[clap(long)]
    pub upstream_token: Option<String>,

    /// Shell command that prints the upstream bearer token on stdout.
    #[clap(long)]
    pub upstream_token_command: Option<String>,

    /// Directory with static frontend files to serve at the root path.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Timeout in seconds for upstream search submissions.
    #[clap(long, default_value_t = 30)]
    pub search_timeout_sec: u64,

    /// Timeout in seconds for upstream result fetches.
    #[clap(long, default_value_t = 60)]
    pub result_timeout_sec: u64,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,
}

/// Convert CLI args to GatewayCliConfig for config resolution
impl From<&CliArgs> for GatewayCliConfig {
    fn from(args: &CliArgs) -> Self {
        GatewayCliConfig {
            port: args.port,
            metrics_port: args.metrics_port,
            source: args.source.clone(),
            upstream_url: args.upstream_url.clone(),
            upstream_token: args.upstream_token.clone(),
            upstream_token_command: args.upstream_token_command.clone(),
            frontend_dir_path: args.frontend_dir_path.clone(),
            search_timeout_sec: args.search_timeout_sec,
            result_timeout_sec: args.result_timeout_sec,
            logging_level: args.logging_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: GatewayCliConfig = (&cli_args).into();
    let settings = GatewaySettings::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  source: {}", settings.source);
    info!("  upstream_url: {}", settings.upstream_url);
    info!("  logging_level: {}", settings.logging_level);

    // Initialize metrics system
    info!("Initializing metrics...");
    server::metrics::init_metrics();

    let token_source = ApiKeySource::from_settings(
        settings.upstream_token.clone(),
        settings.upstream_token_command.clone(),
    );
    if token_source.is_none() {
        warn!("No upstream token configured; requests will be sent without Authorization");
    }

    let upstream = UpstreamClient::new(
        settings.upstream_url.clone(),
        settings.source.clone(),
        token_source,
        settings.search_timeout(),
        settings.result_timeout(),
    );

    info!("Ready to serve at port {}!", settings.port);
    info!("Metrics available at port {}!", settings.metrics_port);
    run_server(
        upstream,
        settings.logging_level.clone(),
        settings.port,
        settings.metrics_port,
        settings.frontend_dir_path.clone(),
    )
    .await
}
