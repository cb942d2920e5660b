use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import modules from the library crate
use samudra_monitor::analytics::Summary;
use samudra_monitor::api_key::ApiKeySource;
use samudra_monitor::classify::{Classifier, GeminiClassifier, HeuristicClassifier};
use samudra_monitor::config::{FileConfig, MonitorCliConfig, MonitorConfig};
use samudra_monitor::feed::{render_summary, ConsoleFeed};
use samudra_monitor::ingest::SearchApiClient;
use samudra_monitor::pipeline::{Monitor, SearchOutcome};

#[derive(Parser, Debug)]
struct CliArgs {
    /// Search query. The built-in multilingual coastal-hazard query is used when omitted.
    pub query: Option<String>,

    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Base URL of the search gateway.
    #[clap(long, default_value = "http://127.0.0.1:5002")]
    pub gateway_url: String,

    /// Search source exposed by the gateway.
    #[clap(long, default_value = "twitter")]
    pub source: String,

    /// Maximum number of posts to request per search.
    #[clap(long, default_value_t = 20)]
    pub max_results: u32,

    /// Timeout in seconds for gateway requests.
    #[clap(long, default_value_t = 30)]
    pub request_timeout_sec: u64,

    /// Skip the remote classifier and use keyword heuristics only.
    #[clap(long)]
    pub offline: bool,

    /// Gemini API key for remote classification.
    #[clap(long)]
    pub api_key: Option<String>,

    /// Shell command that prints the Gemini API key on stdout.
    #[clap(long)]
    pub api_key_command: Option<String>,

    /// Gemini model name.
    #[clap(long)]
    pub model: Option<String>,

    /// Gemini API base URL.
    #[clap(long)]
    pub base_url: Option<String>,
}

/// Convert CLI args to MonitorCliConfig for config resolution
impl From<&CliArgs> for MonitorCliConfig {
    fn from(args: &CliArgs) -> Self {
        MonitorCliConfig {
            gateway_url: args.gateway_url.clone(),
            source: args.source.clone(),
            max_results: args.max_results,
            request_timeout_sec: args.request_timeout_sec,
            offline: args.offline,
            api_key: args.api_key.clone(),
            api_key_command: args.api_key_command.clone(),
            model: args.model.clone(),
            base_url: args.base_url.clone(),
        }
    }
}

/// Pick the remote classifier when a key is configured and the endpoint
/// answers a connectivity probe; keyword heuristics otherwise.
async fn select_classifier(config: &MonitorConfig) -> (Arc<dyn Classifier>, bool) {
    if config.offline {
        info!("Offline mode requested; classifying with keyword heuristics");
        return (Arc::new(HeuristicClassifier::new()), false);
    }

    let key_source = ApiKeySource::from_settings(
        config.classifier.api_key.clone(),
        config.classifier.api_key_command.clone(),
    );
    if key_source.is_none() {
        warn!("No Gemini API key configured; falling back to keyword heuristics");
        return (Arc::new(HeuristicClassifier::new()), false);
    }

    let gemini = GeminiClassifier::new(
        config.classifier.base_url.clone(),
        config.classifier.model.clone(),
        key_source,
    )
    .with_retry(
        config.classifier.max_attempts,
        config.classifier.backoff_step(),
    );
    match gemini.health_check().await {
        Ok(()) => {
            info!(
                "Gemini reachable; classifying with model {}",
                config.classifier.model
            );
            (Arc::new(gemini), true)
        }
        Err(err) => {
            warn!("Gemini connectivity check failed: {}", err);
            (Arc::new(HeuristicClassifier::new()), false)
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
    let cli_config: MonitorCliConfig = (&cli_args).into();
    let config = MonitorConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  gateway_url: {}", config.gateway_url);
    info!("  source: {}", config.source);
    info!("  max_results: {}", config.max_results);

    let (classifier, online) = select_classifier(&config).await;

    let backend = Arc::new(SearchApiClient::new(
        &config.gateway_url,
        &config.source,
        config.request_timeout(),
    )?);
    let sink = Arc::new(ConsoleFeed::new());
    let monitor = Monitor::new(
        backend,
        classifier,
        online,
        sink,
        config.polling.to_policy(),
        config.batch.to_policy(),
        config.max_results,
    );

    let query = cli_args.query.as_deref().unwrap_or("");
    let outcome = monitor.run(query).await;

    if matches!(outcome, SearchOutcome::Completed { .. }) {
        let posts = monitor.snapshot();
        if !posts.is_empty() {
            println!("\n{}", render_summary(&Summary::from_posts(&posts)));
        }
        if let Some(sample) = monitor.volume_history().last() {
            info!(
                "Volume sample recorded: {} posts at {}",
                sample.count, sample.time
            );
        }
    }

    Ok(())
}
