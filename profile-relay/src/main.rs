use clap::{Args, Parser, Subcommand};
use config::{Config, ConfigError, LoggingConfig, MetricsConfig};
use metrics_exporter_statsd::StatsdBuilder;
use relay::upstream::BotToken;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

mod config;

const METRICS_PREFIX: &str = "profile_relay";

#[derive(Parser)]
#[command(version, about = "Relays Discord user lookups as reduced profiles")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Run the profile relay
    Relay(ConfigArgs),
    /// Load and validate the configuration, then exit
    ValidateConfig(ConfigArgs),
}

#[derive(Args)]
struct ConfigArgs {
    /// YAML config file, built-in defaults apply when omitted
    #[arg(long)]
    config_file_path: Option<PathBuf>,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid relay config: {0}")]
    Validation(#[from] relay::config::ValidationError),
    #[error("relay failed: {0}")]
    Relay(#[from] relay::errors::RelayError),
    #[error("could not start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("could not install metrics recorder: {0}")]
    Metrics(String),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        CliCommand::Relay(args) => run_relay(&args),
        CliCommand::ValidateConfig(args) => validate_config(&args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn load_config(args: &ConfigArgs) -> Result<Config, ConfigError> {
    match &args.config_file_path {
        Some(path) => Config::from_file(path),
        None => Ok(Config::default()),
    }
}

fn validate_config(args: &ConfigArgs) -> Result<(), CliError> {
    let config = load_config(args)?;
    config.relay.validate()?;
    println!("Config is valid");
    Ok(())
}

fn run_relay(args: &ConfigArgs) -> Result<(), CliError> {
    // Must happen before the token is read
    let dotenv = dotenvy::dotenv();

    let config = load_config(args)?;
    let _sentry = init_logging(&config.common.logging);

    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Could not load environment file"),
    }

    if let Some(metrics_config) = &config.common.metrics {
        init_metrics(metrics_config)?;
    }

    let token = BotToken::from_env(&config.relay.upstream.token_env);

    // Sentry must be initialised before the runtime starts
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(relay::run(config.relay, token))?;

    Ok(())
}

fn init_logging(config: &LoggingConfig) -> Option<sentry::ClientInitGuard> {
    let guard = config.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(guard.as_ref().map(|_| sentry::integrations::tracing::layer()))
        .init();

    guard
}

fn init_metrics(config: &MetricsConfig) -> Result<(), CliError> {
    let recorder = StatsdBuilder::from(config.statsd_host.clone(), config.statsd_port)
        .build(Some(METRICS_PREFIX))
        .map_err(|e| CliError::Metrics(e.to_string()))?;
    metrics::set_global_recorder(recorder).map_err(|e| CliError::Metrics(e.to_string()))?;

    tracing::info!(
        host = %config.statsd_host,
        port = config.statsd_port,
        "Sending metrics to statsd"
    );
    Ok(())
}
