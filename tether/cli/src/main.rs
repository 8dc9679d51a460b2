//! Tether CLI - query and set up a lakeFS server through its configuration API

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use serde::Serialize;
use tether::{Client, ClientConfig, ConfigError, StaticCredentials, TetherError};
use tether_definitions::ConfigApi;
use tether_definitions::lakefs::{self, CommPrefsInput, Setup};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "tether")]
#[command(version, about = "lakeFS configuration API client", long_about = None)]
struct Cli {
    /// lakeFS server URL; `/api/v1` is appended when missing
    #[arg(long, env = "LAKECTL_SERVER_ENDPOINT_URL", global = true)]
    endpoint: Option<String>,

    /// Access key id used as the basic auth username
    #[arg(long, env = "LAKECTL_CREDENTIALS_ACCESS_KEY_ID", global = true)]
    access_key_id: Option<String>,

    /// Secret access key used as the basic auth password
    #[arg(
        long,
        env = "LAKECTL_CREDENTIALS_SECRET_ACCESS_KEY",
        hide_env_values = true,
        global = true
    )]
    secret_access_key: Option<String>,

    /// Per-request timeout in seconds (0 disables it)
    #[arg(long, value_name = "SECS", default_value_t = tether::DEFAULT_TIMEOUT_SECS, global = true)]
    timeout: u64,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    log_verbosity: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the server version and upgrade recommendation
    Version,

    /// Show the garbage collection configuration
    GcConfig,

    /// Show whether the installation has been set up
    SetupState,

    /// Show the blockstore configuration
    StorageConfig,

    /// Create the initial admin user
    Setup {
        /// Admin user name
        #[arg(long)]
        username: String,

        /// Use this access key id instead of a generated one
        #[arg(long = "key-id", requires = "key_secret")]
        key_id: Option<String>,

        /// Secret for `--key-id`
        #[arg(long = "key-secret", requires = "key_id")]
        key_secret: Option<String>,
    },

    /// Store the admin's communication preferences
    CommPrefs {
        /// Contact email
        #[arg(long)]
        email: Option<String>,

        /// Receive feature update emails
        #[arg(long, action = clap::ArgAction::Set, value_name = "BOOL")]
        feature_updates: bool,

        /// Receive security update emails
        #[arg(long, action = clap::ArgAction::Set, value_name = "BOOL")]
        security_updates: bool,
    },
}

/// Initialize tracing subscriber with appropriate filters.
fn init_tracing(verbose: u8, json: bool) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,tether=info,tether_cli=info".to_string(),
            2 => "info,tether=debug,tether_definitions=debug,tether_cli=debug".to_string(),
            _ => "debug,tether=trace,tether_definitions=trace,tether_cli=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(false)
                    .with_file(verbose >= 3)
                    .with_line_number(verbose >= 3)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    }
}

/// Builds the client the flags describe.
///
/// Explicit credentials win; otherwise they are read from the environment
/// on each secured call, so public commands work without any.
fn connect(cli: &Cli) -> Result<ConfigApi, ConfigError> {
    let endpoint = cli
        .endpoint
        .as_deref()
        .filter(|e| !e.is_empty())
        .ok_or(ConfigError::MissingField {
            field: lakefs::ENDPOINT_URL_VAR,
        })?;
    let builder = ClientConfig::builder(lakefs::api_base_url(endpoint)?);
    let builder = match cli.timeout {
        0 => builder.no_timeout(),
        secs => builder.timeout(Duration::from_secs(secs)),
    };
    let client = Client::new(builder.build()?)?;
    let client = match (&cli.access_key_id, &cli.secret_access_key) {
        (Some(id), Some(secret)) => client.with_auth(StaticCredentials::basic(id, secret)),
        _ => client.with_auth(lakefs::env_credentials()),
    };
    ConfigApi::new(&client)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), TetherError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| TetherError::Codec(tether::CodecError::Model(e)))?;
    println!("{rendered}");
    Ok(())
}

async fn run(api: &ConfigApi, command: Commands) -> Result<(), TetherError> {
    match command {
        Commands::Version => print_json(&api.get_lake_fs_version().await?),
        Commands::GcConfig => print_json(&api.get_garbage_collection_config().await?),
        Commands::SetupState => print_json(&api.get_setup_state().await?),
        Commands::StorageConfig => print_json(&api.get_storage_config().await?),
        Commands::Setup {
            username,
            key_id,
            key_secret,
        } => {
            let setup = match (key_id, key_secret) {
                (Some(id), Some(secret)) => Setup::new(username).with_key(id, secret),
                _ => Setup::new(username),
            };
            let credentials = api.setup(&setup).await?;
            eprintln!(
                "{}",
                "Save the secret access key now; it cannot be retrieved again.".yellow()
            );
            print_json(&credentials)
        }
        Commands::CommPrefs {
            email,
            feature_updates,
            security_updates,
        } => {
            let prefs = CommPrefsInput {
                email,
                feature_updates,
                security_updates,
            };
            api.setup_comm_prefs(&prefs).await?;
            eprintln!("{} communication preferences saved", "✓".green());
            Ok(())
        }
    }
}

/// Human-readable failure; server errors show their status and message.
fn describe(err: &TetherError) -> String {
    match err {
        TetherError::Api(api) => match api.message() {
            Some(message) => format!("server returned {}: {message}", api.status),
            None => format!("server returned {}", api),
        },
        other => other.to_string(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_verbosity, cli.log_json);

    let api = match connect(&cli) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("{} {e}", "Error:".red().bold());
            return ExitCode::from(2);
        }
    };

    tracing::debug!(command = ?cli.command, "running");
    match run(&api, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), describe(&e));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tether").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&[
            "version",
            "--endpoint",
            "http://localhost:8000",
            "--timeout",
            "5",
            "-vv",
        ]);
        assert!(matches!(cli.command, Commands::Version));
        assert_eq!(cli.endpoint.as_deref(), Some("http://localhost:8000"));
        assert_eq!(cli.timeout, 5);
        assert_eq!(cli.log_verbosity, 2);
    }

    #[test]
    fn setup_key_flags_come_in_pairs() {
        let result = Cli::try_parse_from(["tether", "setup", "--username", "admin", "--key-id", "AKIA"]);
        assert!(result.is_err());

        let cli = parse(&["setup", "--username", "admin"]);
        assert!(matches!(cli.command, Commands::Setup { key_id: None, .. }));
    }

    #[test]
    fn comm_prefs_takes_explicit_booleans() {
        let cli = parse(&[
            "comm-prefs",
            "--feature-updates",
            "false",
            "--security-updates",
            "true",
        ]);
        match cli.command {
            Commands::CommPrefs {
                email,
                feature_updates,
                security_updates,
            } => {
                assert_eq!(email, None);
                assert!(!feature_updates);
                assert!(security_updates);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn connect_appends_base_path() {
        let cli = parse(&["gc-config", "--endpoint", "http://localhost:8000", "--timeout", "0"]);
        let api = connect(&cli).unwrap();
        let operation = api.facade().operation(lakefs::GET_GARBAGE_COLLECTION_CONFIG).unwrap();
        let config = operation.client().config();
        assert_eq!(config.base_url().as_str(), "http://localhost:8000/api/v1");
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn describe_api_errors() {
        let err = TetherError::Api(tether::ApiError::new(
            409,
            Default::default(),
            r#"{"message":"lakeFS already initialized"}"#.into(),
            tether::ErrorPayload::Undecoded,
        ));
        assert_eq!(describe(&err), "server returned 409: lakeFS already initialized");
    }
}
