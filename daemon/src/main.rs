//! kycgate daemon: runs the verification node and offers operator commands.

use anyhow::{bail, Context};
use clap::Parser;
use kycgate_node::{init_logging, KycNode, LogFormat, NodeConfig};
use kycgate_store::{AccountRecord, AccountStore};
use kycgate_store_lmdb::{check_integrity, LmdbEnvironment};
use kycgate_types::{AccountId, SecretKey};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kycgate", about = "Identity-verification gateway daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "KYCGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for the LMDB environment.
    #[arg(long, env = "KYCGATE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Address the HTTP API binds to.
    #[arg(long, env = "KYCGATE_BIND_ADDRESS")]
    bind_address: Option<String>,

    /// HTTP API port.
    #[arg(long, env = "KYCGATE_HTTP_PORT")]
    http_port: Option<u16>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "KYCGATE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "KYCGATE_LOG_FORMAT")]
    log_format: Option<String>,

    /// Shared secret for inbound webhook signatures.
    #[arg(long, env = "KYCGATE_WEBHOOK_SECRET", hide_env_values = true)]
    webhook_secret: Option<String>,

    /// Server-side key for identity fingerprints.
    #[arg(long, env = "KYCGATE_FINGERPRINT_SECRET", hide_env_values = true)]
    fingerprint_secret: Option<String>,

    /// Provider API base URL.
    #[arg(long, env = "KYCGATE_PROVIDER_URL")]
    provider_url: Option<String>,

    /// Provider client id.
    #[arg(long, env = "KYCGATE_PROVIDER_CLIENT_ID")]
    provider_client_id: Option<String>,

    /// Provider secret key.
    #[arg(long, env = "KYCGATE_PROVIDER_SECRET", hide_env_values = true)]
    provider_secret: Option<String>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the node.
    #[command(name = "node")]
    Node {
        #[command(subcommand)]
        action: NodeAction,
    },
    /// Inspect or seed account records.
    #[command(name = "account")]
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Run the storage integrity check and exit.
    #[command(name = "check-db")]
    CheckDb,
    /// Print the webhook signature for a body, for testing integrations.
    #[command(name = "sign-webhook")]
    SignWebhook {
        /// File holding the exact request body.
        #[arg(long)]
        body_file: PathBuf,
    },
}

#[derive(clap::Subcommand)]
enum NodeAction {
    /// Run the node until SIGINT/SIGTERM.
    Run,
    /// Print the effective configuration, secrets omitted.
    ShowConfig,
}

#[derive(clap::Subcommand)]
enum AccountAction {
    /// Create an account in the `not_started` state.
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        referred_by: Option<String>,
    },
    /// Print an account's KYC state.
    Show {
        #[arg(long)]
        id: String,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<NodeConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let path = path.to_string_lossy();
            NodeConfig::from_toml_file(&path)
                .with_context(|| format!("loading config from {path}"))?
        }
        None => NodeConfig::default(),
    };

    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(addr) = &cli.bind_address {
        config.bind_address = addr.clone();
    }
    if let Some(port) = cli.http_port {
        config.http_port = port;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    if let Some(secret) = &cli.webhook_secret {
        config.webhook_secret = SecretKey::from(secret.as_str());
    }
    if let Some(secret) = &cli.fingerprint_secret {
        config.fingerprint_secret = SecretKey::from(secret.as_str());
    }
    if let Some(url) = &cli.provider_url {
        config.provider.base_url = url.clone();
    }
    if let Some(client_id) = &cli.provider_client_id {
        config.provider.client_id = client_id.clone();
    }
    if let Some(secret) = &cli.provider_secret {
        config.provider.secret_key = SecretKey::from(secret.as_str());
    }
    Ok(config)
}

fn open_env(config: &NodeConfig) -> anyhow::Result<LmdbEnvironment> {
    LmdbEnvironment::open(&config.data_dir, config.map_size)
        .with_context(|| format!("opening {}", config.data_dir.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let format: LogFormat = config.log_format.parse()?;
    init_logging(format, &config.log_level)?;

    match cli.command {
        Command::Node { action } => match action {
            NodeAction::Run => {
                tracing::info!(
                    "Starting kycgate node (HTTP {}:{}, data {})",
                    config.bind_address,
                    config.http_port,
                    config.data_dir.display()
                );
                let node = KycNode::new(config)?;
                node.run().await?;
                tracing::info!("kycgate daemon exited cleanly");
            }
            NodeAction::ShowConfig => {
                print!("{}", config.to_toml_string()?);
            }
        },
        Command::Account { action } => {
            let env = open_env(&config)?;
            let store = env.account_store();
            match action {
                AccountAction::Add {
                    id,
                    name,
                    email,
                    country,
                    referred_by,
                } => {
                    let id = AccountId::new(id)?;
                    if store.exists(&id)? {
                        bail!("account {id} already exists");
                    }
                    let mut record = AccountRecord::new(id.clone(), name);
                    record.email = email;
                    record.country = country;
                    if let Some(referrer) = referred_by {
                        record = record.with_referrer(AccountId::new(referrer)?);
                    }
                    store.put_account(&record)?;
                    println!("created account {id}");
                }
                AccountAction::Show { id } => {
                    let record = store.get_account(&AccountId::new(id)?)?;
                    println!("account:           {}", record.id);
                    println!("kyc_state:         {}", record.kyc_state);
                    println!("rejection_count:   {}", record.rejection_count);
                    println!(
                        "fingerprint:       {}",
                        record.fingerprint.as_ref().map(|f| f.short()).unwrap_or("-")
                    );
                    println!("points:            {}", record.points);
                }
            }
        }
        Command::CheckDb => {
            let env = open_env(&config)?;
            let report = check_integrity(&env)?;
            println!(
                "{} databases, {} entries, {} verified accounts",
                report.databases_checked, report.total_entries, report.verified_accounts
            );
            for error in &report.errors {
                println!("error: {error}");
            }
            if !report.is_healthy() {
                bail!("integrity check found {} errors", report.errors.len());
            }
        }
        Command::SignWebhook { body_file } => {
            if config.webhook_secret.is_empty() {
                bail!("webhook secret is not set");
            }
            let body = std::fs::read(&body_file)
                .with_context(|| format!("reading {}", body_file.display()))?;
            println!(
                "{}",
                kycgate_crypto::compute_signature(&body, config.webhook_secret.expose())
            );
        }
    }

    Ok(())
}
