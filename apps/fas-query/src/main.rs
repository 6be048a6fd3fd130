use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use fas_connector::config::layered_figment;
use fas_connector::{FasConnector, FasConnectorConfig, USERINFO_PATH, USERMEMBERSHIPS_PATH};
use modkit_connector::{Connector, PathRegistry, Query, QueryRequest, RequestEnv};
use serde_json::Value;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Query FAS accounts through the connector
#[derive(Parser)]
#[command(name = "fas-query", version, about = "Query FAS user profiles and memberships")]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Session id forwarded to the account service
    #[arg(long)]
    session_id: Option<String>,

    /// Act as this logged-in user
    #[arg(long)]
    identity: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one account record
    Userinfo { username: String },
    /// List group memberships of an account
    Memberships {
        username: String,
        /// Show the memberships of the logged-in user instead
        #[arg(long)]
        profile: bool,
        #[arg(long)]
        no_approved: bool,
        #[arg(long)]
        no_unapproved: bool,
        #[arg(long)]
        offset: Option<usize>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the registered query paths and their columns
    Paths,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn request_env(cli: &Cli) -> RequestEnv {
    let mut env = RequestEnv::anonymous();
    if let Some(session_id) = &cli.session_id {
        env = env.with_login(session_id.clone());
    }
    if let Some(userid) = &cli.identity {
        env = env.with_identity(userid.clone(), None);
    }
    env
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(path) = &cli.config
        && !Path::new(path).is_file()
    {
        anyhow::bail!("config file does not exist: {}", path.display());
    }

    let figment = layered_figment(cli.config.as_deref());
    let config = FasConnectorConfig::from_figment(&figment)?;
    let connector = FasConnector::from_config(&config)?;

    let mut registry = PathRegistry::new();
    connector.register(&mut registry);

    let env = request_env(&cli);
    let output = match &cli.command {
        Commands::Paths => serde_json::to_value(registry.paths().collect::<Vec<_>>())?,
        Commands::Userinfo { username } => {
            let request = QueryRequest::new().filter("username", username.as_str());
            let result = connector.query(&env, USERINFO_PATH, &request).await?;
            serde_json::to_value(result)?
        }
        Commands::Memberships {
            username,
            profile,
            no_approved,
            no_unapproved,
            offset,
            limit,
        } => {
            let mut request = QueryRequest::new()
                .filter("username", username.as_str())
                .filter("profile", *profile)
                .filter("show_approved", !no_approved)
                .filter("show_unapproved", !no_unapproved);
            request.offset = *offset;
            request.limit = *limit;
            let result = connector.query(&env, USERMEMBERSHIPS_PATH, &request).await?;
            serde_json::to_value(result)?
        }
    };

    if output == Value::Null {
        tracing::info!("no such account");
    }
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
