mod config;
mod error;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use dispatch::{Dispatcher, StdioConnector};
use policy::IdentityProfile;
use tracing_subscriber::EnvFilter;

use config::Config;
use error::Result;

const CONFIG_FILE: &str = "foreman.toml";

#[derive(Parser)]
#[command(name = "foreman")]
#[command(about = "Role-gated dispatch to an engineering knowledge tool host", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ./foreman.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch a single query through the role gate
    Ask {
        /// The query to dispatch
        query: String,
        /// Role attribute of the calling identity
        #[arg(short, long)]
        role: String,
    },
    /// Serve the engineering knowledge base as a tool host on stdio
    Serve,
    /// List the tools and resources the knowledge host exposes
    Tools,
    /// Print the current safety standards from the knowledge host
    Standards,
}

#[tokio::main]
async fn main() {
    // In serve mode stdout carries protocol traffic, so diagnostics always
    // go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Ask { query, role } => cmd_ask(&config, &role, &query).await,
        Commands::Serve => cmd_serve().await,
        Commands::Tools => cmd_tools(&config).await,
        Commands::Standards => cmd_standards(&config).await,
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None if Path::new(CONFIG_FILE).exists() => Ok(Config::load(CONFIG_FILE)?),
        None => Ok(Config::default()),
    }
}

async fn cmd_ask(config: &Config, role: &str, query: &str) -> Result<()> {
    let connector = StdioConnector::new(config.host_config()?).with_timeout(config.timeout());
    let dispatcher = Dispatcher::new(config.gate.clone(), connector);
    let identity = IdentityProfile::new(role);

    let outcome = dispatcher.execute(&identity, query).await?;
    println!("{outcome}");
    Ok(())
}

async fn cmd_serve() -> Result<()> {
    let registry = knowledge::registry();
    mcp::serve(&registry, knowledge::HOST_NAME).await?;
    Ok(())
}

async fn cmd_tools(config: &Config) -> Result<()> {
    let session = open_session(config).await?;
    let tools = session.tools().await;
    let resources = session.list_resources().await;
    session.shutdown().await?;

    println!("Tools:");
    for tool in tools {
        println!("  {:<24}{}", tool.name, tool.description.unwrap_or_default());
    }

    println!("\nResources:");
    for resource in resources? {
        println!(
            "  {:<24}{}",
            resource.uri,
            resource.description.unwrap_or_default()
        );
    }

    Ok(())
}

async fn cmd_standards(config: &Config) -> Result<()> {
    let session = open_session(config).await?;
    let result = session.read_resource(knowledge::SAFETY_STANDARDS_URI).await;
    session.shutdown().await?;

    println!("{}", result?.text());
    Ok(())
}

async fn open_session(config: &Config) -> Result<mcp::Session> {
    let session = mcp::Session::spawn(config.host_config()?)
        .await?
        .with_timeout(config.timeout());
    session.initialize().await?;
    Ok(session)
}
