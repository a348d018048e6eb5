//! fec-info-mcp entry point
//!
//! `serve` (the default) speaks MCP on stdin/stdout. Logs go to stderr.

use clap::{Parser, Subcommand};
use fec_info_mcp::config::ServerConfig;
use fec_info_mcp::mcp::McpServer;
use fec_info_mcp::observability::{init_default_logging, init_logging, LogFormat};
use fec_info_mcp::openfec::SortOrder;
use fec_info_mcp::tools::builtin::{latest_filings::TOOL_NAME, LatestFilingsParams};
use fec_info_mcp::tools::ToolSystem;
use std::path::PathBuf;
use std::process;
use tokio::signal;
use tracing::{error, info, Level};

/// MCP server for recent FEC electronic filings
#[derive(Parser)]
#[command(name = "fec-info-mcp")]
#[command(about = "MCP tool server for the latest FEC electronic filings")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "FEC_INFO_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdin/stdout
    Serve,
    /// Validate configuration
    Config {
        /// Print the effective configuration
        #[arg(long)]
        show: bool,
    },
    /// Run one latest_filings query and print the JSON result
    Fetch {
        /// Number of filings (0-100)
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
        /// Committee id, e.g. C00893149
        #[arg(long)]
        committee: Option<String>,
        /// Form type, e.g. F3 or F24
        #[arg(long)]
        form_type: Option<String>,
        /// Earliest receipt date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<String>,
        /// Latest receipt date (YYYY-MM-DD)
        #[arg(long)]
        until: Option<String>,
        /// Oldest filings first
        #[arg(long)]
        oldest_first: bool,
        /// Include document URLs
        #[arg(long)]
        show_urls: bool,
        /// Look up processed report totals for F3 filings
        #[arg(long)]
        with_totals: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.verbose {
        0 => init_default_logging(),
        n => {
            let level = if n > 1 { Level::TRACE } else { Level::DEBUG };
            let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());
            init_logging(level, LogFormat::parse(&format), false);
        }
    }

    let config = match load_configuration(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(config).await,
        Commands::Config { show } => handle_config_command(&config, show),
        Commands::Fetch {
            limit,
            committee,
            form_type,
            since,
            until,
            oldest_first,
            show_urls,
            with_totals,
        } => {
            let params = LatestFilingsParams {
                limit,
                sort: if oldest_first {
                    SortOrder::OldestFirst
                } else {
                    SortOrder::NewestFirst
                },
                committee,
                form_type,
                since,
                until,
                show_urls,
                with_totals,
            };
            run_fetch(config, params).await
        }
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn load_configuration(
    config_path: &Option<PathBuf>,
) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    if let Some(path) = config_path {
        info!("Loading configuration from: {}", path.display());
        return Ok(ServerConfig::load_from_file(path)?);
    }

    for path_str in ["fec-info.toml", "config/fec-info.toml"] {
        let path = PathBuf::from(path_str);
        if path.exists() {
            info!("Loading configuration from: {}", path.display());
            return Ok(ServerConfig::load_from_file(&path)?);
        }
    }

    info!("No configuration file found, using defaults");
    Ok(ServerConfig::default())
}

async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting fec-info-mcp v{}", env!("CARGO_PKG_VERSION"));

    let server = McpServer::from_config(&config).await?;
    let handle = server.clone();

    tokio::select! {
        result = server.run_stdio() => {
            result?;
            info!("Client closed stdin, shutting down");
        }
        _ = signal::ctrl_c() => {
            info!("Received Ctrl-C, shutting down");
        }
    }

    handle.shutdown().await?;
    Ok(())
}

fn handle_config_command(
    config: &ServerConfig,
    show: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if show {
        println!("{}", config.to_toml_string()?);
    }

    info!("Configuration is valid");
    Ok(())
}

async fn run_fetch(
    config: ServerConfig,
    params: LatestFilingsParams,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut tools = ToolSystem::with_openfec(config.openfec_config());
    tools.initialize(&config.tools).await?;

    let arguments = serde_json::to_value(&params)?;
    let result = tools.execute_tool(TOOL_NAME, &arguments).await;
    tools.shutdown().await?;

    println!("{}", serde_json::to_string_pretty(&result?)?);
    Ok(())
}
