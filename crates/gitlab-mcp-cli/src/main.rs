//! gitlab-mcp-server - MCP server exposing GitLab as agent tools.

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use gitlab_mcp::McpServer;
use gitlab_mcp_core::config::{parse_toolset_list, Config};
use gitlab_mcp_core::Error;
use gitlab_mcp_gitlab::{build_toolsets, init_toolsets, static_client, GetClientFn, GitLabClient};
use gitlab_mcp_gitlab::DEFAULT_TOOLSETS;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gitlab-mcp-server")]
#[command(author, version, about = "GitLab MCP server", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server on stdin/stdout
    Serve {
        /// Comma-separated toolsets to enable, or "all"
        #[arg(long, env = "GITLAB_TOOLSETS")]
        toolsets: Option<String>,

        /// Expose read-only tools only
        #[arg(long)]
        read_only: bool,

        /// GitLab instance URL
        #[arg(long, env = "GITLAB_HOST")]
        host: Option<String>,

        /// GitLab personal access token
        #[arg(long, env = "GITLAB_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// List available toolsets
    Toolsets,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set a configuration value (e.g. `gitlab.host`, `server.toolsets`)
    Set {
        key: String,
        value: String,
    },

    /// Get a configuration value
    Get {
        key: String,
    },

    /// Show current configuration
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the protocol, so logs go to stderr
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Serve {
            toolsets,
            read_only,
            host,
            token,
        }) => serve(toolsets, read_only, host, token).await,
        Some(Commands::Toolsets) => {
            print_toolsets();
            Ok(())
        }
        Some(Commands::Config { command }) => handle_config(command),
        None => {
            println!("gitlab-mcp-server - GitLab tools for AI agents over MCP");
            println!("Run with --help for usage information");
            Ok(())
        }
    }
}

async fn serve(
    toolsets: Option<String>,
    read_only: bool,
    host: Option<String>,
    token: Option<String>,
) -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    let Some(token) = token.filter(|t| !t.trim().is_empty()) else {
        bail!("GitLab token is required (--token or GITLAB_TOKEN)");
    };
    let host = resolve_host(host.as_deref(), &config);
    let enabled = resolve_toolsets(toolsets.as_deref(), &config);
    let read_only = read_only || config.server.read_only;

    let client = GitLabClient::new(token, &host)?;
    tracing::info!(api = client.api_base(), read_only, "Connecting to GitLab");

    let group = init_toolsets(enabled.as_slice(), read_only, static_client(client))
        .context("Failed to enable toolsets")?;

    let mut server = McpServer::new();
    group.register_active(&mut server);

    server.run().await?;
    Ok(())
}

/// Flag or environment first, then the config file, then gitlab.com.
fn resolve_host(flag: Option<&str>, config: &Config) -> String {
    match flag.map(str::trim).filter(|h| !h.is_empty()) {
        Some(host) => host.to_string(),
        None => config.gitlab_host().to_string(),
    }
}

/// Flag or environment first, then the config file, then every toolset.
fn resolve_toolsets(flag: Option<&str>, config: &Config) -> Vec<String> {
    let from_flag = flag.map(parse_toolset_list).unwrap_or_default();
    if !from_flag.is_empty() {
        return from_flag;
    }
    if !config.server.toolsets.is_empty() {
        return config.server.toolsets.clone();
    }
    DEFAULT_TOOLSETS.iter().map(|s| s.to_string()).collect()
}

fn print_toolsets() {
    // Listing never calls a tool, so no client is needed.
    let no_client: GetClientFn = Arc::new(|| -> gitlab_mcp_core::Result<Arc<GitLabClient>> {
        Err(Error::Config("no GitLab client configured".to_string()))
    });
    let group = build_toolsets(false, no_client);

    for toolset in group.toolsets() {
        println!("{} - {}", toolset.name(), toolset.description());
        for tool in toolset.read_tools() {
            println!("    {}", tool.name());
        }
        for tool in toolset.write_tools() {
            println!("    {} (write)", tool.name());
        }
    }
}

fn handle_config(command: ConfigCommands) -> anyhow::Result<()> {
    match command {
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("Set {} = {}", key, value);
        }
        ConfigCommands::Get { key } => match Config::load()?.get(&key)? {
            Some(value) => println!("{}", value),
            None => println!("{} is not set", key),
        },
        ConfigCommands::Show => {
            let config = Config::load()?;
            println!("Config file: {}", Config::config_path()?.display());
            println!("gitlab.host = {}", config.gitlab_host());
            let toolsets = if config.server.toolsets.is_empty() {
                DEFAULT_TOOLSETS.join(",")
            } else {
                config.server.toolsets.join(",")
            };
            println!("server.toolsets = {}", toolsets);
            println!("server.read_only = {}", config.server.read_only);
        }
    }
    Ok(())
}
