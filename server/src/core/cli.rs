use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    ENV_ADMIN_PASSWORD, ENV_CONFIG, ENV_DEBUG, ENV_HOST, ENV_MISTRAL_API_KEY, ENV_MISTRAL_API_URL,
    ENV_MISTRAL_MODEL, ENV_PORT, ENV_SESSION_TTL_HOURS,
};

#[derive(Parser)]
#[command(name = "holonet")]
#[command(version, about = "Star Wars holonet: accounts, biographies and stories", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Enable debug mode (verbose 404 logging)
    #[arg(long, global = true, env = ENV_DEBUG)]
    pub debug: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Session lifetime in hours
    #[arg(long, global = true, env = ENV_SESSION_TTL_HOURS)]
    pub session_ttl_hours: Option<u32>,

    /// Password for the admin account seeded on first start
    #[arg(long, global = true, env = ENV_ADMIN_PASSWORD, hide_env_values = true)]
    pub admin_password: Option<String>,

    /// Chat completion API key
    #[arg(long, global = true, env = ENV_MISTRAL_API_KEY, hide_env_values = true)]
    pub mistral_api_key: Option<String>,

    /// Chat completion endpoint URL
    #[arg(long, global = true, env = ENV_MISTRAL_API_URL)]
    pub mistral_api_url: Option<String>,

    /// Chat completion model
    #[arg(long, global = true, env = ENV_MISTRAL_MODEL)]
    pub mistral_model: Option<String>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// System maintenance commands
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum SystemCommands {
    /// Delete the local data directory (database, session key). Requires confirmation.
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration derived from CLI arguments
#[derive(Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub debug: bool,
    pub config: Option<PathBuf>,
    pub session_ttl_hours: Option<u32>,
    pub admin_password: Option<String>,
    pub mistral_api_key: Option<String>,
    pub mistral_api_url: Option<String>,
    pub mistral_model: Option<String>,
}

impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("debug", &self.debug)
            .field("config", &self.config)
            .field("session_ttl_hours", &self.session_ttl_hours)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "[REDACTED]"))
            .field("mistral_api_key", &self.mistral_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("mistral_api_url", &self.mistral_api_url)
            .field("mistral_model", &self.mistral_model)
            .finish()
    }
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        debug: cli.debug,
        config: cli.config,
        session_ttl_hours: cli.session_ttl_hours,
        admin_password: cli.admin_password,
        mistral_api_key: cli.mistral_api_key,
        mistral_api_url: cli.mistral_api_url,
        mistral_model: cli.mistral_model,
    };
    (config, cli.command)
}
