//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::{ApiServer, AuthManager};
use crate::core::banner::{self, AdminNotice};
use crate::core::cli::{self, CliConfig, Commands, SystemCommands};
use crate::core::config::{AppConfig, AuthConfig};
use crate::core::constants::{ENV_LOG, GENERATED_ADMIN_PASSWORD_LEN};
use crate::core::shutdown::ShutdownService;
use crate::core::storage::AppStorage;
use crate::data::{SqliteService, UserRepository};
use crate::domain::GenerationService;
use crate::utils::crypto::generate_password;
use crate::utils::password::hash_password;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub storage: AppStorage,
    pub database: Arc<SqliteService>,
    pub auth: Arc<AuthManager>,
    pub generation: GenerationService,
    /// Set only when the admin account was seeded with a generated password on this start
    generated_admin_password: Option<String>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();

        let (cli_config, command) = cli::parse();
        Self::init_logging(cli_config.debug);

        tracing::debug!("Application starting");
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::System {
                command: system_cmd,
            }) => {
                return Self::handle_system_command(system_cmd);
            }
            Some(Commands::Start) | None => {}
        }

        let app = Self::init(&cli_config).await?;
        Self::start_server(app).await
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let storage = AppStorage::init().await?;

        let database = Arc::new(
            SqliteService::init(&storage)
                .await
                .context("Failed to initialize database")?,
        );
        let auth = Arc::new(AuthManager::init(&storage, &config.auth).await?);
        let generation = GenerationService::from_config(&config.generation)
            .context("Failed to initialize completion client")?;

        let users: Arc<dyn UserRepository> = Arc::new(database.clone());
        let generated_admin_password = seed_admin(users.as_ref(), &config.auth).await?;

        let shutdown = ShutdownService::new(database.clone());

        Ok(Self {
            shutdown,
            config,
            storage,
            database,
            auth,
            generation,
            generated_admin_password,
        })
    }

    fn handle_system_command(cmd: SystemCommands) -> Result<()> {
        match cmd {
            SystemCommands::Prune { yes } => Self::prune_data(yes),
        }
    }

    fn prune_data(skip_confirm: bool) -> Result<()> {
        let data_dir = AppStorage::resolve_data_dir();

        if !data_dir.exists() {
            println!(
                "Nothing to prune. Data directory does not exist: {}",
                data_dir.display()
            );
            return Ok(());
        }

        let data_dir = data_dir.canonicalize().unwrap_or(data_dir);

        println!("This will permanently delete the local data directory:");
        println!("  {}", data_dir.display());
        println!();
        println!(
            "All user accounts and the session signing key will be lost. \
             Make sure the server is not running."
        );

        if !skip_confirm {
            print!("\nContinue? [y/N] ");
            std::io::Write::flush(&mut std::io::stdout())?;

            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;

            if !matches!(input.trim().to_lowercase().as_str(), "y" | "yes") {
                println!("Aborted.");
                return Ok(());
            }
        }

        std::fs::remove_dir_all(&data_dir)
            .with_context(|| format!("Failed to delete data directory: {}", data_dir.display()))?;
        println!("Pruned: {}", data_dir.display());
        Ok(())
    }

    fn init_logging(debug: bool) {
        let default_filter = if debug {
            format!("info,{}=debug,tower_http=debug", env!("CARGO_CRATE_NAME"))
        } else {
            format!("info,{}=info", env!("CARGO_CRATE_NAME"))
        };

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        app.start_background_tasks().await;

        banner::print_banner(
            &app.config.server.host,
            app.config.server.port,
            &app.storage.data_dir().display().to_string(),
            app.generation.is_enabled(),
            &AdminNotice {
                username: &app.config.auth.admin_username,
                generated_password: app.generated_admin_password.as_deref(),
            },
        );

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }

    pub async fn start_background_tasks(&self) {
        self.shutdown
            .register(
                self.database
                    .start_checkpoint_task(self.shutdown.subscribe()),
            )
            .await;

        tracing::debug!("Background tasks started");
    }
}

/// Create the admin account if its username is free.
///
/// Returns the password only when one was generated, so it can be shown once.
async fn seed_admin(users: &dyn UserRepository, config: &AuthConfig) -> Result<Option<String>> {
    if users
        .get_user_by_username(&config.admin_username)
        .await?
        .is_some()
    {
        tracing::debug!(username = %config.admin_username, "Admin account already present");
        return Ok(None);
    }

    let (password, generated) = match &config.admin_password {
        Some(password) => (password.clone(), false),
        None => (generate_password(GENERATED_ADMIN_PASSWORD_LEN), true),
    };

    let to_hash = password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&to_hash))
        .await
        .context("Password hashing task failed")??;

    let created = users
        .ensure_admin(
            &config.admin_username,
            &password_hash,
            Some(&config.admin_email),
        )
        .await?;

    if !created {
        return Ok(None);
    }

    tracing::info!(username = %config.admin_username, generated, "Seeded admin account");
    Ok(generated.then_some(password))
}
