// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "Holonet";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".holonet";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "holonet.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "HOLONET_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for debug mode
pub const ENV_DEBUG: &str = "HOLONET_DEBUG";

/// Environment variable for server host
pub const ENV_HOST: &str = "HOLONET_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "HOLONET_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "HOLONET_LOG";

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "HOLONET_DATA_DIR";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5080;

/// Default request body limit (1 MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Body limit for auth endpoints (64 KB)
pub const AUTH_BODY_LIMIT: usize = 64 * 1024;

/// Max time to wait for background tasks during shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Authentication
// =============================================================================

/// Environment variable for session lifetime in hours
pub const ENV_SESSION_TTL_HOURS: &str = "HOLONET_SESSION_TTL_HOURS";

/// Environment variable for the seeded admin password
pub const ENV_ADMIN_PASSWORD: &str = "HOLONET_ADMIN_PASSWORD";

/// Session cookie name
pub const SESSION_COOKIE_NAME: &str = "holonet_session";

/// Default session lifetime
pub const DEFAULT_SESSION_TTL_HOURS: u32 = 24;

/// Upper bound on the configured session lifetime (one year)
pub const MAX_SESSION_TTL_HOURS: u32 = 24 * 365;

/// File (inside the data dir) holding the hex-encoded session signing key
pub const SESSION_KEY_FILENAME: &str = "session.key";

/// Default admin account seeded on first start
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@starwars.com";

/// Length of the generated admin password when none is configured
pub const GENERATED_ADMIN_PASSWORD_LEN: usize = 20;

/// Role names stored in the users table
pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";

// =============================================================================
// Generation (chat completion API)
// =============================================================================

pub const ENV_MISTRAL_API_KEY: &str = "HOLONET_MISTRAL_API_KEY";
pub const ENV_MISTRAL_API_URL: &str = "HOLONET_MISTRAL_API_URL";
pub const ENV_MISTRAL_MODEL: &str = "HOLONET_MISTRAL_MODEL";

/// Default chat completion endpoint
pub const DEFAULT_MISTRAL_API_URL: &str = "https://api.mistral.ai/v1/chat/completions";

/// Default completion model
pub const DEFAULT_MISTRAL_MODEL: &str = "mistral-small-latest";

/// Default request timeout for completion calls
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 60;

pub const BIOGRAPHY_TEMPERATURE: f64 = 0.7;
pub const BIOGRAPHY_MAX_TOKENS: u32 = 800;

pub const STORY_TEMPERATURE: f64 = 0.8;
pub const STORY_MAX_TOKENS: u32 = 1200;

// =============================================================================
// SQLite
// =============================================================================

/// SQLite database filename
pub const SQLITE_DB_FILENAME: &str = "holonet.db";

/// Max pooled connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// Busy timeout for locked database
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// Page cache size (negative = KiB)
pub const SQLITE_CACHE_SIZE: &str = "-16000";

/// Pages between automatic WAL checkpoints
pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";

/// Interval for the background WAL checkpoint task
pub const SQLITE_CHECKPOINT_INTERVAL_SECS: u64 = 300;
