//! Server configuration
//!
//! Defines all configurable parameters for the backend including the launch
//! command, the startup observation window, dispatcher sizing, and auth
//! settings.

use std::path::PathBuf;
use std::time::Duration;

/// Backend configuration
///
/// All timeouts and capacities are configurable to allow tuning for
/// different deployment scenarios (dev vs prod, fast vs slow game servers).
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// Database connection URL (SQLite)
    pub database_url: String,

    /// Root directory holding one subdirectory per user
    pub data_root: PathBuf,

    /// Username whose `game` directory serves as the install template
    pub template_user: String,

    /// Launch command for a user's game server (program followed by args),
    /// executed with the user's `game` directory as working directory
    pub launch_command: Vec<String>,

    /// How long to observe a freshly spawned server before deciding whether
    /// the launch succeeded
    pub startup_probe: Duration,

    /// Number of dispatcher workers executing launch tasks
    pub worker_count: usize,

    /// Capacity of the dispatcher queue; submissions beyond this are rejected
    pub queue_capacity: usize,

    /// How long terminal task entries are retained before eviction
    pub task_retention: Duration,

    /// How often the registry sweeper looks for expired entries
    pub sweep_interval: Duration,

    /// HMAC secret for signing access tokens
    pub jwt_secret: String,

    /// Access token lifetime in minutes
    pub token_expiry_mins: i64,

    /// Minimum accepted password length at registration
    pub min_password_len: usize,
}

impl Config {
    /// Creates configuration from environment variables, falling back to
    /// defaults for everything except `BERTH_JWT_SECRET`.
    ///
    /// Recognized variables:
    /// - BERTH_BIND_ADDR (default: 0.0.0.0:8080)
    /// - DATABASE_URL (default: sqlite://berth.db)
    /// - BERTH_DATA_ROOT (default: ./userdata)
    /// - BERTH_TEMPLATE_USER (default: admin)
    /// - BERTH_LAUNCH_COMMAND (whitespace-split, default: ./launch.sh)
    /// - BERTH_STARTUP_PROBE_SECS (default: 10)
    /// - BERTH_WORKER_COUNT (default: 20)
    /// - BERTH_QUEUE_CAPACITY (default: 64)
    /// - BERTH_TASK_RETENTION_SECS (default: 3600)
    /// - BERTH_SWEEP_INTERVAL_SECS (default: 60)
    /// - BERTH_JWT_SECRET (required)
    /// - BERTH_TOKEN_EXPIRY_MINS (default: 60)
    /// - BERTH_MIN_PASSWORD_LEN (default: 8)
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = std::env::var("BERTH_JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("BERTH_JWT_SECRET environment variable not set"))?;

        let bind_addr =
            std::env::var("BERTH_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://berth.db".to_string());

        let data_root = std::env::var("BERTH_DATA_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("userdata"));

        let template_user =
            std::env::var("BERTH_TEMPLATE_USER").unwrap_or_else(|_| "admin".to_string());

        let launch_command = std::env::var("BERTH_LAUNCH_COMMAND")
            .unwrap_or_else(|_| "./launch.sh".to_string())
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let startup_probe = env_secs("BERTH_STARTUP_PROBE_SECS", 10);
        let task_retention = env_secs("BERTH_TASK_RETENTION_SECS", 3600);
        let sweep_interval = env_secs("BERTH_SWEEP_INTERVAL_SECS", 60);

        let worker_count = std::env::var("BERTH_WORKER_COUNT")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(20);

        let queue_capacity = std::env::var("BERTH_QUEUE_CAPACITY")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(64);

        let token_expiry_mins = std::env::var("BERTH_TOKEN_EXPIRY_MINS")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(60);

        let min_password_len = std::env::var("BERTH_MIN_PASSWORD_LEN")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(8);

        Ok(Self {
            bind_addr,
            database_url,
            data_root,
            template_user,
            launch_command,
            startup_probe,
            worker_count,
            queue_capacity,
            task_retention,
            sweep_interval,
            jwt_secret,
            token_expiry_mins,
            min_password_len,
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if self.jwt_secret.is_empty() {
            anyhow::bail!("jwt_secret cannot be empty");
        }

        if self.launch_command.is_empty() {
            anyhow::bail!("launch_command cannot be empty");
        }

        if self.worker_count == 0 {
            anyhow::bail!("worker_count must be greater than 0");
        }

        if self.queue_capacity == 0 {
            anyhow::bail!("queue_capacity must be greater than 0");
        }

        if self.startup_probe.is_zero() {
            anyhow::bail!("startup_probe must be greater than 0");
        }

        if self.token_expiry_mins <= 0 {
            anyhow::bail!("token_expiry_mins must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            database_url: "sqlite://berth.db".to_string(),
            data_root: PathBuf::from("userdata"),
            template_user: "admin".to_string(),
            launch_command: vec!["./launch.sh".to_string()],
            startup_probe: Duration::from_secs(10),
            worker_count: 20,
            queue_capacity: 64,
            task_retention: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(60),
            jwt_secret: String::new(),
            token_expiry_mins: 60,
            min_password_len: 8,
        }
    }
}

fn env_secs(var: &str, default: u64) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(default))
}
