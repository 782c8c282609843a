//! HTTP server command
//!
//! Runs the carlot API against a MySQL pool built from flags/environment.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use carlot_server::db::{create_pool, DbConfig, MySqlStore, SessionSettings};
use carlot_server::http::{run_server, ServerConfig};
use carlot_server::AppState;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Interface to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// MySQL host
    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub db_host: String,

    /// MySQL port
    #[arg(long, env = "DB_PORT", default_value_t = 3306)]
    pub db_port: u16,

    /// MySQL user
    #[arg(long, env = "DB_USER", default_value = "root")]
    pub db_user: String,

    /// MySQL password
    #[arg(long, env = "DB_PASSWORD", default_value = "", hide_env_values = true)]
    pub db_password: String,

    /// MySQL database name
    #[arg(long, env = "DB_DATABASE", default_value = "carlot")]
    pub db_database: String,

    /// Maximum pooled connections
    #[arg(long, env = "DB_POOL_MAX", default_value_t = 10)]
    pub max_connections: u32,

    /// Seconds a request waits for a free connection
    #[arg(long, env = "DB_ACQUIRE_TIMEOUT_SECS", default_value_t = 10)]
    pub acquire_timeout: u64,

    /// Session sql_mode applied to every connection
    #[arg(long, env = "DB_SQL_MODE", default_value = "TRADITIONAL")]
    pub sql_mode: String,

    /// Session time zone applied to every connection
    #[arg(long, env = "DB_TIME_ZONE", default_value = "-8:00", allow_hyphen_values = true)]
    pub time_zone: String,
}

impl ServeArgs {
    fn db_config(&self) -> DbConfig {
        DbConfig {
            host: self.db_host.clone(),
            port: self.db_port,
            user: self.db_user.clone(),
            password: self.db_password.clone(),
            database: self.db_database.clone(),
            max_connections: self.max_connections,
            acquire_timeout: Duration::from_secs(self.acquire_timeout),
        }
    }

    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: SocketAddr::new(self.host, self.port),
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let settings = SessionSettings::new(&args.sql_mode, &args.time_zone)
        .context("Invalid database session settings")?;

    let db_config = args.db_config();
    tracing::info!(
        "Using MySQL database '{}' at {}:{}",
        db_config.database,
        db_config.host,
        db_config.port
    );

    let store = MySqlStore::new(create_pool(&db_config));
    let state = AppState::new(store, settings);

    // Run server (blocks until shutdown)
    run_server(state, args.server_config())
        .await
        .context("Server error")?;

    Ok(())
}
