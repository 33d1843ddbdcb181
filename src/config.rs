// ⚙️ Configuration & Logging
// Flags with environment fallbacks, plus the tracing subscriber setup

use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE: &str = "expenses.db";

/// HTTP service for tracking expenses by category and month
#[derive(Debug, Clone, Parser)]
#[command(name = "expense-server", version, about)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "EXPENSES_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "EXPENSES_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// SQLite database file (created if missing)
    #[arg(long, env = "EXPENSES_DB", default_value = DEFAULT_DATABASE)]
    pub database: PathBuf,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "EXPENSES_LOG", default_value = "info")]
    pub log_filter: String,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Install the global tracing subscriber. RUST_LOG wins over `default_filter`.
pub fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Already installed (tests) is fine
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
