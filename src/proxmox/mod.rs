pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::ProxmoxClient;
pub use config::{AuthMethod, ConnectionConfig};
pub use error::{ProxmoxError, Result};
