pub mod proxmox;
pub mod settings;
pub mod tools;


pub use proxmox::{AuthMethod, ConnectionConfig, ProxmoxClient, ProxmoxError};
pub use settings::Settings;
