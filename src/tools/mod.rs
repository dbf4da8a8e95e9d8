pub mod lxc;
pub mod vm;

pub use lxc::LxcTools;
pub use vm::VmTools;

use anyhow::Result;
use serde_json::Value;

pub(crate) fn require_str<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or(anyhow::anyhow!("Missing {}", key))
}

pub(crate) fn require_i64(args: &Value, key: &str) -> Result<i64> {
    args.get(key)
        .and_then(|v| v.as_i64())
        .ok_or(anyhow::anyhow!("Missing {}", key))
}

// Renders a loosely-typed PVE field without JSON quoting; some endpoints
// return numbers as strings depending on the PVE version.
pub(crate) fn value_text(v: &Value) -> String {
    match v.as_str() {
        Some(s) => s.to_string(),
        None => v.to_string(),
    }
}

pub(crate) fn format_memory(maxmem: Option<i64>) -> String {
    match maxmem {
        Some(bytes) => format!("{} MB", bytes / 1024 / 1024),
        None => "N/A".into(),
    }
}

pub(crate) fn format_uptime(uptime: Option<i64>) -> String {
    match uptime {
        Some(secs) => format!("{} hours", secs / 3600),
        None => "N/A".into(),
    }
}
