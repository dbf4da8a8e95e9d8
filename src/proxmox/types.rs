use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The uniform `{ "data": ... }` wrapper every Proxmox API response uses.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Envelope<T> {
    pub data: T,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VersionInfo {
    pub version: String,
    pub release: Option<String>,
    pub repoid: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NodeInfo {
    pub node: String,
    pub status: Option<String>,
    pub cpu: Option<f64>,
    pub maxcpu: Option<i64>,
    pub mem: Option<i64>,
    pub maxmem: Option<i64>,
    pub disk: Option<i64>,
    pub maxdisk: Option<i64>,
    pub uptime: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VmInfo {
    pub vmid: i64, // Proxmox uses integer IDs mostly, but sometimes strings. i64 is safe.
    pub name: Option<String>,
    pub status: String,
    pub maxmem: Option<i64>,
    pub maxdisk: Option<i64>,
    pub cpus: Option<f64>,
    pub uptime: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VmConfig {
    pub name: Option<String>,
    pub memory: Option<Value>, // MB as integer, or e.g. "2048" depending on PVE version
    pub cores: Option<i64>,
    pub sockets: Option<i64>,
    pub boot: Option<String>,
    pub ostype: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ContainerInfo {
    pub vmid: Value, // lxc list endpoints return the vmid as a string
    pub name: Option<String>,
    pub status: String,
    pub maxmem: Option<i64>,
    pub maxdisk: Option<i64>,
    pub cpus: Option<f64>,
    pub uptime: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ContainerConfig {
    pub hostname: Option<String>,
    pub memory: Option<Value>,
    pub cores: Option<i64>,
    pub ostype: Option<String>,
    pub rootfs: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TaskStatus {
    pub upid: String,
    #[serde(rename = "type")]
    pub task_type: Option<String>,
    pub status: Option<String>,
    pub exitstatus: Option<String>,
    pub starttime: Option<i64>,
    pub endtime: Option<i64>,
    pub user: Option<String>,
    pub node: Option<String>,
}
