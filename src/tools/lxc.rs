use anyhow::Result;
use serde_json::{json, Value};

use crate::proxmox::types::{ContainerConfig, ContainerInfo, Envelope};
use crate::proxmox::ProxmoxClient;

use super::{format_memory, format_uptime, require_i64, require_str, value_text};

/// LXC tool catalog, the container-side mirror of [`super::vm::VmTools`].
pub struct LxcTools {
    client: ProxmoxClient,
}

impl LxcTools {
    pub fn new(client: ProxmoxClient) -> Self {
        Self { client }
    }

    pub fn definitions(&self) -> Vec<Value> {
        vec![
            json!({
                "name": "listContainers",
                "description": "List all LXC containers on a specific Proxmox node",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "node": { "type": "string", "description": "Proxmox node to list containers from" }
                    },
                    "required": ["node"]
                }
            }),
            json!({
                "name": "getContainer",
                "description": "Get the detailed configuration of a specific LXC container",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "node": { "type": "string", "description": "Proxmox node name" },
                        "vmid": { "type": "number", "description": "ID of the container" }
                    },
                    "required": ["node", "vmid"]
                }
            }),
            json!({
                "name": "startContainer",
                "description": "Start a specific LXC container",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "node": { "type": "string", "description": "Proxmox node name" },
                        "vmid": { "type": "number", "description": "ID of the container to start" }
                    },
                    "required": ["node", "vmid"]
                }
            }),
            json!({
                "name": "stopContainer",
                "description": "Stop a specific LXC container",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "node": { "type": "string", "description": "Proxmox node name" },
                        "vmid": { "type": "number", "description": "ID of the container to stop" }
                    },
                    "required": ["node", "vmid"]
                }
            }),
            json!({
                "name": "restartContainer",
                "description": "Restart a specific LXC container",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "node": { "type": "string", "description": "Proxmox node name" },
                        "vmid": { "type": "number", "description": "ID of the container to restart" }
                    },
                    "required": ["node", "vmid"]
                }
            }),
            json!({
                "name": "deleteContainer",
                "description": "Delete a specific LXC container (CAUTION: this operation is irreversible!)",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "node": { "type": "string", "description": "Proxmox node name" },
                        "vmid": { "type": "number", "description": "ID of the container to delete" }
                    },
                    "required": ["node", "vmid"]
                }
            }),
        ]
    }

    pub async fn execute(&self, name: &str, args: &Value) -> Result<String> {
        match name {
            "listContainers" => Ok(self.list_containers(require_str(args, "node")?).await),
            "getContainer" => {
                Ok(self
                    .get_container(require_str(args, "node")?, require_i64(args, "vmid")?)
                    .await)
            }
            "startContainer" => {
                Ok(self
                    .container_action(
                        require_str(args, "node")?,
                        require_i64(args, "vmid")?,
                        "start",
                    )
                    .await)
            }
            "stopContainer" => {
                Ok(self
                    .container_action(
                        require_str(args, "node")?,
                        require_i64(args, "vmid")?,
                        "stop",
                    )
                    .await)
            }
            "restartContainer" => {
                Ok(self
                    .container_action(
                        require_str(args, "node")?,
                        require_i64(args, "vmid")?,
                        "reboot",
                    )
                    .await)
            }
            "deleteContainer" => {
                Ok(self
                    .delete_container(require_str(args, "node")?, require_i64(args, "vmid")?)
                    .await)
            }
            _ => anyhow::bail!("Unknown LXC tool: {}", name),
        }
    }

    async fn list_containers(&self, node: &str) -> String {
        let resp: Envelope<Vec<ContainerInfo>> =
            match self.client.get(&format!("nodes/{}/lxc", node)).await {
                Ok(r) => r,
                Err(e) => return format!("Failed to list containers: {}", e),
            };

        if resp.data.is_empty() {
            return format!("No containers found on node '{}'", node);
        }

        let lines: Vec<String> = resp
            .data
            .iter()
            .map(|ct| {
                format!(
                    "• Container {}: {}\n  Status: {}\n  Memory: {}\n  CPUs: {}\n  Uptime: {}",
                    value_text(&ct.vmid),
                    ct.name.as_deref().unwrap_or("unnamed"),
                    ct.status,
                    format_memory(ct.maxmem),
                    ct.cpus.map(|c| c.to_string()).unwrap_or_else(|| "N/A".into()),
                    format_uptime(ct.uptime),
                )
            })
            .collect();

        format!("Containers on node '{}':\n\n{}", node, lines.join("\n\n"))
    }

    async fn get_container(&self, node: &str, vmid: i64) -> String {
        let resp: Envelope<ContainerConfig> = match self
            .client
            .get(&format!("nodes/{}/lxc/{}/config", node, vmid))
            .await
        {
            Ok(r) => r,
            Err(e) => return format!("Failed to get configuration of container {}: {}", vmid, e),
        };

        let config = resp.data;
        let full = serde_json::to_string_pretty(&config).unwrap_or_default();

        format!(
            "Configuration of container {} on node '{}':\n\n\
             • Hostname: {}\n\
             • Memory: {} MB\n\
             • CPUs: {} cores\n\
             • OS type: {}\n\
             • Root filesystem: {}\n\
             • Full configuration: {}",
            vmid,
            node,
            config.hostname.as_deref().unwrap_or("unnamed"),
            config
                .memory
                .as_ref()
                .map(value_text)
                .unwrap_or_else(|| "N/A".into()),
            config.cores.unwrap_or(1),
            config.ostype.as_deref().unwrap_or("unknown"),
            config.rootfs.as_deref().unwrap_or("N/A"),
            full,
        )
    }

    async fn container_action(&self, node: &str, vmid: i64, action: &str) -> String {
        let path = format!("nodes/{}/lxc/{}/status/{}", node, vmid, action);
        let resp: Envelope<Option<String>> = match self.client.post(&path, None).await {
            Ok(r) => r,
            Err(e) => return format!("Failed to {} container {}: {}", action, vmid, e),
        };

        format!(
            "Container {} on node '{}': {} initiated.\nTask UPID: {}",
            vmid,
            node,
            action,
            resp.data.as_deref().unwrap_or("n/a"),
        )
    }

    async fn delete_container(&self, node: &str, vmid: i64) -> String {
        let resp: Envelope<Option<String>> = match self
            .client
            .delete(&format!("nodes/{}/lxc/{}", node, vmid))
            .await
        {
            Ok(r) => r,
            Err(e) => return format!("Failed to delete container {}: {}", vmid, e),
        };

        format!(
            "Container {} on node '{}' deleted.\nTask UPID: {}",
            vmid,
            node,
            resp.data.as_deref().unwrap_or("n/a"),
        )
    }
}
