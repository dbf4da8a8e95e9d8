use anyhow::Result;
use serde_json::{json, Value};

use crate::proxmox::types::{Envelope, VmConfig, VmInfo};
use crate::proxmox::ProxmoxClient;

use super::{format_memory, format_uptime, require_i64, require_str, value_text};

/// QEMU tool catalog. Every tool maps to one API call and always renders
/// text, folding client errors into the message instead of raising them
/// at the transport.
pub struct VmTools {
    client: ProxmoxClient,
}

impl VmTools {
    pub fn new(client: ProxmoxClient) -> Self {
        Self { client }
    }

    pub fn definitions(&self) -> Vec<Value> {
        vec![
            json!({
                "name": "listVMs",
                "description": "List all QEMU virtual machines on a specific Proxmox node",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "node": { "type": "string", "description": "Proxmox node to list VMs from" }
                    },
                    "required": ["node"]
                }
            }),
            json!({
                "name": "getVM",
                "description": "Get the detailed configuration of a specific virtual machine",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "node": { "type": "string", "description": "Proxmox node name" },
                        "vmid": { "type": "number", "description": "ID of the virtual machine" }
                    },
                    "required": ["node", "vmid"]
                }
            }),
            json!({
                "name": "startVM",
                "description": "Start a specific virtual machine",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "node": { "type": "string", "description": "Proxmox node name" },
                        "vmid": { "type": "number", "description": "ID of the virtual machine to start" }
                    },
                    "required": ["node", "vmid"]
                }
            }),
            json!({
                "name": "stopVM",
                "description": "Stop a specific virtual machine",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "node": { "type": "string", "description": "Proxmox node name" },
                        "vmid": { "type": "number", "description": "ID of the virtual machine to stop" }
                    },
                    "required": ["node", "vmid"]
                }
            }),
            json!({
                "name": "restartVM",
                "description": "Restart a specific virtual machine",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "node": { "type": "string", "description": "Proxmox node name" },
                        "vmid": { "type": "number", "description": "ID of the virtual machine to restart" }
                    },
                    "required": ["node", "vmid"]
                }
            }),
            json!({
                "name": "deleteVM",
                "description": "Delete a specific virtual machine (CAUTION: this operation is irreversible!)",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "node": { "type": "string", "description": "Proxmox node name" },
                        "vmid": { "type": "number", "description": "ID of the virtual machine to delete" }
                    },
                    "required": ["node", "vmid"]
                }
            }),
        ]
    }

    pub async fn execute(&self, name: &str, args: &Value) -> Result<String> {
        match name {
            "listVMs" => Ok(self.list_vms(require_str(args, "node")?).await),
            "getVM" => {
                Ok(self
                    .get_vm(require_str(args, "node")?, require_i64(args, "vmid")?)
                    .await)
            }
            "startVM" => {
                Ok(self
                    .vm_action(require_str(args, "node")?, require_i64(args, "vmid")?, "start")
                    .await)
            }
            "stopVM" => {
                Ok(self
                    .vm_action(require_str(args, "node")?, require_i64(args, "vmid")?, "stop")
                    .await)
            }
            "restartVM" => {
                Ok(self
                    .vm_action(require_str(args, "node")?, require_i64(args, "vmid")?, "reboot")
                    .await)
            }
            "deleteVM" => {
                Ok(self
                    .delete_vm(require_str(args, "node")?, require_i64(args, "vmid")?)
                    .await)
            }
            _ => anyhow::bail!("Unknown VM tool: {}", name),
        }
    }

    async fn list_vms(&self, node: &str) -> String {
        let resp: Envelope<Vec<VmInfo>> =
            match self.client.get(&format!("nodes/{}/qemu", node)).await {
                Ok(r) => r,
                Err(e) => return format!("Failed to list VMs: {}", e),
            };

        if resp.data.is_empty() {
            return format!("No virtual machines found on node '{}'", node);
        }

        let mut vms = resp.data;
        vms.sort_by_key(|vm| vm.vmid);

        let lines: Vec<String> = vms
            .iter()
            .map(|vm| {
                format!(
                    "• VM {}: {}\n  Status: {}\n  Memory: {}\n  CPUs: {}\n  Uptime: {}",
                    vm.vmid,
                    vm.name.as_deref().unwrap_or("unnamed"),
                    vm.status,
                    format_memory(vm.maxmem),
                    vm.cpus.map(|c| c.to_string()).unwrap_or_else(|| "N/A".into()),
                    format_uptime(vm.uptime),
                )
            })
            .collect();

        format!(
            "Virtual machines on node '{}':\n\n{}",
            node,
            lines.join("\n\n")
        )
    }

    async fn get_vm(&self, node: &str, vmid: i64) -> String {
        let resp: Envelope<VmConfig> = match self
            .client
            .get(&format!("nodes/{}/qemu/{}/config", node, vmid))
            .await
        {
            Ok(r) => r,
            Err(e) => return format!("Failed to get configuration of VM {}: {}", vmid, e),
        };

        let config = resp.data;
        let full = serde_json::to_string_pretty(&config).unwrap_or_default();

        format!(
            "Configuration of VM {} on node '{}':\n\n\
             • Name: {}\n\
             • Memory: {} MB\n\
             • CPUs: {} cores, {} sockets\n\
             • OS type: {}\n\
             • Boot: {}\n\
             • Full configuration: {}",
            vmid,
            node,
            config.name.as_deref().unwrap_or("unnamed"),
            config
                .memory
                .as_ref()
                .map(value_text)
                .unwrap_or_else(|| "N/A".into()),
            config.cores.unwrap_or(1),
            config.sockets.unwrap_or(1),
            config.ostype.as_deref().unwrap_or("unknown"),
            config.boot.as_deref().unwrap_or("default"),
            full,
        )
    }

    async fn vm_action(&self, node: &str, vmid: i64, action: &str) -> String {
        let path = format!("nodes/{}/qemu/{}/status/{}", node, vmid, action);
        let resp: Envelope<Option<String>> = match self.client.post(&path, None).await {
            Ok(r) => r,
            Err(e) => return format!("Failed to {} VM {}: {}", action, vmid, e),
        };

        format!(
            "VM {} on node '{}': {} initiated.\nTask UPID: {}",
            vmid,
            node,
            action,
            resp.data.as_deref().unwrap_or("n/a"),
        )
    }

    async fn delete_vm(&self, node: &str, vmid: i64) -> String {
        let resp: Envelope<Option<String>> = match self
            .client
            .delete(&format!("nodes/{}/qemu/{}", node, vmid))
            .await
        {
            Ok(r) => r,
            Err(e) => return format!("Failed to delete VM {}: {}", vmid, e),
        };

        format!(
            "VM {} on node '{}' deleted.\nTask UPID: {}",
            vmid,
            node,
            resp.data.as_deref().unwrap_or("n/a"),
        )
    }
}
