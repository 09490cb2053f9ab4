//! Network and identity models

use serde::{Deserialize, Serialize};

/// Resolved network placement for the workload. Never cached; resolved
/// fresh on every run.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkTopology {
    /// Selected VPC
    pub vpc_id: String,

    /// All subnets of the selected VPC, in the order the provider
    /// returned them
    pub subnet_ids: Vec<String>,
}

/// One ingress rule on the workload's security group
#[derive(Debug, Clone, Serialize)]
pub struct IngressRule {
    pub ip_protocol: String,
    pub from_port: u16,
    pub to_port: u16,
    pub cidr: String,
}

impl IngressRule {
    /// Single-port TCP rule from an unrestricted source
    pub fn tcp(port: u16) -> Self {
        Self {
            ip_protocol: "tcp".to_string(),
            from_port: port,
            to_port: port,
            cidr: "0.0.0.0/0".to_string(),
        }
    }
}

/// An IAM role resolved (or created) by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBinding {
    #[serde(rename = "RoleName")]
    pub name: String,

    #[serde(rename = "Arn")]
    pub arn: String,
}
