//! Task definition and service models
//!
//! These serialize directly into the ECS API's input documents, which
//! use camelCase keys on the wire.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::deploy::names::Environment;

/// Input for registering one immutable task-definition revision
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinitionSpec {
    pub family: String,
    pub container_definitions: Vec<ContainerDefinition>,
    pub task_role_arn: String,
    pub execution_role_arn: String,
    pub network_mode: String,
    pub requires_compatibilities: Vec<String>,
    /// Task-level sizing as API strings: "256" = 0.25 vCPU
    pub cpu: String,
    pub memory: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerDefinition {
    pub name: String,
    pub image: String,
    pub cpu: u32,
    pub memory: u32,
    pub essential: bool,
    pub port_mappings: Vec<PortMapping>,
    pub environment: Vec<EnvVar>,
    pub log_configuration: LogConfiguration,
}

/// The MID server dials out to its instance; it exposes no ports, so
/// this stays empty in practice.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    pub container_port: u16,
    pub protocol: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogConfiguration {
    pub log_driver: String,
    pub options: BTreeMap<String, String>,
}

impl LogConfiguration {
    /// awslogs sink pointed at a per-environment log group
    pub fn awslogs(group: String, region: String) -> Self {
        let mut options = BTreeMap::new();
        options.insert("awslogs-group".to_string(), group);
        options.insert("awslogs-region".to_string(), region);
        options.insert("awslogs-stream-prefix".to_string(), "ecs".to_string());
        Self {
            log_driver: "awslogs".to_string(),
            options,
        }
    }
}

/// Network placement for the service
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfiguration {
    pub awsvpc_configuration: AwsvpcConfiguration,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsvpcConfiguration {
    pub subnets: Vec<String>,
    pub security_groups: Vec<String>,
    pub assign_public_ip: String,
}

impl NetworkConfiguration {
    pub fn awsvpc(subnets: Vec<String>, security_groups: Vec<String>) -> Self {
        Self {
            awsvpc_configuration: AwsvpcConfiguration {
                subnets,
                security_groups,
                assign_public_ip: "ENABLED".to_string(),
            },
        }
    }
}

/// Whether the reconciliation step created the service or updated it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceAction {
    Created,
    Updated,
}

impl std::fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceAction::Created => f.write_str("created"),
            ServiceAction::Updated => f.write_str("updated"),
        }
    }
}

/// Outcome of one successful deployment run
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentSummary {
    pub environment: Environment,
    pub cluster: String,
    pub service: String,
    pub task_definition: String,
    pub security_group: String,
    pub service_action: ServiceAction,
    pub finished_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_definition_wire_shape() {
        let spec = TaskDefinitionSpec {
            family: "midserver-dev-task".to_string(),
            container_definitions: vec![ContainerDefinition {
                name: "midserver-dev".to_string(),
                image: "repo/midserver:latest".to_string(),
                cpu: 256,
                memory: 512,
                essential: true,
                port_mappings: Vec::new(),
                environment: vec![EnvVar {
                    name: "MID_SERVER_NAME".to_string(),
                    value: "mid-dev".to_string(),
                }],
                log_configuration: LogConfiguration::awslogs(
                    "/ecs/midserver-dev".to_string(),
                    "us-east-1".to_string(),
                ),
            }],
            task_role_arn: "arn:task".to_string(),
            execution_role_arn: "arn:exec".to_string(),
            network_mode: "awsvpc".to_string(),
            requires_compatibilities: vec!["FARGATE".to_string()],
            cpu: "256".to_string(),
            memory: "512".to_string(),
        };

        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["family"], "midserver-dev-task");
        assert_eq!(value["taskRoleArn"], "arn:task");
        assert_eq!(value["requiresCompatibilities"][0], "FARGATE");
        let container = &value["containerDefinitions"][0];
        assert_eq!(container["logConfiguration"]["logDriver"], "awslogs");
        assert_eq!(
            container["logConfiguration"]["options"]["awslogs-group"],
            "/ecs/midserver-dev"
        );
        assert_eq!(container["environment"][0]["name"], "MID_SERVER_NAME");
    }

    #[test]
    fn test_network_configuration_wire_shape() {
        let network = NetworkConfiguration::awsvpc(
            vec!["subnet-1".to_string()],
            vec!["sg-1".to_string()],
        );
        let value = serde_json::to_value(&network).unwrap();
        assert_eq!(value["awsvpcConfiguration"]["subnets"][0], "subnet-1");
        assert_eq!(value["awsvpcConfiguration"]["assignPublicIp"], "ENABLED");
    }
}
