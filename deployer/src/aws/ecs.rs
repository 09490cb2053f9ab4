//! ECS cluster, task-definition and service call wrappers

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::aws::client::{Lookup, ResourceClient, ResourceKind};
use crate::errors::DeployError;
use crate::models::task::{NetworkConfiguration, TaskDefinitionSpec};

/// A deployed service, as returned by describe-services
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceInfo {
    #[serde(rename = "serviceName")]
    pub service_name: String,

    /// Task-definition revision the service currently runs,
    /// `{family}:{revision}` or the full ARN
    #[serde(rename = "taskDefinition")]
    pub task_definition: String,
}

/// Create a cluster by name. The provider treats re-creation of an
/// existing cluster as a no-op.
pub async fn create_cluster(client: &dyn ResourceClient, name: &str) -> Result<(), DeployError> {
    let params = json!({ "clusterName": name });
    client
        .invoke(ResourceKind::Ecs, "create-cluster", params)
        .await?;
    Ok(())
}

/// Register a new immutable task-definition revision, returning its ARN
pub async fn register_task_definition(
    client: &dyn ResourceClient,
    spec: &TaskDefinitionSpec,
) -> Result<String, DeployError> {
    let params = serde_json::to_value(spec)?;
    let response = client
        .invoke(ResourceKind::Ecs, "register-task-definition", params)
        .await?;
    response
        .pointer("/taskDefinition/taskDefinitionArn")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            DeployError::provider(
                ResourceKind::Ecs,
                "register-task-definition",
                None,
                "response missing taskDefinition.taskDefinitionArn",
            )
        })
}

/// Look up a service by name within a cluster. An empty result is the
/// signal to take the create branch.
pub async fn describe_service(
    client: &dyn ResourceClient,
    cluster: &str,
    service: &str,
) -> Result<Lookup<ServiceInfo>, DeployError> {
    let params = json!({ "cluster": cluster, "services": [service] });
    let response = client
        .invoke(ResourceKind::Ecs, "describe-services", params)
        .await?;
    let services = response
        .get("services")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    match services.into_iter().next() {
        Some(svc) => Ok(Lookup::Found(serde_json::from_value(svc)?)),
        None => Ok(Lookup::NotFound),
    }
}

/// Create a new service on Fargate
pub async fn create_service(
    client: &dyn ResourceClient,
    cluster: &str,
    service: &str,
    task_definition: &str,
    desired_count: u32,
    network: &NetworkConfiguration,
) -> Result<(), DeployError> {
    let params = json!({
        "cluster": cluster,
        "serviceName": service,
        "taskDefinition": task_definition,
        "desiredCount": desired_count,
        "launchType": "FARGATE",
        "networkConfiguration": serde_json::to_value(network)?,
    });
    client
        .invoke(ResourceKind::Ecs, "create-service", params)
        .await?;
    Ok(())
}

/// Fields to change on an existing service. Only the task definition
/// is mandatory; the rollback flow repins the revision and touches
/// nothing else.
#[derive(Debug, Clone, Default)]
pub struct ServiceUpdate {
    pub desired_count: Option<u32>,
    pub network: Option<NetworkConfiguration>,
}

/// Point an existing service at a task-definition revision
pub async fn update_service(
    client: &dyn ResourceClient,
    cluster: &str,
    service: &str,
    task_definition: &str,
    update: &ServiceUpdate,
) -> Result<(), DeployError> {
    let mut params = Map::new();
    params.insert("cluster".to_string(), json!(cluster));
    params.insert("service".to_string(), json!(service));
    params.insert("taskDefinition".to_string(), json!(task_definition));
    if let Some(desired_count) = update.desired_count {
        params.insert("desiredCount".to_string(), json!(desired_count));
    }
    if let Some(network) = &update.network {
        params.insert(
            "networkConfiguration".to_string(),
            serde_json::to_value(network)?,
        );
    }
    client
        .invoke(ResourceKind::Ecs, "update-service", Value::Object(params))
        .await?;
    Ok(())
}
