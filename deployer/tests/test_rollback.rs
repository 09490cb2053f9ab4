//! Rollback flow tests against a scripted client

mod common;

use serde_json::json;

use middeploy::aws::client::ResourceKind;
use middeploy::deploy::names::Environment;
use middeploy::deploy::rollback::rollback;
use middeploy::errors::DeployError;

use common::MockClient;

fn service_reply(task_definition: &str) -> serde_json::Value {
    json!({
        "services": [{
            "serviceName": "midserver-dev-service",
            "taskDefinition": task_definition,
        }]
    })
}

#[tokio::test]
async fn test_rollback_repins_previous_revision() {
    let mock = MockClient::new();
    mock.on_ok(
        ResourceKind::Ecs,
        "describe-services",
        service_reply("midserver-dev-task:3"),
    );
    mock.on_ok(ResourceKind::Ecs, "update-service", json!({}));

    let summary = rollback(&mock, Environment::Dev).await.unwrap();

    assert_eq!(summary.cluster, "midserver-dev-cluster");
    assert_eq!(summary.service, "midserver-dev-service");
    assert_eq!(summary.task_definition, "midserver-dev-task:2");

    // The update only repins the task definition; count and network
    // placement are left alone
    let update = mock.calls_for(ResourceKind::Ecs, "update-service");
    assert_eq!(update.len(), 1);
    assert_eq!(update[0].params["taskDefinition"], "midserver-dev-task:2");
    assert!(update[0].params.get("desiredCount").is_none());
    assert!(update[0].params.get("networkConfiguration").is_none());
}

#[tokio::test]
async fn test_rollback_refuses_first_revision() {
    let mock = MockClient::new();
    mock.on_ok(
        ResourceKind::Ecs,
        "describe-services",
        service_reply("midserver-dev-task:1"),
    );

    let err = rollback(&mock, Environment::Dev).await.unwrap_err();

    assert!(matches!(err, DeployError::RollbackNotPossible(_)));
    assert_eq!(mock.count(ResourceKind::Ecs, "update-service"), 0);
}

#[tokio::test]
async fn test_rollback_requires_existing_service() {
    let mock = MockClient::new();
    mock.on_ok(ResourceKind::Ecs, "describe-services", json!({ "services": [] }));

    let err = rollback(&mock, Environment::Dev).await.unwrap_err();

    assert!(matches!(err, DeployError::RollbackNotPossible(_)));
    assert_eq!(mock.count(ResourceKind::Ecs, "update-service"), 0);
}
