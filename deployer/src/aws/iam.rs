//! IAM role call wrappers

use serde_json::{json, Value};

use crate::aws::client::{Lookup, ResourceClient, ResourceKind};
use crate::errors::DeployError;
use crate::models::infra::RoleBinding;

/// Trust policy allowing `service` to assume a role
pub fn assume_role_policy(service: &str) -> Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": { "Service": service },
            "Action": "sts:AssumeRole",
        }]
    })
}

/// Look up a role by name. A missing role is an expected answer, not a
/// failure.
pub async fn get_role(
    client: &dyn ResourceClient,
    role_name: &str,
) -> Result<Lookup<RoleBinding>, DeployError> {
    let params = json!({ "RoleName": role_name });
    match client.invoke(ResourceKind::Iam, "get-role", params).await {
        Ok(response) => {
            let role = response.get("Role").cloned().ok_or_else(|| {
                DeployError::provider(ResourceKind::Iam, "get-role", None, "response missing Role")
            })?;
            Ok(Lookup::Found(serde_json::from_value(role)?))
        }
        Err(DeployError::ProviderCall {
            code: Some(code), ..
        }) if code == "NoSuchEntity" => Ok(Lookup::NotFound),
        Err(e) => Err(e),
    }
}

/// Create a role with the given trust policy
pub async fn create_role(
    client: &dyn ResourceClient,
    role_name: &str,
    trust_policy: &Value,
) -> Result<RoleBinding, DeployError> {
    // The trust policy document is a JSON string on the wire
    let params = json!({
        "RoleName": role_name,
        "AssumeRolePolicyDocument": trust_policy.to_string(),
    });
    let response = client
        .invoke(ResourceKind::Iam, "create-role", params)
        .await?;
    let role = response.get("Role").cloned().ok_or_else(|| {
        DeployError::provider(ResourceKind::Iam, "create-role", None, "response missing Role")
    })?;
    Ok(serde_json::from_value(role)?)
}

/// Attach a managed policy to a role. Attaching an already-attached
/// policy succeeds, so callers may re-attach on every run.
pub async fn attach_role_policy(
    client: &dyn ResourceClient,
    role_name: &str,
    policy_arn: &str,
) -> Result<(), DeployError> {
    let params = json!({
        "RoleName": role_name,
        "PolicyArn": policy_arn,
    });
    client
        .invoke(ResourceKind::Iam, "attach-role-policy", params)
        .await?;
    Ok(())
}
