//! SSM Parameter Store call wrappers

use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};

use crate::aws::client::{Lookup, ResourceClient, ResourceKind};
use crate::errors::DeployError;

/// Fetch one decrypted parameter by path
pub async fn get_parameter(
    client: &dyn ResourceClient,
    name: &str,
) -> Result<Lookup<SecretString>, DeployError> {
    let params = json!({ "Name": name, "WithDecryption": true });
    match client.invoke(ResourceKind::Ssm, "get-parameter", params).await {
        Ok(response) => {
            let value = response
                .pointer("/Parameter/Value")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    DeployError::provider(
                        ResourceKind::Ssm,
                        "get-parameter",
                        None,
                        "response missing Parameter.Value",
                    )
                })?;
            Ok(Lookup::Found(SecretString::from(value.to_string())))
        }
        Err(DeployError::ProviderCall {
            code: Some(code), ..
        }) if code == "ParameterNotFound" => Ok(Lookup::NotFound),
        Err(e) => Err(e),
    }
}

/// Create or overwrite a SecureString parameter
pub async fn put_parameter(
    client: &dyn ResourceClient,
    name: &str,
    value: &SecretString,
    description: &str,
) -> Result<(), DeployError> {
    let params = json!({
        "Name": name,
        "Value": value.expose_secret(),
        "Description": description,
        "Type": "SecureString",
        "Overwrite": true,
    });
    client
        .invoke(ResourceKind::Ssm, "put-parameter", params)
        .await?;
    Ok(())
}
