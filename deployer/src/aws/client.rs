//! Generic AWS client facade

use std::fmt;
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, error};

use crate::errors::DeployError;

/// AWS service a call is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Ec2,
    Ecs,
    Iam,
    Ssm,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Ec2 => "ec2",
            ResourceKind::Ecs => "ecs",
            ResourceKind::Iam => "iam",
            ResourceKind::Ssm => "ssm",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credentials for a run, passed in explicitly at construction time.
/// There is no shared global session.
#[derive(Debug, Clone, Default)]
pub struct CredentialContext {
    /// AWS profile from the shared config (SSO or static keys)
    pub profile: Option<String>,

    /// Region override; falls back to the profile's default region
    pub region: Option<String>,
}

/// Typed result of a lookup operation. "Absent" is an expected answer,
/// not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

/// Uniform call surface every provisioning step goes through
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Invoke one operation against one AWS service. `params` is the
    /// operation's input document; `Value::Null` means no input.
    async fn invoke(
        &self,
        kind: ResourceKind,
        operation: &str,
        params: Value,
    ) -> Result<Value, DeployError>;
}

/// Production client backed by the AWS CLI
pub struct AwsCliClient {
    credentials: CredentialContext,
}

impl AwsCliClient {
    pub fn new(credentials: CredentialContext) -> Self {
        Self { credentials }
    }
}

/// Extract the provider error code from CLI stderr, e.g.
/// `An error occurred (NoSuchEntity) when calling the GetRole operation: ...`
pub(crate) fn parse_error_code(stderr: &str) -> Option<String> {
    const MARKER: &str = "An error occurred (";
    let start = stderr.find(MARKER)? + MARKER.len();
    let rest = &stderr[start..];
    let end = rest.find(')')?;
    Some(rest[..end].to_string())
}

fn is_expired_credential(code: Option<&str>, stderr: &str) -> bool {
    matches!(
        code,
        Some("ExpiredToken") | Some("ExpiredTokenException") | Some("RequestExpired")
    ) || stderr.contains("token has expired")
        || stderr.contains("Error loading SSO Token")
}

#[async_trait]
impl ResourceClient for AwsCliClient {
    async fn invoke(
        &self,
        kind: ResourceKind,
        operation: &str,
        params: Value,
    ) -> Result<Value, DeployError> {
        let mut cmd = Command::new("aws");
        cmd.arg(kind.as_str())
            .arg(operation)
            .arg("--output")
            .arg("json");

        if !params.is_null() {
            cmd.arg("--cli-input-json").arg(params.to_string());
        }
        if let Some(profile) = &self.credentials.profile {
            cmd.arg("--profile").arg(profile);
        }
        if let Some(region) = &self.credentials.region {
            cmd.arg("--region").arg(region);
        }

        debug!(service = %kind, operation, "Invoking AWS operation");

        let output = cmd
            .env("AWS_PAGER", "")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                DeployError::provider(kind, operation, None, format!("failed to run aws cli: {e}"))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let code = parse_error_code(&stderr);

            if is_expired_credential(code.as_deref(), &stderr) {
                error!(service = %kind, operation, "AWS session token has expired");
                return Err(DeployError::ExpiredCredential(
                    "session token expired, run 'aws sso login' and try again".to_string(),
                ));
            }

            error!(service = %kind, operation, "AWS operation failed: {}", stderr);
            return Err(DeployError::provider(kind, operation, code, stderr));
        }

        if output.stdout.is_empty() {
            // Operations without output shape, e.g. attach-role-policy
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_code() {
        let stderr = "An error occurred (NoSuchEntity) when calling the GetRole operation: \
                      The role with name midserver-dev-task-role cannot be found.";
        assert_eq!(parse_error_code(stderr), Some("NoSuchEntity".to_string()));
    }

    #[test]
    fn test_parse_error_code_missing() {
        assert_eq!(parse_error_code("Unable to locate credentials"), None);
    }

    #[test]
    fn test_expired_credential_detection() {
        assert!(is_expired_credential(Some("ExpiredToken"), ""));
        assert!(is_expired_credential(
            None,
            "Error loading SSO Token: Token for profile dev does not exist"
        ));
        assert!(!is_expired_credential(Some("Throttling"), "rate exceeded"));
    }
}
