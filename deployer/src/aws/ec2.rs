//! EC2 network and security-group call wrappers

use serde::Deserialize;
use serde_json::{json, Value};

use crate::aws::client::{ResourceClient, ResourceKind};
use crate::errors::DeployError;
use crate::models::infra::IngressRule;

#[derive(Debug, Clone, Deserialize)]
pub struct Vpc {
    #[serde(rename = "VpcId")]
    pub vpc_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Subnet {
    #[serde(rename = "SubnetId")]
    pub subnet_id: String,
}

/// List all VPCs visible to the credential context
pub async fn describe_vpcs(client: &dyn ResourceClient) -> Result<Vec<Vpc>, DeployError> {
    let response = client
        .invoke(ResourceKind::Ec2, "describe-vpcs", Value::Null)
        .await?;
    let vpcs = response.get("Vpcs").cloned().unwrap_or_else(|| json!([]));
    Ok(serde_json::from_value(vpcs)?)
}

/// List the subnets of one VPC
pub async fn describe_subnets(
    client: &dyn ResourceClient,
    vpc_id: &str,
) -> Result<Vec<Subnet>, DeployError> {
    let params = json!({
        "Filters": [{ "Name": "vpc-id", "Values": [vpc_id] }]
    });
    let response = client
        .invoke(ResourceKind::Ec2, "describe-subnets", params)
        .await?;
    let subnets = response.get("Subnets").cloned().unwrap_or_else(|| json!([]));
    Ok(serde_json::from_value(subnets)?)
}

/// Create a security group in a VPC, returning its id
pub async fn create_security_group(
    client: &dyn ResourceClient,
    group_name: &str,
    description: &str,
    vpc_id: &str,
) -> Result<String, DeployError> {
    let params = json!({
        "GroupName": group_name,
        "Description": description,
        "VpcId": vpc_id,
    });
    let response = client
        .invoke(ResourceKind::Ec2, "create-security-group", params)
        .await?;
    response
        .get("GroupId")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            DeployError::provider(
                ResourceKind::Ec2,
                "create-security-group",
                None,
                "response missing GroupId",
            )
        })
}

/// Authorize ingress rules on a security group
pub async fn authorize_ingress(
    client: &dyn ResourceClient,
    group_id: &str,
    rules: &[IngressRule],
) -> Result<(), DeployError> {
    let permissions: Vec<Value> = rules
        .iter()
        .map(|rule| {
            json!({
                "IpProtocol": rule.ip_protocol,
                "FromPort": rule.from_port,
                "ToPort": rule.to_port,
                "IpRanges": [{ "CidrIp": rule.cidr }],
            })
        })
        .collect();
    let params = json!({
        "GroupId": group_id,
        "IpPermissions": permissions,
    });
    client
        .invoke(ResourceKind::Ec2, "authorize-security-group-ingress", params)
        .await?;
    Ok(())
}
