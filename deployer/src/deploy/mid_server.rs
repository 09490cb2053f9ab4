//! MID server provisioning orchestrator
//!
//! Runs the seven-step pipeline strictly in order: network, security
//! group, IAM roles, cluster, task definition, service reconciliation,
//! summary. Each step's output feeds a later step, so the order is
//! load-bearing. Any failure aborts the run; resources created by
//! earlier steps are left in place.

use std::sync::Arc;

use chrono::Utc;
use secrecy::ExposeSecret;
use tracing::{debug, info};

use crate::aws::client::{Lookup, ResourceClient};
use crate::aws::{ec2, ecs, iam, ssm};
use crate::config::Settings;
use crate::deploy::names::{
    self, EXECUTION_ROLE_POLICY_ARN, REQUIRED_PARAMETERS, TASK_ROLE_POLICY_ARN,
    TASK_TRUST_SERVICE,
};
use crate::errors::DeployError;
use crate::models::infra::{IngressRule, NetworkTopology, RoleBinding};
use crate::models::task::{
    ContainerDefinition, DeploymentSummary, EnvVar, LogConfiguration, NetworkConfiguration,
    ServiceAction, TaskDefinitionSpec,
};

/// Deploys (and redeploys) the MID server for one environment
pub struct MidServerDeployer {
    client: Arc<dyn ResourceClient>,
    settings: Settings,
}

impl MidServerDeployer {
    pub fn new(client: Arc<dyn ResourceClient>, settings: Settings) -> Self {
        Self { client, settings }
    }

    /// Run the full provisioning pipeline
    pub async fn deploy(&self) -> Result<DeploymentSummary, DeployError> {
        let environment = self.settings.environment;
        info!(environment = %environment, "Starting MID server deployment");

        let topology = self.resolve_network().await?;
        let security_group = self.provision_security_group(&topology).await?;
        let (task_role, execution_role) = self.resolve_roles().await?;
        let cluster = self.ensure_cluster().await?;
        let task_definition = self
            .register_task_definition(&task_role, &execution_role)
            .await?;
        let service_action = self
            .reconcile_service(&cluster, &task_definition, &topology, &security_group)
            .await?;

        info!(
            environment = %environment,
            cluster,
            task_definition,
            action = %service_action,
            "MID server deployment completed"
        );

        Ok(DeploymentSummary {
            environment,
            cluster,
            service: names::service_name(environment),
            task_definition,
            security_group,
            service_action,
            finished_at: Utc::now(),
        })
    }

    /// Step 1: pick the first available VPC and enumerate its subnets.
    /// The deployer never creates networks; an empty account/region is
    /// fatal.
    async fn resolve_network(&self) -> Result<NetworkTopology, DeployError> {
        let vpcs = ec2::describe_vpcs(self.client.as_ref()).await?;
        let Some(vpc) = vpcs.into_iter().next() else {
            return Err(DeployError::NoNetworkFound);
        };
        let subnets = ec2::describe_subnets(self.client.as_ref(), &vpc.vpc_id).await?;
        let subnet_ids: Vec<String> = subnets.into_iter().map(|s| s.subnet_id).collect();
        info!(vpc = %vpc.vpc_id, subnets = subnet_ids.len(), "Resolved network topology");
        Ok(NetworkTopology {
            vpc_id: vpc.vpc_id,
            subnet_ids,
        })
    }

    /// Step 2: create the security group and open HTTPS/HTTP ingress.
    /// A new group is created on every run rather than resolved by
    /// name; see DESIGN.md before changing this.
    async fn provision_security_group(
        &self,
        topology: &NetworkTopology,
    ) -> Result<String, DeployError> {
        let environment = self.settings.environment;
        let group_name = names::security_group_name(environment);
        let description = format!("Security group for MID server {}", environment);
        let group_id = ec2::create_security_group(
            self.client.as_ref(),
            &group_name,
            &description,
            &topology.vpc_id,
        )
        .await?;

        let rules = [IngressRule::tcp(443), IngressRule::tcp(80)];
        ec2::authorize_ingress(self.client.as_ref(), &group_id, &rules).await?;

        info!(security_group = %group_id, vpc = %topology.vpc_id, "Provisioned security group");
        Ok(group_id)
    }

    /// Step 3: get-or-create the task and execution roles, then
    /// re-attach their managed policies. Attachment is idempotent.
    async fn resolve_roles(&self) -> Result<(RoleBinding, RoleBinding), DeployError> {
        let environment = self.settings.environment;
        let task_role = self.ensure_role(&names::task_role_name(environment)).await?;
        let execution_role = self
            .ensure_role(&names::execution_role_name(environment))
            .await?;

        iam::attach_role_policy(self.client.as_ref(), &task_role.name, TASK_ROLE_POLICY_ARN)
            .await?;
        iam::attach_role_policy(
            self.client.as_ref(),
            &execution_role.name,
            EXECUTION_ROLE_POLICY_ARN,
        )
        .await?;

        Ok((task_role, execution_role))
    }

    async fn ensure_role(&self, role_name: &str) -> Result<RoleBinding, DeployError> {
        match iam::get_role(self.client.as_ref(), role_name).await? {
            Lookup::Found(role) => {
                debug!(role = role_name, "IAM role already exists");
                Ok(role)
            }
            Lookup::NotFound => {
                info!(role = role_name, "Creating IAM role");
                let trust_policy = iam::assume_role_policy(TASK_TRUST_SERVICE);
                iam::create_role(self.client.as_ref(), role_name, &trust_policy).await
            }
        }
    }

    /// Step 4: create-or-no-op the cluster
    async fn ensure_cluster(&self) -> Result<String, DeployError> {
        let cluster = names::cluster_name(self.settings.environment);
        ecs::create_cluster(self.client.as_ref(), &cluster).await?;
        Ok(cluster)
    }

    /// Pull the four required runtime parameters. Any miss is fatal;
    /// there is no default for runtime secrets.
    async fn resolve_runtime_env(&self) -> Result<Vec<EnvVar>, DeployError> {
        let environment = self.settings.environment;
        let mut env_vars = Vec::with_capacity(REQUIRED_PARAMETERS.len());
        for var in REQUIRED_PARAMETERS {
            let path = names::parameter_path(environment, var);
            match ssm::get_parameter(self.client.as_ref(), &path).await? {
                Lookup::Found(value) => env_vars.push(EnvVar {
                    name: var.to_string(),
                    value: value.expose_secret().to_string(),
                }),
                Lookup::NotFound => {
                    return Err(DeployError::MissingRuntimeParameter(var.to_string()))
                }
            }
        }
        Ok(env_vars)
    }

    /// Step 5: resolve runtime configuration and register a new
    /// task-definition revision. Revisions are immutable; every run
    /// produces a new one.
    async fn register_task_definition(
        &self,
        task_role: &RoleBinding,
        execution_role: &RoleBinding,
    ) -> Result<String, DeployError> {
        let environment = self.settings.environment;
        let env_vars = self.resolve_runtime_env().await?;

        let spec = TaskDefinitionSpec {
            family: names::task_family(environment),
            container_definitions: vec![ContainerDefinition {
                name: names::container_name(environment),
                image: self.settings.image(),
                cpu: 256,
                memory: 512,
                essential: true,
                port_mappings: Vec::new(),
                environment: env_vars,
                log_configuration: LogConfiguration::awslogs(
                    names::log_group(environment),
                    self.settings.aws_region.clone(),
                ),
            }],
            task_role_arn: task_role.arn.clone(),
            execution_role_arn: execution_role.arn.clone(),
            network_mode: "awsvpc".to_string(),
            requires_compatibilities: vec!["FARGATE".to_string()],
            cpu: "256".to_string(),
            memory: "512".to_string(),
        };

        let arn = ecs::register_task_definition(self.client.as_ref(), &spec).await?;
        info!(task_definition = %arn, "Registered task definition revision");
        Ok(arn)
    }

    /// Step 6: the pipeline's only branch. Service exists -> update it
    /// to the new revision; otherwise create it fresh.
    async fn reconcile_service(
        &self,
        cluster: &str,
        task_definition: &str,
        topology: &NetworkTopology,
        security_group: &str,
    ) -> Result<ServiceAction, DeployError> {
        let service = names::service_name(self.settings.environment);
        let network = NetworkConfiguration::awsvpc(
            topology.subnet_ids.clone(),
            vec![security_group.to_string()],
        );

        match ecs::describe_service(self.client.as_ref(), cluster, &service).await? {
            Lookup::Found(_) => {
                let update = ecs::ServiceUpdate {
                    desired_count: Some(self.settings.desired_count),
                    network: Some(network),
                };
                ecs::update_service(
                    self.client.as_ref(),
                    cluster,
                    &service,
                    task_definition,
                    &update,
                )
                .await?;
                info!(service = %service, "Updated existing ECS service");
                Ok(ServiceAction::Updated)
            }
            Lookup::NotFound => {
                ecs::create_service(
                    self.client.as_ref(),
                    cluster,
                    &service,
                    task_definition,
                    self.settings.desired_count,
                    &network,
                )
                .await?;
                info!(service = %service, "Created new ECS service");
                Ok(ServiceAction::Created)
            }
        }
    }
}
