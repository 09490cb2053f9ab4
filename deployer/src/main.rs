//! MID Server Deployer - Entry Point
//!
//! Provisions (or updates) the AWS ECS infrastructure running the
//! ServiceNow MID server for one environment, and can roll a service
//! back to its previous task-definition revision.

use std::collections::HashMap;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use colored::Colorize;
use secrecy::SecretString;
use tracing::error;

use middeploy::aws::client::{AwsCliClient, CredentialContext};
use middeploy::aws::ssm;
use middeploy::config::Settings;
use middeploy::deploy::mid_server::MidServerDeployer;
use middeploy::deploy::names::{parameter_path, Environment};
use middeploy::deploy::rollback::rollback;
use middeploy::logs::{init_logging, LogLevel, LogOptions};
use middeploy::utils::version_info;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    if cli_args.contains_key("version") {
        println!(
            "{}",
            serde_json::to_string_pretty(&version_info()).unwrap()
        );
        return ExitCode::SUCCESS;
    }

    // Initialize logging
    let log_level = match cli_args.get("log-level") {
        Some(raw) => match raw.parse::<LogLevel>() {
            Ok(level) => level,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => LogLevel::default(),
    };
    let log_options = LogOptions {
        log_level,
        json_format: cli_args.contains_key("json-logs"),
    };
    if let Err(e) = init_logging(log_options) {
        eprintln!("Failed to initialize logging: {e}");
    }

    // Resolve the target environment
    let environment = match cli_args.get("env").map(String::as_str).unwrap_or("dev").parse::<Environment>() {
        Ok(environment) => environment,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    // Credential context: flags win over process environment
    let profile = cli_args
        .get("profile")
        .cloned()
        .or_else(|| env::var("AWS_PROFILE").ok());
    let region = cli_args
        .get("region")
        .cloned()
        .or_else(|| env::var("AWS_REGION").ok());
    let credentials = CredentialContext {
        profile: profile.clone(),
        region: region.clone(),
    };
    let client = Arc::new(AwsCliClient::new(credentials));

    // Seed a runtime parameter and exit
    if let Some(var) = cli_args.get("put-param") {
        let Some(value) = cli_args.get("value") else {
            error!("--put-param requires --value=<parameter value>");
            return ExitCode::FAILURE;
        };
        let path = parameter_path(environment, var);
        let value = SecretString::from(value.clone());
        return match ssm::put_parameter(
            client.as_ref(),
            &path,
            &value,
            "MID server runtime parameter",
        )
        .await
        {
            Ok(()) => {
                println!("{} {}", "Stored parameter".green(), path);
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Failed to store parameter {}: {}", path, e);
                ExitCode::FAILURE
            }
        };
    }

    // Roll the service back to its previous revision and exit
    if cli_args.contains_key("rollback") {
        return match rollback(client.as_ref(), environment).await {
            Ok(summary) => {
                println!(
                    "{} {} -> {}",
                    "Rolled back".green(),
                    summary.service,
                    summary.task_definition
                );
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Rollback failed: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    // Deploy
    let mut settings = match Settings::from_env(environment) {
        Ok(settings) => settings,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    settings.aws_profile = profile;
    if let Some(region) = region {
        settings.aws_region = region;
    }

    let deployer = MidServerDeployer::new(client, settings);
    match deployer.deploy().await {
        Ok(summary) => {
            println!(
                "{} environment={} cluster={} service={} ({}) task={}",
                "Deployment completed".green(),
                summary.environment,
                summary.cluster,
                summary.service,
                summary.service_action,
                summary.task_definition
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Deployment failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
