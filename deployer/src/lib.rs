//! MID Server Deployer Library
//!
//! Core modules for provisioning a ServiceNow MID server on AWS ECS.

pub mod aws;
pub mod config;
pub mod deploy;
pub mod errors;
pub mod logs;
pub mod models;
pub mod utils;
