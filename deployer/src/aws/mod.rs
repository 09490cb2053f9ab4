//! AWS call surface
//!
//! A single generic [`client::ResourceClient`] facade plus thin typed
//! wrappers per service. The orchestrator only ever talks to the
//! facade, so tests can swap in a scripted client.

pub mod client;
pub mod ec2;
pub mod ecs;
pub mod iam;
pub mod ssm;
