//! Provisioning pipeline

pub mod mid_server;
pub mod names;
pub mod rollback;
