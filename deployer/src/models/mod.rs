//! Descriptions of remote infrastructure

pub mod infra;
pub mod task;
