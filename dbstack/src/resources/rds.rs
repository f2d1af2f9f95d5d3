//! Database resources: clusters, the instances attached to them, and standalone instances.
//!
//! Storage type, encryption and final-snapshot behaviour are fixed by [`crate::types`] and are
//! filled in by the builders; callers cannot override them.

use bon::Builder;
use serde::Serialize;

use super::Reference;
use crate::types::{Password, SKIP_FINAL_SNAPSHOT, STORAGE_ENCRYPTED, STORAGE_TYPE, Tags};

pub const CLUSTER_TYPE: &str = "aws:rds/cluster:Cluster";
pub const CLUSTER_INSTANCE_TYPE: &str = "aws:rds/clusterInstance:ClusterInstance";
pub const INSTANCE_TYPE: &str = "aws:rds/instance:Instance";

fn storage_type() -> String {
    STORAGE_TYPE.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterArgs {
    #[builder(into)]
    pub cluster_identifier: String,
    #[builder(into)]
    pub engine: String,
    #[builder(into)]
    pub engine_version: String,
    #[builder(into)]
    pub database_name: String,
    #[builder(into)]
    pub master_username: String,
    #[builder(into)]
    pub master_password: Password,
    pub backup_retention_period: u32,
    #[builder(into)]
    pub preferred_backup_window: String,
    #[builder(into)]
    pub preferred_maintenance_window: String,
    #[builder(skip = STORAGE_ENCRYPTED)]
    pub storage_encrypted: bool,
    #[builder(skip = storage_type())]
    pub storage_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocated_storage: Option<u32>,
    #[builder(skip = SKIP_FINAL_SNAPSHOT)]
    pub skip_final_snapshot: bool,
    pub db_subnet_group_name: Reference,
    pub vpc_security_group_ids: Vec<Reference>,
    #[builder(default)]
    pub tags: Tags,
}

/// Compute node attached to a cluster; storage belongs to the cluster
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterInstanceArgs {
    #[builder(into)]
    pub identifier: String,
    pub cluster_identifier: Reference,
    #[builder(into)]
    pub instance_class: String,
    #[builder(into)]
    pub engine: String,
    #[builder(into)]
    pub engine_version: String,
    pub db_subnet_group_name: Reference,
    #[builder(default)]
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceArgs {
    #[builder(into)]
    pub identifier: String,
    #[builder(into)]
    pub engine: String,
    #[builder(into)]
    pub engine_version: String,
    #[builder(into)]
    pub instance_class: String,
    pub allocated_storage: u32,
    #[builder(skip = storage_type())]
    pub storage_type: String,
    #[builder(skip = STORAGE_ENCRYPTED)]
    pub storage_encrypted: bool,
    #[builder(into)]
    pub db_name: String,
    #[builder(into)]
    pub username: String,
    #[builder(into)]
    pub password: Password,
    pub backup_retention_period: u32,
    #[builder(into)]
    pub backup_window: String,
    #[builder(into)]
    pub maintenance_window: String,
    pub multi_az: bool,
    #[builder(skip = SKIP_FINAL_SNAPSHOT)]
    pub skip_final_snapshot: bool,
    pub db_subnet_group_name: Reference,
    pub vpc_security_group_ids: Vec<Reference>,
    #[builder(default)]
    pub tags: Tags,
}
