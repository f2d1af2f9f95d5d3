//! Fixtures shared by unit and scenario tests.

use chrono::{TimeZone, Utc};

use crate::Config;
use crate::args::{ClusterTopology, DatabaseModuleConfig, StandaloneTopology, Topology};
use crate::providers::{FixedClock, Providers, StaticIdentity, StaticNetwork};

pub fn test_network() -> StaticNetwork {
    StaticNetwork::builder()
        .network_id("vpc-0123456789abcdef0")
        .ipv4_cidr("10.0.0.0/16")
        .ipv6_cidr("2600:1f18:1234:5600::/56")
        .database_subnet_ids(vec![
            "subnet-db-a".to_string(),
            "subnet-db-b".to_string(),
            "subnet-db-c".to_string(),
        ])
        .build()
}

/// Deterministic providers: fixed network, identity and clock
pub fn test_providers() -> Providers {
    Providers::new(
        test_network(),
        StaticIdentity::new("arn:aws:iam::123456789012:role/deployer"),
        FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap()),
    )
}

pub fn test_config(engine: &str, topology: impl Into<Topology>) -> DatabaseModuleConfig {
    DatabaseModuleConfig::builder()
        .username("admin")
        .password("correct-horse-battery-staple")
        .backup_window("03:00-04:00")
        .maintenance_window("sun:05:00-sun:06:00")
        .backup_retention_period(7)
        .database_name("orders")
        .engine(engine)
        .engine_version("14.9")
        .topology(topology)
        .service_name("orders-api")
        .environment("staging")
        .build()
}

pub fn postgres_cluster_config(instance_count: Option<u32>) -> DatabaseModuleConfig {
    test_config(
        "postgres-14",
        ClusterTopology::builder().maybe_instance_count(instance_count).build(),
    )
}

pub fn mysql_standalone_config(instance_count: Option<u32>) -> DatabaseModuleConfig {
    let mut config = test_config(
        "mysql-8.0",
        StandaloneTopology::builder()
            .instance_class("db.t3.small")
            .allocated_storage(20)
            .maybe_instance_count(instance_count)
            .build(),
    );
    config.engine_version = "8.0.35".to_string();
    config
}

/// Loaded-config equivalent of a two-instance MySQL standalone, pinned to the fixture clock
pub fn test_file_config() -> Config {
    serde_json::from_value(serde_json::json!({
        "name": "orders",
        "module": {
            "username": "admin",
            "password": "secret",
            "backup_window": "03:00-04:00",
            "maintenance_window": "sun:05:00-sun:06:00",
            "backup_retention_period": 7,
            "database_name": "orders",
            "engine": "mysql",
            "engine_version": "8.0.35",
            "is_aurora": false,
            "instance_class": "db.t3.small",
            "allocated_storage": 20,
            "number_of_instances": 2,
            "service_name": "orders-api",
            "environment": "staging"
        },
        "network": {
            "network_id": "vpc-1",
            "ipv4_cidr": "10.0.0.0/16",
            "ipv6_cidr": "2600:1f18::/56",
            "database_subnet_ids": ["subnet-a"]
        },
        "identity": { "source": "static", "value": "ci" },
        "created_at": "2024-01-15T09:30:00Z"
    }))
    .expect("fixture config is valid")
}
