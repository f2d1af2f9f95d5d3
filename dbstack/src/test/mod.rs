//! End-to-end scenarios: configuration in, resource graph and outputs out.

use chrono::{TimeZone, Utc};
use rstest::rstest;

use crate::args::{ClusterTopology, DatabaseModuleConfig, ModuleArgs, StandaloneTopology, Topology};
use crate::errors::Error;
use crate::resources::rds::{CLUSTER_INSTANCE_TYPE, CLUSTER_TYPE, INSTANCE_TYPE};
use crate::resources::{ResourceArgs, ResourceGraph};
use crate::test_utils::{mysql_standalone_config, postgres_cluster_config, test_config, test_file_config, test_providers};
use crate::types::Tags;
use crate::DatabaseModule;

fn ingress_port(graph: &ResourceGraph) -> u16 {
    let sg = graph
        .iter()
        .find_map(|r| match &r.properties {
            ResourceArgs::SecurityGroup(args) => Some(args),
            _ => None,
        })
        .expect("security group emitted");
    sg.ingress[0].from_port
}

/// Postgres cluster with three instances
#[test_log::test]
fn test_postgres_cluster_with_three_instances() {
    let module = DatabaseModule::new("orders", &postgres_cluster_config(Some(3)), &test_providers()).unwrap();
    let graph = module.resources();

    assert_eq!(graph.of_type(CLUSTER_TYPE).count(), 1);
    assert_eq!(graph.of_type(CLUSTER_INSTANCE_TYPE).count(), 3);
    assert_eq!(graph.of_type(INSTANCE_TYPE).count(), 0);
    assert_eq!(ingress_port(graph), 5432);
    assert_eq!(module.port(), 5432);

    let endpoint = module.outputs().endpoint.as_reference().unwrap();
    assert_eq!(endpoint.resource, "orders-cluster");
    assert_eq!(endpoint.attribute, "endpoint");
    assert_eq!(module.outputs().get("clusterEndpoint"), Some(&module.outputs().endpoint));
    assert!(module.outputs().get("instanceEndpoint").is_none());
}

/// MySQL standalone instance without an instance count
#[test_log::test]
fn test_mysql_standalone_single_az() {
    let module = DatabaseModule::new("orders", &mysql_standalone_config(None), &test_providers()).unwrap();
    let graph = module.resources();

    assert_eq!(graph.of_type(INSTANCE_TYPE).count(), 1);
    assert_eq!(graph.of_type(CLUSTER_TYPE).count(), 0);
    assert_eq!(graph.of_type(CLUSTER_INSTANCE_TYPE).count(), 0);
    assert_eq!(ingress_port(graph), 3306);

    let ResourceArgs::Instance(instance) = &graph.get("orders-instance").unwrap().properties else {
        panic!("expected standalone instance");
    };
    assert!(!instance.multi_az);
    assert_eq!(instance.instance_class, "db.t3.small");
    assert_eq!(instance.allocated_storage, 20);
    assert_eq!(instance.engine, "mysql-8.0");

    assert_eq!(module.outputs().endpoint.as_reference().unwrap().resource, "orders-instance");
    assert_eq!(module.outputs().get("instanceEndpoint"), Some(&module.outputs().endpoint));
}

/// Standalone without an instance class never reaches the graph
#[test]
fn test_standalone_without_instance_class_emits_nothing() {
    let args: ModuleArgs = serde_json::from_value(serde_json::json!({
        "username": "admin",
        "password": "secret",
        "backup_window": "03:00-04:00",
        "maintenance_window": "sun:05:00-sun:06:00",
        "backup_retention_period": 7,
        "database_name": "orders",
        "engine": "mysql-8.0",
        "engine_version": "8.0.35",
        "is_aurora": false,
        "allocated_storage": 20,
        "service_name": "orders-api",
        "environment": "staging"
    }))
    .unwrap();

    let result = DatabaseModuleConfig::try_from(args).and_then(|config| DatabaseModule::new("orders", &config, &test_providers()));

    assert!(matches!(result, Err(Error::MissingField { field: "instance_class", .. })));
}

#[test]
fn test_cluster_defaults_to_one_instance() {
    let module = DatabaseModule::new("orders", &postgres_cluster_config(None), &test_providers()).unwrap();

    let instances: Vec<_> = module.resources().of_type(CLUSTER_INSTANCE_TYPE).collect();
    assert_eq!(instances.len(), 1);
    let ResourceArgs::ClusterInstance(args) = &instances[0].properties else {
        panic!("expected cluster instance");
    };
    assert_eq!(args.instance_class, "db.t4g.medium");
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(2)]
#[case(7)]
fn test_cluster_instance_count(#[case] count: u32) {
    let module = DatabaseModule::new("orders", &postgres_cluster_config(Some(count)), &test_providers()).unwrap();

    let instances: Vec<_> = module.resources().of_type(CLUSTER_INSTANCE_TYPE).collect();
    assert_eq!(instances.len(), count as usize);

    for instance in instances {
        let ResourceArgs::ClusterInstance(args) = &instance.properties else {
            panic!("expected cluster instance");
        };
        assert_eq!(args.cluster_identifier.resource, "orders-cluster");
        assert_eq!(instance.depends_on[0], "orders-cluster");
    }
}

#[test]
fn test_cluster_instance_class_override() {
    let config = test_config(
        "aurora-postgresql",
        ClusterTopology::builder().instance_class("db.r6g.xlarge").instance_count(2).build(),
    );

    let module = DatabaseModule::new("orders", &config, &test_providers()).unwrap();

    for instance in module.resources().of_type(CLUSTER_INSTANCE_TYPE) {
        let ResourceArgs::ClusterInstance(args) = &instance.properties else {
            panic!("expected cluster instance");
        };
        assert_eq!(args.instance_class, "db.r6g.xlarge");
    }
}

#[rstest]
#[case(None, false)]
#[case(Some(0), false)]
#[case(Some(1), false)]
#[case(Some(2), true)]
#[case(Some(3), true)]
fn test_standalone_multi_az(#[case] count: Option<u32>, #[case] multi_az: bool) {
    let module = DatabaseModule::new("orders", &mysql_standalone_config(count), &test_providers()).unwrap();

    assert_eq!(module.resources().of_type(INSTANCE_TYPE).count(), 1);
    let ResourceArgs::Instance(args) = &module.resources().get("orders-instance").unwrap().properties else {
        panic!("expected standalone instance");
    };
    assert_eq!(args.multi_az, multi_az);
}

#[rstest]
#[case("postgres", 5432)]
#[case("aurora-postgresql", 5432)]
#[case("mysql", 3306)]
#[case("aurora-mysql", 3306)]
#[case("mariadb", 3306)]
fn test_ingress_port_by_engine(#[case] engine: &str, #[case] port: u16) {
    let cluster = test_config(engine, ClusterTopology::default());
    let standalone = test_config(
        engine,
        StandaloneTopology::builder().instance_class("db.t3.small").allocated_storage(20).build(),
    );

    for config in [cluster, standalone] {
        let module = DatabaseModule::new("orders", &config, &test_providers()).unwrap();
        assert_eq!(ingress_port(module.resources()), port);
    }
}

#[rstest]
#[case(Topology::Cluster(ClusterTopology::default()))]
#[case(Topology::Standalone(StandaloneTopology {
    instance_class: "db.t3.small".to_string(),
    allocated_storage: 20,
    instance_count: Some(2),
}))]
fn test_storage_policy_on_every_database_resource(#[case] topology: Topology) {
    let module = DatabaseModule::new("orders", &test_config("postgres", topology), &test_providers()).unwrap();

    let databases: Vec<_> = module.resources().iter().filter(|r| r.properties.is_database()).collect();
    assert_eq!(databases.len(), 1);

    for resource in databases {
        let (storage_type, encrypted, skip_snapshot) = match &resource.properties {
            ResourceArgs::Cluster(args) => (&args.storage_type, args.storage_encrypted, args.skip_final_snapshot),
            ResourceArgs::Instance(args) => (&args.storage_type, args.storage_encrypted, args.skip_final_snapshot),
            other => panic!("unexpected database resource {other:?}"),
        };
        assert_eq!(storage_type, "gp3");
        assert!(encrypted);
        assert!(skip_snapshot);
    }
}

#[test]
fn test_caller_tags_override_defaults() {
    let mut config = postgres_cluster_config(None);
    config.tags = Tags::from([
        ("Environment".to_string(), "prod-eu".to_string()),
        ("CreatedBy".to_string(), "terraform-migration".to_string()),
        ("CostCenter".to_string(), "42".to_string()),
    ]);

    let module = DatabaseModule::new("orders", &config, &test_providers()).unwrap();
    let tags = module.tags();

    // Colliding keys take the caller's value
    assert_eq!(tags["Environment"], "prod-eu");
    assert_eq!(tags["CreatedBy"], "terraform-migration");
    // Everything else survives
    assert_eq!(tags["CostCenter"], "42");
    assert_eq!(tags["Name"], "orders");
    assert_eq!(tags["Service"], "orders-api");
    assert_eq!(tags["Provisioner"], "dbstack");
    assert_eq!(tags["CreatedAt"], "2024-01-15T09:30:00Z");
    assert_eq!(tags.len(), 7);
}

#[test]
fn test_emit_writes_stack_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stack.json");

    let config = test_file_config();
    config.validate().unwrap();

    crate::emit(&config, Some(path.as_path())).unwrap();

    let json = read_document(&path);
    assert_eq!(json["lookups"]["callerIdentity"], "ci");
    assert_eq!(json["resources"].as_array().unwrap().len(), 3);
    assert_eq!(json["resources"][2]["properties"]["multiAz"], true);
    assert_eq!(json["resources"][2]["properties"]["storageType"], "gp3");
    assert_eq!(json["outputs"]["instanceEndpoint"]["value"]["resource"], "orders-instance");
}

fn read_document(path: &std::path::Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn created_at_tags(json: &serde_json::Value) -> Vec<String> {
    json["resources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["properties"]["tags"]["CreatedAt"].as_str().unwrap().to_string())
        .collect()
}

/// Re-emitting without a pinned timestamp keeps the one already on disk
#[test_log::test]
fn test_reemit_keeps_created_at() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stack.json");

    // First run pinned to an old instant, as if emitted long ago
    let mut config = test_file_config();
    config.created_at = Some(Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap());
    crate::emit(&config, Some(path.as_path())).unwrap();
    let first = read_document(&path);

    config.created_at = None;
    crate::emit(&config, Some(path.as_path())).unwrap();
    let second = read_document(&path);

    assert_eq!(second["lookups"]["timestamp"], "2023-06-01T00:00:00Z");
    assert_eq!(created_at_tags(&second), vec!["2023-06-01T00:00:00Z".to_string(); 3]);
    assert_eq!(first, second);
}

/// With nothing recorded, the first document's clock reading sticks for later runs
#[test]
fn test_first_emit_records_timestamp_for_later_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stack.json");

    let mut config = test_file_config();
    config.created_at = None;

    crate::emit(&config, Some(path.as_path())).unwrap();
    let first = read_document(&path);
    crate::emit(&config, Some(path.as_path())).unwrap();
    let second = read_document(&path);

    assert_eq!(first["lookups"]["timestamp"], second["lookups"]["timestamp"]);
    assert_eq!(created_at_tags(&first), created_at_tags(&second));
}

#[test]
fn test_emit_refuses_to_overwrite_foreign_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.md");
    std::fs::write(&path, "# release notes\n").unwrap();

    let mut config = test_file_config();
    config.created_at = None;

    let err = crate::emit(&config, Some(path.as_path())).unwrap_err();

    assert!(matches!(err, Error::Other(_)));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "# release notes\n");
}
