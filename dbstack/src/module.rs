//! The database module: one pass from configuration to resource graph.
//!
//! Resources are emitted in a fixed order:
//!
//! 1. the access group, opening the engine's port to the network's address ranges
//! 2. the subnet grouping over the network's database subnets
//! 3. either a cluster followed by its instances, or a single standalone instance
//!
//! Everything is tagged with the same merged tag set. Ambient lookups (caller identity and the
//! provisioning timestamp) are resolved once, up front, through the injected [`Providers`].

use serde::Serialize;
use tracing::{info, instrument};

use crate::args::{ClusterTopology, DatabaseModuleConfig, StandaloneTopology, Topology};
use crate::errors::Result;
use crate::outputs::{ModuleOutputs, Output, TopologyEndpoint};
use crate::providers::Providers;
use crate::resources::network::{SecurityGroupArgs, SecurityGroupRule, SubnetGroupArgs};
use crate::resources::rds::{ClusterArgs, ClusterInstanceArgs, InstanceArgs};
use crate::resources::{ATTR_NAME, ResourceGraph, ResourceHandle};
use crate::stack::Stack;
use crate::types::{
    EngineFamily, PROVISIONER, TAG_CREATED_AT, TAG_CREATED_BY, TAG_ENVIRONMENT, TAG_NAME, TAG_PROVISIONER, TAG_SERVICE, Tags,
    merge_tags,
};

/// Values resolved from the environment before any resource is emitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lookups {
    pub caller_identity: String,
    pub timestamp: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseModule {
    name: String,
    lookups: Lookups,
    tags: Tags,
    port: u16,
    graph: ResourceGraph,
    outputs: ModuleOutputs,
}

/// Handles shared by every database resource
struct Placement {
    security_group: ResourceHandle,
    subnet_group: ResourceHandle,
}

impl DatabaseModule {
    /// Build the module's resource graph and outputs.
    ///
    /// Nothing is provisioned here. The only failures are graph wiring errors, which cannot
    /// occur for names derived from a single module name.
    #[instrument(skip(name, config, providers), fields(module = tracing::field::Empty, engine = %config.engine, topology = config.topology.name()))]
    pub fn new(name: impl Into<String>, config: &DatabaseModuleConfig, providers: &Providers) -> Result<Self> {
        let name = name.into();
        tracing::Span::current().record("module", name.as_str());

        let lookups = Lookups {
            caller_identity: providers.identity.caller_identity(),
            timestamp: providers.timestamp_token(),
        };
        let tags = merge_tags(default_tags(&name, config, &lookups), &config.tags);
        let port = EngineFamily::from_engine(&config.engine).port();

        let mut graph = ResourceGraph::new();
        let network = providers.network.as_ref();

        let security_group = graph.add(
            format!("{name}-sg"),
            SecurityGroupArgs::builder()
                .vpc_id(network.network_id())
                .description(format!("Database access for {name}"))
                .ingress(vec![SecurityGroupRule::tcp_ingress(port, network.ipv4_cidr(), network.ipv6_cidr())])
                .egress(vec![SecurityGroupRule::allow_all_egress()])
                .tags(tags.clone())
                .build(),
        )?;

        let subnet_group = graph.add(
            format!("{name}-subnet-group"),
            SubnetGroupArgs::builder()
                .subnet_ids(network.database_subnet_ids().to_vec())
                .description(format!("Database subnets for {name}"))
                .tags(tags.clone())
                .build(),
        )?;

        let placement = Placement {
            security_group,
            subnet_group,
        };

        let topology_endpoint = match &config.topology {
            Topology::Cluster(cluster) => {
                let handle = emit_cluster(&mut graph, &name, config, cluster, &placement, &tags)?;
                TopologyEndpoint::Cluster(Output::reference(handle.endpoint()))
            }
            Topology::Standalone(standalone) => {
                let handle = emit_standalone(&mut graph, &name, config, standalone, &placement, &tags)?;
                TopologyEndpoint::Instance(Output::reference(handle.endpoint()))
            }
        };

        let outputs = ModuleOutputs {
            endpoint: topology_endpoint.output().clone(),
            username: Output::literal(&config.username),
            password: Output::secret(config.password.expose()),
            security_group_id: Output::reference(placement.security_group.id()),
            topology_endpoint,
        };

        info!(port, resources = graph.len(), "Database module {} synthesized", name);

        Ok(Self {
            name,
            lookups,
            tags,
            port,
            graph,
            outputs,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lookups(&self) -> &Lookups {
        &self.lookups
    }

    /// Merged tag set applied to every resource
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Port opened by the access group
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn resources(&self) -> &ResourceGraph {
        &self.graph
    }

    pub fn outputs(&self) -> &ModuleOutputs {
        &self.outputs
    }

    /// Document handed to the provisioning engine
    pub fn stack(&self) -> Stack<'_> {
        Stack::new(&self.name, &self.lookups, &self.graph, &self.outputs)
    }
}

fn default_tags(name: &str, config: &DatabaseModuleConfig, lookups: &Lookups) -> Tags {
    Tags::from([
        (TAG_NAME.to_string(), name.to_string()),
        (TAG_SERVICE.to_string(), config.service_name.clone()),
        (TAG_ENVIRONMENT.to_string(), config.environment.clone()),
        (TAG_PROVISIONER.to_string(), PROVISIONER.to_string()),
        (TAG_CREATED_BY.to_string(), lookups.caller_identity.clone()),
        (TAG_CREATED_AT.to_string(), lookups.timestamp.clone()),
    ])
}

fn emit_cluster(
    graph: &mut ResourceGraph,
    name: &str,
    config: &DatabaseModuleConfig,
    cluster: &ClusterTopology,
    placement: &Placement,
    tags: &Tags,
) -> Result<ResourceHandle> {
    let cluster_name = format!("{name}-cluster");
    let handle = graph.add(
        cluster_name.clone(),
        ClusterArgs::builder()
            .cluster_identifier(cluster_name)
            .engine(&config.engine)
            .engine_version(&config.engine_version)
            .database_name(&config.database_name)
            .master_username(&config.username)
            .master_password(config.password.clone())
            .backup_retention_period(config.backup_retention_period)
            .preferred_backup_window(&config.backup_window)
            .preferred_maintenance_window(&config.maintenance_window)
            .maybe_allocated_storage(cluster.allocated_storage)
            .db_subnet_group_name(placement.subnet_group.attr(ATTR_NAME))
            .vpc_security_group_ids(vec![placement.security_group.id()])
            .tags(tags.clone())
            .build(),
    )?;

    for i in 0..cluster.instance_count() {
        let instance_name = format!("{name}-instance-{i}");
        graph.add(
            instance_name.clone(),
            ClusterInstanceArgs::builder()
                .identifier(instance_name)
                .cluster_identifier(handle.id())
                .instance_class(cluster.instance_class())
                .engine(&config.engine)
                .engine_version(&config.engine_version)
                .db_subnet_group_name(placement.subnet_group.attr(ATTR_NAME))
                .tags(tags.clone())
                .build(),
        )?;
    }

    Ok(handle)
}

fn emit_standalone(
    graph: &mut ResourceGraph,
    name: &str,
    config: &DatabaseModuleConfig,
    standalone: &StandaloneTopology,
    placement: &Placement,
    tags: &Tags,
) -> Result<ResourceHandle> {
    let instance_name = format!("{name}-instance");
    graph.add(
        instance_name.clone(),
        InstanceArgs::builder()
            .identifier(instance_name)
            .engine(&config.engine)
            .engine_version(&config.engine_version)
            .instance_class(&standalone.instance_class)
            .allocated_storage(standalone.allocated_storage)
            .db_name(&config.database_name)
            .username(&config.username)
            .password(config.password.clone())
            .backup_retention_period(config.backup_retention_period)
            .backup_window(&config.backup_window)
            .maintenance_window(&config.maintenance_window)
            .multi_az(standalone.multi_az())
            .db_subnet_group_name(placement.subnet_group.attr(ATTR_NAME))
            .vpc_security_group_ids(vec![placement.security_group.id()])
            .tags(tags.clone())
            .build(),
    )
}
