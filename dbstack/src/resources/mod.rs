//! Declarative resource graph handed to the provisioning engine.
//!
//! Resources are recorded in emission order. Each one carries a logical name, the provider's
//! type token, its typed input properties and the list of resources it depends on. Dependencies
//! are never declared by hand: they are derived from the [`Reference`]s found in a resource's
//! properties, so a resource can only depend on something that was emitted before it.
//!
//! ```
//! use dbstack::resources::{ResourceGraph, network::SubnetGroupArgs};
//!
//! # fn main() -> dbstack::errors::Result<()> {
//! let mut graph = ResourceGraph::new();
//! let group = graph.add(
//!     "orders-subnet-group",
//!     SubnetGroupArgs::builder()
//!         .subnet_ids(vec!["subnet-a".to_string()])
//!         .build(),
//! )?;
//! assert_eq!(group.id().resource, "orders-subnet-group");
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{Error, Result};

pub mod network;
pub mod rds;

use network::{SecurityGroupArgs, SubnetGroupArgs};
use rds::{ClusterArgs, ClusterInstanceArgs, InstanceArgs};

// Attribute names resolved by the provisioning engine
pub const ATTR_ID: &str = "id";
pub const ATTR_NAME: &str = "name";
pub const ATTR_ENDPOINT: &str = "endpoint";

/// Late-bound attribute of another resource in the same graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub resource: String,
    pub attribute: String,
}

impl Reference {
    pub fn new(resource: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            attribute: attribute.into(),
        }
    }
}

/// Returned by [`ResourceGraph::add`] for wiring later resources to this one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandle {
    name: String,
}

impl ResourceHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, attribute: &str) -> Reference {
        Reference::new(&self.name, attribute)
    }

    pub fn id(&self) -> Reference {
        self.attr(ATTR_ID)
    }

    pub fn endpoint(&self) -> Reference {
        self.attr(ATTR_ENDPOINT)
    }
}

/// Input properties for every resource type this crate knows how to emit
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResourceArgs {
    SecurityGroup(SecurityGroupArgs),
    SubnetGroup(SubnetGroupArgs),
    Cluster(ClusterArgs),
    ClusterInstance(ClusterInstanceArgs),
    Instance(InstanceArgs),
}

impl ResourceArgs {
    pub fn type_token(&self) -> &'static str {
        match self {
            ResourceArgs::SecurityGroup(_) => network::SECURITY_GROUP_TYPE,
            ResourceArgs::SubnetGroup(_) => network::SUBNET_GROUP_TYPE,
            ResourceArgs::Cluster(_) => rds::CLUSTER_TYPE,
            ResourceArgs::ClusterInstance(_) => rds::CLUSTER_INSTANCE_TYPE,
            ResourceArgs::Instance(_) => rds::INSTANCE_TYPE,
        }
    }

    /// All references held by these properties, in field order
    pub fn references(&self) -> Vec<&Reference> {
        match self {
            ResourceArgs::SecurityGroup(_) | ResourceArgs::SubnetGroup(_) => Vec::new(),
            ResourceArgs::Cluster(args) => {
                let mut refs = vec![&args.db_subnet_group_name];
                refs.extend(args.vpc_security_group_ids.iter());
                refs
            }
            ResourceArgs::ClusterInstance(args) => vec![&args.cluster_identifier, &args.db_subnet_group_name],
            ResourceArgs::Instance(args) => {
                let mut refs = vec![&args.db_subnet_group_name];
                refs.extend(args.vpc_security_group_ids.iter());
                refs
            }
        }
    }

    /// Whether this resource owns database storage
    pub fn is_database(&self) -> bool {
        matches!(self, ResourceArgs::Cluster(_) | ResourceArgs::Instance(_))
    }
}

macro_rules! impl_from_args {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ResourceArgs {
                fn from(args: $ty) -> Self {
                    ResourceArgs::$variant(args)
                }
            }
        )*
    };
}

impl_from_args! {
    SecurityGroup => SecurityGroupArgs,
    SubnetGroup => SubnetGroupArgs,
    Cluster => ClusterArgs,
    ClusterInstance => ClusterInstanceArgs,
    Instance => InstanceArgs,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub name: String,
    #[serde(rename = "type")]
    pub type_token: &'static str,
    pub properties: ResourceArgs,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResourceGraph {
    resources: Vec<Resource>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resource.
    ///
    /// Fails if the name is taken or if any reference in `args` points at a resource that has
    /// not been added yet.
    pub fn add(&mut self, name: impl Into<String>, args: impl Into<ResourceArgs>) -> Result<ResourceHandle> {
        let name = name.into();
        let properties = args.into();

        if self.get(&name).is_some() {
            return Err(Error::DuplicateResource { name });
        }

        let mut depends_on: Vec<String> = Vec::new();
        for reference in properties.references() {
            if self.get(&reference.resource).is_none() {
                return Err(Error::UnknownReference {
                    resource: name,
                    reference: reference.resource.clone(),
                });
            }
            if !depends_on.contains(&reference.resource) {
                depends_on.push(reference.resource.clone());
            }
        }

        debug!(resource = %name, type_token = properties.type_token(), ?depends_on, "Adding resource");

        self.resources.push(Resource {
            name: name.clone(),
            type_token: properties.type_token(),
            properties,
            depends_on,
        });

        Ok(ResourceHandle { name })
    }

    pub fn get(&self, name: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.name == name)
    }

    pub fn of_type<'a>(&'a self, type_token: &'a str) -> impl Iterator<Item = &'a Resource> + 'a {
        self.resources.iter().filter(move |r| r.type_token == type_token)
    }

    pub fn dependencies_of(&self, name: &str) -> Option<&[String]> {
        self.get(name).map(|r| r.depends_on.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
