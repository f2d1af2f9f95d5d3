//! Module configuration.
//!
//! [`DatabaseModuleConfig`] is the typed input to [`crate::DatabaseModule::new`]. The database
//! topology is a tagged union, so the fields that only one topology needs can be required
//! where they must be: a standalone instance cannot be described without an instance class
//! and a storage size, and the builder will not compile without them.
//!
//! [`ModuleArgs`] is the flat form used in config files, with an `is_aurora` flag choosing
//! the topology. Converting it with `TryFrom` is where a missing standalone field is
//! reported.

use bon::Builder;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::errors::Error;
use crate::types::{DEFAULT_INSTANCE_CLASS, Password, Tags};

const CLUSTER_TOPOLOGY: &str = "cluster";
const STANDALONE_TOPOLOGY: &str = "standalone";

/// Cluster with attached compute instances sharing storage
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterTopology {
    /// Class for every attached instance; defaults to `db.t4g.medium`
    #[builder(into)]
    pub instance_class: Option<String>,
    /// Number of attached instances; defaults to 1
    pub instance_count: Option<u32>,
    pub allocated_storage: Option<u32>,
}

impl ClusterTopology {
    pub fn instance_class(&self) -> &str {
        self.instance_class.as_deref().unwrap_or(DEFAULT_INSTANCE_CLASS)
    }

    pub fn instance_count(&self) -> u32 {
        self.instance_count.unwrap_or(1)
    }
}

/// Single instance with its own storage
#[derive(Debug, Clone, PartialEq, Eq, Builder, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandaloneTopology {
    #[builder(into)]
    pub instance_class: String,
    pub allocated_storage: u32,
    /// More than one requests a multi-AZ deployment
    pub instance_count: Option<u32>,
}

impl StandaloneTopology {
    pub fn multi_az(&self) -> bool {
        self.instance_count.is_some_and(|n| n > 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Topology {
    Cluster(ClusterTopology),
    Standalone(StandaloneTopology),
}

impl Topology {
    pub fn name(&self) -> &'static str {
        match self {
            Topology::Cluster(_) => CLUSTER_TOPOLOGY,
            Topology::Standalone(_) => STANDALONE_TOPOLOGY,
        }
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self, Topology::Cluster(_))
    }
}

impl From<ClusterTopology> for Topology {
    fn from(topology: ClusterTopology) -> Self {
        Topology::Cluster(topology)
    }
}

impl From<StandaloneTopology> for Topology {
    fn from(topology: StandaloneTopology) -> Self {
        Topology::Standalone(topology)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct DatabaseModuleConfig {
    #[builder(into)]
    pub username: String,
    #[builder(into)]
    pub password: Password,
    /// Daily backup window, e.g. `03:00-04:00`
    #[builder(into)]
    pub backup_window: String,
    /// Weekly maintenance window, e.g. `sun:05:00-sun:06:00`
    #[builder(into)]
    pub maintenance_window: String,
    /// Days to keep automated backups
    pub backup_retention_period: u32,
    #[builder(into)]
    pub database_name: String,
    /// Engine identifier, e.g. `aurora-postgresql` or `mysql`
    #[builder(into)]
    pub engine: String,
    #[builder(into)]
    pub engine_version: String,
    #[builder(into)]
    pub topology: Topology,
    #[builder(into)]
    pub service_name: String,
    #[builder(into)]
    pub environment: String,
    /// Extra tags; these win over the module's defaults
    #[builder(default)]
    pub tags: Tags,
}

/// Flat module arguments as they appear in a config file.
///
/// Keys are snake_case so every field can be overridden from the environment. Text fields
/// accept any scalar: `DBSTACK_MODULE__ENGINE_VERSION=16.2` arrives as a number and is kept
/// as `"16.2"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleArgs {
    #[serde(deserialize_with = "string_or_scalar")]
    pub username: String,
    #[serde(deserialize_with = "password_or_scalar")]
    pub password: Password,
    #[serde(deserialize_with = "string_or_scalar")]
    pub backup_window: String,
    #[serde(deserialize_with = "string_or_scalar")]
    pub maintenance_window: String,
    pub backup_retention_period: u32,
    #[serde(deserialize_with = "string_or_scalar")]
    pub database_name: String,
    #[serde(deserialize_with = "string_or_scalar")]
    pub engine: String,
    #[serde(deserialize_with = "string_or_scalar")]
    pub engine_version: String,
    #[serde(
        default,
        deserialize_with = "optional_string_or_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub instance_class: Option<String>,
    pub is_aurora: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_instances: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocated_storage: Option<u32>,
    #[serde(deserialize_with = "string_or_scalar")]
    pub service_name: String,
    #[serde(deserialize_with = "string_or_scalar")]
    pub environment: String,
    #[serde(default, deserialize_with = "tags_or_scalars")]
    pub tags: Tags,
}

/// Deserialize a string from any scalar, keeping the scalar's text form.
///
/// Environment values are parsed before they reach serde, so an all-digit password or a
/// dotted version number shows up as a number. Leading zeros and trailing fractional zeros
/// are lost in that parse; quote the value (`'"15.10"'`) to keep them.
pub(crate) fn string_or_scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(ScalarText)
}

fn optional_string_or_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|s| s.0))
}

fn password_or_scalar<'de, D>(deserializer: D) -> Result<Password, D::Error>
where
    D: Deserializer<'de>,
{
    string_or_scalar(deserializer).map(Password::from)
}

fn tags_or_scalars<'de, D>(deserializer: D) -> Result<Tags, D::Error>
where
    D: Deserializer<'de>,
{
    let tags = BTreeMap::<String, Scalar>::deserialize(deserializer)?;
    Ok(tags.into_iter().map(|(k, v)| (k, v.0)).collect())
}

#[derive(Deserialize)]
struct Scalar(#[serde(deserialize_with = "string_or_scalar")] String);

struct ScalarText;

impl Visitor<'_> for ScalarText {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string, number or boolean")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_char<E: de::Error>(self, v: char) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<String, E> {
        Ok(v.to_string())
    }

    // Formatted at its own width; widening to f64 first would print 16.200000762939453
    fn visit_f32<E: de::Error>(self, v: f32) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(v.to_string())
    }
}

impl TryFrom<ModuleArgs> for DatabaseModuleConfig {
    type Error = Error;

    fn try_from(args: ModuleArgs) -> Result<Self, Self::Error> {
        let topology = if args.is_aurora {
            Topology::Cluster(ClusterTopology {
                instance_class: args.instance_class,
                instance_count: args.number_of_instances,
                allocated_storage: args.allocated_storage,
            })
        } else {
            let instance_class = args.instance_class.ok_or(Error::MissingField {
                topology: STANDALONE_TOPOLOGY,
                field: "instance_class",
            })?;
            let allocated_storage = args.allocated_storage.ok_or(Error::MissingField {
                topology: STANDALONE_TOPOLOGY,
                field: "allocated_storage",
            })?;
            Topology::Standalone(StandaloneTopology {
                instance_class,
                allocated_storage,
                instance_count: args.number_of_instances,
            })
        };

        Ok(DatabaseModuleConfig {
            username: args.username,
            password: args.password,
            backup_window: args.backup_window,
            maintenance_window: args.maintenance_window,
            backup_retention_period: args.backup_retention_period,
            database_name: args.database_name,
            engine: args.engine,
            engine_version: args.engine_version,
            topology,
            service_name: args.service_name,
            environment: args.environment,
            tags: args.tags,
        })
    }
}
