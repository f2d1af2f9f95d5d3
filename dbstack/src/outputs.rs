//! Values published by a module once the provisioning engine has resolved them.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::resources::Reference;

pub const OUTPUT_ENDPOINT: &str = "endpoint";
pub const OUTPUT_USERNAME: &str = "username";
pub const OUTPUT_PASSWORD: &str = "password";
pub const OUTPUT_SECURITY_GROUP_ID: &str = "securityGroupId";
pub const OUTPUT_CLUSTER_ENDPOINT: &str = "clusterEndpoint";
pub const OUTPUT_INSTANCE_ENDPOINT: &str = "instanceEndpoint";

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum OutputValue {
    Literal(String),
    Reference(Reference),
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Output {
    pub value: OutputValue,
    /// Engine should mask this value in its own logs and state
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub secret: bool,
}

impl Output {
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            value: OutputValue::Literal(value.into()),
            secret: false,
        }
    }

    pub fn secret(value: impl Into<String>) -> Self {
        Self {
            value: OutputValue::Literal(value.into()),
            secret: true,
        }
    }

    pub fn reference(reference: Reference) -> Self {
        Self {
            value: OutputValue::Reference(reference),
            secret: false,
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match &self.value {
            OutputValue::Reference(reference) => Some(reference),
            OutputValue::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&str> {
        match &self.value {
            OutputValue::Literal(value) => Some(value),
            OutputValue::Reference(_) => None,
        }
    }
}

/// Endpoint mirrored under a name that says which topology produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyEndpoint {
    Cluster(Output),
    Instance(Output),
}

impl TopologyEndpoint {
    pub fn output_name(&self) -> &'static str {
        match self {
            TopologyEndpoint::Cluster(_) => OUTPUT_CLUSTER_ENDPOINT,
            TopologyEndpoint::Instance(_) => OUTPUT_INSTANCE_ENDPOINT,
        }
    }

    pub fn output(&self) -> &Output {
        match self {
            TopologyEndpoint::Cluster(output) | TopologyEndpoint::Instance(output) => output,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOutputs {
    pub endpoint: Output,
    pub username: Output,
    pub password: Output,
    pub security_group_id: Output,
    pub topology_endpoint: TopologyEndpoint,
}

impl ModuleOutputs {
    /// All outputs as `(name, output)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Output)> {
        [
            (OUTPUT_ENDPOINT, &self.endpoint),
            (OUTPUT_USERNAME, &self.username),
            (OUTPUT_PASSWORD, &self.password),
            (OUTPUT_SECURITY_GROUP_ID, &self.security_group_id),
            (self.topology_endpoint.output_name(), self.topology_endpoint.output()),
        ]
        .into_iter()
    }

    pub fn get(&self, name: &str) -> Option<&Output> {
        self.iter().find(|(n, _)| *n == name).map(|(_, output)| output)
    }
}

impl Serialize for ModuleOutputs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        for (name, output) in self.iter() {
            map.serialize_entry(name, output)?;
        }
        map.end()
    }
}
