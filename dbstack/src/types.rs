//! Common type definitions shared by the module and the resource graph.
//!
//! # Engine family
//!
//! [`EngineFamily`] decides which port the access group opens. Classification is a plain
//! substring test on the engine identifier: anything containing `postgres` is PostgreSQL,
//! everything else is treated as MySQL.
//!
//! # Tags
//!
//! [`Tags`] is an ordered map so rendered stack documents are stable between runs.
//! [`merge_tags`] layers caller tags over module defaults.
//!
//! # Storage policy
//!
//! Every database resource gets [`STORAGE_TYPE`], [`STORAGE_ENCRYPTED`] and
//! [`SKIP_FINAL_SNAPSHOT`]. These are not configurable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Resource tags, keyed by tag name
pub type Tags = BTreeMap<String, String>;

/// Instance class used for cluster members when none is configured
pub const DEFAULT_INSTANCE_CLASS: &str = "db.t4g.medium";
/// Storage class applied to every database resource
pub const STORAGE_TYPE: &str = "gp3";
pub const STORAGE_ENCRYPTED: bool = true;
/// Final snapshots are skipped on teardown; data is lost when the stack is destroyed
pub const SKIP_FINAL_SNAPSHOT: bool = true;
/// Value of the `Provisioner` tag on everything this crate emits
pub const PROVISIONER: &str = "dbstack";

pub const POSTGRES_PORT: u16 = 5432;
pub const MYSQL_PORT: u16 = 3306;

// Default tag keys
pub const TAG_NAME: &str = "Name";
pub const TAG_SERVICE: &str = "Service";
pub const TAG_ENVIRONMENT: &str = "Environment";
pub const TAG_PROVISIONER: &str = "Provisioner";
pub const TAG_CREATED_BY: &str = "CreatedBy";
pub const TAG_CREATED_AT: &str = "CreatedAt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineFamily {
    Postgres,
    MySql,
}

impl EngineFamily {
    /// Classify an engine identifier such as `aurora-postgresql` or `mysql`.
    ///
    /// Any third engine family lands in [`EngineFamily::MySql`].
    pub fn from_engine(engine: &str) -> Self {
        if engine.contains("postgres") {
            EngineFamily::Postgres
        } else {
            EngineFamily::MySql
        }
    }

    pub fn port(self) -> u16 {
        match self {
            EngineFamily::Postgres => POSTGRES_PORT,
            EngineFamily::MySql => MYSQL_PORT,
        }
    }
}

impl fmt::Display for EngineFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineFamily::Postgres => write!(f, "postgres"),
            EngineFamily::MySql => write!(f, "mysql"),
        }
    }
}

/// Merge caller tags over defaults. Caller values win on key collisions.
pub fn merge_tags(defaults: Tags, overrides: &Tags) -> Tags {
    let mut merged = defaults;
    merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Master password. Serializes as the plain value; only `Debug` is redacted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<String> for Password {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Password {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"********\"")
    }
}
