//! Configuration management for the `dbstack` binary.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The file path
//! defaults to `dbstack.yaml` and can be changed with `-f` or the `DBSTACK_CONFIG` environment
//! variable.
//!
//! ## Loading Priority
//!
//! 1. **YAML config file** - Base configuration
//! 2. **Environment variables** - Variables prefixed with `DBSTACK_` override YAML values
//!
//! Nested values use double underscores, e.g. `DBSTACK_MODULE__ENGINE_VERSION=16.2` sets
//! `module.engine_version`. Keys are snake_case throughout because environment keys are
//! lowercased before they are matched.
//!
//! ## Provisioning timestamp
//!
//! `created_at` pins the `CreatedAt` tag. When it is unset and the output file already holds
//! a stack document, that document's timestamp is reused, so re-emitting never changes the
//! tag. The wall clock is read only for the first document.
//!
//! ## Example
//!
//! ```yaml
//! name: orders
//! module:
//!   username: admin
//!   password: change-me
//!   backup_window: "03:00-04:00"
//!   maintenance_window: "sun:05:00-sun:06:00"
//!   backup_retention_period: 7
//!   database_name: orders
//!   engine: aurora-postgresql
//!   engine_version: "15.4"
//!   is_aurora: true
//!   number_of_instances: 2
//!   service_name: orders-api
//!   environment: production
//!   tags:
//!     Team: payments
//! network:
//!   network_id: vpc-0123456789abcdef0
//!   ipv4_cidr: 10.0.0.0/16
//!   ipv6_cidr: "2600:1f18:1234:5600::/56"
//!   database_subnet_ids: [subnet-a, subnet-b]
//! identity:
//!   source: static
//!   value: arn:aws:iam::123456789012:role/deployer
//! ```

use chrono::{DateTime, Utc};
use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

use crate::args::{DatabaseModuleConfig, ModuleArgs, string_or_scalar};
use crate::errors::Error;
use crate::providers::{Clock, EnvIdentity, FixedClock, IdentityProvider, Providers, StaticIdentity, StaticNetwork, SystemClock};
use crate::stack;

/// Simple CLI args - config file, output destination, validate-only
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "DBSTACK_CONFIG", default_value = "dbstack.yaml")]
    pub config: String,

    /// Write the stack document here instead of stdout
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Validate configuration and exit without emitting anything
    #[arg(long)]
    pub validate: bool,
}

/// Where the `CreatedBy` tag value comes from
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "source", rename_all = "lowercase", deny_unknown_fields)]
pub enum IdentitySource {
    Static { value: String },
    Env { var: String },
}

impl Default for IdentitySource {
    fn default() -> Self {
        IdentitySource::Env { var: "USER".to_string() }
    }
}

impl IdentitySource {
    fn provider(&self) -> Box<dyn IdentityProvider> {
        match self {
            IdentitySource::Static { value } => Box::new(StaticIdentity::new(value)),
            IdentitySource::Env { var } => Box::new(EnvIdentity::new(var)),
        }
    }
}

fn default_pretty() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Module name; prefixes every resource name
    #[serde(deserialize_with = "string_or_scalar")]
    pub name: String,
    pub module: ModuleArgs,
    /// The externally owned network the database is placed in
    pub network: StaticNetwork,
    #[serde(default)]
    pub identity: IdentitySource,
    /// Pin the `CreatedAt` tag; see [`Config::resolve_created_at`] for the fallback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Pretty-print the stack document
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Config {
    #[allow(clippy::result_large_err)]
    #[instrument(skip(args), fields(path = %args.config))]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("DBSTACK_").ignore(&["CONFIG"]).split("__"))
    }

    /// Typed module configuration; fails if the chosen topology is missing a required field
    pub fn module_config(&self) -> Result<DatabaseModuleConfig, Error> {
        DatabaseModuleConfig::try_from(self.module.clone())
    }

    /// Check the configuration for required fields and obvious mistakes
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidConfig {
                message: "name cannot be empty".to_string(),
            });
        }

        if self.module.engine.trim().is_empty() {
            return Err(Error::InvalidConfig {
                message: "module.engine cannot be empty".to_string(),
            });
        }

        if self.network.database_subnet_ids.is_empty() {
            return Err(Error::InvalidConfig {
                message: "network.database_subnet_ids must list at least one subnet".to_string(),
            });
        }

        self.module_config()?;
        Ok(())
    }

    /// Settle `created_at` before emitting to `output`.
    ///
    /// A configured value wins. Otherwise the timestamp recorded in the document already at
    /// `output` is adopted. With neither, the clock is read at synthesis and the resulting
    /// document records it for next time; on stdout nothing is recorded, so that is warned about.
    pub fn resolve_created_at(&mut self, output: Option<&Path>) -> Result<(), Error> {
        if self.created_at.is_some() {
            return Ok(());
        }

        match output {
            Some(path) => {
                self.created_at = stack::recorded_timestamp(path)?;
                if let Some(at) = self.created_at {
                    debug!(%at, path = %path.display(), "Reusing recorded provisioning timestamp");
                }
            }
            None => warn!("created_at is not set and nothing is recorded on stdout; CreatedAt will change on every run"),
        }
        Ok(())
    }

    /// Collaborators for module construction, built from this configuration
    pub fn providers(&self) -> Providers {
        let clock: Box<dyn Clock> = match self.created_at {
            Some(at) => Box::new(FixedClock::new(at)),
            None => Box::new(SystemClock),
        };
        Providers {
            network: Box::new(self.network.clone()),
            identity: self.identity.provider(),
            clock,
        }
    }
}
