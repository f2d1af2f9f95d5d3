//! # dbstack: declarative database composition
//!
//! `dbstack` turns a small configuration record into the declarative description of a managed
//! relational database placed inside an existing virtual network. It does not talk to any
//! cloud API. The result is a resource graph plus a handful of outputs, rendered as a JSON
//! stack document that an external provisioning engine plans and applies.
//!
//! ## What gets emitted
//!
//! For a module named `orders`:
//!
//! - `orders-sg`: an access group in the supplied network that lets the network's IPv4 and IPv6
//!   ranges reach the database port (5432 for PostgreSQL-family engines, 3306 otherwise) and
//!   allows all egress
//! - `orders-subnet-group`: the network's database subnets
//! - either `orders-cluster` with `orders-instance-0..N` attached to it, or a single
//!   `orders-instance`
//!
//! Every database resource uses gp3 storage, has encryption enabled and skips its final
//! snapshot on teardown. All resources share one tag set: module defaults (`Name`, `Service`,
//! `Environment`, `Provisioner`, `CreatedBy`, `CreatedAt`) with caller tags layered on top.
//!
//! The module publishes `endpoint`, `username`, `password` (flagged secret), `securityGroupId`
//! and the endpoint again as `clusterEndpoint` or `instanceEndpoint`.
//!
//! ## Collaborators
//!
//! The network, the caller identity and the clock are injected through the traits in
//! [`providers`], so construction is deterministic and needs no live backend.
//!
//! ## Quick Start
//!
//! ```
//! use chrono::Utc;
//! use dbstack::{
//!     DatabaseModule, DatabaseModuleConfig,
//!     args::ClusterTopology,
//!     providers::{FixedClock, Providers, StaticIdentity, StaticNetwork},
//! };
//!
//! # fn main() -> dbstack::errors::Result<()> {
//! let network = StaticNetwork::builder()
//!     .network_id("vpc-0123456789abcdef0")
//!     .ipv4_cidr("10.0.0.0/16")
//!     .ipv6_cidr("2600:1f18:1234:5600::/56")
//!     .database_subnet_ids(vec!["subnet-a".to_string(), "subnet-b".to_string()])
//!     .build();
//! let providers = Providers::new(network, StaticIdentity::new("ci"), FixedClock::new(Utc::now()));
//!
//! let config = DatabaseModuleConfig::builder()
//!     .username("admin")
//!     .password("change-me")
//!     .backup_window("03:00-04:00")
//!     .maintenance_window("sun:05:00-sun:06:00")
//!     .backup_retention_period(7)
//!     .database_name("orders")
//!     .engine("aurora-postgresql")
//!     .engine_version("15.4")
//!     .topology(ClusterTopology::builder().instance_count(2).build())
//!     .service_name("orders-api")
//!     .environment("production")
//!     .build();
//!
//! let module = DatabaseModule::new("orders", &config, &providers)?;
//! assert_eq!(module.port(), 5432);
//! println!("{}", module.stack().to_json(true)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! The `dbstack` binary reads its input from YAML and the environment; see the [`config`]
//! module.

pub mod args;
pub mod config;
pub mod errors;
pub mod module;
pub mod outputs;
pub mod providers;
pub mod resources;
pub mod stack;
pub mod telemetry;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

#[cfg(test)]
mod test;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

pub use args::{DatabaseModuleConfig, Topology};
pub use config::Config;
pub use module::DatabaseModule;
pub use stack::Stack;

/// Build the module described by a loaded [`Config`]
pub fn synthesize(config: &Config) -> errors::Result<DatabaseModule> {
    let module_config = config.module_config()?;
    DatabaseModule::new(&config.name, &module_config, &config.providers())
}

/// Build the module and write its stack document to `output`, or stdout when `None`.
///
/// Writing over an earlier document keeps that document's `CreatedAt` timestamp unless the
/// configuration pins one.
pub fn emit(config: &Config, output: Option<&Path>) -> errors::Result<()> {
    let mut config = config.clone();
    config.resolve_created_at(output)?;

    let module = synthesize(&config)?;
    let stack = module.stack();

    match output {
        Some(path) => {
            let file = File::create(path)?;
            stack.write_to(BufWriter::new(file), config.pretty)?;
            info!("Wrote {} resources to {}", module.resources().len(), path.display());
        }
        None => stack.write_to(std::io::stdout().lock(), config.pretty)?,
    }

    Ok(())
}
