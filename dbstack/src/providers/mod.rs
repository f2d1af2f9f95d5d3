//! Capability interfaces for everything the module reads from outside.
//!
//! The module never looks anything up itself. Network details, the caller identity and the
//! provisioning timestamp are handed in through the [`NetworkInfo`], [`IdentityProvider`] and
//! [`Clock`] traits, bundled together as [`Providers`]. Static implementations make module
//! construction deterministic in tests.

use chrono::{DateTime, Utc};

pub mod clock;
pub mod identity;
pub mod network;

pub use clock::{FixedClock, SystemClock};
pub use identity::{EnvIdentity, StaticIdentity};
pub use network::StaticNetwork;

/// Read-only view of an externally owned virtual network
pub trait NetworkInfo: Send + Sync {
    /// Identifier of the network the access group is scoped to
    fn network_id(&self) -> &str;

    /// IPv4 range allowed to reach the database
    fn ipv4_cidr(&self) -> &str;

    /// IPv6 range allowed to reach the database
    fn ipv6_cidr(&self) -> &str;

    /// Subnets designated for database placement
    fn database_subnet_ids(&self) -> &[String];
}

/// Resolves the principal the stack is being synthesized for
pub trait IdentityProvider: Send + Sync {
    fn caller_identity(&self) -> String;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The set of collaborators a module is built against
pub struct Providers {
    pub network: Box<dyn NetworkInfo>,
    pub identity: Box<dyn IdentityProvider>,
    pub clock: Box<dyn Clock>,
}

impl Providers {
    pub fn new(
        network: impl NetworkInfo + 'static,
        identity: impl IdentityProvider + 'static,
        clock: impl Clock + 'static,
    ) -> Self {
        Self {
            network: Box::new(network),
            identity: Box::new(identity),
            clock: Box::new(clock),
        }
    }

    /// Timestamp token used for the `CreatedAt` tag, RFC 3339 at second precision
    pub fn timestamp_token(&self) -> String {
        self.clock.now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    }
}
