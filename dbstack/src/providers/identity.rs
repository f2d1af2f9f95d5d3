//! Caller identity sources.

use super::IdentityProvider;

/// Identity used when the environment gives us nothing
pub const UNKNOWN_IDENTITY: &str = "unknown";

/// Fixed identity, e.g. a role ARN from the config file
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    value: String,
}

impl StaticIdentity {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }
}

impl IdentityProvider for StaticIdentity {
    fn caller_identity(&self) -> String {
        self.value.clone()
    }
}

/// Reads the identity from an environment variable at lookup time
#[derive(Debug, Clone)]
pub struct EnvIdentity {
    var: String,
}

impl EnvIdentity {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl IdentityProvider for EnvIdentity {
    fn caller_identity(&self) -> String {
        match std::env::var(&self.var) {
            Ok(value) if !value.trim().is_empty() => value,
            _ => {
                tracing::warn!("{} is not set, tagging resources with '{}'", self.var, UNKNOWN_IDENTITY);
                UNKNOWN_IDENTITY.to_string()
            }
        }
    }
}
