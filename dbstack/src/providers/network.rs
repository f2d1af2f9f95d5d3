use bon::Builder;
use serde::{Deserialize, Serialize};

use super::NetworkInfo;

/// Network descriptor supplied as plain data, typically from the config file.
///
/// Keys are snake_case so they line up with `DBSTACK_NETWORK__*` environment overrides.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StaticNetwork {
    #[builder(into)]
    pub network_id: String,
    #[builder(into)]
    pub ipv4_cidr: String,
    #[builder(into)]
    pub ipv6_cidr: String,
    pub database_subnet_ids: Vec<String>,
}

impl NetworkInfo for StaticNetwork {
    fn network_id(&self) -> &str {
        &self.network_id
    }

    fn ipv4_cidr(&self) -> &str {
        &self.ipv4_cidr
    }

    fn ipv6_cidr(&self) -> &str {
        &self.ipv6_cidr
    }

    fn database_subnet_ids(&self) -> &[String] {
        &self.database_subnet_ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize() {
        let network: StaticNetwork = serde_json::from_value(serde_json::json!({
            "network_id": "vpc-0abc",
            "ipv4_cidr": "10.10.0.0/16",
            "ipv6_cidr": "2600:1f18:abcd::/56",
            "database_subnet_ids": ["subnet-1", "subnet-2"]
        }))
        .unwrap();

        assert_eq!(network.network_id(), "vpc-0abc");
        assert_eq!(network.ipv4_cidr(), "10.10.0.0/16");
        assert_eq!(network.ipv6_cidr(), "2600:1f18:abcd::/56");
        assert_eq!(network.database_subnet_ids(), ["subnet-1", "subnet-2"]);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<StaticNetwork, _> = serde_json::from_value(serde_json::json!({
            "network_id": "vpc-0abc",
            "ipv4_cidr": "10.10.0.0/16",
            "ipv6_cidr": "::/0",
            "database_subnet_ids": [],
            "public_subnet_ids": ["subnet-9"]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_camel_case_keys_rejected() {
        let result: Result<StaticNetwork, _> = serde_json::from_value(serde_json::json!({
            "networkId": "vpc-0abc",
            "ipv4_cidr": "10.10.0.0/16",
            "ipv6_cidr": "::/0",
            "database_subnet_ids": ["subnet-1"]
        }));
        assert!(result.unwrap_err().to_string().contains("unknown field `networkId`"));
    }
}
