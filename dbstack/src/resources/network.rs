//! Access group and subnet grouping resources.

use bon::Builder;
use serde::Serialize;

use crate::types::Tags;

pub const SECURITY_GROUP_TYPE: &str = "aws:ec2/securityGroup:SecurityGroup";
pub const SUBNET_GROUP_TYPE: &str = "aws:rds/subnetGroup:SubnetGroup";

/// Protocol value meaning "all protocols"
pub const ALL_PROTOCOLS: &str = "-1";
pub const ANY_IPV4: &str = "0.0.0.0/0";
pub const ANY_IPV6: &str = "::/0";

#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityGroupRule {
    #[builder(into)]
    pub protocol: String,
    pub from_port: u16,
    pub to_port: u16,
    #[builder(default)]
    pub cidr_blocks: Vec<String>,
    #[builder(default)]
    pub ipv6_cidr_blocks: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub description: Option<String>,
}

impl SecurityGroupRule {
    /// Inbound TCP on a single port from the given ranges
    pub fn tcp_ingress(port: u16, ipv4_cidr: &str, ipv6_cidr: &str) -> Self {
        Self::builder()
            .protocol("tcp")
            .from_port(port)
            .to_port(port)
            .cidr_blocks(vec![ipv4_cidr.to_string()])
            .ipv6_cidr_blocks(vec![ipv6_cidr.to_string()])
            .description("Database access from within the network")
            .build()
    }

    /// Outbound traffic on any protocol to anywhere
    pub fn allow_all_egress() -> Self {
        Self::builder()
            .protocol(ALL_PROTOCOLS)
            .from_port(0)
            .to_port(0)
            .cidr_blocks(vec![ANY_IPV4.to_string()])
            .ipv6_cidr_blocks(vec![ANY_IPV6.to_string()])
            .build()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityGroupArgs {
    #[builder(into)]
    pub vpc_id: String,
    #[builder(into)]
    pub description: String,
    pub ingress: Vec<SecurityGroupRule>,
    pub egress: Vec<SecurityGroupRule>,
    #[builder(default)]
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetGroupArgs {
    pub subnet_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub description: Option<String>,
    #[builder(default)]
    pub tags: Tags,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tcp_ingress() {
        let rule = SecurityGroupRule::tcp_ingress(5432, "10.0.0.0/16", "2600:1f18::/56");

        assert_eq!(rule.protocol, "tcp");
        assert_eq!((rule.from_port, rule.to_port), (5432, 5432));
        assert_eq!(rule.cidr_blocks, ["10.0.0.0/16"]);
        assert_eq!(rule.ipv6_cidr_blocks, ["2600:1f18::/56"]);
    }

    #[test]
    fn test_allow_all_egress() {
        let rule = SecurityGroupRule::allow_all_egress();

        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "protocol": "-1",
                "fromPort": 0,
                "toPort": 0,
                "cidrBlocks": ["0.0.0.0/0"],
                "ipv6CidrBlocks": ["::/0"]
            })
        );
    }
}
