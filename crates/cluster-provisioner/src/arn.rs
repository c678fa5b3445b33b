// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Parsing of `arn:partition:service:region:account:resource` identifiers.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A parsed resource name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arn {
    /// Partition, e.g. `aws`
    pub partition: String,
    /// Service namespace, e.g. `rds`
    pub service: String,
    /// Region, may be empty for global services
    pub region: String,
    /// Owning account id
    pub account_id: String,
    /// Resource part, e.g. `cluster:orders`
    pub resource: String,
}

impl Arn {
    /// The resource name with its type qualifier stripped.
    ///
    /// `cluster:orders` and `role/admin` yield `orders` and `admin`.
    pub fn resource_name(&self) -> &str {
        match self.resource.find([':', '/']) {
            Some(idx) => &self.resource[idx + 1..],
            None => &self.resource,
        }
    }
}

impl FromStr for Arn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.splitn(6, ':').collect();
        if parts.len() != 6 || parts[0] != "arn" || parts[5].is_empty() {
            return Err(Error::Internal(format!("failed to parse ARN {:?}", s)));
        }

        Ok(Arn {
            partition: parts[1].to_string(),
            service: parts[2].to_string(),
            region: parts[3].to_string(),
            account_id: parts[4].to_string(),
            resource: parts[5].to_string(),
        })
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account_id, self.resource
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_cluster_arn() {
        let arn: Arn = "arn:aws:rds:us-east-1:123456789012:cluster:orders"
            .parse()
            .unwrap();

        assert_eq!(arn.partition, "aws");
        assert_eq!(arn.service, "rds");
        assert_eq!(arn.region, "us-east-1");
        assert_eq!(arn.account_id, "123456789012");
        assert_eq!(arn.resource, "cluster:orders");
        assert_eq!(arn.resource_name(), "orders");
    }

    #[test]
    fn test_resource_name_variants() {
        let role: Arn = "arn:aws:iam::123456789012:role/admin".parse().unwrap();
        assert_eq!(role.region, "");
        assert_eq!(role.resource_name(), "admin");

        let bare: Arn = "arn:aws:s3:::bucket".parse().unwrap();
        assert_eq!(bare.resource_name(), "bucket");
    }

    #[test]
    fn test_display_roundtrip() {
        let raw = "arn:aws:rds:us-east-1:123456789012:cluster:orders";
        let arn: Arn = raw.parse().unwrap();
        assert_eq!(arn.to_string(), raw);
    }

    #[test]
    fn test_malformed_arn_is_internal() {
        for raw in ["", "orders", "arn:aws:rds", "urn:aws:rds:r:a:cluster:x", "arn:aws:rds:r:a:"] {
            let err = raw.parse::<Arn>().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Internal, "input: {raw:?}");
        }
    }
}
