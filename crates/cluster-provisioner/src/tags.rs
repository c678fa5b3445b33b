// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Tenant ownership tags.
//!
//! Every resource this service creates carries three service-owned tags.
//! [`TagSet::normalize`] stamps them onto caller-provided tags and
//! [`TagSet::belongs_to_tenant`] is the ownership gate for reads and
//! mutations of existing clusters.

use serde::{Deserialize, Serialize};

/// Tag key carrying the owning tenant organization.
pub const ORG_TAG: &str = "tenant-org";
/// Tag key carrying the resource type.
pub const TYPE_TAG: &str = "resource-type";
/// Tag key carrying the resource flavor.
pub const FLAVOR_TAG: &str = "resource-flavor";

/// Value of [`TYPE_TAG`] on every managed resource.
pub const RESOURCE_TYPE: &str = "database";
/// Value of [`FLAVOR_TAG`] on every managed resource.
pub const RESOURCE_FLAVOR: &str = "docdb";

const RESERVED_KEYS: [&str; 3] = [ORG_TAG, TYPE_TAG, FLAVOR_TAG];

/// A single key/value tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    /// Tag key
    pub key: String,
    /// Tag value
    pub value: String,
}

impl Tag {
    /// Create a tag.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Ordered list of tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(Vec<Tag>);

impl TagSet {
    /// Empty tag set.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Return a copy owned by `tenant`: the three service-owned tags first,
    /// then every caller tag whose key is not reserved, in original order.
    pub fn normalize(&self, tenant: &str) -> TagSet {
        let mut out = Vec::with_capacity(self.0.len() + RESERVED_KEYS.len());
        out.push(Tag::new(ORG_TAG, tenant));
        out.push(Tag::new(TYPE_TAG, RESOURCE_TYPE));
        out.push(Tag::new(FLAVOR_TAG, RESOURCE_FLAVOR));
        out.extend(
            self.0
                .iter()
                .filter(|t| !RESERVED_KEYS.contains(&t.key.as_str()))
                .cloned(),
        );
        TagSet(out)
    }

    /// True iff an org tag exactly equal to `tenant` is present.
    pub fn belongs_to_tenant(&self, tenant: &str) -> bool {
        self.0.iter().any(|t| t.key == ORG_TAG && t.value == tenant)
    }

    /// Value of the first tag with `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|t| t.key == key)
            .map(|t| t.value.as_str())
    }

    /// Append a tag.
    pub fn push(&mut self, tag: Tag) {
        self.0.push(tag);
    }

    /// Iterate over tags in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.0.iter()
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no tags.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Tag>> for TagSet {
    fn from(tags: Vec<Tag>) -> Self {
        Self(tags)
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
