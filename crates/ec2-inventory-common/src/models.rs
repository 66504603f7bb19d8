//! Inventory data model: tag filters, instance records, and the grouped
//! mapping handed to Ansible.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::Error;

/// One list-instances filter, parsed from a `KEY=VALUE` token.
///
/// The key is passed to the provider verbatim, so any filter name the
/// provider understands works here, not only tag keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFilter {
    pub key: String,
    pub value: String,
}

impl TagFilter {
    pub fn new(key: String, value: String) -> Self {
        Self { key, value }
    }

    /// Split a `KEY=VALUE` token on the first `=`. A token without `=` is
    /// rejected; a second `=` belongs to the value.
    pub fn parse(token: &str) -> crate::Result<Self> {
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| Error::InvalidTagFilter(token.to_string()))?;
        Ok(Self::new(key.to_string(), value.to_string()))
    }
}

impl FromStr for TagFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A key-value tag attached to an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceTag {
    pub key: String,
    pub value: String,
}

/// One instance as returned by the provider listing.
///
/// Conversion from provider types is total: attributes the provider did not
/// populate come through as `None` or empty rather than failing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InstanceRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub tags: Vec<InstanceTag>,
    #[serde(default)]
    pub private_address: Option<String>,
    #[serde(default)]
    pub image_id: Option<String>,
}

impl InstanceRecord {
    /// Inventory host name: the first `Name` tag when present, the instance
    /// identifier otherwise. `None` when the record carries neither.
    pub fn host_name(&self) -> Option<String> {
        self.tags
            .iter()
            .find(|tag| tag.key == "Name")
            .map(|tag| tag.value.clone())
            .or_else(|| self.id.clone())
    }
}

/// Per-host connection variables served under `_meta.hostvars`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HostVars {
    /// Private address of the host; serialized as `null` when the provider
    /// reported none.
    #[serde(default)]
    pub ansible_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ansible_user: Option<String>,
}

/// Variables applied to every host in the region group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupVars {
    pub ansible_host_key_checking: String,
}

impl Default for GroupVars {
    fn default() -> Self {
        Self {
            ansible_host_key_checking: "false".to_string(),
        }
    }
}

/// The grouped inventory mapping.
///
/// Serializes as two top-level keys: `_meta` (with `hostvars`) and the
/// region name (with `hosts` and `vars`). The region key is dynamic, hence
/// the hand-written `Serialize` impl. Host order follows insertion order,
/// which is the provider's return order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    region: String,
    hostvars: BTreeMap<String, HostVars>,
    hosts: Vec<String>,
    vars: GroupVars,
}

impl Inventory {
    pub fn new(region: String) -> Self {
        Self {
            region,
            hostvars: BTreeMap::new(),
            hosts: Vec::new(),
            vars: GroupVars::default(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    pub fn host_vars(&self, name: &str) -> Option<&HostVars> {
        self.hostvars.get(name)
    }

    pub fn group_vars(&self) -> &GroupVars {
        &self.vars
    }

    /// Append a host to the region group and open its hostvars entry with
    /// the (possibly absent) private address.
    pub fn add_host(&mut self, name: &str, address: Option<String>) {
        self.hosts.push(name.to_string());
        self.hostvars.insert(
            name.to_string(),
            HostVars {
                ansible_host: address,
                ansible_user: None,
            },
        );
    }

    /// Set the login user for a host already added via `add_host`.
    pub fn set_user(&mut self, name: &str, user: &str) {
        if let Some(vars) = self.hostvars.get_mut(name) {
            vars.ansible_user = Some(user.to_string());
        }
    }
}

impl Serialize for Inventory {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(Serialize)]
        struct Meta<'a> {
            hostvars: &'a BTreeMap<String, HostVars>,
        }

        #[derive(Serialize)]
        struct Group<'a> {
            hosts: &'a [String],
            vars: &'a GroupVars,
        }

        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(
            "_meta",
            &Meta {
                hostvars: &self.hostvars,
            },
        )?;
        map.serialize_entry(
            &self.region,
            &Group {
                hosts: &self.hosts,
                vars: &self.vars,
            },
        )?;
        map.end()
    }
}
