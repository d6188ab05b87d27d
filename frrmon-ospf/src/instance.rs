//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use serde_json::{Map, Value};

use crate::error::DecodeError;

// Name of the field whose presence marks a sub-object as an interface
// entry. Instance objects mix scalar metadata ("vrfName", "vrfId") with
// interface-keyed sub-objects at the same nesting level, so the value
// shape is the only reliable discriminator.
const IFINDEX_FIELD: &str = "ifIndex";

/// Decoded per-protocol state dump, keyed by routing instance.
///
/// The tree is validated structurally at decode time: the root and every
/// instance value must be objects. Classification of instance members into
/// metadata and interface entries happens during iteration.
#[derive(Debug)]
pub struct InstanceTree {
    root: Map<String, Value>,
}

/// One routing instance of the dump: its metadata plus the interface
/// entries grouped under it.
///
/// The instance name is the outer map key, not the "vrfName" metadata
/// value; derived labels must disambiguate interfaces by instance, and
/// only the key is guaranteed to be the name the entry is filed under.
#[derive(Clone, Copy, Debug)]
pub struct Instance<'a> {
    pub name: &'a str,
    obj: &'a Map<String, Value>,
}

// ===== impl InstanceTree =====

impl InstanceTree {
    /// Decodes and structurally validates a raw state dump.
    pub fn decode(data: &[u8]) -> Result<InstanceTree, DecodeError> {
        let root: Value =
            serde_json::from_slice(data).map_err(DecodeError::InvalidJson)?;
        let Value::Object(root) = root else {
            return Err(DecodeError::RootNotObject);
        };
        if let Some((instance, _)) =
            root.iter().find(|(_, value)| !value.is_object())
        {
            return Err(DecodeError::InstanceNotObject(instance.clone()));
        }
        Ok(InstanceTree { root })
    }

    /// Iterates over the routing instances of the dump.
    pub fn instances(&self) -> impl Iterator<Item = Instance<'_>> {
        self.root.iter().map(|(name, value)| Instance {
            name,
            // Non-object instance values were rejected at decode time.
            obj: value.as_object().expect("validated instance value"),
        })
    }

    /// Iterates over the interface entries of all instances, yielding
    /// (instance name, interface name, raw interface object) triples.
    pub fn interfaces(
        &self,
    ) -> impl Iterator<Item = (&str, &str, &Map<String, Value>)> {
        self.instances().flat_map(|instance| {
            instance
                .interfaces()
                .map(move |(ifname, obj)| (instance.name, ifname, obj))
        })
    }
}

// ===== impl Instance =====

impl<'a> Instance<'a> {
    /// Numeric instance ID advertised in the metadata, when present and
    /// well-typed.
    pub fn vrf_id(&self) -> Option<u64> {
        self.obj.get("vrfId").and_then(Value::as_u64)
    }

    /// Iterates over the instance's interface entries, skipping metadata
    /// members.
    pub fn interfaces(
        self,
    ) -> impl Iterator<Item = (&'a str, &'a Map<String, Value>)> {
        self.obj.iter().filter_map(|(key, value)| {
            value
                .as_object()
                .filter(|obj| obj.contains_key(IFINDEX_FIELD))
                .map(|obj| (key.as_str(), obj))
        })
    }
}

// ===== tests =====
