//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use serde_json::{Map, Value};

use crate::error::{FieldError, FieldErrorKind};

/// Typed snapshot of one interface's protocol state, extracted from a
/// single interface entry of the instance tree.
///
/// String fields are preserved verbatim: the area in particular is an
/// opaque label value ("0.0.0.0" is a name, not an address to interpret).
#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceState {
    // Operational status.
    pub if_up: bool,
    // Interface ifindex.
    pub ifindex: u64,
    // Interface MTU, in bytes.
    pub mtu_bytes: u64,
    // Configured bandwidth, in Mbit/s.
    pub bandwidth_mbit: f64,
    // Raw interface flag string.
    pub if_flags: String,
    // Whether OSPF is enabled on the interface.
    pub enabled: bool,
    // Primary address and prefix length.
    pub ip_address: String,
    pub ip_prefixlen: u64,
    // Area the interface is attached to.
    pub area: String,
    // Router ID.
    pub router_id: String,
    // Network type (e.g. "BROADCAST").
    pub network_type: String,
    // Interface output cost.
    pub cost: u64,
    // Transmit delay, in milliseconds.
    pub transmit_delay_msecs: f64,
    // Interface role on its segment (e.g. "DR").
    pub state: String,
    // Router priority.
    pub priority: u64,
    // Multicast group memberships.
    pub mcast_all_routers: bool,
    pub mcast_designated_routers: bool,
    // Timers, in milliseconds.
    pub timer_msecs: f64,
    pub timer_dead_msecs: f64,
    pub timer_wait_msecs: f64,
    pub timer_retransmit: f64,
    pub timer_hello_in_msecs: f64,
    // Neighbor counts. Adjacent neighbors are the subset of detected
    // neighbors that completed database synchronization.
    pub nbr_count: u64,
    pub nbr_adjacent_count: u64,
    // The segment's BDR. Present only when the interface participates in
    // DR/BDR election. Absence is distinct from a present zero value.
    pub bdr_id: Option<String>,
    pub bdr_address: Option<String>,
    // Self-originated network LSA sequence number. DR role only.
    pub network_lsa_sequence: Option<u64>,
}

// Field-level reader over one raw interface object, carrying the context
// needed to build precise field errors.
struct RecordReader<'a> {
    instance: &'a str,
    ifname: &'a str,
    obj: &'a Map<String, Value>,
}

// ===== impl InterfaceState =====

impl InterfaceState {
    /// Extracts a typed interface state from one raw interface entry.
    ///
    /// Required fields yield an error when missing or mistyped. Optional
    /// fields are looked up by presence: absence maps to `None` and is
    /// never an error by itself.
    pub fn from_value(
        instance: &str,
        ifname: &str,
        obj: &Map<String, Value>,
    ) -> Result<InterfaceState, FieldError> {
        let record = RecordReader {
            instance,
            ifname,
            obj,
        };
        Ok(InterfaceState {
            if_up: record.bool("ifUp")?,
            ifindex: record.uint("ifIndex")?,
            mtu_bytes: record.uint("mtuBytes")?,
            bandwidth_mbit: record.num("bandwidthMbit")?,
            if_flags: record.string("ifFlags")?,
            enabled: record.bool("ospfEnabled")?,
            ip_address: record.string("ipAddress")?,
            ip_prefixlen: record.uint("ipAddressPrefixlen")?,
            area: record.string("area")?,
            router_id: record.string("routerId")?,
            network_type: record.string("networkType")?,
            cost: record.uint("cost")?,
            transmit_delay_msecs: record.num("transmitDelayMsecs")?,
            state: record.string("state")?,
            priority: record.uint("priority")?,
            mcast_all_routers: record.bool("mcastMemberOspfAllRouters")?,
            mcast_designated_routers: record
                .bool("mcastMemberOspfDesignatedRouters")?,
            timer_msecs: record.num("timerMsecs")?,
            timer_dead_msecs: record.num("timerDeadMsecs")?,
            timer_wait_msecs: record.num("timerWaitMsecs")?,
            timer_retransmit: record.num("timerRetransmit")?,
            timer_hello_in_msecs: record.num("timerHelloInMsecs")?,
            nbr_count: record.uint("nbrCount")?,
            nbr_adjacent_count: record.uint("nbrAdjacentCount")?,
            bdr_id: record.opt_string("bdrId")?,
            bdr_address: record.opt_string("bdrAddress")?,
            network_lsa_sequence: record.opt_uint("networkLsaSequence")?,
        })
    }
}

// ===== impl RecordReader =====

impl RecordReader<'_> {
    fn error(&self, field: &'static str, kind: FieldErrorKind) -> FieldError {
        FieldError {
            instance: self.instance.to_owned(),
            ifname: self.ifname.to_owned(),
            field,
            kind,
        }
    }

    fn wrong_type(
        &self,
        field: &'static str,
        expected: &'static str,
        value: &Value,
    ) -> FieldError {
        self.error(
            field,
            FieldErrorKind::WrongType {
                expected,
                found: json_type(value),
            },
        )
    }

    fn required(&self, field: &'static str) -> Result<&Value, FieldError> {
        self.obj
            .get(field)
            .ok_or_else(|| self.error(field, FieldErrorKind::Missing))
    }

    fn bool(&self, field: &'static str) -> Result<bool, FieldError> {
        let value = self.required(field)?;
        value
            .as_bool()
            .ok_or_else(|| self.wrong_type(field, "boolean", value))
    }

    fn uint(&self, field: &'static str) -> Result<u64, FieldError> {
        let value = self.required(field)?;
        value
            .as_u64()
            .ok_or_else(|| self.wrong_type(field, "unsigned integer", value))
    }

    // Rates and timers come back as either integers or floats depending on
    // the daemon version.
    fn num(&self, field: &'static str) -> Result<f64, FieldError> {
        let value = self.required(field)?;
        value
            .as_f64()
            .ok_or_else(|| self.wrong_type(field, "number", value))
    }

    fn string(&self, field: &'static str) -> Result<String, FieldError> {
        let value = self.required(field)?;
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| self.wrong_type(field, "string", value))
    }

    fn opt_uint(
        &self,
        field: &'static str,
    ) -> Result<Option<u64>, FieldError> {
        match self.obj.get(field) {
            None => Ok(None),
            Some(value) => value.as_u64().map(Some).ok_or_else(|| {
                self.wrong_type(field, "unsigned integer", value)
            }),
        }
    }

    fn opt_string(
        &self,
        field: &'static str,
    ) -> Result<Option<String>, FieldError> {
        match self.obj.get(field) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(|s| Some(s.to_owned()))
                .ok_or_else(|| self.wrong_type(field, "string", value)),
        }
    }
}

// ===== global functions =====

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ===== tests =====

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record() -> Map<String, Value> {
        let value = json!({
            "ifUp": true,
            "ifIndex": 6,
            "mtuBytes": 1500,
            "bandwidthMbit": 4294967295u64,
            "ifFlags": "<UP,BROADCAST,RUNNING,MULTICAST>",
            "ospfEnabled": true,
            "ipAddress": "192.168.2.1",
            "ipAddressPrefixlen": 24,
            "area": "0.0.0.0",
            "routerId": "192.168.255.1",
            "networkType": "BROADCAST",
            "cost": 1,
            "transmitDelayMsecs": 1000,
            "state": "DR",
            "priority": 1,
            "bdrId": "1.1.1.1",
            "bdrAddress": "192.168.1.2",
            "networkLsaSequence": 2147483717u64,
            "mcastMemberOspfAllRouters": true,
            "mcastMemberOspfDesignatedRouters": true,
            "timerMsecs": 100,
            "timerDeadMsecs": 25,
            "timerWaitMsecs": 25,
            "timerRetransmit": 200,
            "timerHelloInMsecs": 7769,
            "nbrCount": 1,
            "nbrAdjacentCount": 1
        });
        let Value::Object(obj) = value else { unreachable!() };
        obj
    }

    fn extract(
        obj: &Map<String, Value>,
    ) -> Result<InterfaceState, FieldError> {
        InterfaceState::from_value("default", "swp2", obj)
    }

    #[test]
    fn extracts_complete_record() {
        let iface = extract(&record()).unwrap();
        assert!(iface.if_up);
        assert_eq!(iface.ifindex, 6);
        assert_eq!(iface.bandwidth_mbit, 4294967295.0);
        assert_eq!(iface.area, "0.0.0.0");
        assert_eq!(iface.state, "DR");
        assert_eq!(iface.timer_hello_in_msecs, 7769.0);
        assert_eq!(iface.nbr_count, 1);
        assert_eq!(iface.nbr_adjacent_count, 1);
        assert_eq!(iface.bdr_id.as_deref(), Some("1.1.1.1"));
        assert_eq!(iface.network_lsa_sequence, Some(2147483717));
    }

    #[test]
    fn strings_are_preserved_verbatim() {
        let mut obj = record();
        obj.insert("area".to_owned(), json!("0.0.0.000"));
        obj.insert("networkType".to_owned(), json!("point-to-point"));
        let iface = extract(&obj).unwrap();
        assert_eq!(iface.area, "0.0.0.000");
        assert_eq!(iface.network_type, "point-to-point");
    }

    #[test]
    fn absent_optional_is_not_zero() {
        let mut obj = record();
        obj.remove("bdrId");
        obj.remove("bdrAddress");
        obj.remove("networkLsaSequence");
        let absent = extract(&obj).unwrap();
        assert_eq!(absent.network_lsa_sequence, None);
        assert_eq!(absent.bdr_id, None);
        assert_eq!(absent.bdr_address, None);

        obj.insert("networkLsaSequence".to_owned(), json!(0));
        let zero = extract(&obj).unwrap();
        assert_eq!(zero.network_lsa_sequence, Some(0));
        assert_ne!(absent.network_lsa_sequence, zero.network_lsa_sequence);
    }

    #[test]
    fn missing_required_field() {
        let mut obj = record();
        obj.remove("nbrCount");
        let error = extract(&obj).unwrap_err();
        assert_eq!(error.instance, "default");
        assert_eq!(error.ifname, "swp2");
        assert_eq!(error.field, "nbrCount");
        assert_eq!(error.kind, FieldErrorKind::Missing);
    }

    #[test]
    fn wrong_typed_required_field() {
        let mut obj = record();
        obj.insert("cost".to_owned(), json!("1"));
        let error = extract(&obj).unwrap_err();
        assert_eq!(error.field, "cost");
        assert_eq!(
            error.kind,
            FieldErrorKind::WrongType {
                expected: "unsigned integer",
                found: "string",
            }
        );
    }

    #[test]
    fn wrong_typed_optional_field_is_an_error() {
        let mut obj = record();
        obj.insert("bdrId".to_owned(), json!(5));
        let error = extract(&obj).unwrap_err();
        assert_eq!(error.field, "bdrId");
        assert_eq!(
            error.kind,
            FieldErrorKind::WrongType {
                expected: "string",
                found: "number",
            }
        );
    }

    #[test]
    fn counts_reject_floats() {
        let mut obj = record();
        obj.insert("nbrCount".to_owned(), json!(1.5));
        let error = extract(&obj).unwrap_err();
        assert_eq!(error.field, "nbrCount");
        assert!(matches!(error.kind, FieldErrorKind::WrongType { .. }));
    }

    #[test]
    fn timers_tolerate_floats() {
        let mut obj = record();
        obj.insert("timerMsecs".to_owned(), json!(99.5));
        let iface = extract(&obj).unwrap();
        assert_eq!(iface.timer_msecs, 99.5);
    }
}
