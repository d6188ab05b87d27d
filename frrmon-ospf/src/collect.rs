//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use frrmon_utils::metric::{Desc, MetricKind};
use frrmon_utils::sink::MetricSink;

use crate::error::{Error, FieldError};
use crate::instance::InstanceTree;
use crate::interface::InterfaceState;

// Per-interface neighbor gauges. These are the only series derived from
// the interface records; the remaining decoded fields are exposed through
// `InterfaceState` without a metric mapping.
pub static NEIGHBORS: Desc = Desc::new(
    "frr_ospf_neighbors",
    "Number of neighbors detected.",
    MetricKind::Gauge,
    &["area", "iface", "vrf"],
);
pub static NEIGHBOR_ADJACENCIES: Desc = Desc::new(
    "frr_ospf_neighbor_adjacencies",
    "Number of neighbor adjacencies formed.",
    MetricKind::Gauge,
    &["area", "iface", "vrf"],
);

// The vtysh command whose output feeds this collector.
pub const SHOW_COMMAND: &str = "show ip ospf vrf all interface json";

// Outcome of one collection pass: how many samples were written, and which
// interfaces were skipped and why.
#[derive(Debug, Default)]
pub struct CollectReport {
    pub emitted: usize,
    pub skipped: Vec<FieldError>,
}

// ===== global functions =====

/// Converts one raw per-instance interface dump into neighbor gauges on
/// the sink.
///
/// Structural problems with the payload abort the pass before any sample
/// is written. A malformed interface record skips only that interface; the
/// error is logged and collected in the report. The two samples of one
/// interface are committed to the sink as a unit, so a cancelled pass
/// never exposes a half-written interface.
pub async fn process_interfaces(
    data: &[u8],
    sink: &MetricSink,
) -> Result<CollectReport, Error> {
    let tree = InstanceTree::decode(data)?;

    let mut report = CollectReport::default();
    for (instance, ifname, obj) in tree.interfaces() {
        let iface = match InterfaceState::from_value(instance, ifname, obj) {
            Ok(iface) => iface,
            Err(error) => {
                error.log();
                report.skipped.push(error);
                continue;
            }
        };

        let labels = || {
            [iface.area.clone(), ifname.to_owned(), instance.to_owned()]
        };
        sink.send_all([
            NEIGHBORS.sample(labels(), iface.nbr_count as f64),
            NEIGHBOR_ADJACENCIES
                .sample(labels(), iface.nbr_adjacent_count as f64),
        ])
        .await?;
        report.emitted += 2;
    }

    Ok(report)
}
