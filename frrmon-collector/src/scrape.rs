//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::time::Instant;

use frrmon_ospf::collect::CollectReport;
use frrmon_ospf::error::Error as OspfError;
use frrmon_utils::metric::{Desc, MetricKind};
use frrmon_utils::protocol::Protocol;
use frrmon_utils::sink::{MetricSink, SinkError};
use frrmon_utils::task::Task;
use tracing::{Instrument, info_span, warn};

use crate::vtysh::{Vtysh, VtyshError};

// Per-collector health gauges, shared by every protocol category.
pub static COLLECTOR_UP: Desc = Desc::new(
    "frr_collector_up",
    "Whether the collector's last scrape succeeded.",
    MetricKind::Gauge,
    &["collector"],
);
pub static COLLECTOR_SCRAPE_DURATION: Desc = Desc::new(
    "frr_collector_scrape_duration_seconds",
    "Duration of the collector's last scrape.",
    MetricKind::Gauge,
    &["collector"],
);

// Outcome of one scrape pass across all enabled protocol categories.
#[derive(Debug, Default)]
pub struct ScrapeReport {
    pub outcomes: Vec<ProtocolOutcome>,
}

#[derive(Debug)]
pub struct ProtocolOutcome {
    pub protocol: Protocol,
    pub success: bool,
    pub emitted: usize,
    pub skipped: usize,
}

// Errors of one protocol collection attempt. Only the loss of the sink is
// fatal to the pass as a whole; everything else is scoped to the failing
// protocol.
#[derive(Debug)]
enum CollectError {
    Query(VtyshError),
    Process(OspfError),
}

// ===== impl CollectError =====

impl CollectError {
    fn log(&self) {
        match self {
            CollectError::Query(error) => error.log(),
            CollectError::Process(error) => error.log(),
        }
    }
}

impl From<VtyshError> for CollectError {
    fn from(error: VtyshError) -> CollectError {
        CollectError::Query(error)
    }
}

impl From<OspfError> for CollectError {
    fn from(error: OspfError) -> CollectError {
        CollectError::Process(error)
    }
}

// ===== global functions =====

/// Runs one scrape pass: every enabled protocol category is collected by
/// its own task, all writing to the same sink.
///
/// A failing protocol never affects its siblings; the failure is recorded
/// in the report and reflected in the collector health gauges.
pub async fn scrape(
    vtysh: &Vtysh,
    protocols: &[Protocol],
    sink: &MetricSink,
) -> Result<ScrapeReport, SinkError> {
    let tasks = protocols
        .iter()
        .map(|&protocol| {
            let vtysh = vtysh.clone();
            let sink = sink.clone();
            Task::spawn(
                async move { collect(protocol, &vtysh, &sink).await }
                    .instrument(info_span!("collector", %protocol)),
            )
        })
        .collect::<Vec<_>>();

    let mut report = ScrapeReport::default();
    for task in tasks {
        match task.await {
            Ok(outcome) => report.outcomes.push(outcome?),
            Err(error) => {
                warn!(%error, "collector task failed");
            }
        }
    }
    Ok(report)
}

// Collects one protocol category and reports the collector's health
// through the same sink its samples went to.
async fn collect(
    protocol: Protocol,
    vtysh: &Vtysh,
    sink: &MetricSink,
) -> Result<ProtocolOutcome, SinkError> {
    let start = Instant::now();
    let mut outcome = ProtocolOutcome {
        protocol,
        success: false,
        emitted: 0,
        skipped: 0,
    };

    let result = match protocol {
        Protocol::OSPF => collect_ospf(vtysh, sink).await,
    };
    match result {
        Ok(report) => {
            outcome.success = true;
            outcome.emitted = report.emitted;
            outcome.skipped = report.skipped.len();
        }
        Err(CollectError::Process(OspfError::Sink(error))) => {
            return Err(error);
        }
        Err(error) => {
            error.log();
        }
    }

    let up = if outcome.success { 1.0 } else { 0.0 };
    sink.send_all([
        COLLECTOR_UP.sample([protocol.to_string()], up),
        COLLECTOR_SCRAPE_DURATION
            .sample([protocol.to_string()], start.elapsed().as_secs_f64()),
    ])
    .await?;
    Ok(outcome)
}

async fn collect_ospf(
    vtysh: &Vtysh,
    sink: &MetricSink,
) -> Result<CollectReport, CollectError> {
    let data = vtysh.show(frrmon_ospf::collect::SHOW_COMMAND).await?;
    let report = frrmon_ospf::collect::process_interfaces(&data, sink).await?;
    Ok(report)
}
