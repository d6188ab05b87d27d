//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use frrmon_collector::scrape;
use frrmon_collector::vtysh::Vtysh;
use frrmon_utils::metric::{MetricKind, MetricSample};
use frrmon_utils::protocol::Protocol;
use frrmon_utils::sink::MetricSink;
use frrmon_utils::task::Task;
use prometheus::{CounterVec, Encoder, GaugeVec, Opts, Registry, TextEncoder};
use tracing::{debug, error};

use crate::config::Config;

// Shared server state.
#[derive(Debug)]
pub struct AppState {
    pub vtysh: Vtysh,
    pub protocols: Vec<Protocol>,
    pub sink_capacity: usize,
}

// Folds drained samples into a per-pass Prometheus registry.
//
// A fresh registry per pass means series that were not produced this pass
// (skipped interfaces, vanished instances) are absent from the output
// rather than lingering at their last value or reading as zero.
struct SampleFold<'a> {
    registry: &'a Registry,
    gauges: HashMap<&'static str, GaugeVec>,
    counters: HashMap<&'static str, CounterVec>,
}

// ===== impl SampleFold =====

impl<'a> SampleFold<'a> {
    fn new(registry: &'a Registry) -> SampleFold<'a> {
        SampleFold {
            registry,
            gauges: Default::default(),
            counters: Default::default(),
        }
    }

    fn add(&mut self, sample: &MetricSample) -> Result<(), prometheus::Error> {
        let keys: Vec<_> =
            sample.labels.iter().map(|(key, _)| *key).collect();
        let values: Vec<_> =
            sample.labels.iter().map(|(_, value)| value.as_str()).collect();
        let opts = Opts::new(sample.name, sample.help);

        match sample.kind {
            MetricKind::Gauge => {
                let vec = match self.gauges.entry(sample.name) {
                    Entry::Occupied(entry) => entry.into_mut(),
                    Entry::Vacant(entry) => {
                        let vec = GaugeVec::new(opts, &keys)?;
                        self.registry.register(Box::new(vec.clone()))?;
                        entry.insert(vec)
                    }
                };
                vec.get_metric_with_label_values(&values)?
                    .set(sample.value);
            }
            MetricKind::Counter => {
                let vec = match self.counters.entry(sample.name) {
                    Entry::Occupied(entry) => entry.into_mut(),
                    Entry::Vacant(entry) => {
                        let vec = CounterVec::new(opts, &keys)?;
                        self.registry.register(Box::new(vec.clone()))?;
                        entry.insert(vec)
                    }
                };
                vec.get_metric_with_label_values(&values)?
                    .inc_by(sample.value);
            }
        }
        Ok(())
    }
}

// ===== global functions =====

pub fn router(config: &Config, state: Arc<AppState>) -> Router {
    let index = Html(format!(
        "<html><head><title>FRR Exporter</title></head><body>\
         <h1>FRR Exporter</h1><p><a href=\"{0}\">Metrics</a></p>\
         </body></html>",
        config.telemetry_path
    ));
    Router::new()
        .route("/", get(move || async move { index }))
        .route(&config.telemetry_path, get(metrics))
        .with_state(state)
}

// One exposition request drives one full collection pass: the collectors
// run concurrently with the drain below, with the bounded sink as the only
// coupling between them.
async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    let (sink, mut rx) = MetricSink::channel(state.sink_capacity);

    let vtysh = state.vtysh.clone();
    let protocols = state.protocols.clone();
    let scrape_task = Task::spawn(async move {
        scrape::scrape(&vtysh, &protocols, &sink).await
    });

    let registry = Registry::new();
    let mut fold = SampleFold::new(&registry);
    while let Some(sample) = rx.recv().await {
        if let Err(error) = fold.add(&sample) {
            error!(%error, name = %sample.name, "failed to record sample");
        }
    }

    let report = match scrape_task.await {
        Ok(Ok(report)) => report,
        Ok(Err(error)) => {
            error!(%error, "collection pass failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
        Err(error) => {
            error!(%error, "collection task failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    for outcome in &report.outcomes {
        debug!(
            protocol = %outcome.protocol,
            success = outcome.success,
            emitted = outcome.emitted,
            skipped = outcome.skipped,
            "collector finished"
        );
    }

    let encoder = TextEncoder::new();
    let mut buf = Vec::new();
    if let Err(error) = encoder.encode(&registry.gather(), &mut buf) {
        error!(%error, "failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    (
        [(header::CONTENT_TYPE, encoder.format_type().to_owned())],
        buf,
    )
        .into_response()
}

// ===== tests =====

#[cfg(test)]
mod tests {
    use frrmon_utils::metric::Desc;

    use super::*;

    static NEIGHBORS: Desc = Desc::new(
        "frr_ospf_neighbors",
        "Number of neighbors detected.",
        MetricKind::Gauge,
        &["area", "iface", "vrf"],
    );
    static PASSES: Desc = Desc::new(
        "frr_scrape_passes_total",
        "Total scrape passes.",
        MetricKind::Counter,
        &["collector"],
    );

    fn encode(registry: &Registry) -> String {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&registry.gather(), &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn folds_gauges_into_labeled_series() {
        let registry = Registry::new();
        let mut fold = SampleFold::new(&registry);
        for (iface, value) in [("swp1", 0.0), ("swp2", 1.0)] {
            let sample = NEIGHBORS.sample(
                [
                    "0.0.0.0".to_owned(),
                    iface.to_owned(),
                    "default".to_owned(),
                ],
                value,
            );
            fold.add(&sample).unwrap();
        }

        let text = encode(&registry);
        assert!(text.contains(
            "# HELP frr_ospf_neighbors Number of neighbors detected."
        ));
        assert!(text.contains("# TYPE frr_ospf_neighbors gauge"));
        assert!(text.contains(
            "frr_ospf_neighbors{area=\"0.0.0.0\",iface=\"swp1\",\
             vrf=\"default\"} 0"
        ));
        assert!(text.contains(
            "frr_ospf_neighbors{area=\"0.0.0.0\",iface=\"swp2\",\
             vrf=\"default\"} 1"
        ));
    }

    #[test]
    fn folds_counters() {
        let registry = Registry::new();
        let mut fold = SampleFold::new(&registry);
        let sample = PASSES.sample(["ospf".to_owned()], 3.0);
        fold.add(&sample).unwrap();

        let text = encode(&registry);
        assert!(text.contains("# TYPE frr_scrape_passes_total counter"));
        assert!(text
            .contains("frr_scrape_passes_total{collector=\"ospf\"} 3"));
    }

    #[test]
    fn relabeled_metric_name_is_rejected_not_mixed() {
        // Cardinality consistency: once a metric name is registered with a
        // label key set, a conflicting sample cannot corrupt it.
        let registry = Registry::new();
        let mut fold = SampleFold::new(&registry);
        let good = NEIGHBORS.sample(
            ["0.0.0.0".to_owned(), "swp1".to_owned(), "default".to_owned()],
            0.0,
        );
        fold.add(&good).unwrap();

        let mut bad = good.clone();
        bad.labels.pop();
        assert!(fold.add(&bad).is_err());
    }
}
