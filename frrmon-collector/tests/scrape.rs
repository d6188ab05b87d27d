//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::path::PathBuf;
use std::time::Duration;

use frrmon_collector::scrape;
use frrmon_collector::vtysh::Vtysh;
use frrmon_utils::protocol::Protocol;
use frrmon_utils::sink::MetricSink;

#[tokio::test]
async fn failed_query_reports_collector_down() {
    let vtysh = Vtysh::new(
        PathBuf::from("/nonexistent/vtysh"),
        false,
        Duration::from_secs(5),
    );
    let (sink, mut rx) = MetricSink::channel(1024);
    let report = scrape::scrape(&vtysh, &[Protocol::OSPF], &sink)
        .await
        .unwrap();
    drop(sink);

    assert_eq!(report.outcomes.len(), 1);
    let outcome = &report.outcomes[0];
    assert_eq!(outcome.protocol, Protocol::OSPF);
    assert!(!outcome.success);
    assert_eq!(outcome.emitted, 0);
    assert_eq!(outcome.skipped, 0);

    // The failed collector still reports its health through the sink.
    let mut samples = Vec::new();
    while let Some(sample) = rx.recv().await {
        samples.push(sample);
    }
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].name, "frr_collector_up");
    assert_eq!(samples[0].value, 0.0);
    assert_eq!(
        samples[0].labels.as_slice(),
        &[("collector", "ospf".to_owned())]
    );
    assert_eq!(samples[1].name, "frr_collector_scrape_duration_seconds");
}
