//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use tokio::sync::mpsc;

use crate::metric::MetricSample;

/// Sending half of the sample channel shared by all collectors.
///
/// The channel is bounded: writing to a full sink blocks the producing
/// collector until the consuming side drains it. A sample is never dropped
/// once extraction succeeded.
#[derive(Clone, Debug)]
pub struct MetricSink(mpsc::Sender<MetricSample>);

// Failure to write to the sink. The receiving half is gone, so the
// collection pass as a whole cannot complete.
#[derive(Debug)]
pub struct SinkError;

// ===== impl MetricSink =====

impl MetricSink {
    /// Creates a bounded sample channel, returning the sink and the
    /// receiving half used by the exposition layer.
    pub fn channel(
        capacity: usize,
    ) -> (MetricSink, mpsc::Receiver<MetricSample>) {
        let (tx, rx) = mpsc::channel(capacity);
        (MetricSink(tx), rx)
    }

    /// Writes one sample, waiting for capacity when the channel is full.
    pub async fn send(&self, sample: MetricSample) -> Result<(), SinkError> {
        self.0.send(sample).await.map_err(|_| SinkError)
    }

    /// Writes a group of samples as a unit.
    ///
    /// Capacity for the whole group is reserved before anything is written,
    /// and the samples are then committed without yielding in between. A
    /// cancelled scrape therefore never leaves a partial group behind on
    /// the channel. The channel capacity must be at least the group size.
    pub async fn send_all<const N: usize>(
        &self,
        samples: [MetricSample; N],
    ) -> Result<(), SinkError> {
        let permits = self.0.reserve_many(N).await.map_err(|_| SinkError)?;
        for (permit, sample) in permits.zip(samples) {
            permit.send(sample);
        }
        Ok(())
    }
}

// ===== impl SinkError =====

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "metric sink closed")
    }
}

impl std::error::Error for SinkError {}

// ===== tests =====
