//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use smallvec::SmallVec;

// Label key/value pairs attached to a sample, in descriptor order.
pub type LabelSet = SmallVec<[(&'static str, String); 4]>;

// The kinds of metrics the exposition layer knows how to render.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

/// Static description of one metric: name, help text, kind and ordered label
/// keys.
///
/// Samples are always built through a descriptor, which pins the label key
/// set of a metric name: two samples of the same metric can never disagree
/// on label keys or label order.
#[derive(Debug)]
pub struct Desc {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    pub labels: &'static [&'static str],
}

/// One exported measurement: a named, labeled, typed numeric value.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricSample {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    pub labels: LabelSet,
    pub value: f64,
}

// ===== impl Desc =====

impl Desc {
    pub const fn new(
        name: &'static str,
        help: &'static str,
        kind: MetricKind,
        labels: &'static [&'static str],
    ) -> Desc {
        Desc {
            name,
            help,
            kind,
            labels,
        }
    }

    /// Builds a sample of this metric. Label values are paired positionally
    /// with the descriptor's label keys.
    pub fn sample<const N: usize>(
        &self,
        values: [String; N],
        value: f64,
    ) -> MetricSample {
        debug_assert_eq!(N, self.labels.len());
        let labels = self.labels.iter().copied().zip(values).collect();
        MetricSample {
            name: self.name,
            help: self.help,
            kind: self.kind,
            labels,
            value,
        }
    }
}

// ===== tests =====

#[cfg(test)]
mod tests {
    use super::*;

    static TEST_GAUGE: Desc = Desc::new(
        "test_gauge",
        "A gauge.",
        MetricKind::Gauge,
        &["area", "iface", "vrf"],
    );

    #[test]
    fn sample_labels_follow_descriptor_order() {
        let sample = TEST_GAUGE.sample(
            ["0.0.0.0".to_owned(), "swp1".to_owned(), "default".to_owned()],
            3.0,
        );
        assert_eq!(sample.name, "test_gauge");
        assert_eq!(sample.kind, MetricKind::Gauge);
        assert_eq!(sample.value, 3.0);
        assert_eq!(
            sample.labels.as_slice(),
            &[
                ("area", "0.0.0.0".to_owned()),
                ("iface", "swp1".to_owned()),
                ("vrf", "default".to_owned()),
            ]
        );
    }
}
