// SPDX-License-Identifier: AGPL-3.0-only
// Copyright Authors of rhmi-exporter

use crate::error::MetricsError;
use crate::registry::{Descriptor, GaugeFamily};
use parking_lot::RwLock;
use prometheus_client::encoding::{EncodeMetric, MetricEncoder};
use prometheus_client::metrics::MetricType;
use std::fmt;
use std::sync::Arc;
use tracing::error;

#[derive(Debug)]
struct Series {
    values: Vec<String>,
    value: i64,
}

/// A gauge family that exposes at most one series at a time.
///
/// Used for state that is inherently single-valued, such as the current installation stage.
/// [`LatchedGauge::replace`] swaps the active series under the family's lock, so a concurrent
/// scrape sees either the previous series or the new one, never both and never neither.
#[derive(Clone, Debug)]
pub struct LatchedGauge {
    descriptor: Descriptor,
    required: Option<usize>,
    active: Arc<RwLock<Option<Series>>>,
}

impl LatchedGauge {
    /// Marks a dimension as required. A replace with an empty value for it clears the family
    /// instead of publishing an empty label.
    ///
    /// Only affects writes made through this handle and its clones.
    pub fn requiring(mut self, dimension: &'static str) -> Result<Self, MetricsError> {
        self.required = Some(self.descriptor.position(dimension)?);
        Ok(self)
    }

    pub fn try_replace<V: AsRef<str>>(
        &self,
        values: &[V],
        value: i64,
    ) -> Result<(), MetricsError> {
        let values = self.descriptor.label_values(values)?;
        let series = match self.required {
            Some(index) if values[index].is_empty() => None,
            _ => Some(Series { values, value }),
        };
        *self.active.write() = series;
        Ok(())
    }

    /// Makes the given series the only one in the family.
    ///
    /// # Panics
    ///
    /// Panics if the number of label values differs from the registered dimensions.
    pub fn replace<V: AsRef<str>>(&self, values: &[V], value: i64) {
        if let Err(error) = self.try_replace(values, value) {
            panic!("{error}");
        }
    }

    /// Sets the value of a family registered without dimensions.
    pub fn set(&self, value: i64) {
        self.replace::<&str>(&[], value);
    }

    pub fn clear(&self) {
        *self.active.write() = None;
    }

    /// Returns the active series, if any.
    pub fn active(&self) -> Option<(Vec<String>, i64)> {
        self.active
            .read()
            .as_ref()
            .map(|series| (series.values.clone(), series.value))
    }
}

impl GaugeFamily for LatchedGauge {
    fn new(descriptor: Descriptor) -> Self {
        Self {
            descriptor,
            required: None,
            active: Arc::new(RwLock::new(None)),
        }
    }

    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn series(&self) -> Vec<(Vec<String>, i64)> {
        self.active().into_iter().collect()
    }
}

impl EncodeMetric for LatchedGauge {
    fn encode(&self, mut encoder: MetricEncoder) -> Result<(), fmt::Error> {
        let active = self.active.read();
        match active.as_ref() {
            Some(series) => self
                .descriptor
                .encode_series(&mut encoder, &series.values, series.value),
            None => Ok(()),
        }
    }

    fn metric_type(&self) -> MetricType {
        MetricType::Gauge
    }
}

/// Latched gauges that publish the same state under different family names.
///
/// Each sink is its own replace unit: a sink that rejects an update does not stop the others
/// from being written, and nothing is rolled back.
#[derive(Clone, Debug)]
pub struct Mirrored {
    sinks: Vec<LatchedGauge>,
}

impl Mirrored {
    pub fn new(sinks: impl IntoIterator<Item = LatchedGauge>) -> Self {
        Self {
            sinks: sinks.into_iter().collect(),
        }
    }

    /// Replaces the active series of every sink.
    ///
    /// # Panics
    ///
    /// Panics after all sinks were attempted if any of them rejected the label values.
    pub fn replace<V: AsRef<str>>(&self, values: &[V], value: i64) {
        let mut failed = 0;
        for sink in &self.sinks {
            if let Err(error) = sink.try_replace(values, value) {
                error! {
                    ?error,
                    family = sink.descriptor.name(),
                    "unable to update mirrored state gauge"
                }
                failed += 1;
            }
        }
        if failed > 0 {
            panic!(
                "{failed} of {} mirrored state gauges rejected the update",
                self.sinks.len()
            );
        }
    }

    pub fn clear(&self) {
        for sink in &self.sinks {
            sink.clear();
        }
    }
}
