// SPDX-License-Identifier: AGPL-3.0-only
// Copyright Authors of rhmi-exporter

use crate::error::MetricsError;
use prometheus_client::encoding::{EncodeMetric, MetricEncoder};
use prometheus_client::registry::Registry;
use std::fmt;
use std::sync::Arc;

/// The identity of a gauge family: its name and the ordered label dimensions fixed at
/// registration.
#[derive(Clone, Debug)]
pub struct Descriptor {
    name: Arc<str>,
    dimensions: Arc<[&'static str]>,
}

impl Descriptor {
    fn new(name: &str, dimensions: &[&'static str]) -> Result<Self, MetricsError> {
        for (index, dimension) in dimensions.iter().enumerate() {
            if dimensions[..index].contains(dimension) {
                return Err(MetricsError::DuplicateDimension {
                    family: name.to_string(),
                    dimension: *dimension,
                });
            }
        }
        Ok(Self {
            name: name.into(),
            dimensions: dimensions.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimensions(&self) -> &[&'static str] {
        &self.dimensions
    }

    pub(crate) fn position(&self, dimension: &'static str) -> Result<usize, MetricsError> {
        self.dimensions
            .iter()
            .position(|candidate| *candidate == dimension)
            .ok_or_else(|| MetricsError::UnknownDimension {
                family: self.name.to_string(),
                dimension,
            })
    }

    /// Copies the label values of one series, making sure there is exactly one per dimension.
    pub(crate) fn label_values<V: AsRef<str>>(
        &self,
        values: &[V],
    ) -> Result<Vec<String>, MetricsError> {
        if values.len() != self.dimensions.len() {
            return Err(MetricsError::DimensionMismatch {
                family: self.name.to_string(),
                expected: self.dimensions.len(),
                actual: values.len(),
            });
        }
        Ok(values.iter().map(|value| value.as_ref().to_owned()).collect())
    }

    /// Writes one series of this family in the exposition format.
    pub(crate) fn encode_series(
        &self,
        encoder: &mut MetricEncoder,
        values: &[String],
        value: i64,
    ) -> Result<(), fmt::Error> {
        if self.dimensions.is_empty() {
            return encoder.encode_gauge(&value);
        }
        let labels: Vec<(String, String)> = self
            .dimensions
            .iter()
            .map(|dimension| dimension.to_string())
            .zip(values.iter().map(|value| escape_label_value(value)))
            .collect();
        encoder.encode_family(&labels)?.encode_gauge(&value)
    }
}

/// The text encoder writes label values verbatim, so `\\`, `"` and line feeds are escaped here.
fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// A kind of gauge family that can live in a [`MetricsRegistry`].
pub trait GaugeFamily: EncodeMetric + Clone + fmt::Debug + Send + Sync + 'static {
    fn new(descriptor: Descriptor) -> Self;

    fn descriptor(&self) -> &Descriptor;

    /// Returns a consistent copy of the family's series as (label values, value) pairs.
    fn series(&self) -> Vec<(Vec<String>, i64)>;
}

/// Object-safe view of a registered family used by [`MetricsRegistry::snapshot`].
trait SeriesSource: fmt::Debug + Send + Sync {
    fn descriptor(&self) -> &Descriptor;

    fn series(&self) -> Vec<(Vec<String>, i64)>;
}

impl<F: GaugeFamily> SeriesSource for F {
    fn descriptor(&self) -> &Descriptor {
        GaugeFamily::descriptor(self)
    }

    fn series(&self) -> Vec<(Vec<String>, i64)> {
        GaugeFamily::series(self)
    }
}

/// One exported series.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sample<'a> {
    pub family: &'a str,
    pub labels: Vec<(&'static str, String)>,
    pub value: i64,
}

impl Sample<'_> {
    pub fn label(&self, dimension: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(name, _)| *name == dimension)
            .map(|(_, value)| value.as_str())
    }
}

/// The process-wide table of gauge families.
///
/// Families are registered once during bootstrap. Afterwards the registry is only read, so it
/// can be shared behind an `Arc` while the handles returned by [`MetricsRegistry::register`]
/// are used to update the families.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    registry: Registry,
    families: Vec<Box<dyn SeriesSource>>,
}

impl MetricsRegistry {
    pub fn register<F: GaugeFamily>(
        &mut self,
        name: &str,
        help: &str,
        dimensions: &[&'static str],
    ) -> Result<F, MetricsError> {
        if self
            .families
            .iter()
            .any(|family| family.descriptor().name() == name)
        {
            return Err(MetricsError::DuplicateName(name.to_string()));
        }

        let family = F::new(Descriptor::new(name, dimensions)?);
        self.registry.register(name, help, family.clone());
        self.families.push(Box::new(family.clone()));
        Ok(family)
    }

    /// Lists the registered family names in registration order.
    pub fn family_names(&self) -> impl Iterator<Item = &str> {
        self.families.iter().map(|family| family.descriptor().name())
    }

    /// Returns every exported series, family by family in registration order.
    ///
    /// The iterator is lazy: a family is read when the iterator reaches it, under that family's
    /// lock, so each family is seen in a state produced by a complete update. No ordering is
    /// implied across families. Clone the iterator, or call this again, to start over.
    pub fn snapshot(&self) -> impl Iterator<Item = Sample<'_>> + Clone + '_ {
        self.families.iter().flat_map(|family| {
            let descriptor = family.descriptor();
            family
                .series()
                .into_iter()
                .map(move |(values, value)| Sample {
                    family: descriptor.name(),
                    labels: descriptor.dimensions().iter().copied().zip(values).collect(),
                    value,
                })
        })
    }

    /// Renders all families in the OpenMetrics text format.
    pub fn encode(&self) -> Result<String, fmt::Error> {
        let mut buffer = String::new();
        prometheus_client::encoding::text::encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }
}
