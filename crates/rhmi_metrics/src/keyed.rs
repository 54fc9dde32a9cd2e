// SPDX-License-Identifier: AGPL-3.0-only
// Copyright Authors of rhmi-exporter

use crate::error::MetricsError;
use crate::registry::{Descriptor, GaugeFamily};
use parking_lot::RwLock;
use prometheus_client::encoding::{EncodeMetric, MetricEncoder};
use prometheus_client::metrics::MetricType;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A gauge family of independent series, e.g. one per (user, action) pair. Series stay until
/// the family is reset.
#[derive(Clone, Debug)]
pub struct KeyedGauge {
    descriptor: Descriptor,
    series: Arc<RwLock<BTreeMap<Vec<String>, i64>>>,
}

impl KeyedGauge {
    pub fn try_set<V: AsRef<str>>(
        &self,
        values: &[V],
        value: i64,
    ) -> Result<(), MetricsError> {
        let values = self.descriptor.label_values(values)?;
        self.series.write().insert(values, value);
        Ok(())
    }

    /// Inserts or updates one series without touching the others.
    ///
    /// # Panics
    ///
    /// Panics if the number of label values differs from the registered dimensions.
    pub fn set<V: AsRef<str>>(&self, values: &[V], value: i64) {
        if let Err(error) = self.try_set(values, value) {
            panic!("{error}");
        }
    }

    pub fn reset_all(&self) {
        self.series.write().clear();
    }

    /// Replaces every series with the given batch in one step. Nothing changes if any entry of
    /// the batch has the wrong number of label values.
    pub fn try_replace_all<K, V>(
        &self,
        batch: impl IntoIterator<Item = (K, i64)>,
    ) -> Result<(), MetricsError>
    where
        K: AsRef<[V]>,
        V: AsRef<str>,
    {
        let series = batch
            .into_iter()
            .map(|(values, value)| {
                self.descriptor
                    .label_values(values.as_ref())
                    .map(|values| (values, value))
            })
            .collect::<Result<BTreeMap<_, _>, MetricsError>>()?;
        *self.series.write() = series;
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if any entry has the wrong number of label values.
    pub fn replace_all<K, V>(&self, batch: impl IntoIterator<Item = (K, i64)>)
    where
        K: AsRef<[V]>,
        V: AsRef<str>,
    {
        if let Err(error) = self.try_replace_all(batch) {
            panic!("{error}");
        }
    }

    pub fn get<V: AsRef<str>>(&self, values: &[V]) -> Option<i64> {
        let key: Vec<String> = values.iter().map(|value| value.as_ref().to_owned()).collect();
        self.series.read().get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.series.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.read().is_empty()
    }
}

impl GaugeFamily for KeyedGauge {
    fn new(descriptor: Descriptor) -> Self {
        Self {
            descriptor,
            series: Default::default(),
        }
    }

    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn series(&self) -> Vec<(Vec<String>, i64)> {
        self.series
            .read()
            .iter()
            .map(|(values, value)| (values.clone(), *value))
            .collect()
    }
}

impl EncodeMetric for KeyedGauge {
    fn encode(&self, mut encoder: MetricEncoder) -> Result<(), fmt::Error> {
        let series = self.series.read();
        for (values, value) in series.iter() {
            self.descriptor.encode_series(&mut encoder, values, *value)?;
        }
        Ok(())
    }

    fn metric_type(&self) -> MetricType {
        MetricType::Gauge
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MetricsRegistry;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    fn user_actions(registry: &mut MetricsRegistry) -> KeyedGauge {
        registry
            .register::<KeyedGauge>(
                "threescale_user_action",
                "Status of user CRUD action in 3scale",
                &["username", "action"],
            )
            .unwrap()
    }

    #[test]
    fn should_keep_independent_series() {
        let mut registry = MetricsRegistry::default();
        let actions = user_actions(&mut registry);

        actions.set(&["alice", "create"], 201);
        actions.set(&["alice", "update"], 409);

        assert_eq!(actions.get(&["alice", "create"]), Some(201));
        assert_eq!(actions.get(&["alice", "update"]), Some(409));
        assert_eq!(registry.snapshot().count(), 2);
    }

    #[test]
    fn should_overwrite_same_key() {
        let mut registry = MetricsRegistry::default();
        let actions = user_actions(&mut registry);

        actions.set(&["alice", "create"], 500);
        actions.set(&["alice", "create"], 201);

        assert_eq!(actions.len(), 1);
        assert_eq!(actions.get(&["alice", "create"]), Some(201));
    }

    #[test]
    fn should_remove_everything_on_reset() {
        let mut registry = MetricsRegistry::default();
        let actions = user_actions(&mut registry);
        actions.set(&["alice", "create"], 201);
        actions.set(&["bob", "delete"], 200);

        actions.reset_all();

        assert!(actions.is_empty());
        assert_eq!(registry.snapshot().count(), 0);
    }

    #[test]
    fn should_replace_whole_batch() {
        let mut registry = MetricsRegistry::default();
        let actions = user_actions(&mut registry);
        actions.set(&["alice", "create"], 201);

        actions.replace_all([(["bob", "create"], 201), (["bob", "delete"], 404)]);

        assert_eq!(actions.get(&["alice", "create"]), None);
        assert_eq!(actions.get(&["bob", "create"]), Some(201));
        assert_eq!(actions.get(&["bob", "delete"]), Some(404));
    }

    #[test]
    fn should_leave_family_untouched_on_invalid_batch() {
        let mut registry = MetricsRegistry::default();
        let actions = user_actions(&mut registry);
        actions.set(&["alice", "create"], 201);

        let result = actions.try_replace_all([
            (vec!["bob", "create"], 201),
            (vec!["bob"], 404),
        ]);

        assert_eq!(
            result.unwrap_err(),
            MetricsError::DimensionMismatch {
                family: "threescale_user_action".to_string(),
                expected: 2,
                actual: 1,
            }
        );
        assert_eq!(actions.len(), 1);
        assert_eq!(actions.get(&["alice", "create"]), Some(201));
    }

    #[test]
    #[should_panic(expected = "expects 2 label values, got 3")]
    fn should_panic_on_wrong_dimension_count() {
        let mut registry = MetricsRegistry::default();
        let actions = user_actions(&mut registry);

        actions.set(&["alice", "create", "extra"], 201);
    }

    #[test]
    fn should_encode_every_series() {
        let mut registry = MetricsRegistry::default();
        let actions = user_actions(&mut registry);
        actions.set(&["alice", "create"], 201);
        actions.set(&["bob", "delete"], 404);

        let text = registry.encode().unwrap();
        assert!(text.contains(
            "\nthreescale_user_action{username=\"alice\",action=\"create\"} 201\n"
        ));
        assert!(text.contains(
            "\nthreescale_user_action{username=\"bob\",action=\"delete\"} 404\n"
        ));
    }

    #[test]
    fn should_escape_label_values() {
        let mut registry = MetricsRegistry::default();
        let actions = user_actions(&mut registry);

        actions.set(&["a\"b\\c\nd", "create"], 201);

        let text = registry.encode().unwrap();
        assert!(text.contains(
            "\nthreescale_user_action{username=\"a\\\"b\\\\c\\nd\",action=\"create\"} 201\n"
        ));
        // Snapshots keep the raw values.
        let sample = registry.snapshot().next().unwrap();
        assert_eq!(sample.label("username"), Some("a\"b\\c\nd"));
    }

    #[test]
    fn should_never_expose_partial_batch_under_concurrent_replace() {
        let mut registry = MetricsRegistry::default();
        let actions = user_actions(&mut registry);
        let first = vec![
            (["alice".to_string(), "create".to_string()], 201),
            (["alice".to_string(), "update".to_string()], 200),
        ];
        let second = vec![(["bob".to_string(), "delete".to_string()], 404)];
        actions.replace_all(first.clone());

        let expected = |batch: &[([String; 2], i64)]| -> Vec<(String, String, i64)> {
            batch
                .iter()
                .map(|([username, action], value)| (username.clone(), action.clone(), *value))
                .collect()
        };
        let batches = [expected(&first), expected(&second)];

        let done = AtomicBool::new(false);
        thread::scope(|scope| {
            let reader = scope.spawn(|| {
                let mut observations = 0;
                loop {
                    let finished = done.load(Ordering::Acquire);
                    let observed: Vec<_> = registry
                        .snapshot()
                        .filter(|sample| sample.family == "threescale_user_action")
                        .map(|sample| {
                            (
                                sample.label("username").unwrap().to_string(),
                                sample.label("action").unwrap().to_string(),
                                sample.value,
                            )
                        })
                        .collect();
                    assert!(batches.contains(&observed), "observed {observed:?}");
                    observations += 1;
                    if finished {
                        return observations;
                    }
                }
            });

            let writer = scope.spawn(|| {
                for round in 0..1000 {
                    if round % 2 == 0 {
                        actions.replace_all(second.clone());
                    } else {
                        actions.replace_all(first.clone());
                    }
                }
            });
            writer.join().unwrap();
            done.store(true, Ordering::Release);
            assert!(reader.join().unwrap() > 0);
        });

        assert_eq!(actions.len(), 2);
    }

    #[test]
    fn should_keep_all_concurrent_writes() {
        let mut registry = MetricsRegistry::default();
        let actions = user_actions(&mut registry);

        thread::scope(|scope| {
            for user in 0..4 {
                let actions = actions.clone();
                scope.spawn(move || {
                    for action in 0..100 {
                        actions.set(&[format!("user-{user}"), format!("action-{action}")], 200);
                    }
                });
            }
        });

        assert_eq!(actions.len(), 400);
        assert_eq!(registry.snapshot().count(), 400);
    }
}
