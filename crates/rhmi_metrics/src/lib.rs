// SPDX-License-Identifier: AGPL-3.0-only
// Copyright Authors of rhmi-exporter

//! Publishes the controller's current state as gauge series.
//!
//! State families that can only hold one value at a time (stage, version, preflight, quota)
//! are backed by a [`LatchedGauge`], which swaps its single active series under one lock so
//! a scrape never observes a family with zero or two active series in the middle of an
//! update. Independent facts are backed by a [`KeyedGauge`].

pub mod error;
pub mod keyed;
pub mod latched;
pub mod publisher;
pub mod registry;

pub use error::MetricsError;
pub use keyed::KeyedGauge;
pub use latched::{LatchedGauge, Mirrored};
pub use publisher::InstallationMetrics;
pub use registry::{GaugeFamily, MetricsRegistry, Sample};
