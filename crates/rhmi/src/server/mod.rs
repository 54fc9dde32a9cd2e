// SPDX-License-Identifier: AGPL-3.0-only
// Copyright Authors of rhmi-exporter

use color_eyre::eyre::{self, Context};
use rhmi_common::server::runtime::create_shutdown_cancellation_token;
use rhmi_metrics::{InstallationMetrics, MetricsRegistry};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub(crate) mod args;
mod metrics;
mod reconciler;

/// Common state for components
#[derive(Clone)]
pub(crate) struct AppRuntime {
    pub metrics_registry: Arc<MetricsRegistry>,
    pub metrics: InstallationMetrics,
    pub cancellation_token: CancellationToken,
}

impl AppRuntime {
    pub(crate) fn new(cancellation_token: CancellationToken) -> eyre::Result<Self> {
        let mut registry = MetricsRegistry::default();
        let metrics = InstallationMetrics::register(&mut registry)
            .context("unable to register the metric families")?;
        metrics.set_operator_version(env!("CARGO_PKG_VERSION"));

        Ok(Self {
            metrics_registry: Arc::new(registry),
            metrics,
            cancellation_token,
        })
    }
}

pub(crate) async fn main(args: args::Args) -> eyre::Result<()> {
    let runtime = AppRuntime::new(create_shutdown_cancellation_token())?;

    info!("starting components");
    let mut set = JoinSet::new();

    if args.components.enable_server {
        set.spawn(metrics::run_metrics_server(runtime.clone(), args.metrics));
    }
    if args.components.enable_reconciler {
        set.spawn(reconciler::main(runtime.clone(), args.reconciler));
    }

    if set.is_empty() {
        warn!("no components enabled, see --help for a list of components");
    }

    while let Some(res) = set.join_next().await {
        // Propagate error
        res??;
    }

    Ok(())
}
