// SPDX-License-Identifier: AGPL-3.0-only
// Copyright Authors of rhmi-exporter

use crate::server::args::ReconcilerConfig;
use crate::server::AppRuntime;
use chrono::Utc;
use color_eyre::eyre::Result;
use rhmi_common::models::InstallationState;
use rhmi_common::server::state::read_installation_state;
use rhmi_metrics::InstallationMetrics;
use std::time::Duration;
use tokio::select;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Periodically reads the installation state file and publishes it.
pub(crate) async fn main(runtime: AppRuntime, config: ReconcilerConfig) -> Result<()> {
    info!("starting reconciler");

    let mut interval = tokio::time::interval(Duration::from_secs(config.reconcile_interval));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Used in place of the creation timestamp for installations that do not carry one.
    let mut first_observed = None;

    loop {
        select! {
            _ = runtime.cancellation_token.cancelled() => {
                info!("shutting down reconciler");
                return Ok(());
            }
            _ = interval.tick() => {}
        }

        match read_installation_state(&config.state_file).await {
            Ok(state) => {
                let first_observed = *first_observed.get_or_insert_with(|| Utc::now().timestamp());
                debug! {
                    installation.name = state.installation.name,
                    installation.stage = state.installation.status.stage,
                    "publishing installation state"
                }
                publish(&runtime.metrics, &state, first_observed);
            }
            Err(error) => {
                warn! {
                    ?error,
                    path = config.state_file,
                    "unable to read the installation state"
                }
                runtime.metrics.set_status_available(false);
            }
        }
    }
}

pub(crate) fn publish(
    metrics: &InstallationMetrics,
    state: &InstallationState,
    first_observed: i64,
) {
    let installation = &state.installation;
    let status = &installation.status;

    metrics.set_info(installation);
    metrics.set_status(installation);
    let first_install_timestamp = installation
        .creation_timestamp
        .map(|timestamp| timestamp.timestamp())
        .unwrap_or(first_observed);
    metrics.set_versions(
        &status.stage,
        &status.version,
        &status.to_version,
        first_install_timestamp,
    );
    metrics.set_preflight_status(status.preflight_status);
    if status.quota.is_empty() {
        metrics.quota.clear();
    } else {
        metrics.set_quota(&status.stage, &status.quota, &status.to_quota);
    }
    metrics.set_threescale_user_actions(&state.user_actions);
    metrics.set_status_available(true);
}
