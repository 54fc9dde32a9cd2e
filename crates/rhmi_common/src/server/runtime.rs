// SPDX-License-Identifier: AGPL-3.0-only
// Copyright Authors of rhmi-exporter

use futures::future::select_all;
use futures::FutureExt;
use tokio::signal::unix::SignalKind;
use tokio::{signal, spawn};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Creates a token that is cancelled once the process receives SIGTERM or SIGINT.
pub fn create_shutdown_cancellation_token() -> CancellationToken {
    let cancellation_token = CancellationToken::new();
    let signal_cancellation_token = cancellation_token.clone();

    spawn(async move {
        let mut signals: Vec<signal::unix::Signal> = [
            signal::unix::signal(SignalKind::terminate()),
            signal::unix::signal(SignalKind::interrupt()),
        ]
        .into_iter()
        .filter_map(|maybe_signal| match maybe_signal {
            Ok(signal) => Some(signal),
            Err(error) => {
                error! {
                    ?error,
                    "unable to listen for shutdown signal"
                }
                None
            }
        })
        .collect();
        if signals.is_empty() {
            return;
        }

        let signal_futures = signals.iter_mut().map(|signal| signal.recv().boxed());
        select_all(signal_futures).await;

        info!("shutdown signal received");
        signal_cancellation_token.cancel();
    });
    cancellation_token
}
