// SPDX-License-Identifier: AGPL-3.0-only
// Copyright Authors of rhmi-exporter

use crate::server::args::OpenMetricsConfig;
use crate::server::AppRuntime;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use color_eyre::eyre;
use color_eyre::eyre::Context;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

const OPENMETRICS_CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

pub(crate) fn router(runtime: AppRuntime) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(runtime)
}

pub(crate) async fn run_metrics_server(
    runtime: AppRuntime,
    args: OpenMetricsConfig,
) -> eyre::Result<()> {
    let cancellation_token = runtime.cancellation_token.clone();
    let app = router(runtime);

    let addr: SocketAddr = args
        .openmetrics_listen
        .parse()
        .context("unable to parse the listening address")?;
    let listener = TcpListener::bind(addr)
        .await
        .context("unable to start the openmetrics server, is the port taken?")?;

    info!("listening on {addr:?}");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancellation_token.cancelled().await;
        })
        .await
        .context("openmetrics server error")?;

    Ok(())
}

async fn metrics_handler(State(runtime): State<AppRuntime>) -> Response {
    match runtime.metrics_registry.encode() {
        Ok(buffer) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, OPENMETRICS_CONTENT_TYPE)],
            buffer,
        )
            .into_response(),
        Err(error) => {
            error! {
                ?error,
                "unable to encode metrics"
            }
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhmi_common::models::PreflightStatus;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn should_render_published_state() {
        let runtime = AppRuntime::new(CancellationToken::new()).unwrap();
        runtime.metrics.set_stage("complete");
        runtime.metrics.set_preflight_status(PreflightStatus::Success);

        let response = metrics_handler(State(runtime)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            OPENMETRICS_CONTENT_TYPE
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("\nrhmi_status{stage=\"complete\"} 1\n"));
        assert!(text.contains("\nrhmi_preflight_status{status=\"success\"} 1\n"));
        assert!(text.contains(&format!(
            "\nintegreatly_version_info{{operator_version=\"{0}\",version=\"{0}\"}} 1\n",
            env!("CARGO_PKG_VERSION")
        )));
    }

    #[tokio::test]
    async fn should_serve_on_ephemeral_port_until_cancelled() {
        let runtime = AppRuntime::new(CancellationToken::new()).unwrap();
        let cancellation_token = runtime.cancellation_token.clone();

        let server = tokio::spawn(run_metrics_server(
            runtime,
            OpenMetricsConfig {
                openmetrics_listen: "127.0.0.1:0".to_string(),
            },
        ));
        cancellation_token.cancel();

        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn should_reject_invalid_listen_address() {
        let runtime = AppRuntime::new(CancellationToken::new()).unwrap();

        let result = run_metrics_server(
            runtime,
            OpenMetricsConfig {
                openmetrics_listen: "not-an-address".to_string(),
            },
        )
        .await;

        assert!(result.is_err());
    }
}
