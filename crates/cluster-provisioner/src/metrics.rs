// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Prometheus metrics.
//!
//! Metrics are recorded through the `metrics` facade and rendered in the
//! Prometheus text format by `GET /v1/docdb/metrics`. Until [`install`] runs,
//! every counter is a no-op.

use std::sync::OnceLock;
use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use metrics::{Unit, counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::error::{Error, Result};

/// HTTP requests served, by method, route and status.
pub const HTTP_REQUESTS_TOTAL: &str = "provisioner_http_requests_total";
/// HTTP request latency, by method and route.
pub const HTTP_REQUEST_DURATION: &str = "provisioner_http_request_duration_seconds";
/// Cluster create requests, by outcome.
pub const CLUSTER_CREATES_TOTAL: &str = "provisioner_cluster_creates_total";
/// Finished convergence tasks, by outcome.
pub const CONVERGENCE_TOTAL: &str = "provisioner_convergence_total";

/// Content type of the rendered exposition.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Route label of requests that matched no route.
const UNMATCHED_ROUTE: &str = "unmatched";

static RECORDER: OnceLock<std::result::Result<PrometheusHandle, String>> = OnceLock::new();

/// Install the process-wide Prometheus recorder and return a handle for
/// rendering. Later calls return the same handle.
pub fn install() -> Result<PrometheusHandle> {
    RECORDER
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            metrics::set_global_recorder(recorder)
                .map_err(|_| "another metrics recorder is already installed".to_string())?;
            describe();
            Ok(handle)
        })
        .clone()
        .map_err(Error::Internal)
}

fn describe() {
    describe_counter!(HTTP_REQUESTS_TOTAL, "HTTP requests served");
    describe_histogram!(
        HTTP_REQUEST_DURATION,
        Unit::Seconds,
        "HTTP request latency"
    );
    describe_counter!(CLUSTER_CREATES_TOTAL, "Cluster create requests by outcome");
    describe_counter!(CONVERGENCE_TOTAL, "Finished convergence tasks by outcome");
}

/// Record request count and latency per matched route.
pub async fn track_requests(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16().to_string();
    histogram!(HTTP_REQUEST_DURATION, "method" => method.clone(), "route" => route.clone())
        .record(start.elapsed().as_secs_f64());
    counter!(HTTP_REQUESTS_TOTAL, "method" => method, "route" => route, "status" => status)
        .increment(1);

    response
}

/// Count a create request by its outcome: `accepted` or the error kind.
pub(crate) fn record_create(outcome: &'static str) {
    counter!(CLUSTER_CREATES_TOTAL, "outcome" => outcome).increment(1);
}

/// Count a finished convergence task.
pub(crate) fn record_convergence(outcome: &'static str) {
    counter!(CONVERGENCE_TOTAL, "outcome" => outcome).increment(1);
}
