//! Transport event hooks for diagnostics.
//!
//! A `TransportObserver` sees every phase of a search request in order:
//! response headers, each body chunk, the collected metrics, and the
//! completion. Observers only record; they never influence the result.

use std::fmt::Debug;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use url::Url;

/// Response headers were received.
#[derive(Debug, Clone, Copy)]
pub struct ResponseEvent<'a> {
    /// Request URL (includes the API key).
    pub url: &'a Url,
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: &'a HeaderMap,
}

/// A body chunk was received.
#[derive(Debug, Clone, Copy)]
pub struct DataEvent<'a> {
    /// Request URL (includes the API key).
    pub url: &'a Url,
    /// Raw chunk bytes.
    pub chunk: &'a [u8],
    /// Total bytes received so far, including this chunk.
    pub received: usize,
}

/// The request finished, successfully or not.
#[derive(Debug, Clone, Copy)]
pub struct CompletionEvent<'a> {
    /// Request URL (includes the API key).
    pub url: &'a Url,
    /// Transport error, if the request did not complete normally.
    pub error: Option<&'a reqwest::Error>,
}

/// Timing and volume collected over the lifetime of a request.
#[derive(Debug, Clone, Copy)]
pub struct TaskMetrics<'a> {
    /// Request URL (includes the API key).
    pub url: &'a Url,
    /// HTTP status code, if headers were received.
    pub status: Option<u16>,
    /// Time from dispatch until headers were received.
    pub time_to_headers: Option<Duration>,
    /// Time from dispatch until the request finished.
    pub elapsed: Duration,
    /// Body bytes received.
    pub bytes_received: usize,
    /// Body chunks received.
    pub chunks_received: usize,
}

/// Receives raw transport events of a search request.
///
/// Hooks are called in order: `on_response`, zero or more `on_data`,
/// `on_metrics`, `on_complete`. `on_response` and `on_data` are skipped
/// when the transport fails before reaching them.
pub trait TransportObserver: Send + Sync + Debug {
    /// Called once response headers are available.
    fn on_response(&self, event: &ResponseEvent<'_>);

    /// Called for each body chunk.
    fn on_data(&self, event: &DataEvent<'_>);

    /// Called with the collected metrics before completion.
    fn on_metrics(&self, metrics: &TaskMetrics<'_>);

    /// Called last, with the transport error if any.
    fn on_complete(&self, event: &CompletionEvent<'_>);
}

/// Default observer: emits `tracing` events, and OpenTelemetry
/// instruments when the `otel` feature is enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TransportObserver for TracingObserver {
    fn on_response(&self, event: &ResponseEvent<'_>) {
        tracing::debug!(
            url = %redact_api_key(event.url),
            status = %event.status,
            "Response headers received"
        );
        tracing::trace!(headers = ?event.headers, "Response headers");
    }

    fn on_data(&self, event: &DataEvent<'_>) {
        tracing::trace!(
            chunk_len = event.chunk.len(),
            received = event.received,
            "Response body chunk received"
        );
    }

    fn on_metrics(&self, metrics: &TaskMetrics<'_>) {
        tracing::debug!(
            status = ?metrics.status,
            time_to_headers = ?metrics.time_to_headers,
            elapsed = ?metrics.elapsed,
            bytes = metrics.bytes_received,
            chunks = metrics.chunks_received,
            "Request metrics"
        );

        #[cfg(feature = "otel")]
        otel::record(metrics);
    }

    fn on_complete(&self, event: &CompletionEvent<'_>) {
        if let Some(error) = event.error {
            tracing::warn!(
                url = %redact_api_key(event.url),
                error = %error,
                "Search request failed"
            );
        } else {
            tracing::debug!(url = %redact_api_key(event.url), "Search request completed");
        }
    }
}

/// Renders `url` with the `api_key` query value masked.
///
/// Other parameters keep their encoding as sent.
#[must_use]
pub fn redact_api_key(url: &Url) -> String {
    let Some(query) = url.query() else {
        return url.to_string();
    };

    let redacted_query = query
        .split('&')
        .map(|pair| {
            if pair.starts_with("api_key=") {
                "api_key=***"
            } else {
                pair
            }
        })
        .collect::<Vec<_>>()
        .join("&");

    let mut redacted = url.clone();
    redacted.set_query(Some(&redacted_query));
    redacted.to_string()
}

#[cfg(feature = "otel")]
mod otel {
    use std::sync::OnceLock;

    use opentelemetry::KeyValue;
    use opentelemetry::metrics::Histogram;
    use opentelemetry_semantic_conventions::{attribute, metric};

    use super::TaskMetrics;

    struct Instruments {
        duration: Histogram<f64>,
        body_size: Histogram<u64>,
    }

    fn instruments() -> &'static Instruments {
        static INSTRUMENTS: OnceLock<Instruments> = OnceLock::new();
        INSTRUMENTS.get_or_init(|| {
            let meter = opentelemetry::global::meter(env!("CARGO_PKG_NAME"));
            Instruments {
                duration: meter
                    .f64_histogram(metric::HTTP_CLIENT_REQUEST_DURATION)
                    .with_unit("s")
                    .build(),
                body_size: meter
                    .u64_histogram(metric::HTTP_CLIENT_RESPONSE_BODY_SIZE)
                    .with_unit("By")
                    .build(),
            }
        })
    }

    pub(super) fn record(metrics: &TaskMetrics<'_>) {
        let attributes: Vec<KeyValue> = metrics
            .status
            .map(|status| {
                vec![KeyValue::new(
                    attribute::HTTP_RESPONSE_STATUS_CODE,
                    i64::from(status),
                )]
            })
            .unwrap_or_default();

        let instruments = instruments();
        instruments
            .duration
            .record(metrics.elapsed.as_secs_f64(), &attributes);
        instruments.body_size.record(
            u64::try_from(metrics.bytes_received).unwrap_or(u64::MAX),
            &attributes,
        );
    }
}
