use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
};

/// Process metrics, all registered on a private registry.
///
/// Cheap to clone: every collector is reference counted internally.
#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_total_by_route: IntCounterVec,
    pub http_request_duration_seconds_by_route: HistogramVec,

    pub auth_flows_started_total: IntCounter,
    pub auth_flows_completed_total: IntCounter,
    pub auth_flows_failed_total: IntCounterVec,

    pub upstream_requests_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            IntCounter::new("http_requests_total", "Total number of HTTP requests")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let http_requests_total_by_route = IntCounterVec::new(
            Opts::new(
                "http_requests_by_route_total",
                "HTTP requests by method, route and status",
            ),
            &["method", "route", "status"],
        )?;
        let http_request_duration_seconds_by_route = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_by_route_seconds",
                "HTTP request latency by method, route and status",
            ),
            &["method", "route", "status"],
        )?;

        let auth_flows_started_total = IntCounter::new(
            "dropbox_auth_flows_started_total",
            "Authorization flows started (redirects issued)",
        )?;
        let auth_flows_completed_total = IntCounter::new(
            "dropbox_auth_flows_completed_total",
            "Authorization flows that produced an access token",
        )?;
        let auth_flows_failed_total = IntCounterVec::new(
            Opts::new(
                "dropbox_auth_flows_failed_total",
                "Authorization flows that failed, by error code",
            ),
            &["error"],
        )?;

        let upstream_requests_total = IntCounterVec::new(
            Opts::new(
                "dropbox_upstream_requests_total",
                "Storage API calls by operation and outcome",
            ),
            &["operation", "outcome"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_total_by_route.clone()))?;
        registry.register(Box::new(http_request_duration_seconds_by_route.clone()))?;
        registry.register(Box::new(auth_flows_started_total.clone()))?;
        registry.register(Box::new(auth_flows_completed_total.clone()))?;
        registry.register(Box::new(auth_flows_failed_total.clone()))?;
        registry.register(Box::new(upstream_requests_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_total_by_route,
            http_request_duration_seconds_by_route,
            auth_flows_started_total,
            auth_flows_completed_total,
            auth_flows_failed_total,
            upstream_requests_total,
        })
    }
}
