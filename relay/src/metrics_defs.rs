use shared::metrics_defs::{MetricDef, MetricType};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "request.duration",
    metric_type: MetricType::Histogram,
    description: "Profile lookup duration in seconds. Tagged with status.",
};

pub const REQUESTS_INFLIGHT: MetricDef = MetricDef {
    name: "requests.inflight",
    metric_type: MetricType::Gauge,
    description: "Number of profile lookups currently being processed",
};

pub const UPSTREAM_ERRORS: MetricDef = MetricDef {
    name: "upstream.errors",
    metric_type: MetricType::Counter,
    description: "Number of failed profile lookups. Tagged with error.",
};

pub const ALL_METRICS: &[MetricDef] = &[REQUEST_DURATION, REQUESTS_INFLIGHT, UPSTREAM_ERRORS];
