//! Metrics definitions for the redirect handlers.

use shared::metrics_defs::{MetricDef, MetricType};

pub const REDIRECT_HIT: MetricDef = MetricDef {
    name: "redirect.hit",
    metric_type: MetricType::Counter,
    description: "Number of requests answered with a redirect",
};

pub const REDIRECT_MISS: MetricDef = MetricDef {
    name: "redirect.miss",
    metric_type: MetricType::Counter,
    description: "Number of requests passed on to the fallback handler",
};

pub const STORE_QUERY_DURATION: MetricDef = MetricDef {
    name: "store.query.duration",
    metric_type: MetricType::Histogram,
    description: "Time to fetch all redirects from the record store in seconds",
};

pub const STORE_QUERY_FAILURE: MetricDef = MetricDef {
    name: "store.query.failure",
    metric_type: MetricType::Counter,
    description: "Number of record store queries that failed",
};

pub const ALL_METRICS: &[MetricDef] = &[
    REDIRECT_HIT,
    REDIRECT_MISS,
    STORE_QUERY_DURATION,
    STORE_QUERY_FAILURE,
];
