//! Metrics definitions for SKU details retrieval.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
}

#[derive(Debug, Clone, Copy)]
pub struct MetricDef {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub description: &'static str,
}

/// Counter for a [`MetricDef`], with optional `label => value` pairs.
#[macro_export]
macro_rules! counter {
    ($def:expr $(, $label:expr => $value:expr)* $(,)?) => {
        metrics::counter!($def.name $(, $label => $value)*)
    };
}

/// Histogram for a [`MetricDef`], with optional `label => value` pairs.
#[macro_export]
macro_rules! histogram {
    ($def:expr $(, $label:expr => $value:expr)* $(,)?) => {
        metrics::histogram!($def.name $(, $label => $value)*)
    };
}

pub const BATCH_CALLS: MetricDef = MetricDef {
    name: "sku_details.batch.calls",
    metric_type: MetricType::Counter,
    description: "Number of batch calls sent to the billing service. Tagged with product.",
};

pub const BATCH_DURATION: MetricDef = MetricDef {
    name: "sku_details.batch.duration",
    metric_type: MetricType::Histogram,
    description: "Duration of a single batch call in seconds",
};

pub const BATCH_SIZE: MetricDef = MetricDef {
    name: "sku_details.batch.size",
    metric_type: MetricType::Histogram,
    description: "Number of SKUs sent in a single batch call",
};

pub const REQUESTS: MetricDef = MetricDef {
    name: "sku_details.requests",
    metric_type: MetricType::Counter,
    description: "Finished SKU details requests. Tagged with outcome (completed, aborted, failed).",
};

pub const SERVICE_ERRORS: MetricDef = MetricDef {
    name: "sku_details.service_error",
    metric_type: MetricType::Counter,
    description: "Error responses reported by the billing service. Tagged with code.",
};

pub const CACHE_HIT: MetricDef = MetricDef {
    name: "sku_details.cache.hit",
    metric_type: MetricType::Counter,
    description: "Number of requests answered from the result cache",
};

pub const CACHE_MISS: MetricDef = MetricDef {
    name: "sku_details.cache.miss",
    metric_type: MetricType::Counter,
    description: "Number of cacheable requests that missed the result cache",
};

pub const ALL_METRICS: &[MetricDef] = &[
    BATCH_CALLS,
    BATCH_DURATION,
    BATCH_SIZE,
    REQUESTS,
    SERVICE_ERRORS,
    CACHE_HIT,
    CACHE_MISS,
];

/// Registers descriptions of all metrics with the installed recorder.
pub fn describe_metrics() {
    for def in ALL_METRICS {
        match def.metric_type {
            MetricType::Counter => metrics::describe_counter!(def.name, def.description),
            MetricType::Histogram => metrics::describe_histogram!(def.name, def.description),
        }
    }
}
