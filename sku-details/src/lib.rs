//! Fetches SKU details from a billing service that accepts only a few SKUs
//! per call.
//!
//! A [`GetSkuDetailsRequest`] sorts its SKUs, sends them in batches of at most
//! [`MAX_BATCH_SIZE`](batch::MAX_BATCH_SIZE), and returns the details of all
//! batches together, or nothing if any batch fails. Its cache key does not
//! depend on the order the SKUs were given in.

pub mod batch;
pub mod cache;
pub mod cache_key;
pub mod config;
pub mod errors;
pub mod http_service;
pub mod metrics_defs;
pub mod protocol;
pub mod request;
pub mod service;

#[cfg(test)]
mod testutils;

pub use cache::BillingClient;
pub use errors::{Result, SkuDetailsError, TransportError};
pub use protocol::{Sku, Skus};
pub use request::{GetSkuDetailsRequest, Request, RequestOutcome, RequestType, Response};
pub use service::{BillingContext, BillingService, ErrorHandler, ResultParser};
