//! Sequential batch execution against the billing service.
//!
//! The SKU list is cut into consecutive batches of at most [`MAX_BATCH_SIZE`]
//! ids. Batches are sent one at a time, in order:
//!
//! ```text
//! Pending -> Executing(0) -> Executing(1) -> ... -> Completed
//!                 |               |
//!                 +---------------+--> Aborted   (service reported an error)
//!                 +---------------+--> Err(..)   (transport or parse failure)
//! ```
//!
//! Details of finished batches are only returned once every batch succeeded.
//! An abort or an error drops everything collected so far.

use crate::errors::Result;
use crate::metrics_defs::{BATCH_CALLS, BATCH_DURATION, BATCH_SIZE};
use crate::protocol::{Sku, Skus};
use crate::request::RequestOutcome;
use crate::service::BillingContext;
use std::ops::ControlFlow;
use std::time::Instant;

/// Maximum number of SKU ids the billing service accepts in one call.
///
/// This is an undocumented limit of the platform, not a tunable: larger
/// batches are rejected by the service. 20 matches the platform's own samples.
pub const MAX_BATCH_SIZE: usize = 20;

/// Splits a SKU list into consecutive batches of at most [`MAX_BATCH_SIZE`].
///
/// Every batch but the last is full. An empty list yields no batches.
pub fn split_batches(skus: &[String]) -> std::slice::Chunks<'_, String> {
    skus.chunks(MAX_BATCH_SIZE)
}

/// Sends the batches of one request and aggregates their details.
pub struct BatchExecutor<'a> {
    context: &'a BillingContext,
}

impl<'a> BatchExecutor<'a> {
    pub fn new(context: &'a BillingContext) -> Self {
        Self { context }
    }

    /// Runs every batch of `skus` in order.
    ///
    /// Returns `Completed` with details in batch order when all batches
    /// succeed, `Aborted` at the first batch the error handler flags, and an
    /// error as soon as a call or a parse fails.
    pub async fn execute(&self, product: &str, skus: &[String]) -> Result<RequestOutcome<Skus>> {
        let mut details = Vec::with_capacity(skus.len());

        for (batch_index, batch) in split_batches(skus).enumerate() {
            match self.execute_batch(product, batch_index, batch).await? {
                ControlFlow::Continue(batch_details) => details.extend(batch_details),
                ControlFlow::Break(()) => {
                    tracing::debug!(
                        product,
                        batch_index,
                        discarded = details.len(),
                        "Service error, aborting request"
                    );
                    return Ok(RequestOutcome::Aborted { batch_index });
                }
            }
        }

        Ok(RequestOutcome::Completed(Skus::new(product, details)))
    }

    /// Sends a single batch.
    ///
    /// Breaks when the response is a service error, which the error handler
    /// has already reported.
    async fn execute_batch(
        &self,
        product: &str,
        batch_index: usize,
        batch: &[String],
    ) -> Result<ControlFlow<(), Vec<Sku>>> {
        assert!(
            batch.len() <= MAX_BATCH_SIZE,
            "SKU batch of {} exceeds the limit of {MAX_BATCH_SIZE}",
            batch.len()
        );

        crate::counter!(BATCH_CALLS, "product" => product.to_string()).increment(1);
        crate::histogram!(BATCH_SIZE).record(batch.len() as f64);

        let started = Instant::now();
        let response = self
            .context
            .service
            .get_sku_details(
                self.context.api_version,
                &self.context.package_name,
                product,
                batch,
            )
            .await;
        crate::histogram!(BATCH_DURATION).record(started.elapsed().as_secs_f64());

        let response = response.inspect_err(|e| {
            tracing::error!(product, batch_index, error = %e, "Billing service call failed");
        })?;

        if self.context.error_handler.handle_error(&response) {
            return Ok(ControlFlow::Break(()));
        }

        let batch_details = self.context.parser.parse(&response, product)?;
        Ok(ControlFlow::Continue(batch_details))
    }
}
