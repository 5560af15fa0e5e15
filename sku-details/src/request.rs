use crate::batch::BatchExecutor;
use crate::cache_key::derive_cache_key;
use crate::errors::Result;
use crate::metrics_defs::REQUESTS;
use crate::protocol::Skus;
use crate::service::BillingContext;
use std::fmt;

/// Outcome of a request that did not fail with an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome<T> {
    Completed(T),
    /// The billing service reported an error for the batch at `batch_index`.
    /// The error handler has already reported it; nothing is returned.
    Aborted { batch_index: usize },
}

impl<T> RequestOutcome<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            RequestOutcome::Completed(value) => Some(value),
            RequestOutcome::Aborted { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RequestOutcome<U> {
        match self {
            RequestOutcome::Completed(value) => RequestOutcome::Completed(f(value)),
            RequestOutcome::Aborted { batch_index } => RequestOutcome::Aborted { batch_index },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestType {
    GetSkuDetails,
}

impl RequestType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RequestType::GetSkuDetails => "get_sku_details",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requests that can be sent to the billing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    GetSkuDetails(GetSkuDetailsRequest),
}

/// Successful result of a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    SkuDetails(Skus),
}

impl Request {
    pub fn sku_details<I, S>(product: impl Into<String>, skus: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Request::GetSkuDetails(GetSkuDetailsRequest::new(product, skus))
    }

    pub fn request_type(&self) -> RequestType {
        match self {
            Request::GetSkuDetails(_) => RequestType::GetSkuDetails,
        }
    }

    pub async fn execute(&self, context: &BillingContext) -> Result<RequestOutcome<Response>> {
        match self {
            Request::GetSkuDetails(request) => Ok(request
                .execute(context)
                .await?
                .map(Response::SkuDetails)),
        }
    }

    /// Key identifying equivalent requests, `None` if the request must not be cached.
    pub fn cache_key(&self) -> Option<String> {
        match self {
            Request::GetSkuDetails(request) => Some(request.cache_key()),
        }
    }
}

/// Fetches details for any number of SKUs of one product type.
///
/// SKUs are sorted on construction. Duplicates are kept: they are sent to
/// the service and are part of the cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetSkuDetailsRequest {
    product: String,
    skus: Vec<String>,
}

impl GetSkuDetailsRequest {
    pub fn new<I, S>(product: impl Into<String>, skus: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut skus: Vec<String> = skus.into_iter().map(Into::into).collect();
        skus.sort();

        Self {
            product: product.into(),
            skus,
        }
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    /// SKUs in the order they are sent to the service.
    pub fn skus(&self) -> &[String] {
        &self.skus
    }

    pub async fn execute(&self, context: &BillingContext) -> Result<RequestOutcome<Skus>> {
        let result = BatchExecutor::new(context)
            .execute(&self.product, &self.skus)
            .await;

        let outcome = match &result {
            Ok(RequestOutcome::Completed(_)) => "completed",
            Ok(RequestOutcome::Aborted { .. }) => "aborted",
            Err(_) => "failed",
        };
        crate::counter!(REQUESTS, "outcome" => outcome).increment(1);
        tracing::debug!(
            product = %self.product,
            skus = self.skus.len(),
            outcome,
            "SKU details request finished"
        );

        result
    }

    pub fn cache_key(&self) -> String {
        derive_cache_key(&self.product, &self.skus)
    }
}
