use crate::errors::{SkuDetailsError, TransportError};
use crate::metrics_defs::SERVICE_ERRORS;
use crate::protocol::{API_VERSION, ResponseCode, ServiceResponse, Sku};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Connection to the billing service.
///
/// Implementations own the transport: session lifecycle, wire format and any
/// per-call timeout. A call that cannot complete returns a [`TransportError`].
#[async_trait]
pub trait BillingService: Send + Sync {
    /// Fetch details for one batch of SKUs.
    ///
    /// Callers never pass more than
    /// [`MAX_BATCH_SIZE`](crate::batch::MAX_BATCH_SIZE) ids.
    async fn get_sku_details(
        &self,
        api_version: u32,
        package_name: &str,
        product: &str,
        skus: &[String],
    ) -> Result<ServiceResponse, TransportError>;
}

/// Decides whether a response is a business-level failure.
///
/// Returning `true` means the failure has already been reported through the
/// handler's own channel. Callers only use the value for control flow.
pub trait ErrorHandler: Send + Sync {
    fn handle_error(&self, response: &ServiceResponse) -> bool;
}

/// Converts a successful response into SKU details.
pub trait ResultParser: Send + Sync {
    fn parse(&self, response: &ServiceResponse, product: &str) -> Result<Vec<Sku>, SkuDetailsError>;
}

/// A failure reported by the billing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    pub code: ResponseCode,
}

/// Treats every non-`Ok` response code as an error.
///
/// Errors are logged and, if a listener is attached, forwarded to it.
#[derive(Clone, Default)]
pub struct ReportingErrorHandler {
    listener: Option<mpsc::UnboundedSender<ServiceError>>,
}

impl ReportingErrorHandler {
    pub fn new() -> Self {
        Self { listener: None }
    }

    pub fn with_listener(listener: mpsc::UnboundedSender<ServiceError>) -> Self {
        Self {
            listener: Some(listener),
        }
    }
}

impl ErrorHandler for ReportingErrorHandler {
    fn handle_error(&self, response: &ServiceResponse) -> bool {
        let code = response.code();
        if code == ResponseCode::Ok {
            return false;
        }

        tracing::error!(code = %code, "Billing service reported an error");
        crate::counter!(SERVICE_ERRORS, "code" => code.as_str()).increment(1);

        if let Some(listener) = &self.listener
            && listener.send(ServiceError { code }).is_err()
        {
            tracing::debug!("Error listener dropped, error not forwarded");
        }
        true
    }
}

/// Parses each `DETAILS_LIST` entry as a JSON SKU document.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonResultParser;

impl ResultParser for JsonResultParser {
    fn parse(&self, response: &ServiceResponse, product: &str) -> Result<Vec<Sku>, SkuDetailsError> {
        response
            .details_list
            .iter()
            .map(|json| Sku::from_json(json, product).map_err(SkuDetailsError::from))
            .collect()
    }
}

/// Everything a request needs to talk to the billing service.
#[derive(Clone)]
pub struct BillingContext {
    pub service: Arc<dyn BillingService>,
    pub error_handler: Arc<dyn ErrorHandler>,
    pub parser: Arc<dyn ResultParser>,
    pub api_version: u32,
    pub package_name: String,
}

impl BillingContext {
    /// Context using the reporting error handler and the JSON parser.
    pub fn new(service: Arc<dyn BillingService>, package_name: impl Into<String>) -> Self {
        Self {
            service,
            error_handler: Arc::new(ReportingErrorHandler::new()),
            parser: Arc::new(JsonResultParser),
            api_version: API_VERSION,
            package_name: package_name.into(),
        }
    }

    pub fn with_error_handler(mut self, error_handler: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = error_handler;
        self
    }

    pub fn with_parser(mut self, parser: Arc<dyn ResultParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_api_version(mut self, api_version: u32) -> Self {
        self.api_version = api_version;
        self
    }
}
