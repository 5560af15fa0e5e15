use crate::errors::TransportError;
use crate::protocol::{ResponseCode, ServiceResponse};
use crate::service::{BillingService, ErrorHandler, ReportingErrorHandler};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// What the mock service does on a given call.
#[derive(Clone, Debug)]
pub enum MockReply {
    /// Answer with one details document per requested SKU
    Details,
    /// Answer with an error response code
    Error(ResponseCode),
    /// Fail the call itself
    Disconnect,
}

/// Billing service that records every batch it receives.
///
/// Calls answer with [`MockReply::Details`] unless another reply is scripted
/// for their index.
#[derive(Default)]
pub struct MockBillingService {
    calls: Mutex<Vec<Vec<String>>>,
    replies: HashMap<usize, MockReply>,
}

impl MockBillingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(mut self, call_index: usize, reply: MockReply) -> Self {
        self.replies.insert(call_index, reply);
        self
    }

    /// Batches received so far, in call order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.calls().iter().map(Vec::len).collect()
    }
}

pub fn sku_json(id: &str) -> String {
    serde_json::json!({
        "productId": id,
        "type": "inapp",
        "price": "$0.99",
        "price_amount_micros": 990000,
        "price_currency_code": "USD",
        "title": format!("Title of {id}"),
        "description": format!("Description of {id}"),
    })
    .to_string()
}

#[async_trait]
impl BillingService for MockBillingService {
    async fn get_sku_details(
        &self,
        _api_version: u32,
        _package_name: &str,
        _product: &str,
        skus: &[String],
    ) -> Result<ServiceResponse, TransportError> {
        let call_index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(skus.to_vec());
            calls.len() - 1
        };

        match self.replies.get(&call_index).unwrap_or(&MockReply::Details) {
            MockReply::Details => Ok(ServiceResponse::ok(
                skus.iter().map(|sku| sku_json(sku)).collect(),
            )),
            MockReply::Error(code) => Ok(ServiceResponse::error(*code)),
            MockReply::Disconnect => Err(TransportError::Disconnected(format!(
                "call {call_index} dropped"
            ))),
        }
    }
}

/// Error handler that counts how many responses it inspected.
#[derive(Default)]
pub struct CountingErrorHandler {
    inner: ReportingErrorHandler,
    inspected: AtomicUsize,
}

impl CountingErrorHandler {
    pub fn inspected(&self) -> usize {
        self.inspected.load(Ordering::SeqCst)
    }
}

impl ErrorHandler for CountingErrorHandler {
    fn handle_error(&self, response: &ServiceResponse) -> bool {
        self.inspected.fetch_add(1, Ordering::SeqCst);
        self.inner.handle_error(response)
    }
}

/// SKU ids `sku_00`, `sku_01`, ... in reverse order.
pub fn sku_ids(count: usize) -> Vec<String> {
    (0..count).rev().map(|i| format!("sku_{i:02}")).collect()
}
