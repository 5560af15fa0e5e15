//! Billing service reached over HTTP.
//!
//! Each batch is a `POST {url}/v{api_version}/sku-details` with a JSON
//! [`SkuDetailsQuery`] body. The service answers with a JSON
//! [`ServiceResponse`]. Anything that keeps the call from producing such a
//! response (connection failure, timeout, non-2xx status, undecodable body)
//! is a [`TransportError`].

use crate::config::ServiceConfig;
use crate::errors::TransportError;
use crate::protocol::{ServiceResponse, SkuDetailsQuery};
use crate::service::BillingService;
use async_trait::async_trait;
use url::Url;

pub struct HttpBillingService {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBillingService {
    pub fn new(config: &ServiceConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.url.clone(),
        })
    }

    fn endpoint(&self, api_version: u32) -> String {
        format!(
            "{}/v{api_version}/sku-details",
            self.base_url.as_str().trim_end_matches('/')
        )
    }
}

#[async_trait]
impl BillingService for HttpBillingService {
    async fn get_sku_details(
        &self,
        api_version: u32,
        package_name: &str,
        product: &str,
        skus: &[String],
    ) -> Result<ServiceResponse, TransportError> {
        let query = SkuDetailsQuery {
            package_name: package_name.to_string(),
            product: product.to_string(),
            item_ids: skus.to_vec(),
        };

        let response = self
            .client
            .post(self.endpoint(api_version))
            .json(&query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TransportError::UnexpectedStatus(response.status()));
        }

        Ok(response.json::<ServiceResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ResponseCode;
    use crate::request::{GetSkuDetailsRequest, RequestOutcome};
    use crate::service::BillingContext;
    use crate::testutils::{sku_ids, sku_json};
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::net::TcpListener;

    async fn sku_details(
        State(calls): State<Arc<AtomicUsize>>,
        Json(query): Json<SkuDetailsQuery>,
    ) -> Json<ServiceResponse> {
        calls.fetch_add(1, Ordering::SeqCst);
        if query.package_name == "com.example.unknown" {
            return Json(ServiceResponse::error(ResponseCode::DeveloperError));
        }
        Json(ServiceResponse::ok(
            query.item_ids.iter().map(|id| sku_json(id)).collect(),
        ))
    }

    async fn spawn_server(app: Router) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/")).unwrap()
    }

    fn service_config(url: Url) -> ServiceConfig {
        ServiceConfig {
            url,
            timeout_secs: Some(5),
        }
    }

    #[tokio::test]
    async fn test_request_over_http() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/v3/sku-details", post(sku_details))
            .with_state(calls.clone());
        let url = spawn_server(app).await;

        let service = HttpBillingService::new(&service_config(url)).unwrap();
        let context = BillingContext::new(Arc::new(service), "com.example.app");

        let request = GetSkuDetailsRequest::new("inapp", sku_ids(25));
        let skus = request.execute(&context).await.unwrap().completed().unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(skus.len(), 25);
        assert_eq!(skus.list[0].id, "sku_00");
        assert_eq!(skus.list[0].detailed_price.currency, "USD");
    }

    #[tokio::test]
    async fn test_service_error_response() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/v3/sku-details", post(sku_details))
            .with_state(calls.clone());
        let url = spawn_server(app).await;

        let service = HttpBillingService::new(&service_config(url)).unwrap();
        let context = BillingContext::new(Arc::new(service), "com.example.unknown");

        let outcome = GetSkuDetailsRequest::new("inapp", sku_ids(25))
            .execute(&context)
            .await
            .unwrap();

        assert_eq!(outcome, RequestOutcome::Aborted { batch_index: 0 });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unexpected_status() {
        let app = Router::new().route(
            "/v3/sku-details",
            post(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
        let url = spawn_server(app).await;

        let service = HttpBillingService::new(&service_config(url)).unwrap();
        let result = service
            .get_sku_details(3, "com.example.app", "inapp", &sku_ids(1))
            .await;

        assert!(matches!(
            result,
            Err(TransportError::UnexpectedStatus(status)) if status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        ));
    }

    #[tokio::test]
    async fn test_timeout_is_a_transport_error() {
        let app = Router::new().route(
            "/v3/sku-details",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                StatusCode::OK
            }),
        );
        let url = spawn_server(app).await;

        let config = ServiceConfig {
            url,
            timeout_secs: Some(1),
        };
        let service = HttpBillingService::new(&config).unwrap();
        let result = service
            .get_sku_details(3, "com.example.app", "inapp", &sku_ids(1))
            .await;

        assert!(matches!(result, Err(TransportError::Http(e)) if e.is_timeout()));
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let config = service_config(Url::parse("http://localhost:1").unwrap());
        let service = HttpBillingService::new(&config).unwrap();

        let result = service
            .get_sku_details(3, "com.example.app", "inapp", &sku_ids(1))
            .await;

        assert!(matches!(result, Err(TransportError::Http(_))));
    }

    #[test]
    fn test_endpoint() {
        let config = service_config(Url::parse("http://billing.example.com/api/").unwrap());
        let service = HttpBillingService::new(&config).unwrap();
        assert_eq!(
            service.endpoint(3),
            "http://billing.example.com/api/v3/sku-details"
        );
    }
}
