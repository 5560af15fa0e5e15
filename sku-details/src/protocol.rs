//! Protocol types for the billing service's SKU details call (API v3).
//!
//! A request carries the package name, the product type and at most
//! [`MAX_BATCH_SIZE`](crate::batch::MAX_BATCH_SIZE) SKU ids. The response is a
//! response code plus a list of JSON documents, one per known SKU.
//!
//! # Example response
//! ```json
//! {
//!   "RESPONSE_CODE": 0,
//!   "DETAILS_LIST": [
//!     "{\"productId\":\"coins_100\",\"type\":\"inapp\",\"price\":\"$0.99\",...}"
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Billing API version used when none is configured.
pub const API_VERSION: u32 = 3;

/// Body sent to the billing service for one batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkuDetailsQuery {
    #[serde(rename = "packageName")]
    pub package_name: String,

    #[serde(rename = "type")]
    pub product: String,

    #[serde(rename = "ITEM_ID_LIST")]
    pub item_ids: Vec<String>,
}

/// Raw response of the billing service for one batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceResponse {
    #[serde(rename = "RESPONSE_CODE")]
    pub response_code: i32,

    /// One JSON document per SKU. Absent on error responses.
    #[serde(rename = "DETAILS_LIST", default)]
    pub details_list: Vec<String>,
}

impl ServiceResponse {
    pub fn ok(details_list: Vec<String>) -> Self {
        Self {
            response_code: ResponseCode::Ok.code(),
            details_list,
        }
    }

    pub fn error(code: ResponseCode) -> Self {
        Self {
            response_code: code.code(),
            details_list: Vec::new(),
        }
    }

    pub fn code(&self) -> ResponseCode {
        ResponseCode::from_code(self.response_code)
    }
}

/// Response codes reported by the billing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    Ok,
    UserCanceled,
    ServiceUnavailable,
    BillingUnavailable,
    ItemUnavailable,
    DeveloperError,
    Error,
    ItemAlreadyOwned,
    ItemNotOwned,
    Unknown(i32),
}

impl ResponseCode {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ResponseCode::Ok,
            1 => ResponseCode::UserCanceled,
            2 => ResponseCode::ServiceUnavailable,
            3 => ResponseCode::BillingUnavailable,
            4 => ResponseCode::ItemUnavailable,
            5 => ResponseCode::DeveloperError,
            6 => ResponseCode::Error,
            7 => ResponseCode::ItemAlreadyOwned,
            8 => ResponseCode::ItemNotOwned,
            other => ResponseCode::Unknown(other),
        }
    }

    pub const fn code(&self) -> i32 {
        match self {
            ResponseCode::Ok => 0,
            ResponseCode::UserCanceled => 1,
            ResponseCode::ServiceUnavailable => 2,
            ResponseCode::BillingUnavailable => 3,
            ResponseCode::ItemUnavailable => 4,
            ResponseCode::DeveloperError => 5,
            ResponseCode::Error => 6,
            ResponseCode::ItemAlreadyOwned => 7,
            ResponseCode::ItemNotOwned => 8,
            ResponseCode::Unknown(code) => *code,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            ResponseCode::Ok => "ok",
            ResponseCode::UserCanceled => "user_canceled",
            ResponseCode::ServiceUnavailable => "service_unavailable",
            ResponseCode::BillingUnavailable => "billing_unavailable",
            ResponseCode::ItemUnavailable => "item_unavailable",
            ResponseCode::DeveloperError => "developer_error",
            ResponseCode::Error => "error",
            ResponseCode::ItemAlreadyOwned => "item_already_owned",
            ResponseCode::ItemNotOwned => "item_not_owned",
            ResponseCode::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.code())
    }
}

/// Price of a SKU in micro-units of its currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Price {
    pub amount_micros: i64,
    pub currency: String,
}

/// Details of a single SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sku {
    /// Product type the SKU was requested under
    pub product: String,
    pub id: String,
    /// Formatted price, including the currency sign
    pub price: String,
    pub detailed_price: Price,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_trial_period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introductory_price: Option<String>,
}

/// Entry of `DETAILS_LIST` as produced by the billing service.
#[derive(Debug, Deserialize)]
struct SkuJson {
    #[serde(rename = "productId")]
    product_id: String,
    price: String,
    #[serde(default)]
    price_amount_micros: i64,
    #[serde(default)]
    price_currency_code: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "subscriptionPeriod")]
    subscription_period: Option<String>,
    #[serde(rename = "freeTrialPeriod")]
    free_trial_period: Option<String>,
    #[serde(rename = "introductoryPrice")]
    introductory_price: Option<String>,
}

impl Sku {
    pub fn from_json(json: &str, product: &str) -> Result<Self, serde_json::Error> {
        let raw: SkuJson = serde_json::from_str(json)?;
        Ok(Sku {
            product: product.to_string(),
            id: raw.product_id,
            price: raw.price,
            detailed_price: Price {
                amount_micros: raw.price_amount_micros,
                currency: raw.price_currency_code,
            },
            title: raw.title,
            description: raw.description,
            subscription_period: raw.subscription_period,
            free_trial_period: raw.free_trial_period,
            introductory_price: raw.introductory_price,
        })
    }
}

/// Details of every SKU of a request, in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skus {
    pub product: String,
    pub list: Vec<Sku>,
}

impl Skus {
    pub fn new(product: impl Into<String>, list: Vec<Sku>) -> Self {
        Self {
            product: product.into(),
            list,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Sku> {
        self.list.iter().find(|sku| sku.id == id)
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}
