//! Canonical cache keys for SKU details requests.
//!
//! A single SKU yields `product_sku`, any other count yields
//! `product_[sku1,sku2,...]`. Callers pass the sorted SKU list, so the key
//! does not depend on the order the SKUs were supplied in. Duplicates are
//! kept and change the key.

/// Derives the cache key for `product` and an already sorted SKU list.
pub fn derive_cache_key(product: &str, skus: &[String]) -> String {
    match skus {
        [sku] => format!("{product}_{sku}"),
        _ => format!("{product}_[{}]", skus.join(",")),
    }
}
