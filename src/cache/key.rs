//! Cache key generation
//!
//! Keys are readable strings (`GET:api/facturas.php?estado=pendiente`) rather
//! than hashes, because invalidation matches on substrings of the key.

use std::collections::BTreeMap;

use reqwest::Method;

use crate::client::query::{QueryParams, encode_query};

/// Split an endpoint with an embedded query string and merge `params` into it.
///
/// Embedded parameters come first; `params` overwrite on collision and absent
/// values are skipped. The result is sorted by parameter name.
pub fn merged_params(endpoint: &str, params: &QueryParams) -> (String, BTreeMap<String, String>) {
    let (path, embedded) = match endpoint.split_once('?') {
        Some((path, query)) => (path, query),
        None => (endpoint, ""),
    };

    let mut merged: BTreeMap<String, String> = url::form_urlencoded::parse(embedded.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    merged.extend(params.canonical());

    (path.to_string(), merged)
}

/// Generate a deterministic cache key from endpoint, method and parameters.
///
/// Two requests with the same parameter values produce the same key no
/// matter the order the parameters were supplied in.
pub fn cache_key(endpoint: &str, method: &Method, params: &QueryParams) -> String {
    let (path, merged) = merged_params(endpoint, params);

    if merged.is_empty() {
        return format!("{}:{}", method.as_str(), path);
    }

    let query = encode_query(merged.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    format!("{}:{}?{}", method.as_str(), path, query)
}
