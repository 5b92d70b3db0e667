//! Query parameters for backend requests
//!
//! Parameters keep explicit "absent" values so callers can pass optional
//! filters straight through; absent values never reach the URL or a cache key.

use std::collections::BTreeMap;

/// Ordered list of query parameters, some possibly absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, Option<String>)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a present value, replacing any earlier value for `key`.
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.insert(key, Some(value.to_string()));
        self
    }

    /// Add an optional value, replacing any earlier value for `key`.
    pub fn with_opt<V: ToString>(mut self, key: &str, value: Option<V>) -> Self {
        self.insert(key, value.map(|v| v.to_string()));
        self
    }

    pub fn insert(&mut self, key: &str, value: Option<String>) {
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    /// Value for `key`, if present
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Iterate over present values only, in insertion order
    pub fn present(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
    }

    pub fn is_empty(&self) -> bool {
        self.present().next().is_none()
    }

    /// Present values sorted by name
    pub fn canonical(&self) -> BTreeMap<String, String> {
        self.present()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

/// Serialize parameters as an `application/x-www-form-urlencoded` string
pub fn encode_query<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (k, v) in pairs {
        serializer.append_pair(k, v);
    }
    serializer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_values_are_skipped() {
        let params = QueryParams::new()
            .with("estado", "pendiente")
            .with_opt::<String>("cliente_id", None);

        assert_eq!(params.get("estado"), Some("pendiente"));
        assert_eq!(params.get("cliente_id"), None);
        assert_eq!(params.present().count(), 1);
    }

    #[test]
    fn test_insert_overwrites() {
        let params = QueryParams::new().with("page", 1).with("page", 2);
        assert_eq!(params.get("page"), Some("2"));
        assert_eq!(params.present().count(), 1);
    }

    #[test]
    fn test_canonical_is_sorted() {
        let params = QueryParams::new().with("b", 2).with("a", 1);
        let keys: Vec<_> = params.canonical().into_keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_encode_query_escapes() {
        let encoded = encode_query([("buscar", "Pérez & hijos")]);
        assert_eq!(encoded, "buscar=P%C3%A9rez+%26+hijos");
    }

    #[test]
    fn test_only_absent_values_is_empty() {
        let params = QueryParams::new().with_opt::<i64>("id", None);
        assert!(params.is_empty());
    }
}
