//! Conversion between url strings and structured locations.
//!
//! # Responsibilities
//! - Split raw urls into path, query and hash
//! - Normalize query maps (collapse one-element lists, drop empty lists)
//! - Stringify path + query + hash into a canonical full path
//!
//! # Design Decisions
//! - Query keys are emitted in sorted order, so two equal maps always
//!   produce the same full path
//! - The hash keeps its leading `#`
//! - Encoding is `application/x-www-form-urlencoded`; byte-identical output
//!   with any particular browser is not a goal

use url::form_urlencoded;

use crate::location::query::{Query, QueryValue};
use crate::location::route::HistoryLocation;

/// Location (de)serialization used by history backends and the router.
pub trait LocationNormalizer: Send + Sync {
    /// Parse a raw url such as `/search?q=rust#results`.
    fn normalize_location(&self, raw: &str) -> HistoryLocation;

    /// Normalize a caller-supplied query map.
    fn normalize_query(&self, query: &Query) -> Query {
        query
            .iter()
            .filter_map(|(key, value)| value.normalized().map(|v| (key.clone(), v)))
            .collect()
    }

    /// Build the canonical full path.
    fn stringify_url(&self, path: &str, query: &Query, hash: &str) -> String;
}

/// Default normalizer built on `url::form_urlencoded`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlNormalizer;

impl LocationNormalizer for UrlNormalizer {
    fn normalize_location(&self, raw: &str) -> HistoryLocation {
        let (before_hash, hash) = match raw.find('#') {
            Some(index) => (&raw[..index], normalize_hash(&raw[index..])),
            None => (raw, String::new()),
        };
        let (path, search) = match before_hash.find('?') {
            Some(index) => (&before_hash[..index], &before_hash[index + 1..]),
            None => (before_hash, ""),
        };

        let path = normalize_path(path);
        let query = parse_query(search);
        let full_path = self.stringify_url(&path, &query, &hash);

        HistoryLocation {
            path,
            query,
            hash,
            full_path,
        }
    }

    fn stringify_url(&self, path: &str, query: &Query, hash: &str) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in query {
            for item in value.values() {
                serializer.append_pair(key, item);
            }
        }
        let search = serializer.finish();

        let mut url = String::with_capacity(path.len() + search.len() + hash.len() + 1);
        url.push_str(path);
        if !search.is_empty() {
            url.push('?');
            url.push_str(&search);
        }
        url.push_str(&normalize_hash(hash));
        url
    }
}

/// Parse a query string (without the leading `?`). Repeated keys become lists.
pub fn parse_query(search: &str) -> Query {
    let mut query = Query::new();
    for (key, value) in form_urlencoded::parse(search.as_bytes()) {
        if key.is_empty() {
            continue;
        }
        match query.get_mut(&*key) {
            Some(existing) => existing.push(value.into_owned()),
            None => {
                query.insert(key.into_owned(), QueryValue::One(value.into_owned()));
            }
        }
    }
    query
}

/// Ensure a non-empty hash starts with `#`; a lone `#` is treated as empty.
pub fn normalize_hash(hash: &str) -> String {
    match hash {
        "" | "#" => String::new(),
        h if h.starts_with('#') => h.to_string(),
        h => format!("#{}", h),
    }
}

fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}
