//! Incoming HTTP request type.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Uri};

/// A shared, type-erased attribute value.
pub type Attribute = Arc<dyn Any + Send + Sync>;

/// An incoming HTTP request with its body fully read.
///
/// Besides the HTTP message itself, a request carries *attributes*: values
/// that pipeline stages attach for the stages after them, keyed by name and
/// kept in insertion order. Attributes are written through
/// [`Request::with_attribute`], which consumes the request and hands back the
/// updated one, so a stage can only affect what it passes on.
pub struct Request {
    method: http::Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    params: HashMap<String, String>,
    attributes: Vec<(String, Attribute)>,
}

impl Request {
    pub(crate) fn from_parts(parts: http::request::Parts, body: Bytes) -> Self {
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            params: HashMap::new(),
            attributes: Vec::new(),
        }
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }

    pub fn method(&self) -> &http::Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Header lookup; `None` if absent or not visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    // ── Attributes ───────────────────────────────────────────────────────────

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attribute_arc(key).is_some()
    }

    /// Returns the attribute under `key` if it is present and of type `T`.
    pub fn attribute<T: Any>(&self, key: &str) -> Option<&T> {
        self.attribute_arc(key)?.downcast_ref::<T>()
    }

    /// Returns the shared attribute handle under `key`, whatever its type.
    pub fn attribute_arc(&self, key: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Attribute names in insertion order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|(k, _)| k.as_str())
    }

    /// Sets `key` to `value` and returns the request.
    ///
    /// Overwriting an existing key keeps its position in the ordering.
    pub fn with_attribute<T: Any + Send + Sync>(self, key: impl Into<String>, value: T) -> Self {
        self.with_attribute_arc(key, Arc::new(value))
    }

    /// Like [`Request::with_attribute`] for a value that is already shared.
    pub fn with_attribute_arc(mut self, key: impl Into<String>, value: Attribute) -> Self {
        let key = key.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
        self
    }

    pub fn without_attribute(mut self, key: &str) -> Self {
        self.attributes.retain(|(k, _)| k != key);
        self
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Self::from_parts(parts, body)
    }
}
