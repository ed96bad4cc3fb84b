//! Outcome of matching a request against the router.

use std::collections::HashMap;

use crate::method::Method;

/// The result of routing one request.
///
/// The server computes it once per request and stores it under
/// [`RouteResult::ATTRIBUTE`] before the middleware pipeline runs, so every
/// stage can see which route (if any) will handle the request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteResult {
    /// A route matched both path and method.
    Success {
        method: Method,
        /// The registered pattern, e.g. `/users/{id}`.
        pattern: String,
        params: HashMap<String, String>,
    },
    /// No route matches the path.
    NotFound,
    /// The path is routed, but not for this method.
    MethodNotAllowed { allowed: Vec<Method> },
}

impl RouteResult {
    /// Request attribute under which the router publishes its result.
    pub const ATTRIBUTE: &'static str = "trestle::RouteResult";

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_method_failure(&self) -> bool {
        matches!(self, Self::MethodNotAllowed { .. })
    }

    /// Matched pattern, on success.
    pub fn pattern(&self) -> Option<&str> {
        match self {
            Self::Success { pattern, .. } => Some(pattern),
            _ => None,
        }
    }

    /// Captured path parameters, on success.
    pub fn params(&self) -> Option<&HashMap<String, String>> {
        match self {
            Self::Success { params, .. } => Some(params),
            _ => None,
        }
    }

    /// Methods the path accepts, on a method failure.
    pub fn allowed_methods(&self) -> &[Method] {
        match self {
            Self::MethodNotAllowed { allowed } => allowed,
            _ => &[],
        }
    }
}
