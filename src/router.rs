//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. The router decides which
//! handler ends the pipeline and records that decision as a [`RouteResult`]
//! on the request, so middleware sees the outcome before the handler runs.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http::header::ALLOW;
use matchit::Router as MatchitRouter;
use tracing::debug;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::{Middleware, Pipeline};
use crate::request::Request;
use crate::response::Response;
use crate::route_result::RouteResult;

struct Route {
    pattern: String,
    handler: BoxedHandler,
}

/// The application router and its middleware pipeline.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
/// Registration methods return `self` so calls chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<Route>>,
    pipeline: Pipeline,
    fallback: BoxedHandler,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            pipeline: Pipeline::default(),
            fallback: unrouted.into_boxed_handler(),
        }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax and are read with `req.param("name")`.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        let route = Route { pattern: path.to_owned(), handler: handler.into_boxed_handler() };
        self.routes
            .entry(method)
            .or_default()
            .insert(path, route)
            .unwrap_or_else(|e| panic!("invalid route `{method} {path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Put, path, handler)
    }

    pub fn patch(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Patch, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Delete, path, handler)
    }

    /// Appends a middleware stage. Stages run in the order they are added,
    /// for every request, whether or not it matched a route.
    pub fn middleware(mut self, mw: impl Middleware) -> Self {
        self.pipeline = self.pipeline.push(Arc::new(mw));
        self
    }

    /// Replaces the handler that answers requests no route matched.
    ///
    /// The default answers `404 Not Found`, or `405 Method Not Allowed` with an
    /// `Allow` header when the path exists under other methods.
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        self.fallback = handler.into_boxed_handler();
        self
    }

    /// Matches `method` and `path` against the registered routes.
    pub fn route(&self, method: &http::Method, path: &str) -> RouteResult {
        self.lookup(method, path).0
    }

    /// Routes and runs one request through the pipeline.
    ///
    /// The server calls this for every request once the body is read; it is
    /// public so applications can be exercised without a socket.
    pub async fn call(&self, req: http::Request<Bytes>) -> Response {
        let (parts, body) = req.into_parts();
        self.dispatch(Request::from_parts(parts, body)).await
    }

    pub(crate) async fn dispatch(&self, mut req: Request) -> Response {
        let (result, endpoint) = self.lookup(req.method(), req.path());
        debug!(
            method = %req.method(),
            path = req.path(),
            route = result.pattern().unwrap_or("-"),
            stages = self.pipeline.len(),
            "routed"
        );

        if let Some(params) = result.params() {
            req.set_params(params.clone());
        }
        let req = req.with_attribute(RouteResult::ATTRIBUTE, result);
        self.pipeline.handle(req, endpoint).await
    }

    fn lookup(&self, method: &http::Method, path: &str) -> (RouteResult, BoxedHandler) {
        if let Ok(method) = Method::try_from(method) {
            if let Some(matched) = self.routes.get(&method).and_then(|t| t.at(path).ok()) {
                let params = matched.params.iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect();
                let result = RouteResult::Success {
                    method,
                    pattern: matched.value.pattern.clone(),
                    params,
                };
                return (result, Arc::clone(&matched.value.handler));
            }
        }

        let allowed: Vec<Method> = Method::ALL
            .into_iter()
            .filter(|m| self.routes.get(m).is_some_and(|t| t.at(path).is_ok()))
            .collect();
        let result = if allowed.is_empty() {
            RouteResult::NotFound
        } else {
            RouteResult::MethodNotAllowed { allowed }
        };
        (result, Arc::clone(&self.fallback))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

/// Default fallback: answers from the [`RouteResult`] the router stored.
async fn unrouted(req: Request) -> Response {
    match req.attribute::<RouteResult>(RouteResult::ATTRIBUTE) {
        Some(RouteResult::MethodNotAllowed { allowed }) => {
            let allow = allowed.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ");
            Response::builder()
                .status(StatusCode::METHOD_NOT_ALLOWED)
                .header(ALLOW.as_str(), &allow)
                .no_body()
        }
        _ => Response::status(StatusCode::NOT_FOUND),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn ok(_req: Request) -> &'static str { "ok" }

    fn router() -> Router {
        Router::new()
            .get("/users/{id}", ok)
            .delete("/users/{id}", ok)
            .post("/users", ok)
    }

    #[test]
    fn success_carries_pattern_and_params() {
        let result = router().route(&http::Method::GET, "/users/42");

        assert_eq!(result.pattern(), Some("/users/{id}"));
        assert_eq!(result.params().and_then(|p| p.get("id")).map(String::as_str), Some("42"));
    }

    #[test]
    fn unknown_path_is_not_found() {
        assert_eq!(router().route(&http::Method::GET, "/nope"), RouteResult::NotFound);
    }

    #[test]
    fn wrong_method_lists_allowed() {
        let result = router().route(&http::Method::PUT, "/users/1");
        assert_eq!(result.allowed_methods(), [Method::Get, Method::Delete]);
    }

    #[test]
    fn unroutable_method_is_method_failure() {
        let propfind = http::Method::from_bytes(b"PROPFIND").unwrap();
        assert!(router().route(&propfind, "/users").is_method_failure());
    }

    #[tokio::test]
    async fn fallback_answers_405_with_allow() {
        let req = http::Request::post("/users/1").body(Bytes::new()).unwrap();
        let res = router().call(req).await;

        assert_eq!(res.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.header("allow"), Some("GET, DELETE"));
    }

    #[tokio::test]
    async fn fallback_answers_404() {
        let req = http::Request::get("/missing").body(Bytes::new()).unwrap();
        assert_eq!(router().call(req).await.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn handler_sees_path_params() {
        async fn echo(req: Request) -> String {
            req.param("id").unwrap_or("none").to_owned()
        }
        let app = Router::new().get("/items/{id}", echo);
        let req = http::Request::get("/items/abc").body(Bytes::new()).unwrap();

        assert_eq!(app.call(req).await.body(), b"abc");
    }
}
