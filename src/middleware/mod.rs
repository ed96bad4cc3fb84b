//! Middleware pipeline.
//!
//! A middleware receives the request and a [`Next`] handle to the rest of the
//! pipeline. It may rewrite the request before passing it on, rewrite the
//! response on the way back, or answer by itself without calling `next`.
//!
//! Stages run in registration order and the pipeline ends in the route
//! handler the router selected:
//!
//! ```text
//! request → mw[0] → mw[1] → … → handler
//! response ←──────────────────────┘
//! ```
//!
//! Write a middleware either by implementing [`Middleware`] or, for one-off
//! stages, with [`from_fn`]:
//!
//! ```rust
//! use trestle::middleware::{self, Next};
//! use trestle::{Request, Response};
//!
//! async fn tag(req: Request, next: Next) -> Response {
//!     next.run(req.with_attribute("tagged", true)).await
//! }
//!
//! let stage = middleware::from_fn(tag);
//! # let _ = stage;
//! ```

mod route_template;

pub use route_template::RouteTemplateVariableMiddleware;

use std::future::Future;
use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::request::Request;
use crate::response::IntoResponse;

/// A stage in the request pipeline.
pub trait Middleware: Send + Sync + 'static {
    fn process(&self, req: Request, next: Next) -> BoxFuture;
}

pub(crate) type BoxedMiddleware = Arc<dyn Middleware>;

// ── Next ──────────────────────────────────────────────────────────────────────

/// The remainder of the pipeline after the current stage.
///
/// Consumed by [`Next::run`]; a stage can forward the request at most once.
pub struct Next {
    stack: Arc<[BoxedMiddleware]>,
    index: usize,
    endpoint: BoxedHandler,
}

impl Next {
    /// A pipeline tail that goes straight to `handler`.
    ///
    /// Useful for driving a single middleware in isolation.
    pub fn handler(handler: impl Handler) -> Self {
        Self { stack: Arc::from(Vec::new()), index: 0, endpoint: handler.into_boxed_handler() }
    }

    /// Passes `req` to the next stage and resolves to its response.
    pub fn run(self, req: Request) -> BoxFuture {
        match self.stack.get(self.index).cloned() {
            Some(mw) => {
                let next = Self { index: self.index + 1, ..self };
                mw.process(req, next)
            }
            None => self.endpoint.call(req),
        }
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// An ordered, immutable middleware stack.
#[derive(Clone, Default)]
pub(crate) struct Pipeline {
    stack: Arc<[BoxedMiddleware]>,
}

impl Pipeline {
    pub(crate) fn new(stack: Vec<BoxedMiddleware>) -> Self {
        Self { stack: Arc::from(stack) }
    }

    /// Returns a pipeline with `mw` appended as the innermost stage.
    pub(crate) fn push(&self, mw: BoxedMiddleware) -> Self {
        let mut stack = self.stack.to_vec();
        stack.push(mw);
        Self::new(stack)
    }

    pub(crate) fn len(&self) -> usize {
        self.stack.len()
    }

    /// Runs `req` through every stage, ending in `endpoint`.
    pub(crate) fn handle(&self, req: Request, endpoint: BoxedHandler) -> BoxFuture {
        Next { stack: Arc::clone(&self.stack), index: 0, endpoint }.run(req)
    }
}

// ── from_fn ───────────────────────────────────────────────────────────────────

/// Turns an `async fn(Request, Next) -> impl IntoResponse` into a [`Middleware`].
pub fn from_fn<F, Fut, R>(f: F) -> FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    FromFn(f)
}

/// Middleware returned by [`from_fn`].
pub struct FromFn<F>(F);

impl<F, Fut, R> Middleware for FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn process(&self, req: Request, next: Next) -> BoxFuture {
        let fut = (self.0)(req, next);
        Box::pin(async move { fut.await.into_response() })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bytes::Bytes;

    use super::*;
    use crate::response::Response;

    fn request() -> Request {
        Request::from(http::Request::builder().uri("/").body(Bytes::new()).unwrap())
    }

    fn recorder(log: Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> BoxedMiddleware {
        Arc::new(from_fn(move |req: Request, next: Next| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(name);
                next.run(req).await
            }
        }))
    }

    #[tokio::test]
    async fn stages_run_in_order_then_endpoint() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::new(vec![
            recorder(Arc::clone(&log), "first"),
            recorder(Arc::clone(&log), "second"),
        ]);

        let endpoint_log = Arc::clone(&log);
        let endpoint = (move |_req: Request| {
            let log = Arc::clone(&endpoint_log);
            async move {
                log.lock().unwrap().push("handler");
                Response::text("done")
            }
        })
        .into_boxed_handler();

        let res = pipeline.handle(request(), endpoint).await;

        assert_eq!(res.body(), b"done");
        assert_eq!(*log.lock().unwrap(), ["first", "second", "handler"]);
    }

    #[tokio::test]
    async fn stage_can_short_circuit() {
        let guard: BoxedMiddleware = Arc::new(from_fn(|_req: Request, _next: Next| async {
            http::StatusCode::UNAUTHORIZED
        }));
        let pipeline = Pipeline::new(vec![guard]);
        let endpoint = (|_req: Request| async { Response::text("unreachable") }).into_boxed_handler();

        let res = pipeline.handle(request(), endpoint).await;

        assert_eq!(res.status_code(), http::StatusCode::UNAUTHORIZED);
        assert!(res.body().is_empty());
    }

    #[tokio::test]
    async fn attributes_flow_downstream() {
        let login: BoxedMiddleware = Arc::new(from_fn(|req: Request, next: Next| async move {
            next.run(req.with_attribute("user", String::from("alice"))).await
        }));
        let pipeline = Pipeline::new(vec![login]);
        let endpoint = (|req: Request| async move {
            req.attribute::<String>("user").cloned().unwrap_or_default()
        })
        .into_boxed_handler();

        let res = pipeline.handle(request(), endpoint).await;

        assert_eq!(res.body(), b"alice");
    }
}
