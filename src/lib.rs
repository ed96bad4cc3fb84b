//! # trestle
//!
//! A small HTTP framework built around a request pipeline whose stages pass
//! data to each other through request *attributes*.
//!
//! - Radix-tree routing via [`matchit`], with the outcome published on every
//!   request as a [`RouteResult`]
//! - Middleware that sees the request before the handler and the response
//!   after it
//! - A copy-on-write [`TemplateVariableContainer`] for values a view layer
//!   will render, filled by [`RouteTemplateVariableMiddleware`] with the
//!   current route
//! - Graceful shutdown on SIGTERM / Ctrl-C
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use trestle::middleware::RouteTemplateVariableMiddleware;
//! use trestle::{Request, Response, RouteResult, Router, Server, TemplateVariableContainer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .middleware(RouteTemplateVariableMiddleware)
//!         .get("/posts/{slug}", show_post);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn show_post(req: Request) -> Response {
//!     let vars = req
//!         .attribute::<TemplateVariableContainer>(TemplateVariableContainer::ATTRIBUTE)
//!         .cloned()
//!         .unwrap_or_default();
//!     let pattern = vars
//!         .get("route")
//!         .and_then(|v| v.downcast_ref::<RouteResult>())
//!         .and_then(RouteResult::pattern)
//!         .unwrap_or("?");
//!     Response::text(format!("rendered via {pattern}"))
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod route_result;
mod router;
mod server;
mod template;

pub mod middleware;

pub use error::Error;
pub use handler::{BoxFuture, Handler};
pub use method::Method;
pub use middleware::{Middleware, Next, RouteTemplateVariableMiddleware};
pub use request::{Attribute, Request};
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use route_result::RouteResult;
pub use router::Router;
pub use server::Server;
pub use template::{TemplateVariableContainer, Variable};
