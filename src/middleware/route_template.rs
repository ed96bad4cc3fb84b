//! Exposes the routing result to templates.

use crate::handler::BoxFuture;
use crate::middleware::{Middleware, Next};
use crate::request::Request;
use crate::route_result::RouteResult;
use crate::template::{TemplateVariableContainer, Variable};

/// Publishes the request's [`RouteResult`] as the `route` template variable.
///
/// Reads the [`TemplateVariableContainer`] attribute (starting from an empty
/// one when absent), sets `route` to the value under
/// [`RouteResult::ATTRIBUTE`] or to [`Variable::Null`] when the request was
/// never routed, and stores the new container under both
/// [`TemplateVariableContainer::ATTRIBUTE`] and
/// [`TemplateVariableContainer::LEGACY_ATTRIBUTE`]. The response of the next
/// stage is returned as is.
///
/// ```rust,no_run
/// use trestle::middleware::RouteTemplateVariableMiddleware;
/// use trestle::{Request, Response, Router, TemplateVariableContainer};
///
/// async fn page(req: Request) -> Response {
///     let vars = req
///         .attribute::<TemplateVariableContainer>(TemplateVariableContainer::ATTRIBUTE)
///         .cloned()
///         .unwrap_or_default();
///     Response::text(format!("{} variables", vars.len()))
/// }
///
/// let app = Router::new()
///     .middleware(RouteTemplateVariableMiddleware)
///     .get("/", page);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct RouteTemplateVariableMiddleware;

impl RouteTemplateVariableMiddleware {
    /// Template variable name the route result is published under.
    pub const VARIABLE: &'static str = "route";

    /// Returns `req` with the `route` variable injected into its container.
    pub fn inject(req: Request) -> Request {
        let container = req
            .attribute::<TemplateVariableContainer>(TemplateVariableContainer::ATTRIBUTE)
            .cloned()
            .unwrap_or_default();

        let route = match req.attribute_arc(RouteResult::ATTRIBUTE) {
            Some(result) => Variable::from_arc(result.clone()),
            None => Variable::Null,
        };

        let container = container.with(Self::VARIABLE, route);

        req.with_attribute(TemplateVariableContainer::ATTRIBUTE, container.clone())
            .with_attribute(TemplateVariableContainer::LEGACY_ATTRIBUTE, container)
    }
}

impl Middleware for RouteTemplateVariableMiddleware {
    fn process(&self, req: Request, next: Next) -> BoxFuture {
        next.run(Self::inject(req))
    }
}
