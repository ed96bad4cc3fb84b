//! Minimal trestle example — route results exposed as a template variable.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/posts/hello-world
//!   curl http://localhost:3000/about
//!   curl -X DELETE http://localhost:3000/posts/hello-world

use trestle::middleware::{self, Next, RouteTemplateVariableMiddleware};
use trestle::{
    Request, Response, RouteResult, Router, Server, TemplateVariableContainer, Variable,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        .middleware(middleware::from_fn(site_globals))
        .middleware(RouteTemplateVariableMiddleware)
        .get("/posts/{slug}", show_post)
        .get("/about", about);

    if let Err(e) = Server::bind("0.0.0.0:3000").serve(app).await {
        tracing::error!("server error: {e}");
    }
}

// Seeds the container with variables every page shares.
async fn site_globals(req: Request, next: Next) -> Response {
    let vars = TemplateVariableContainer::new().with("site_name", Variable::new("trestle demo"));
    next.run(req.with_attribute(TemplateVariableContainer::ATTRIBUTE, vars)).await
}

async fn show_post(req: Request) -> Response {
    let slug = req.param("slug").unwrap_or("unknown").to_owned();
    Response::html(render(&req, &format!("<h1>{slug}</h1>")))
}

async fn about(req: Request) -> Response {
    Response::html(render(&req, "<p>About</p>"))
}

// Stand-in for a template engine: prints what the route variable holds.
fn render(req: &Request, body: &str) -> String {
    let vars = req
        .attribute::<TemplateVariableContainer>(TemplateVariableContainer::ATTRIBUTE)
        .cloned()
        .unwrap_or_default();

    let site = vars
        .get("site_name")
        .and_then(|v| v.downcast_ref::<&str>())
        .copied()
        .unwrap_or("");
    let route = vars
        .get("route")
        .and_then(|v| v.downcast_ref::<RouteResult>())
        .and_then(RouteResult::pattern)
        .unwrap_or("none");

    format!("<title>{site}</title>{body}<footer>route: {route}</footer>")
}
