mod support;

use bytes::Bytes;
use http::StatusCode;
use trestle::middleware::{self, Next, RouteTemplateVariableMiddleware};
use trestle::{Request, Response, RouteResult, Router, TemplateVariableContainer, Variable};

fn container(req: &Request) -> TemplateVariableContainer {
    req.attribute::<TemplateVariableContainer>(TemplateVariableContainer::ATTRIBUTE)
        .cloned()
        .unwrap_or_default()
}

// Reports what the handler saw in the `route` variable.
async fn describe_route(req: Request) -> Response {
    let vars = container(&req);
    let legacy = req
        .attribute::<TemplateVariableContainer>(TemplateVariableContainer::LEGACY_ATTRIBUTE)
        .is_some_and(|l| TemplateVariableContainer::ptr_eq(l, &vars));

    let route = match vars.get("route") {
        None => "absent".to_owned(),
        Some(Variable::Null) => "null".to_owned(),
        Some(v) => match v.downcast_ref::<RouteResult>() {
            Some(RouteResult::Success { pattern, .. }) => format!("success {pattern}"),
            Some(RouteResult::NotFound) => "not-found".to_owned(),
            Some(RouteResult::MethodNotAllowed { .. }) => "method-not-allowed".to_owned(),
            None => "other".to_owned(),
        },
    };
    Response::text(format!("{route}; legacy={legacy}"))
}

fn app() -> Router {
    Router::new()
        .middleware(RouteTemplateVariableMiddleware)
        .get("/posts/{slug}", describe_route)
        .fallback(describe_route)
}

fn get(path: &str) -> http::Request<Bytes> {
    http::Request::get(path).body(Bytes::new()).unwrap()
}

#[tokio::test]
async fn matched_route_reaches_handler_as_template_variable() {
    let res = app().call(get("/posts/hello")).await;

    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.body(), b"success /posts/{slug}; legacy=true");
}

#[tokio::test]
async fn unmatched_request_still_gets_route_variable() {
    let res = app().call(get("/nowhere")).await;
    assert_eq!(res.body(), b"not-found; legacy=true");

    let post = http::Request::post("/posts/hello").body(Bytes::new()).unwrap();
    let res = app().call(post).await;
    assert_eq!(res.body(), b"method-not-allowed; legacy=true");
}

#[tokio::test]
async fn earlier_stage_can_clear_route_result() {
    let app = Router::new()
        .middleware(middleware::from_fn(|req: Request, next: Next| async move {
            next.run(req.without_attribute(RouteResult::ATTRIBUTE)).await
        }))
        .middleware(RouteTemplateVariableMiddleware)
        .get("/posts/{slug}", describe_route);

    let res = app.call(get("/posts/hello")).await;

    assert_eq!(res.body(), b"null; legacy=true");
}

#[tokio::test]
async fn variables_from_earlier_stages_survive() {
    let app = Router::new()
        .middleware(middleware::from_fn(|req: Request, next: Next| async move {
            let vars = TemplateVariableContainer::new().with("title", Variable::new("Posts"));
            next.run(req.with_attribute(TemplateVariableContainer::ATTRIBUTE, vars)).await
        }))
        .middleware(RouteTemplateVariableMiddleware)
        .get("/posts/{slug}", |req: Request| async move {
            let vars = container(&req);
            let title = vars.get("title").and_then(|v| v.downcast_ref::<&str>()).copied();
            format!("{}:{}", title.unwrap_or("-"), vars.has("route"))
        });

    let res = app.call(get("/posts/hello")).await;

    assert_eq!(res.body(), b"Posts:true");
}

#[tokio::test]
async fn downstream_response_is_returned_untouched() {
    let app = Router::new()
        .middleware(RouteTemplateVariableMiddleware)
        .get("/made", |_req: Request| async {
            Response::builder()
                .status(StatusCode::CREATED)
                .header("x-origin", "handler")
                .json(&b"{\"ok\":true}"[..])
        });

    let res = app.call(get("/made")).await;

    assert_eq!(res.status_code(), StatusCode::CREATED);
    assert_eq!(res.header("x-origin"), Some("handler"));
    assert_eq!(res.header("content-type"), Some("application/json"));
    assert_eq!(res.body(), b"{\"ok\":true}");
}

#[tokio::test]
async fn served_over_tcp() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let serve = support::serve(app()).await;

    let raw = serve.send("GET", "/posts/first").await;
    assert!(raw.starts_with("HTTP/1.1 200"), "{raw}");
    assert!(raw.ends_with("success /posts/{slug}; legacy=true"), "{raw}");

    let raw = serve.send("GET", "/missing").await;
    assert!(raw.ends_with("not-found; legacy=true"), "{raw}");

    serve.shutdown().await;
}

#[tokio::test]
async fn invalid_listen_address_is_an_error() {
    let err = trestle::Server::bind("not an address")
        .serve_with_shutdown(app(), std::future::ready(()))
        .await
        .unwrap_err();

    assert!(matches!(err, trestle::Error::Addr { .. }));
    assert!(err.to_string().contains("not an address"));
}
