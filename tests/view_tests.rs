//! Tests for view rendering through the assembled application
//!
//! # Test Coverage
//!
//! - The flagship contract: `GET /view` renders template `"template"` with
//!   model `{"name": "world"}` to exactly `Hello world!`
//! - Rendered views default to `text/html`
//! - Directory-based template resolution
//! - Render failures are request-scoped (500, server keeps serving)
//! - Requesting a view without enabling views is a 500, not a crash

mod common;

use common::http::send_request;
use common::test_server::setup_may_runtime;
use serde_json::json;
use wireup::dispatcher::HandlerResponse;
use wireup::router::RouterBuilder;
use wireup::{application, WebServer};

#[test]
fn test_create_and_request_a_view() {
    setup_may_runtime();
    let router = RouterBuilder::new()
        .get("/view", |_req| {
            HandlerResponse::render("template", json!({ "name": "world" }))
        })
        .build();

    let mut context = application()
        .enable(WebServer, move |web| {
            web.bind("127.0.0.1:0").import_router(router);
            web.views().template("template", "Hello {{ name }}!");
            Ok(())
        })
        .unwrap()
        .run()
        .unwrap();
    let addr = context.addr().unwrap();

    let res = send_request(addr, "GET", "/view", None);
    assert!(
        (200..300).contains(&res.status),
        "expected 2xx, got {}",
        res.status
    );
    assert_eq!(res.body, "Hello world!");
    assert_eq!(res.header("content-type"), Some("text/html"));
    context.close();
}

#[test]
fn test_views_resolve_from_a_template_directory() {
    setup_may_runtime();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>{{ title }}</h1>").unwrap();
    let dir_path = dir.path().to_path_buf();

    let router = RouterBuilder::new()
        .get("/", |_req| {
            HandlerResponse::render("index", json!({ "title": "Home" }))
        })
        .build();

    let mut context = application()
        .enable(WebServer, move |web| {
            web.bind("127.0.0.1:0").import_router(router);
            web.views().dir(dir_path);
            Ok(())
        })
        .unwrap()
        .run()
        .unwrap();
    let addr = context.addr().unwrap();

    let res = send_request(addr, "GET", "/", None);
    assert_eq!(res.status, 200);
    assert_eq!(res.body, "<h1>Home</h1>");
    context.close();
}

#[test]
fn test_render_failure_is_scoped_to_the_request() {
    setup_may_runtime();
    let router = RouterBuilder::new()
        .get("/missing", |_req| {
            HandlerResponse::render("no_such_template", json!({}))
        })
        .get("/present", |_req| {
            HandlerResponse::render("greeting", json!({ "name": "world" }))
        })
        .build();

    let mut context = application()
        .enable(WebServer, move |web| {
            web.bind("127.0.0.1:0").import_router(router);
            web.views().template("greeting", "Hello {{ name }}!");
            Ok(())
        })
        .unwrap()
        .run()
        .unwrap();
    let addr = context.addr().unwrap();

    let res = send_request(addr, "GET", "/missing", None);
    assert_eq!(res.status, 500);
    assert!(res.body.contains("Render failed"));

    // the failure above must not have taken anything down
    let res = send_request(addr, "GET", "/present", None);
    assert_eq!(res.status, 200);
    assert_eq!(res.body, "Hello world!");
    context.close();
}

#[test]
fn test_view_without_views_enabled_is_a_request_error() {
    setup_may_runtime();
    let router = RouterBuilder::new()
        .get("/view", |_req| {
            HandlerResponse::render("template", json!({ "name": "world" }))
        })
        .build();

    let mut context = application()
        .enable(WebServer, move |web| {
            web.bind("127.0.0.1:0").import_router(router);
            Ok(())
        })
        .unwrap()
        .run()
        .unwrap();
    let addr = context.addr().unwrap();

    let res = send_request(addr, "GET", "/view", None);
    assert_eq!(res.status, 500);
    assert!(res.body.contains("not enabled"));
    context.close();
}

#[test]
fn test_broken_inline_template_fails_assembly() {
    setup_may_runtime();
    let result = application()
        .enable(WebServer, |web| {
            web.bind("127.0.0.1:0");
            web.views().template("broken", "Hello {{ name !");
            Ok(())
        })
        .unwrap()
        .run();
    match result {
        Err(wireup::Error::Template { name, .. }) => assert_eq!(name, "broken"),
        other => panic!("expected a template error, got {other:?}"),
    }
}
