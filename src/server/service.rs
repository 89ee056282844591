use super::request::parse_request;
use super::response::{write_json_error, write_response};
use crate::dispatcher::{Dispatcher, HandlerResponse, ResponseBody};
use crate::router::Router;
use crate::views::ViewEngine;
use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use std::io;
use std::sync::Arc;
use tracing::warn;

/// The assembled HTTP service: router, dispatcher, and (optionally) the
/// view engine, shared across connection coroutines.
#[derive(Clone)]
pub struct AppService {
    pub router: Arc<Router>,
    pub dispatcher: Arc<Dispatcher>,
    pub views: Option<Arc<ViewEngine>>,
}

/// Basic health check endpoint returning `{ "status": "ok" }`.
pub fn health_endpoint(res: &mut Response) -> io::Result<()> {
    write_response(
        res,
        HandlerResponse::ok_json(json!({ "status": "ok" })),
    );
    Ok(())
}

impl AppService {
    /// Resolve a `View` body through the view engine, then write.
    ///
    /// Rendering failures are scoped to this request: the client gets a
    /// 500 and the server keeps serving.
    fn write_resolved(&self, res: &mut Response, response: HandlerResponse) {
        let HandlerResponse {
            status,
            headers,
            body,
        } = response;

        match body {
            ResponseBody::View { name, model } => match &self.views {
                Some(engine) => match engine.render(&name, &model) {
                    Ok(rendered) => {
                        let mut resolved =
                            HandlerResponse::new(status, headers, ResponseBody::Text(rendered));
                        if resolved.get_header("content-type").is_none() {
                            resolved.set_header("Content-Type", "text/html".to_string());
                        }
                        write_response(res, resolved);
                    }
                    Err(err) => {
                        warn!(template = %name, error = %err, "View rendering failed");
                        write_json_error(
                            res,
                            500,
                            json!({ "error": "Render failed", "template": name }),
                        );
                    }
                },
                None => {
                    warn!(template = %name, "View requested but rendering is not enabled");
                    write_json_error(
                        res,
                        500,
                        json!({ "error": "View rendering is not enabled" }),
                    );
                }
            },
            body => write_response(res, HandlerResponse::new(status, headers, body)),
        }
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let parsed = parse_request(req);

        if parsed.method == "GET" && parsed.path == "/health" {
            return health_endpoint(res);
        }

        let method = match parsed.method.parse::<http::Method>() {
            Ok(method) => method,
            Err(_) => {
                write_json_error(
                    res,
                    400,
                    json!({ "error": "Unsupported method", "method": parsed.method }),
                );
                return Ok(());
            }
        };

        let route_opt = self.router.route(method, &parsed.path);
        match route_opt {
            Some(mut route_match) => {
                route_match.query_params = parsed.query_params;
                let handler_response = self.dispatcher.dispatch(
                    route_match,
                    parsed.body,
                    parsed.headers,
                    parsed.cookies,
                );
                match handler_response {
                    Some(response) => self.write_resolved(res, response),
                    None => {
                        write_json_error(
                            res,
                            500,
                            json!({
                                "error": "Handler failed or not registered",
                                "method": parsed.method,
                                "path": parsed.path
                            }),
                        );
                    }
                }
            }
            None => {
                write_json_error(
                    res,
                    404,
                    json!({
                        "error": "Not Found",
                        "method": parsed.method,
                        "path": parsed.path
                    }),
                );
            }
        }
        Ok(())
    }
}
