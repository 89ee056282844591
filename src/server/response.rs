use crate::dispatcher::{HandlerResponse, ResponseBody};
use may_minihttp::Response;
use serde_json::Value;

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "OK",
    }
}

/// Write a handler response to the wire.
///
/// Explicit headers on the response win; otherwise the content type follows
/// the body kind (`text/plain` for text, `application/json` for JSON).
/// `View` bodies must have been resolved by the service before this point;
/// an unresolved one is a wiring bug and is reported as a 500.
pub(crate) fn write_response(res: &mut Response, response: HandlerResponse) {
    res.status_code(response.status as usize, status_reason(response.status));

    let explicit_content_type = response.get_header("content-type").is_some();
    for (name, value) in &response.headers {
        let header = format!("{name}: {value}").into_boxed_str();
        res.header(Box::leak(header));
    }

    match response.body {
        ResponseBody::Empty => {}
        ResponseBody::Text(s) => {
            if !explicit_content_type {
                res.header("Content-Type: text/plain");
            }
            res.body_vec(s.into_bytes());
        }
        ResponseBody::Json(value) => {
            if !explicit_content_type {
                res.header("Content-Type: application/json");
            }
            res.body_vec(serde_json::to_vec(&value).unwrap_or_default());
        }
        ResponseBody::View { name, .. } => {
            res.status_code(500, status_reason(500));
            res.header("Content-Type: application/json");
            res.body_vec(
                serde_json::json!({ "error": "Unresolved view", "template": name })
                    .to_string()
                    .into_bytes(),
            );
        }
    }
}

/// Write a JSON error body with the given status.
pub(crate) fn write_json_error(res: &mut Response, status: u16, body: Value) {
    res.status_code(status as usize, status_reason(status));
    res.header("Content-Type: application/json");
    res.body_vec(body.to_string().into_bytes());
}
