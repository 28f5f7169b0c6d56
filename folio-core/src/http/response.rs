//! Response builders and the access log

use std::time::Instant;

use http::header::{ALLOW, CACHE_CONTROL, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::Serialize;

use super::{body_from, RequestContext, Resp};
use crate::logging::ACCESS_TARGET;

fn build(status: StatusCode, content_type: &str, body: impl Into<bytes::Bytes>) -> Resp {
    let mut resp = Response::new(body_from(body));
    *resp.status_mut() = status;
    if let Ok(value) = content_type.parse() {
        resp.headers_mut().insert(CONTENT_TYPE, value);
    }
    resp
}

pub fn html_response(status: StatusCode, html: String) -> Resp {
    build(status, "text/html; charset=utf-8", html)
}

pub fn text_response(status: StatusCode, text: &str) -> Resp {
    build(status, "text/plain; charset=utf-8", text.to_string())
}

/// Serialize `value` as the response body
pub fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Resp {
    match serde_json::to_vec(value) {
        Ok(body) => build(status, "application/json", body),
        Err(e) => {
            log::error!("failed to serialize response body: {}", e);
            json_error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Something went wrong",
            )
        }
    }
}

/// `{"error": "snake_code", "message": "Human readable detail"}`
pub fn json_error_response(status: StatusCode, error: &str, message: &str) -> Resp {
    let body = serde_json::json!({ "error": error, "message": message }).to_string();
    build(status, "application/json", body)
}

pub fn method_not_allowed_response(allow: &str) -> Resp {
    let mut resp = json_error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        "method_not_allowed",
        "HTTP method not allowed for this endpoint",
    );
    if let Ok(value) = allow.parse() {
        resp.headers_mut().insert(ALLOW, value);
    }
    resp
}

/// A file read from disk, typed by extension
pub fn file_response(path: &std::path::Path, content: Vec<u8>) -> Resp {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let mut resp = build(StatusCode::OK, mime.essence_str(), content);
    resp.headers_mut().insert(CACHE_CONTROL, http::HeaderValue::from_static("public, max-age=3600"));
    resp
}

/// One access line per request under the `folio::access` target
pub fn log_access<B>(ctx: &RequestContext, resp: &Response<B>, start: Instant) {
    let remote = ctx.client_ip();
    let request_id = ctx.request_id.to_string();
    let status = resp.status().as_u16();
    let dur_ms = start.elapsed().as_millis() as u64;
    log::info!(
        target: ACCESS_TARGET,
        remote = remote.as_str(),
        method = ctx.method.as_str(),
        path = ctx.path.as_str(),
        status = status,
        dur_ms = dur_ms,
        request_id = request_id.as_str();
        "{} {} {}",
        ctx.method,
        ctx.path,
        status
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_string(resp: Resp) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_json_error_shape() {
        let resp = json_error_response(StatusCode::NOT_FOUND, "not_found", r#"no "such" post"#);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/json");

        let body: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["message"], r#"no "such" post"#);
    }

    #[test]
    fn test_method_not_allowed_sets_allow() {
        let resp = method_not_allowed_response("GET");
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[ALLOW], "GET");
    }

    #[test]
    fn test_file_response_mime() {
        let resp = file_response(std::path::Path::new("site.css"), b"body{}".to_vec());
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/css");
    }

    #[tokio::test]
    async fn test_html_response() {
        let resp = html_response(StatusCode::OK, "<p>hi</p>".to_string());
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(body_string(resp).await, "<p>hi</p>");
    }
}
