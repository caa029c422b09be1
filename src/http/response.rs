//! HTTP response building module
//!
//! Builders for every status the file server emits. None of them touch CORS;
//! those headers are appended afterwards by the `cors` wrapper.

use futures_util::TryStreamExt;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use hyper::header::{
    ACCEPT_RANGES, CONNECTION, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG, LAST_MODIFIED,
    LOCATION,
};
use hyper::{Response, StatusCode};
use std::io;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;

use super::range::ByteRange;

/// Content type of generated HTML error pages
pub const ERROR_CONTENT_TYPE: &str = "text/html;charset=utf-8";

/// Body of every response: in-memory pages or a file streamed from disk
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// Body holding bytes already in memory
pub fn full_body(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

pub fn empty_body() -> ResponseBody {
    full_body(Bytes::new())
}

/// Body streaming at most `len` bytes of `file` from its current position
pub fn file_body(file: File, len: u64) -> ResponseBody {
    let frames = ReaderStream::new(file.take(len)).map_ok(Frame::data);
    StreamBody::new(frames).boxed_unsync()
}

/// Validators and type shared by full and partial file responses
#[derive(Debug, Clone)]
pub struct FileHeaders {
    pub content_type: &'static str,
    pub etag: String,
    pub last_modified: String,
}

/// 200 with the whole file
///
/// `body` is empty for HEAD; `content_length` is the file size either way.
pub fn build_file_response(
    body: ResponseBody,
    content_length: u64,
    headers: &FileHeaders,
) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, headers.content_type)
        .header(CONTENT_LENGTH, content_length)
        .header(LAST_MODIFIED, &headers.last_modified)
        .header(ETAG, &headers.etag)
        .header(ACCEPT_RANGES, "bytes")
        .body(body)
        .unwrap_or_else(|e| fallback(StatusCode::OK, &e))
}

/// 206 with one byte range of a file of `total_size` bytes
///
/// `body` must yield exactly the bytes described by `range` (empty for HEAD).
pub fn build_partial_response(
    body: ResponseBody,
    headers: &FileHeaders,
    range: ByteRange,
    total_size: u64,
) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(CONTENT_TYPE, headers.content_type)
        .header(CONTENT_LENGTH, range.content_length())
        .header(CONTENT_RANGE, range.content_range(total_size))
        .header(LAST_MODIFIED, &headers.last_modified)
        .header(ETAG, &headers.etag)
        .header(ACCEPT_RANGES, "bytes")
        .body(body)
        .unwrap_or_else(|e| fallback(StatusCode::PARTIAL_CONTENT, &e))
}

/// 304 Not Modified, repeating the validators
pub fn build_304_response(headers: &FileHeaders) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(ETAG, &headers.etag)
        .header(LAST_MODIFIED, &headers.last_modified)
        .body(empty_body())
        .unwrap_or_else(|e| fallback(StatusCode::NOT_MODIFIED, &e))
}

/// 301 to the slash-terminated form of a directory path
pub fn build_redirect_response(location: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(LOCATION, location)
        .header(CONTENT_LENGTH, 0)
        .body(empty_body())
        .unwrap_or_else(|e| fallback(StatusCode::MOVED_PERMANENTLY, &e))
}

/// 200 with generated HTML (directory listings)
pub fn build_html_response(content: String, is_head: bool) -> Response<ResponseBody> {
    let content_length = content.len();
    let body = if is_head {
        empty_body()
    } else {
        full_body(content)
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/html; charset=utf-8")
        .header(CONTENT_LENGTH, content_length)
        .body(body)
        .unwrap_or_else(|e| fallback(StatusCode::OK, &e))
}

/// Standard HTML error page
///
/// `message` defaults to the status reason phrase. The connection is closed
/// after an error, like any simple HTTP/1.0 style server does.
pub fn build_error_response(
    status: StatusCode,
    message: Option<&str>,
    is_head: bool,
) -> Response<ResponseBody> {
    let reason = status.canonical_reason().unwrap_or("Unknown");
    let page = render_error_page(status, message.unwrap_or(reason));
    let content_length = page.len();
    let body = if is_head {
        empty_body()
    } else {
        full_body(page)
    };

    Response::builder()
        .status(status)
        .header(CONNECTION, "close")
        .header(CONTENT_TYPE, ERROR_CONTENT_TYPE)
        .header(CONTENT_LENGTH, content_length)
        .body(body)
        .unwrap_or_else(|e| fallback(status, &e))
}

pub fn build_404_response(message: &str, is_head: bool) -> Response<ResponseBody> {
    build_error_response(StatusCode::NOT_FOUND, Some(message), is_head)
}

/// 416 with the `bytes */<size>` form of `Content-Range`
pub fn build_416_response(total_size: u64, is_head: bool) -> Response<ResponseBody> {
    let mut response = build_error_response(StatusCode::RANGE_NOT_SATISFIABLE, None, is_head);
    if let Ok(value) = format!("bytes */{total_size}").parse() {
        response.headers_mut().insert(CONTENT_RANGE, value);
    }
    response
}

/// 501 for every method the file handler does not implement
pub fn build_501_response(method: &str) -> Response<ResponseBody> {
    build_error_response(
        StatusCode::NOT_IMPLEMENTED,
        Some(&format!("Unsupported method ('{method}')")),
        false,
    )
}

fn render_error_page(status: StatusCode, message: &str) -> String {
    let code = status.as_u16();
    format!(
        r#"<!DOCTYPE HTML>
<html lang="en">
    <head>
        <meta charset="utf-8">
        <title>Error response</title>
    </head>
    <body>
        <h1>Error response</h1>
        <p>Error code: {code}</p>
        <p>Message: {}.</p>
        <p>Error code explanation: {code} - {}.</p>
    </body>
</html>
"#,
        escape_html(message),
        explain(status),
    )
}

/// Long description of a status, shown on error pages
fn explain(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "Bad request syntax or unsupported method",
        StatusCode::FORBIDDEN => "Request forbidden -- authorization will not help",
        StatusCode::NOT_FOUND => "Nothing matches the given URI",
        StatusCode::METHOD_NOT_ALLOWED => "Specified method is invalid for this resource",
        StatusCode::RANGE_NOT_SATISFIABLE => "Cannot satisfy request range",
        StatusCode::INTERNAL_SERVER_ERROR => "Server got itself in trouble",
        StatusCode::NOT_IMPLEMENTED => "Server does not support this operation",
        _ => status.canonical_reason().unwrap_or("Unknown"),
    }
}

/// Escape text for inclusion in HTML element content
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Response used when the builder rejects a header value
fn fallback(status: StatusCode, error: &hyper::http::Error) -> Response<ResponseBody> {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
    let mut response = Response::new(empty_body());
    *response.status_mut() = status;
    response
}
