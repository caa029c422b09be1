//! Request dispatch module
//!
//! Entry point for HTTP request processing: method check, header extraction,
//! dispatch to the static file handler, and optional access logging.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http::{self, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use hyper::header::{HeaderValue, CONTENT_LENGTH, SERVER};
use hyper::{HeaderMap, Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    /// Raw request path, still percent-encoded
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
    pub if_modified_since: Option<&'a str>,
    pub range_header: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        let headers = req.headers();
        Self {
            path: req.uri().path(),
            query: req.uri().query(),
            is_head: req.method() == Method::HEAD,
            if_none_match: header_str(headers, "if-none-match"),
            if_modified_since: header_str(headers, "if-modified-since"),
            range_header: header_str(headers, "range"),
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Main entry point for HTTP request handling
///
/// Never fails: every problem becomes an error status. The request body is
/// never read.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: Option<SocketAddr>,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();

    let mut response = match *req.method() {
        Method::GET | Method::HEAD => {
            let ctx = RequestContext::from_request(&req);
            static_files::serve(&ctx, &state).await
        }
        // OPTIONS included: no preflight short-circuit, the CORS layer still
        // decorates the 501
        _ => http::build_501_response(req.method().as_str()),
    };

    if let Ok(value) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, value);
    }

    if state.access_log() {
        log_access(&req, &response, &state, peer_addr, started);
    }

    Ok(response)
}

fn log_access<B>(
    req: &Request<B>,
    response: &Response<ResponseBody>,
    state: &AppState,
    peer_addr: Option<SocketAddr>,
    started: Instant,
) {
    let mut entry = AccessLogEntry::new(
        peer_addr,
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.status = response.status().as_u16();
    // File bodies stream, so the declared length stands in for bytes sent
    entry.body_bytes = if req.method() == Method::HEAD {
        0
    } else {
        header_str(response.headers(), CONTENT_LENGTH.as_str())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    };
    entry.referer = header_str(req.headers(), "referer").map(ToString::to_string);
    entry.user_agent = header_str(req.headers(), "user-agent").map(ToString::to_string);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
