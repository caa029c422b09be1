//! CORS response decoration
//!
//! [`Cors`] wraps any hyper service and stamps the fixed, permissive CORS
//! header set onto every response it returns, whatever the status and
//! whichever branch of the inner handler produced it.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use hyper::header::{
    HeaderMap, HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use hyper::service::Service;
use hyper::Response;

/// Headers added to every response
///
/// Only GET and OPTIONS are advertised, but the origin wildcard is sent for
/// every method, PUT and friends included.
pub const CORS_HEADERS: [(HeaderName, &str); 3] = [
    (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (ACCESS_CONTROL_ALLOW_METHODS, "GET, OPTIONS"),
    (ACCESS_CONTROL_ALLOW_HEADERS, "*"),
];

/// Set the CORS headers, replacing any value already present for those names
pub fn apply_cors_headers(headers: &mut HeaderMap) {
    for (name, value) in CORS_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
}

/// Service wrapper that decorates every outgoing response with CORS headers
#[derive(Debug, Clone, Copy)]
pub struct Cors<S> {
    inner: S,
}

impl<S> Cors<S> {
    pub const fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S, Req, B> Service<Req> for Cors<S>
where
    S: Service<Req, Response = Response<B>>,
{
    type Response = Response<B>;
    type Error = S::Error;
    type Future = CorsFuture<S::Future>;

    fn call(&self, req: Req) -> Self::Future {
        CorsFuture {
            inner: Box::pin(self.inner.call(req)),
        }
    }
}

/// Response future of [`Cors`]
pub struct CorsFuture<F> {
    inner: Pin<Box<F>>,
}

impl<F, B, E> Future for CorsFuture<F>
where
    F: Future<Output = Result<Response<B>, E>>,
{
    type Output = F::Output;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx).map_ok(|mut response| {
            apply_cors_headers(response.headers_mut());
            response
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use hyper::body::Bytes;
    use hyper::service::service_fn;
    use hyper::{Request, StatusCode};
    use std::convert::Infallible;

    fn request() -> Request<Full<Bytes>> {
        Request::new(Full::new(Bytes::new()))
    }

    fn assert_cors(headers: &HeaderMap) {
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "GET, OPTIONS");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], "*");
    }

    #[test]
    fn test_apply_keeps_other_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("text/plain"));
        headers.insert(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("https://example.com"),
        );

        apply_cors_headers(&mut headers);

        assert_cors(&headers);
        assert_eq!(headers["content-type"], "text/plain");
        assert_eq!(headers.get_all(ACCESS_CONTROL_ALLOW_ORIGIN).iter().count(), 1);
    }

    #[tokio::test]
    async fn test_wraps_every_status() {
        for status in [
            StatusCode::OK,
            StatusCode::MOVED_PERMANENTLY,
            StatusCode::NOT_FOUND,
            StatusCode::NOT_IMPLEMENTED,
        ] {
            let svc = Cors::new(service_fn(move |_req: Request<Full<Bytes>>| async move {
                let mut resp = Response::new(Full::new(Bytes::new()));
                *resp.status_mut() = status;
                Ok::<_, Infallible>(resp)
            }));

            let resp = svc.call(request()).await.unwrap();
            assert_eq!(resp.status(), status);
            assert_cors(resp.headers());
        }
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let svc = Cors::new(service_fn(|_req: Request<Full<Bytes>>| async {
            Err::<Response<Full<Bytes>>, _>("boom")
        }));
        assert_eq!(svc.call(request()).await.unwrap_err(), "boom");
    }
}
