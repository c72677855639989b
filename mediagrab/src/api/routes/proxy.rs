//! Streaming proxy route.
//!
//! Media CDNs enforce anti-hotlink checks, so the browser cannot fetch
//! assets directly from the resolve response. This route forwards the
//! request with browser-mimicking headers and Range support, and pipes
//! the upstream body through without buffering it.

use axum::Router;
use axum::body::Body;
use axum::extract::{Query, Request};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use futures::TryStreamExt;
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;

use crate::api::error::{ApiError, ApiResult};
use crate::api::server::AppState;

const PROXY_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Max bytes of an upstream error body echoed back for diagnostics.
const ERROR_SNIPPET_LIMIT: usize = 256;

fn proxy_client() -> ApiResult<&'static reqwest::Client> {
    // No total request timeout: media transfers legitimately run for
    // minutes. Connect and read timeouts still bound a dead upstream.
    static CLIENT: OnceLock<Result<reqwest::Client, String>> = OnceLock::new();

    let client = CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .read_timeout(Duration::from_secs(30))
            .tcp_nodelay(true)
            .pool_max_idle_per_host(20)
            .build()
            .map_err(|e| e.to_string())
    });

    match client {
        Ok(client) => Ok(client),
        Err(message) => Err(ApiError::internal(message.clone())),
    }
}

#[derive(Debug, Deserialize)]
pub struct ProxyQuery {
    pub url: Option<String>,
}

/// Create the proxy router.
pub fn router() -> Router<AppState> {
    Router::new()
        // Mounted under `/api/proxy` by the main router.
        .route("/", get(proxy_get).options(proxy_options))
}

fn cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Range"),
    );
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static("Content-Length, Content-Range, Accept-Ranges, Content-Disposition"),
    );
}

async fn proxy_options() -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    cors_headers(&mut headers);
    (StatusCode::OK, headers)
}

/// Referer/Origin pair for CDN hosts that reject referer-less
/// requests.
fn spoofed_referer(host: &str) -> Option<(&'static str, &'static str)> {
    const TABLE: &[(&[&str], (&str, &str))] = &[
        (
            &["tiktokcdn", "tiktok.com"],
            ("https://www.tiktok.com/", "https://www.tiktok.com"),
        ),
        (
            &["cdninstagram", "instagram"],
            ("https://www.instagram.com/", "https://www.instagram.com"),
        ),
        (
            &["fbcdn", "facebook"],
            ("https://www.facebook.com/", "https://www.facebook.com"),
        ),
        (
            &["googlevideo", "ytimg", "youtube"],
            ("https://www.youtube.com/", "https://www.youtube.com"),
        ),
        (
            &["twimg", "twitter"],
            ("https://twitter.com/", "https://twitter.com"),
        ),
    ];

    let host = host.to_ascii_lowercase();
    TABLE
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| host.contains(n)))
        .map(|(_, pair)| *pair)
}

fn validate_target(raw: &str) -> ApiResult<url::Url> {
    let target = url::Url::parse(raw)
        .map_err(|e| ApiError::bad_request(format!("Invalid url: {e}")))?;
    match target.scheme() {
        "http" | "https" => {}
        _ => return Err(ApiError::bad_request("Only http/https URLs are allowed")),
    }

    // Basic SSRF guardrails: disallow loopback and private IP literals.
    if let Some(host) = target.host_str() {
        if host.eq_ignore_ascii_case("localhost") {
            return Err(ApiError::bad_request("localhost is not allowed"));
        }

        // Allow loopback IP literals in tests so an in-process upstream
        // can be used.
        if !cfg!(test)
            && let Ok(ip) = host.parse::<std::net::IpAddr>()
        {
            if ip.is_loopback() {
                return Err(ApiError::bad_request("loopback is not allowed"));
            }
            if matches!(ip, std::net::IpAddr::V4(v4) if v4.is_private()) {
                return Err(ApiError::bad_request("private ip is not allowed"));
            }
        }
    }

    Ok(target)
}

/// Default attachment filename derived from the target URL path.
fn attachment_filename(target: &url::Url) -> String {
    target
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .unwrap_or("media")
        .to_string()
}

pub async fn proxy_get(Query(query): Query<ProxyQuery>, req: Request) -> ApiResult<Response> {
    let raw_url = query
        .url
        .ok_or_else(|| ApiError::bad_request("Missing url parameter"))?;
    let target = validate_target(&raw_url)?;

    let headers_in = req.headers();

    // Browser-mimicking headers. Identity encoding keeps byte ranges
    // and Content-Length meaningful end to end.
    let mut upstream_headers = reqwest::header::HeaderMap::new();
    upstream_headers.insert(
        reqwest::header::ACCEPT,
        HeaderValue::from_static("*/*"),
    );
    upstream_headers.insert(
        reqwest::header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    upstream_headers.insert(
        reqwest::header::ACCEPT_ENCODING,
        HeaderValue::from_static("identity"),
    );

    // The caller's own User-Agent wins over the default.
    let ua = headers_in
        .get(header::USER_AGENT)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(PROXY_UA));
    upstream_headers.insert(reqwest::header::USER_AGENT, ua);

    if let Some(host) = target.host_str()
        && let Some((referer, origin)) = spoofed_referer(host)
    {
        upstream_headers.insert(reqwest::header::REFERER, HeaderValue::from_static(referer));
        upstream_headers.insert(reqwest::header::ORIGIN, HeaderValue::from_static(origin));
    }

    // Forward Range verbatim for partial-content semantics.
    if let Some(range) = headers_in.get(header::RANGE) {
        upstream_headers.insert(reqwest::header::RANGE, range.clone());
    }

    let client = proxy_client()?;

    let upstream = client
        .get(target.clone())
        .headers(upstream_headers)
        .send()
        .await
        .map_err(|e| ApiError::bad_gateway(format!("Proxy request failed: {e}")))?;

    let status = upstream.status();

    if !status.is_success() {
        // Pass the upstream status through with a short diagnostic
        // snippet; no retry.
        let snippet: String = upstream
            .text()
            .await
            .unwrap_or_default()
            .chars()
            .take(ERROR_SNIPPET_LIMIT)
            .collect();
        tracing::warn!(%status, url = %target, "Upstream rejected proxied request");
        return Err(ApiError::new(
            StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY),
            format!("Upstream returned {status}: {snippet}"),
        ));
    }

    // Build response headers.
    let mut out_headers = HeaderMap::new();
    let allowed = [
        header::CONTENT_TYPE,
        header::CONTENT_LENGTH,
        header::CONTENT_RANGE,
        header::ACCEPT_RANGES,
        header::CONTENT_DISPOSITION,
        header::CACHE_CONTROL,
        header::ETAG,
        header::LAST_MODIFIED,
    ];

    for key in allowed {
        if let Some(value) = upstream.headers().get(key.as_str()) {
            out_headers.insert(key, value.clone());
        }
    }

    if !out_headers.contains_key(header::CONTENT_DISPOSITION) {
        let filename = attachment_filename(&target);
        if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\"")) {
            out_headers.insert(header::CONTENT_DISPOSITION, value);
        }
    }

    cors_headers(&mut out_headers);

    // Pipe the upstream body straight through. Dropping the stream on
    // client disconnect releases the upstream connection.
    let stream = upstream.bytes_stream().map_err(std::io::Error::other);
    let body = Body::from_stream(stream);

    let mut response = (status, body).into_response();
    *response.headers_mut() = out_headers;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::http::Request as HttpRequest;
    use axum::response::IntoResponse;
    use tokio::net::TcpListener;
    use tower::ServiceExt;

    async fn upstream_handler(req: HttpRequest<Body>) -> impl IntoResponse {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("video/mp4"));
        headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));

        let status = if req.headers().get(header::RANGE).is_some() {
            headers.insert(
                header::CONTENT_RANGE,
                HeaderValue::from_static("bytes 100-200/1000"),
            );
            StatusCode::PARTIAL_CONTENT
        } else {
            StatusCode::OK
        };

        (status, headers, "abc")
    }

    async fn echo_headers(req: HttpRequest<Body>) -> impl IntoResponse {
        let mut headers = HeaderMap::new();
        for (name, echo) in [
            (header::USER_AGENT, "x-echo-user-agent"),
            (header::REFERER, "x-echo-referer"),
            (header::ACCEPT_ENCODING, "x-echo-accept-encoding"),
        ] {
            if let Some(value) = req.headers().get(name) {
                headers.insert(
                    axum::http::HeaderName::from_static(echo),
                    value.clone(),
                );
            }
        }
        (StatusCode::OK, headers, "ok")
    }

    async fn spawn_upstream() -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new()
            .route("/stream/clip.mp4", get(upstream_handler))
            .route("/echo", get(echo_headers))
            .route(
                "/missing",
                get(|| async { (StatusCode::NOT_FOUND, "gone from cdn") }),
            );
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn app() -> Router {
        Router::new()
            .nest("/api/proxy", router())
            .with_state(AppState::new())
    }

    fn proxy_uri(target: &str) -> String {
        format!("/api/proxy?url={}", urlencoding_encode(target))
    }

    fn urlencoding_encode(s: &str) -> String {
        let mut ser = url::form_urlencoded::Serializer::new(String::new());
        ser.append_pair("u", s);
        ser.finish().split_off(2)
    }

    #[tokio::test]
    async fn range_requests_pass_through_as_partial_content() {
        let addr = spawn_upstream().await;
        let target = format!("http://{addr}/stream/clip.mp4");

        let request = HttpRequest::builder()
            .uri(proxy_uri(&target))
            .header(header::RANGE, "bytes=100-200")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(
            response.headers().get(header::CONTENT_RANGE).unwrap(),
            "bytes 100-200/1000"
        );
        assert_eq!(response.headers().get(header::ACCEPT_RANGES).unwrap(), "bytes");
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn success_gets_default_attachment_filename() {
        let addr = spawn_upstream().await;
        let target = format!("http://{addr}/stream/clip.mp4");

        let request = HttpRequest::builder()
            .uri(proxy_uri(&target))
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"clip.mp4\""
        );

        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&bytes[..], b"abc");
    }

    #[tokio::test]
    async fn browser_headers_are_applied_upstream() {
        let addr = spawn_upstream().await;
        let target = format!("http://{addr}/echo");

        let request = HttpRequest::builder()
            .uri(proxy_uri(&target))
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get("x-echo-user-agent").unwrap(),
            PROXY_UA
        );
        assert_eq!(
            response.headers().get("x-echo-accept-encoding").unwrap(),
            "identity"
        );
    }

    #[tokio::test]
    async fn inbound_user_agent_overrides_default() {
        let addr = spawn_upstream().await;
        let target = format!("http://{addr}/echo");

        let request = HttpRequest::builder()
            .uri(proxy_uri(&target))
            .header(header::USER_AGENT, "custom-player/1.0")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get("x-echo-user-agent").unwrap(),
            "custom-player/1.0"
        );
    }

    #[tokio::test]
    async fn upstream_error_status_is_passed_through() {
        let addr = spawn_upstream().await;
        let target = format!("http://{addr}/missing");

        let request = HttpRequest::builder()
            .uri(proxy_uri(&target))
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].as_str().unwrap().contains("gone from cdn"));
    }

    #[tokio::test]
    async fn non_http_schemes_are_rejected_without_outbound_call() {
        let request = HttpRequest::builder()
            .uri(proxy_uri("ftp://example.com/file"))
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_url_is_rejected() {
        let request = HttpRequest::builder()
            .uri("/api/proxy")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn options_preflight_returns_ok_with_cors() {
        let request = HttpRequest::builder()
            .method("OPTIONS")
            .uri("/api/proxy")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
                .unwrap(),
            "Range"
        );
    }

    #[test]
    fn referer_table_matches_known_cdns() {
        assert_eq!(
            spoofed_referer("v16m.tiktokcdn-us.com").map(|(r, _)| r),
            Some("https://www.tiktok.com/")
        );
        assert_eq!(
            spoofed_referer("scontent.cdninstagram.com").map(|(r, _)| r),
            Some("https://www.instagram.com/")
        );
        assert_eq!(
            spoofed_referer("video.xx.fbcdn.net").map(|(r, _)| r),
            Some("https://www.facebook.com/")
        );
        assert!(spoofed_referer("cdn.example.com").is_none());
    }
}
