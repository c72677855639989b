//! Media resolution route.

use axum::{Json, Router, extract::Query, extract::State, routing::get};
use tracing::debug;

use crate::api::error::{ApiError, ApiResult};
use crate::api::models::{ResolveQuery, ResolveResponse};
use crate::api::server::AppState;

use media_resolvers::extractor::canonical_url_for_id;
use media_resolvers::{PlatformTag, classify, is_valid_url, resolve_media};

/// Create the resolve router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(resolve))
}

/// `GET /api/resolve?platform={tag}&url={url}` (or `&id={post-id}`).
async fn resolve(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> ApiResult<Json<ResolveResponse>> {
    // An unrecognized platform value falls back to URL detection
    // rather than failing outright.
    let declared_tag = query.platform.as_deref().and_then(PlatformTag::from_str);

    let (tag, target) = if let Some(url) = query.url.as_deref().filter(|u| !u.trim().is_empty()) {
        if !is_valid_url(url) {
            return Err(ApiError::bad_request("Invalid URL")
                .with_note("Supply a full http(s) link to the post"));
        }
        let tag = declared_tag.unwrap_or_else(|| classify(url));
        (tag, url.to_string())
    } else if let Some(id) = query.id.as_deref().filter(|i| !i.trim().is_empty()) {
        let tag = declared_tag.ok_or_else(|| {
            ApiError::bad_request("Missing platform")
                .with_note("Resolving by id requires a platform tag")
        })?;
        let target = canonical_url_for_id(tag, id).ok_or_else(|| {
            ApiError::bad_request("This platform does not support id lookup")
        })?;
        (tag, target)
    } else {
        return Err(ApiError::bad_request("Missing url or id parameter"));
    };

    debug!(?tag, url = %target, "Resolving media");

    let resolution = resolve_media(tag, &target, &state.http_client, state.credentials.as_ref())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(ResolveResponse::from(resolution)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .nest("/api/resolve", router())
            .with_state(AppState::new())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn missing_url_and_id_is_rejected() {
        let (status, body) = get_json(app(), "/api/resolve").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("url or id"));
    }

    #[tokio::test]
    async fn malformed_url_is_rejected() {
        let (status, _) = get_json(app(), "/api/resolve?url=not-a-url").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn ftp_scheme_is_rejected() {
        let (status, _) =
            get_json(app(), "/api/resolve?url=ftp%3A%2F%2Fexample.com%2Ffile").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn id_without_platform_is_rejected() {
        let (status, body) = get_json(app(), "/api/resolve?id=12345").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["note"].as_str().unwrap().contains("platform"));
    }

    #[tokio::test]
    async fn direct_media_resolves_without_upstream_calls() {
        let (status, body) = get_json(
            app(),
            "/api/resolve?url=https%3A%2F%2Fcdn.example.com%2Fphoto.png",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "image");
        assert_eq!(body["formats"][0]["url"], "https://cdn.example.com/photo.png");
        assert_eq!(body["formats"][0]["format"], "image");
    }

    #[tokio::test]
    async fn unclassifiable_page_is_unsupported() {
        let (status, body) = get_json(
            app(),
            "/api/resolve?url=https%3A%2F%2Fexample.com%2Fsome-page",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Unsupported"));
    }
}
