//! Static serving of locally stored media under `/uploads`.

use axum::{
    body::Body,
    http::{header, HeaderValue, Request},
    middleware::{self, Next},
    response::Response,
    Router,
};
use potluck_core::{video_content_type, MediaKind};
use std::path::Path;
use tower_http::services::ServeDir;

/// Serves `<uploads_dir>/images` and `<uploads_dir>/videos`. Nothing else
/// under the uploads directory is reachable.
pub fn router<S>(uploads_dir: &Path) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let serve = |kind: MediaKind| {
        (
            format!("/uploads/{}", kind.folder()),
            ServeDir::new(uploads_dir.join(kind.folder())),
        )
    };

    let (image_path, images) = serve(MediaKind::Image);
    let (video_path, videos) = serve(MediaKind::Video);

    let video_router = Router::new()
        .nest_service(&video_path, videos)
        .layer(middleware::from_fn(set_video_content_type));

    Router::new()
        .nest_service(&image_path, images)
        .merge(video_router)
}

/// Overrides the guessed content type for video extensions browsers are
/// picky about (e.g. `.ogg` would otherwise go out as audio).
async fn set_video_content_type(request: Request<Body>, next: Next) -> Response {
    let content_type = video_content_type(request.uri().path());
    let mut response = next.run(request).await;

    if let Some(content_type) = content_type {
        if response.status().is_success() {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
    }

    response
}
