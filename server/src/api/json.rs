use super::ApiError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

/// JSON request body whose rejections render as a 400 `ErrorResponse`
/// instead of axum's plain-text 4xx.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::recipes::rate::RateRecipeRequest;
    use axum::routing::post;
    use axum::Router;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    async fn echo_rating(ApiJson(req): ApiJson<RateRecipeRequest>) -> Json<Value> {
        Json(json!({ "rating": req.rating }))
    }

    fn server() -> TestServer {
        TestServer::new(Router::new().route("/rate", post(echo_rating))).unwrap()
    }

    #[tokio::test]
    async fn test_well_formed_body_is_accepted() {
        let response = server().post("/rate").json(&json!({ "rating": 4 })).await;
        response.assert_status_ok();
        response.assert_json(&json!({ "rating": 4 }));
    }

    #[tokio::test]
    async fn test_bad_bodies_are_json_bad_requests() {
        let server = server();

        for body in [json!({ "rating": "4" }), json!({}), json!({ "rating": 4.5 })] {
            let response = server.post("/rate").json(&body).expect_failure().await;
            response.assert_status_bad_request();
            let error: Value = response.json();
            assert!(
                error["error"].as_str().is_some_and(|e| !e.is_empty()),
                "body {} gave {}",
                body,
                error
            );
        }
    }

    #[tokio::test]
    async fn test_syntax_error_and_missing_content_type_are_bad_requests() {
        let server = server();

        server
            .post("/rate")
            .text("{\"rating\":")
            .content_type("application/json")
            .expect_failure()
            .await
            .assert_status_bad_request();
        server
            .post("/rate")
            .text("{\"rating\":4}")
            .expect_failure()
            .await
            .assert_status_bad_request();
    }
}
