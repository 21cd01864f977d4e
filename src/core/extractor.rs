use axum::{
    body::Body,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;

/// JSON body extractor whose rejections use the `ApiResponse` error envelope
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(|rejection| AppError::Validation(rejection_message(&rejection)))
    }
}

/// Profile forms and review decisions are sent as JSON; tell the client which part was wrong
fn rejection_message(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            format!("Request body has unexpected fields or values: {}", err.body_text())
        }
        JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON".to_string(),
        JsonRejection::MissingJsonContentType(_) => {
            "Request body must be sent as application/json".to_string()
        }
        _ => "Could not read request body".to_string(),
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Sign in to continue".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Router};
    use axum_test::TestServer;
    use serde::Deserialize;
    use serde_json::{json, Value};

    #[derive(Deserialize)]
    struct Decision {
        status: String,
    }

    async fn echo(AppJson(decision): AppJson<Decision>) -> String {
        decision.status
    }

    async fn whoami(user: AuthenticatedUser) -> String {
        user.account_id.to_string()
    }

    fn server() -> TestServer {
        let app = Router::new()
            .route("/decision", post(echo))
            .route("/whoami", post(whoami));
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_is_extracted() {
        let response = server()
            .post("/decision")
            .json(&json!({"status": "approved"}))
            .await;
        response.assert_status_ok();
        response.assert_text("approved");
    }

    #[tokio::test]
    async fn test_wrong_shape_is_validation_error() {
        let response = server()
            .post("/decision")
            .json(&json!({"status": 5}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Request body has unexpected fields or values"));
    }

    #[tokio::test]
    async fn test_malformed_and_untyped_bodies() {
        let response = server()
            .post("/decision")
            .content_type("application/json")
            .text("{\"status\":")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["message"], "Request body is not valid JSON");

        let response = server()
            .post("/decision")
            .text("{\"status\":\"approved\"}")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["message"], "Request body must be sent as application/json");
    }

    #[tokio::test]
    async fn test_missing_identity_is_unauthorized() {
        server()
            .post("/whoami")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
