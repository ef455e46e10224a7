use crate::core::error::AppError;
use crate::features::auth::JwtValidator;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use base64::prelude::*;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

/// Request ID generator using UUID v7 (time-ordered)
#[derive(Clone, Copy)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string();
        Some(RequestId::new(HeaderValue::from_str(&id).unwrap()))
    }
}

/// Custom MakeSpan that includes request_id in the tracing span
#[derive(Clone, Debug)]
pub struct MakeSpanWithRequestId;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpanWithRequestId {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

pub fn cors_layer(allowed_origins: Vec<String>) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    // If origins list contains "*", allow any origin
    if allowed_origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        // Parse origins into HeaderValue
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

pub fn basic_auth_middleware(
    valid_credentials: Arc<String>,
) -> impl Fn(
    Request,
    Next,
)
    -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, Response>> + Send>>
       + Clone {
    move |req: Request, next: Next| {
        let credentials = valid_credentials.clone();
        Box::pin(async move {
            let auth_header = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|header| header.to_str().ok());

            if let Some(auth_header) = auth_header {
                if let Some(encoded) = auth_header.strip_prefix("Basic ") {
                    if let Ok(decoded) = BASE64_STANDARD.decode(encoded) {
                        if let Ok(creds) = String::from_utf8(decoded) {
                            if creds == *credentials {
                                return Ok(next.run(req).await);
                            }
                        }
                    }
                }
            }

            let response = Response::builder()
                .status(StatusCode::UNAUTHORIZED)
                .header(header::WWW_AUTHENTICATE, "Basic realm=\"Swagger UI\"")
                .body(Body::from("Unauthorized"))
                .unwrap();

            Err(response)
        })
    }
}

pub async fn auth_middleware(
    State(validator): State<Arc<JwtValidator>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    // Validate Bearer format
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| {
            AppError::Unauthorized("Invalid authorization header format".to_string())
        })?;

    // Validate token
    let user = validator.validate_token(token)?;

    // Insert authenticated user into request extensions
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::{AuthenticatedUser, Claims};
    use axum::{middleware::from_fn_with_state, routing::get, Router};
    use axum_test::TestServer;
    use jsonwebtoken::{encode, EncodingKey, Header as JwtHeader};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    const SECRET: &str = "middleware-test-secret";

    async fn whoami(user: AuthenticatedUser) -> String {
        user.sub
    }

    fn protected_server() -> TestServer {
        let validator = Arc::new(JwtValidator::new(SECRET, Duration::from_secs(0)));
        let app = Router::new()
            .route("/whoami", get(whoami))
            .route_layer(from_fn_with_state(validator, auth_middleware));
        TestServer::new(app).unwrap()
    }

    fn issue(secret: &str) -> String {
        let exp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            + 3600;
        encode(
            &JwtHeader::default(),
            &Claims {
                sub: "user-1".to_string(),
                roles: vec!["citizen".to_string()],
                exp,
            },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_request_without_token_is_unauthorized() {
        let server = protected_server();

        let response = server.get("/whoami").await;

        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_non_bearer_scheme_is_unauthorized() {
        let server = protected_server();

        let response = server
            .get("/whoami")
            .add_header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .await;

        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_token_signed_with_wrong_secret_is_unauthorized() {
        let server = protected_server();

        let response = server
            .get("/whoami")
            .authorization_bearer(&issue("other-secret"))
            .await;

        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler_with_identity() {
        let server = protected_server();

        let response = server
            .get("/whoami")
            .authorization_bearer(&issue(SECRET))
            .await;

        response.assert_status_ok();
        response.assert_text("user-1");
    }
}
