use std::collections::HashMap;

use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::AuthVerdict;
use crate::domain::auth::models::Identity;
use crate::domain::auth::ports::Store;
use crate::domain::auth::request::AuthRequest;

pub mod me;
pub mod signin;
pub mod signup;

/// Response header repeating the issued session token.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    Conflict(String),
    Unauthorized(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated
            | AuthError::InvalidToken
            | AuthError::Rejected(_)
            | AuthError::PasswordMismatch
            | AuthError::WeakPassword { .. } => ApiError::Unauthorized(err.to_string()),
            AuthError::BadRequest(_) => ApiError::BadRequest(err.to_string()),
            AuthError::DuplicateUser(_) => ApiError::Conflict(err.to_string()),
            AuthError::Configuration(_)
            | AuthError::EntropySource(_)
            | AuthError::DuplicateToken
            | AuthError::Password(_)
            | AuthError::Store(_)
            | AuthError::Interrupted => ApiError::InternalServerError(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub id: String,
    pub username: String,
}

impl From<&Identity> for UserData {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.to_string(),
            username: identity.user_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionResponseData {
    pub user: UserData,
    pub token: String,
}

/// Build the scheme view of an HTTP request.
pub(crate) fn auth_request(
    store: Store,
    headers: HeaderMap,
    query: HashMap<String, String>,
    body: Option<Map<String, Value>>,
) -> AuthRequest {
    let request = AuthRequest::new(Some(store))
        .with_headers(headers)
        .with_query(query);

    match body {
        Some(payload) => request.with_payload(payload),
        None => request,
    }
}

/// Render a credential verdict as `{user, token}` plus the token header.
pub(crate) fn session_response(
    status: StatusCode,
    verdict: AuthVerdict,
) -> Result<Response, ApiError> {
    let (Some(identity), Some(token)) = (verdict.identity, verdict.issued_token) else {
        return Err(ApiError::InternalServerError(
            "credential scheme finished without a session".to_string(),
        ));
    };

    let header = HeaderValue::from_str(&token)
        .map_err(|e| ApiError::InternalServerError(e.to_string()))?;

    let data = SessionResponseData {
        user: UserData::from(&identity),
        token,
    };

    Ok(([(ACCESS_TOKEN_HEADER, header)], ApiSuccess::new(status, data)).into_response())
}
