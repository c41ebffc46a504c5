use std::collections::HashMap;

use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde_json::Map;
use serde_json::Value;

use super::auth_request;
use super::session_response;
use super::ApiError;
use crate::inbound::http::router::AppState;

pub async fn signup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    body: Option<Json<Map<String, Value>>>,
) -> Result<Response, ApiError> {
    let mut request = auth_request(
        state.store.clone(),
        headers,
        query,
        body.map(|Json(payload)| payload),
    );

    let verdict = state
        .engine
        .run(&*state.signup_scheme, &mut request)
        .await?;

    session_response(StatusCode::CREATED, verdict)
}
