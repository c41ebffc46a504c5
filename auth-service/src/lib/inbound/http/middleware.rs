use std::collections::HashMap;

use axum::extract::Query;
use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::Response;

use crate::inbound::http::handlers::auth_request;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Middleware that runs the token scheme and adds the [`Identity`] to request
/// extensions.
///
/// [`Identity`]: crate::domain::auth::models::Identity
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let query = Query::<HashMap<String, String>>::try_from_uri(req.uri())
        .map(|Query(query)| query)
        .unwrap_or_default();

    let mut request = auth_request(state.store.clone(), req.headers().clone(), query, None);

    let verdict = state
        .engine
        .run(&*state.token_scheme, &mut request)
        .await?;

    if let Some(identity) = verdict.identity {
        req.extensions_mut().insert(identity);
    }

    Ok(next.run(req).await)
}
