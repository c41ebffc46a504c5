use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::me::me;
use super::handlers::signin::signin;
use super::handlers::signup::signup;
use super::middleware::authenticate as auth_middleware;
use crate::domain::auth::engine::AuthEngine;
use crate::domain::auth::ports::Store;
use crate::domain::auth::schemes::CredentialFields;
use crate::domain::auth::schemes::SigninScheme;
use crate::domain::auth::schemes::SignupScheme;
use crate::domain::auth::schemes::TokenScheme;
use crate::domain::auth::schemes::TokenSchemeConfig;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AuthEngine>,
    pub store: Store,
    pub token_scheme: Arc<TokenScheme>,
    pub signin_scheme: Arc<SigninScheme>,
    pub signup_scheme: Arc<SignupScheme>,
}

/// Per-route scheme overrides.
#[derive(Clone, Default)]
pub struct RouteSchemes {
    pub credential_fields: CredentialFields,
    pub token: TokenSchemeConfig,
}

pub fn create_router(engine: Arc<AuthEngine>, store: Store) -> Router {
    create_router_with(engine, store, RouteSchemes::default())
}

pub fn create_router_with(engine: Arc<AuthEngine>, store: Store, schemes: RouteSchemes) -> Router {
    let state = AppState {
        token_scheme: Arc::new(engine.token_scheme(schemes.token)),
        signin_scheme: Arc::new(engine.signin_scheme(schemes.credential_fields.clone())),
        signup_scheme: Arc::new(engine.signup_scheme(schemes.credential_fields)),
        engine,
        store,
    };

    let public_routes = Router::new()
        .route("/api/auth/signin", post(signin))
        .route("/api/auth/signup", post(signup));

    let protected_routes = Router::new()
        .route("/api/auth/me", get(me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Headers stay out of the span: they carry credentials.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri().path(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                path = %request.uri().path(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
