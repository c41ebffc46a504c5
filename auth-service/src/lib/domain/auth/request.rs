use std::collections::HashMap;

use http::header::AUTHORIZATION;
use http::HeaderMap;
use serde_json::Map;
use serde_json::Value;

use crate::domain::auth::models::AuthVerdict;
use crate::domain::auth::ports::Store;

/// Inbound request as seen by an authentication scheme.
///
/// Carries what the schemes read (headers, query, payload), the store handle
/// for the current connection, and the verdict accumulated so far.
#[derive(Clone, Default)]
pub struct AuthRequest {
    pub headers: HeaderMap,
    pub query: HashMap<String, String>,
    pub payload: Option<Map<String, Value>>,
    pub store: Option<Store>,
    pub auth: AuthVerdict,
}

impl AuthRequest {
    pub fn new(store: Option<Store>) -> Self {
        Self {
            store,
            ..Self::default()
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_query(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }

    pub fn with_payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Authorization header split into scheme and credentials.
    ///
    /// The credentials part is the second space-delimited field.
    pub fn authorization(&self) -> Option<(&str, Option<&str>)> {
        let value = self.headers.get(AUTHORIZATION)?.to_str().ok()?;
        let mut fields = value.split(' ');
        let scheme = fields.next()?;
        let credentials = fields.next().filter(|c| !c.is_empty());
        Some((scheme, credentials))
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// String payload field; absent, non-string and empty values read as None.
    pub fn payload_str(&self, field: &str) -> Option<&str> {
        self.payload
            .as_ref()?
            .get(field)?
            .as_str()
            .filter(|v| !v.is_empty())
    }
}
