//! Admin authorization: a single shared bearer secret.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use subtle::ConstantTimeEq;

use noticeboard_core::constants::{BEARER_PREFIX, ENV_ADMIN_TOKEN};
use noticeboard_core::error::{BoardError, Result};

use crate::error::ApiError;
use crate::state::AppState;

/// Checks `Authorization: Bearer <token>` against the configured secret.
///
/// A missing secret is a server problem (`ServerMisconfigured`), never
/// `Unauthorized`, so operators can tell "not set up" from "wrong token".
#[derive(Clone)]
pub struct AdminGate {
    secret: Option<String>,
}

impl AdminGate {
    /// Creates a gate. An empty or whitespace-only secret counts as unset.
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.trim().is_empty()),
        }
    }

    /// True if a secret is configured.
    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Checks a raw `Authorization` header value.
    pub fn check_header(&self, header: Option<&str>) -> Result<()> {
        let secret = self.secret.as_deref().ok_or_else(|| {
            BoardError::ServerMisconfigured(format!("missing {ENV_ADMIN_TOKEN}"))
        })?;

        let token = header
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .map(str::trim)
            .ok_or(BoardError::Unauthorized)?;

        if bool::from(token.as_bytes().ct_eq(secret.as_bytes())) {
            Ok(())
        } else {
            Err(BoardError::Unauthorized)
        }
    }

    /// Checks the `Authorization` header in `headers`.
    pub fn check(&self, headers: &HeaderMap) -> Result<()> {
        let header = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        self.check_header(header)
    }
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("configured", &self.is_configured())
            .finish()
    }
}

/// Extractor that only lets requests through the [`AdminGate`].
///
/// ```ignore
/// async fn handler(_admin: AdminAuth, State(state): State<Arc<AppState>>) { ... }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AdminAuth;

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> std::result::Result<Self, Self::Rejection> {
        state.gate.check(&parts.headers)?;
        Ok(AdminAuth)
    }
}
