use crate::auth::jwt::TokenService;
use crate::types::{AppError, AuthError, Claims, Role, TokenError};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Per-request access decision: bearer token in, claims or a reason out.
///
/// Role checks are plain equality over the two roles. A moderator does not
/// pass a client-only gate and a client does not pass a moderator-only one.
/// The gate never touches storage; the role in the token is trusted as-is.
#[derive(Clone)]
pub struct AuthorizationGate {
    tokens: Arc<TokenService>,
}

impl AuthorizationGate {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Verifies the bearer token without checking its role.
    pub fn authenticate(&self, header: Option<&str>) -> Result<Claims, AuthError> {
        let token = extract_bearer(header)?;
        let claims = self.tokens.verify(token)?;
        Ok(claims)
    }

    /// Verifies the bearer token and requires its role to equal `required`.
    pub fn authorize(&self, header: Option<&str>, required: Role) -> Result<Claims, AuthError> {
        let claims = self.authenticate(header)?;

        if claims.sub != required {
            return Err(AuthError::InsufficientRole {
                required,
                actual: claims.sub,
            });
        }

        Ok(claims)
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let token = header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(AuthError::MissingCredential)?;

    if token.is_empty() {
        return Err(AuthError::MissingCredential);
    }

    Ok(token)
}

/// State for [`require_role`]: which gate to ask and what to require.
#[derive(Clone)]
pub struct RoleRequirement {
    gate: AuthorizationGate,
    required: Option<Role>,
}

impl RoleRequirement {
    /// Any valid token passes.
    pub fn authenticated(gate: AuthorizationGate) -> Self {
        Self {
            gate,
            required: None,
        }
    }

    /// Only tokens carrying exactly `role` pass.
    pub fn only(gate: AuthorizationGate, role: Role) -> Self {
        Self {
            gate,
            required: Some(role),
        }
    }
}

/// Axum middleware that runs the gate and stores the verified [`Claims`] in
/// the request extensions.
pub async fn require_role(
    State(requirement): State<RoleRequirement>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = match req.headers().get(header::AUTHORIZATION) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| AuthError::InvalidCredential(TokenError::Malformed))?,
        ),
        None => None,
    };

    let decision = match requirement.required {
        Some(role) => requirement.gate.authorize(header, role),
        None => requirement.gate.authenticate(header),
    };

    let claims = decision.map_err(|e| {
        tracing::warn!(reason = %e, path = %req.uri().path(), "request rejected by authorization gate");
        e
    })?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Extractor for the claims placed by [`require_role`].
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Auth(AuthError::MissingCredential))
    }
}
