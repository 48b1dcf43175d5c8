use crate::types::{AppError, Claims, Result, Role, TokenError};
use crate::utils::clock::SharedClock;
use chrono::TimeDelta;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

/// Issues and verifies stateless HS256 bearer tokens.
///
/// The signing key is fixed at construction and never changes, so a single
/// instance is shared by every request. Expiry is checked against the
/// injected clock with no leeway.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl: TimeDelta,
    clock: SharedClock,
}

impl TokenService {
    /// Creates a new TokenService.
    ///
    /// # Arguments
    /// * `secret` - Symmetric signing key (at least 32 bytes in production)
    /// * `issuer` - Value written to and required in the `iss` claim
    /// * `ttl` - Lifetime of tokens issued with [`issue`](Self::issue)
    /// * `clock` - Time source for `iat`/`exp`
    pub fn new(secret: &[u8], issuer: impl Into<String>, ttl: TimeDelta, clock: SharedClock) -> Self {
        let issuer = issuer.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        // Expiry is enforced below against our own clock.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            issuer,
            ttl,
            clock,
        }
    }

    /// Default token lifetime.
    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Issues a token for `role` with the configured lifetime.
    pub fn issue(&self, role: Role) -> Result<String> {
        self.issue_with_ttl(role, self.ttl)
    }

    /// Issues a token for `role` that expires `ttl` from now.
    pub fn issue_with_ttl(&self, role: Role, ttl: TimeDelta) -> Result<String> {
        let now = self.clock.utc();
        let claims = Claims {
            sub: role,
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Verifies a token and returns its claims.
    pub fn verify(&self, token: &str) -> std::result::Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm | ErrorKind::MissingAlgorithm => {
                    TokenError::InvalidSignature
                }
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;

        if self.clock.utc().timestamp() > data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}
