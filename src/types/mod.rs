use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

mod error;

pub use error::{AppError, AuthError, Result, TokenError, ValidationError};

// ============= Roles =============

/// Access level embedded in every bearer token.
///
/// The set is closed: anything other than `client` or `moderator` is rejected
/// when it is deserialized or parsed, so no other value reaches the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Buyers and renters. Create flats, see approved ones.
    Client,
    /// Staff. Create houses, move flats through moderation.
    Moderator,
}

impl Role {
    /// Wire representation of the role.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Moderator => "moderator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "client" => Ok(Role::Client),
            "moderator" => Ok(Role::Moderator),
            other => Err(ValidationError::InvalidRole(other.to_string())),
        }
    }
}

// ============= Flat Status =============

/// Moderation status of a flat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FlatStatus {
    Created,
    #[serde(alias = "on moderation")]
    OnModeration,
    Approved,
    Declined,
}

impl FlatStatus {
    /// Every recognised status, in lifecycle order.
    pub const ALL: [FlatStatus; 4] = [
        FlatStatus::Created,
        FlatStatus::OnModeration,
        FlatStatus::Approved,
        FlatStatus::Declined,
    ];

    /// Storage and wire representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            FlatStatus::Created => "created",
            FlatStatus::OnModeration => "on_moderation",
            FlatStatus::Approved => "approved",
            FlatStatus::Declined => "declined",
        }
    }
}

impl fmt::Display for FlatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlatStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "created" => Ok(FlatStatus::Created),
            // Older clients send the human-readable form.
            "on_moderation" | "on moderation" => Ok(FlatStatus::OnModeration),
            "approved" => Ok(FlatStatus::Approved),
            "declined" => Ok(FlatStatus::Declined),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

// ============= Domain Records =============

/// A registered account.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    /// PHC-formatted Argon2 digest.
    pub password_hash: String,
    pub role: Role,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// A housing development.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct House {
    pub id: i64,
    pub address: String,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Last time a flat under this house was created or changed status.
    pub updated_at: DateTime<Utc>,
}

/// A unit inside a house.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Flat {
    pub id: i64,
    pub house_id: i64,
    pub status: FlatStatus,
    /// Unit number, unique within the house.
    pub number: i32,
    pub rooms: i32,
    pub price: i64,
}

/// Validated input for a new house.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHouse {
    pub address: String,
    pub year: i32,
    pub developer: Option<String>,
}

/// Validated input for a new flat. Status is always `created` on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFlat {
    pub house_id: i64,
    pub number: i32,
    pub rooms: i32,
    pub price: i64,
}

// ============= API Request/Response Types =============

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub user_type: Role,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, IntoParams)]
pub struct DummyLoginQuery {
    pub user_type: Role,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateHouseRequest {
    pub address: String,
    pub year: i32,
    #[serde(default)]
    pub developer: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateFlatRequest {
    pub house_id: i64,
    pub number: i32,
    pub rooms: i32,
    pub price: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateFlatRequest {
    pub id: i64,
    /// Target status. Kept as a raw string so unknown values are reported as
    /// an unknown status rather than a malformed body.
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FlatsResponse {
    pub flats: Vec<Flat>,
}

// ============= Token Claims =============

/// JWT claims carried by every bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The caller's role.
    pub sub: Role,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("client", Role::Client)]
    #[case("moderator", Role::Moderator)]
    fn test_role_parses_known_values(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(raw.parse::<Role>(), Ok(expected));
        assert_eq!(expected.as_str(), raw);
    }

    #[rstest]
    #[case("admin")]
    #[case("Client")]
    #[case("")]
    fn test_role_rejects_unknown_values(#[case] raw: &str) {
        assert_eq!(
            raw.parse::<Role>(),
            Err(ValidationError::InvalidRole(raw.to_string()))
        );
    }

    #[test]
    fn test_role_deserialization_is_closed() {
        let ok: Role = serde_json::from_str("\"moderator\"").expect("known role");
        assert_eq!(ok, Role::Moderator);

        let err = serde_json::from_str::<Role>("\"admin\"");
        assert!(err.is_err(), "admin must not deserialize into a role");
    }

    #[rstest]
    #[case("created", FlatStatus::Created)]
    #[case("on_moderation", FlatStatus::OnModeration)]
    #[case("on moderation", FlatStatus::OnModeration)]
    #[case("approved", FlatStatus::Approved)]
    #[case("declined", FlatStatus::Declined)]
    fn test_flat_status_parses(#[case] raw: &str, #[case] expected: FlatStatus) {
        assert_eq!(raw.parse::<FlatStatus>(), Ok(expected));
    }

    #[test]
    fn test_flat_status_rejects_archived() {
        assert_eq!(
            "archived".parse::<FlatStatus>(),
            Err(ValidationError::UnknownStatus("archived".to_string()))
        );
    }

    #[test]
    fn test_flat_status_serializes_snake_case() {
        let json = serde_json::to_string(&FlatStatus::OnModeration).expect("serialize");
        assert_eq!(json, "\"on_moderation\"");

        let legacy: FlatStatus = serde_json::from_str("\"on moderation\"").expect("alias");
        assert_eq!(legacy, FlatStatus::OnModeration);
    }

    #[test]
    fn test_user_debug_redacts_hash() {
        let user = User {
            id: "u-1".to_string(),
            email: "m@x.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::Moderator,
        };

        let rendered = format!("{:?}", user);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
