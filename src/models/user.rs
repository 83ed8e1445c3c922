use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/register`
///
/// Lengths are checked by `validation::registration`, not by deserialization,
/// so that a bad value produces a field-level validation error.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistrationRequest {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
}

/// One successful registration.
///
/// The database store fills `id` and `created_at`; the in-memory store leaves
/// them empty and they are dropped from the JSON shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    /// Stored and echoed verbatim, no hashing
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub data: UserRecord,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_registrations: i64,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}
