use serde::{Deserialize, Serialize};

use crate::db::{Account, Waypoint, WaypointSet};
use crate::domain::Role;
use crate::services::LoginOutcome;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

// ---- Requests ----

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub nickname: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub username: String,
    /// Omitted to keep the current password.
    pub password: Option<String>,
    pub nickname: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Query parameters for the account listing.
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    /// Keep only accounts carrying this role tag.
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WaypointSetRequest {
    pub waypoint_name: String,
    pub description: String,
    #[serde(default)]
    pub waypoints: Vec<WaypointEntryRequest>,
}

#[derive(Debug, Deserialize)]
pub struct WaypointEntryRequest {
    pub seq: i32,
    pub lat: f64,
    pub long: f64,
    pub radius: i32,
    pub clue: String,
    #[serde(default)]
    pub hints: Vec<String>,
    pub image_subject: String,
}

// ---- Responses ----

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub account: AccountDto,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            token: outcome.token,
            token_type: "Bearer".to_string(),
            expires_in: outcome.expires_in,
            account: outcome.account.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: i32,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct AccountDto {
    pub username: String,
    pub nickname: String,
    pub roles: Vec<Role>,
    pub valid_from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
}

impl From<Account> for AccountDto {
    fn from(account: Account) -> Self {
        Self {
            username: account.username,
            nickname: account.nickname,
            roles: account.roles,
            valid_from: account.valid_from,
            valid_until: account.valid_until,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WaypointEntryDto {
    pub seq: i32,
    pub lat: f64,
    pub long: f64,
    pub radius: i32,
    pub clue: String,
    pub hints: Vec<String>,
    pub image_subject: String,
}

impl From<Waypoint> for WaypointEntryDto {
    fn from(waypoint: Waypoint) -> Self {
        Self {
            seq: waypoint.seq_order,
            lat: waypoint.latitude,
            long: waypoint.longitude,
            radius: waypoint.radius,
            clue: waypoint.clue,
            hints: waypoint.hints,
            image_subject: waypoint.image_subject,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WaypointSetDto {
    pub waypoint_name: String,
    pub description: String,
    pub waypoints: Vec<WaypointEntryDto>,
    pub valid_from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
}

impl From<WaypointSet> for WaypointSetDto {
    fn from(set: WaypointSet) -> Self {
        Self {
            waypoint_name: set.name,
            description: set.description,
            waypoints: set.waypoints.into_iter().map(Into::into).collect(),
            valid_from: set.valid_from,
            valid_until: set.valid_until,
        }
    }
}

/// Listing shape: entry counts instead of full entry bodies.
#[derive(Debug, Serialize)]
pub struct WaypointSetSummaryDto {
    pub waypoint_name: String,
    pub description: String,
    pub waypoint_count: usize,
    pub valid_from: String,
}

impl From<WaypointSet> for WaypointSetSummaryDto {
    fn from(set: WaypointSet) -> Self {
        Self {
            waypoint_name: set.name,
            description: set.description,
            waypoint_count: set.waypoints.len(),
            valid_from: set.valid_from,
        }
    }
}
