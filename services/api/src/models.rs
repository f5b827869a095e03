//! API models for request and response payloads

use auth::{IssuedToken, User, UserProfile};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Request for user registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(flatten)]
    pub profile: UserProfile,
}

/// Response for a successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: User,
    #[serde(flatten)]
    pub token: IssuedToken,
}

/// Query string of the availability endpoint
#[derive(Debug, Deserialize)]
pub struct AvailabilityParams {
    pub hotel_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
}
