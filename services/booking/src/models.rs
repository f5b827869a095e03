//! Availability and booking models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use common::error::{ServiceError, ServiceResult};
use serde::{Deserialize, Serialize};

/// Largest party a single query or booking may cover
pub const MAX_GUESTS: u32 = 20;

const MAX_HOTEL_ID_LEN: usize = 64;

/// A validated availability request
///
/// Only constructible through [`AvailabilityQuery::new`], so a query in hand
/// always has check-out after check-in, at least one guest, and a hotel id
/// that is safe to embed in a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AvailabilityQuery {
    hotel_id: String,
    check_in: NaiveDate,
    check_out: NaiveDate,
    guests: u32,
}

impl AvailabilityQuery {
    pub fn new(
        hotel_id: impl Into<String>,
        check_in: NaiveDate,
        check_out: NaiveDate,
        guests: u32,
    ) -> ServiceResult<Self> {
        let hotel_id = hotel_id.into();

        if hotel_id.is_empty() || hotel_id.len() > MAX_HOTEL_ID_LEN {
            return Err(ServiceError::Validation(format!(
                "hotel id must be 1 to {} characters long",
                MAX_HOTEL_ID_LEN
            )));
        }
        if !hotel_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ServiceError::Validation(
                "hotel id may only contain letters, digits, '-' and '_'".to_string(),
            ));
        }
        if check_out <= check_in {
            return Err(ServiceError::Validation(
                "check-out date must be after check-in date".to_string(),
            ));
        }
        if guests == 0 || guests > MAX_GUESTS {
            return Err(ServiceError::Validation(format!(
                "guests must be between 1 and {}",
                MAX_GUESTS
            )));
        }

        Ok(Self {
            hotel_id,
            check_in,
            check_out,
            guests,
        })
    }

    pub fn hotel_id(&self) -> &str {
        &self.hotel_id
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    pub fn guests(&self) -> u32 {
        self.guests
    }
}

/// An availability answer for one query
///
/// `rooms_available` and `price` are optional because the provider and the
/// simulated fallback do not always fill them in the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityQuote {
    pub hotel_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub available: bool,
    pub currency: Option<String>,
    pub rooms_available: Option<u32>,
    /// Total price for the whole stay
    pub price: Option<f64>,
    /// Hotel id on the provider side, set only for live provider quotes
    #[serde(default)]
    pub provider_hotel_id: Option<String>,
}

impl AvailabilityQuote {
    /// A quote echoing `query` with nothing known about it yet
    pub fn for_query(query: &AvailabilityQuery, available: bool) -> Self {
        Self {
            hotel_id: query.hotel_id.clone(),
            check_in: query.check_in,
            check_out: query.check_out,
            guests: query.guests,
            available,
            currency: None,
            rooms_available: None,
            price: None,
            provider_hotel_id: None,
        }
    }
}

/// Booking lifecycle status
///
/// Only `Confirmed` is produced here; the others belong to flows outside
/// this service but may be read back from storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(format!("unknown booking status: {}", other)),
        }
    }
}

/// Booking entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub hotel_id: String,
    pub provider_hotel_id: Option<String>,
    pub provider_booking_id: Option<String>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub room_type: String,
    pub total_price: f64,
    pub currency: String,
    pub status: BookingStatus,
    pub booking_reference: String,
    pub special_requests: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New booking creation payload
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: i64,
    pub hotel_id: String,
    pub provider_hotel_id: Option<String>,
    pub provider_booking_id: Option<String>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub room_type: String,
    pub total_price: f64,
    pub currency: String,
    pub status: BookingStatus,
    pub booking_reference: String,
    pub special_requests: Option<String>,
}

/// What a user asks for when booking
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBooking {
    pub hotel_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub room_type: String,
    #[serde(default)]
    pub special_requests: Option<String>,
}
