//! PostgreSQL booking repository

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use super::BookingStore;
use crate::models::{Booking, BookingStatus, NewBooking};

const BOOKING_COLUMNS: &str = "id, user_id, hotel_id, provider_hotel_id, provider_booking_id, \
     check_in_date, check_out_date, guests, room_type, total_price, currency, status, \
     booking_reference, special_requests, created_at, updated_at";

#[derive(Clone)]
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn booking_from_row(row: &PgRow) -> DatabaseResult<Booking> {
    let status: String = row.try_get("status").map_err(DatabaseError::Query)?;
    let status = status
        .parse::<BookingStatus>()
        .map_err(DatabaseError::Configuration)?;

    Ok(Booking {
        id: row.try_get("id").map_err(DatabaseError::Query)?,
        user_id: row.try_get("user_id").map_err(DatabaseError::Query)?,
        hotel_id: row.try_get("hotel_id").map_err(DatabaseError::Query)?,
        provider_hotel_id: row.try_get("provider_hotel_id").map_err(DatabaseError::Query)?,
        provider_booking_id: row
            .try_get("provider_booking_id")
            .map_err(DatabaseError::Query)?,
        check_in: row.try_get("check_in_date").map_err(DatabaseError::Query)?,
        check_out: row.try_get("check_out_date").map_err(DatabaseError::Query)?,
        guests: row.try_get("guests").map_err(DatabaseError::Query)?,
        room_type: row.try_get("room_type").map_err(DatabaseError::Query)?,
        total_price: row.try_get("total_price").map_err(DatabaseError::Query)?,
        currency: row.try_get("currency").map_err(DatabaseError::Query)?,
        status,
        booking_reference: row.try_get("booking_reference").map_err(DatabaseError::Query)?,
        special_requests: row.try_get("special_requests").map_err(DatabaseError::Query)?,
        created_at: row.try_get("created_at").map_err(DatabaseError::Query)?,
        updated_at: row.try_get("updated_at").map_err(DatabaseError::Query)?,
    })
}

#[async_trait]
impl BookingStore for PgBookingRepository {
    async fn insert(&self, booking: &NewBooking) -> DatabaseResult<i64> {
        info!(
            "Creating booking {} for user {}",
            booking.booking_reference, booking.user_id
        );

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO bookings (
                user_id, hotel_id, provider_hotel_id, provider_booking_id,
                check_in_date, check_out_date, guests, room_type, total_price,
                currency, status, booking_reference, special_requests
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id
            "#,
        )
        .bind(booking.user_id)
        .bind(&booking.hotel_id)
        .bind(&booking.provider_hotel_id)
        .bind(&booking.provider_booking_id)
        .bind(booking.check_in)
        .bind(booking.check_out)
        .bind(booking.guests)
        .bind(&booking.room_type)
        .bind(booking.total_price)
        .bind(&booking.currency)
        .bind(booking.status.as_str())
        .bind(&booking.booking_reference)
        .bind(&booking.special_requests)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Booking>> {
        let query = format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        row.as_ref().map(booking_from_row).transpose()
    }

    async fn find_by_user(&self, user_id: i64) -> DatabaseResult<Vec<Booking>> {
        let query = format!(
            "SELECT {} FROM bookings WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            BOOKING_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        rows.iter().map(booking_from_row).collect()
    }
}
