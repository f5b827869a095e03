//! In-memory booking store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use tokio::sync::Mutex;

use super::BookingStore;
use crate::models::{Booking, NewBooking};

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    bookings: HashMap<i64, Booking>,
}

/// Hash map store mirroring the `bookings` table constraints that matter
/// here: unique reference, check-out after check-in.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBookingStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.bookings.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn insert(&self, booking: &NewBooking) -> DatabaseResult<i64> {
        let mut inner = self.inner.lock().await;

        if inner
            .bookings
            .values()
            .any(|b| b.booking_reference == booking.booking_reference)
        {
            return Err(DatabaseError::UniqueViolation(format!(
                "bookings_booking_reference_key: {}",
                booking.booking_reference
            )));
        }
        if booking.check_out <= booking.check_in {
            return Err(DatabaseError::Configuration(
                "bookings check constraint: check_out_date > check_in_date".to_string(),
            ));
        }

        inner.next_id += 1;
        let id = inner.next_id;
        let now = Utc::now();

        inner.bookings.insert(
            id,
            Booking {
                id,
                user_id: booking.user_id,
                hotel_id: booking.hotel_id.clone(),
                provider_hotel_id: booking.provider_hotel_id.clone(),
                provider_booking_id: booking.provider_booking_id.clone(),
                check_in: booking.check_in,
                check_out: booking.check_out,
                guests: booking.guests,
                room_type: booking.room_type.clone(),
                total_price: booking.total_price,
                currency: booking.currency.clone(),
                status: booking.status,
                booking_reference: booking.booking_reference.clone(),
                special_requests: booking.special_requests.clone(),
                created_at: now,
                updated_at: now,
            },
        );

        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Booking>> {
        Ok(self.inner.lock().await.bookings.get(&id).cloned())
    }

    async fn find_by_user(&self, user_id: i64) -> DatabaseResult<Vec<Booking>> {
        let inner = self.inner.lock().await;
        let mut bookings: Vec<Booking> = inner
            .bookings
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();

        bookings.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(bookings)
    }
}
