//! Booking persistence

use std::sync::Arc;

use async_trait::async_trait;
use common::error::DatabaseResult;

use crate::models::{Booking, NewBooking};

pub mod booking;
pub mod memory;

pub use booking::PgBookingRepository;
pub use memory::InMemoryBookingStore;

/// Booking store contract
///
/// `insert` must reject a duplicate `booking_reference` with
/// `DatabaseError::UniqueViolation`.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Persist a booking and return its id
    async fn insert(&self, booking: &NewBooking) -> DatabaseResult<i64>;

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Booking>>;

    /// All bookings of a user, newest first (`created_at`, then `id`, descending)
    async fn find_by_user(&self, user_id: i64) -> DatabaseResult<Vec<Booking>>;
}

#[async_trait]
impl<S: BookingStore + ?Sized> BookingStore for Arc<S> {
    async fn insert(&self, booking: &NewBooking) -> DatabaseResult<i64> {
        (**self).insert(booking).await
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Booking>> {
        (**self).find_by_id(id).await
    }

    async fn find_by_user(&self, user_id: i64) -> DatabaseResult<Vec<Booking>> {
        (**self).find_by_user(user_id).await
    }
}
