//! Application state shared across handlers

use std::sync::Arc;

use auth::AuthManager;
use booking::{AvailabilityResolver, BookingManager};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthManager>,
    pub bookings: Arc<BookingManager>,
    pub availability: Arc<AvailabilityResolver>,
}

impl AppState {
    pub fn new(auth: AuthManager, bookings: BookingManager) -> Self {
        let availability = bookings.resolver().clone();
        Self {
            auth: Arc::new(auth),
            bookings: Arc::new(bookings),
            availability,
        }
    }
}
