//! Availability and booking service for the hotel booking backend
//!
//! [`AvailabilityResolver`] answers availability questions from the cache,
//! the live inventory provider, or a deterministic simulation, in that
//! order. [`BookingManager`] turns a fresh quote into a confirmed booking.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use booking::{
//!     AvailabilityConfig, AvailabilityResolver, BookingManager,
//!     provider::DisabledProvider, repositories::InMemoryBookingStore,
//! };
//! use common::cache::MemoryCache;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let resolver = Arc::new(AvailabilityResolver::new(
//!     Arc::new(MemoryCache::new()),
//!     Arc::new(DisabledProvider),
//!     AvailabilityConfig::default(),
//! ));
//! let bookings = BookingManager::new(resolver, Arc::new(InMemoryBookingStore::new()));
//! let _mine = bookings.get_user_bookings(1).await?;
//! # Ok(())
//! # }
//! ```

pub mod availability;
pub mod manager;
pub mod models;
pub mod provider;
pub mod reference;
pub mod repositories;

pub use availability::{AvailabilityConfig, AvailabilityResolver, FallbackConfig};
pub use manager::BookingManager;
pub use models::{AvailabilityQuery, AvailabilityQuote, Booking, BookingStatus, CreateBooking};
