//! Booking creation and lookup

use std::sync::Arc;

use common::error::{ServiceError, ServiceResult};
use tracing::{info, warn};

use crate::{
    availability::AvailabilityResolver,
    models::{AvailabilityQuery, Booking, BookingStatus, CreateBooking, NewBooking},
    reference::ReferenceGenerator,
    repositories::BookingStore,
};

const MAX_ROOM_TYPE_LEN: usize = 50;
const MAX_SPECIAL_REQUESTS_LEN: usize = 1000;

/// Currency recorded when a quote carries none
pub const DEFAULT_CURRENCY: &str = "ARS";

/// Booking service
///
/// Every booking is priced from a quote resolved inside the same call, so
/// the stored total and currency always match what availability answered
/// at that moment. Callers cannot supply a quote of their own.
#[derive(Clone)]
pub struct BookingManager {
    resolver: Arc<AvailabilityResolver>,
    store: Arc<dyn BookingStore>,
    references: Arc<ReferenceGenerator>,
    default_currency: String,
}

impl BookingManager {
    pub fn new(resolver: Arc<AvailabilityResolver>, store: Arc<dyn BookingStore>) -> Self {
        Self {
            resolver,
            store,
            references: Arc::new(ReferenceGenerator::new()),
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn with_default_currency(mut self, currency: impl Into<String>) -> Self {
        self.default_currency = currency.into();
        self
    }

    pub fn resolver(&self) -> &Arc<AvailabilityResolver> {
        &self.resolver
    }

    /// Create a confirmed booking for `user_id`
    ///
    /// Fails with `Unavailable` when the freshly resolved quote says so.
    /// Storage failures are reported once, not retried.
    pub async fn create_booking(&self, user_id: i64, request: CreateBooking) -> ServiceResult<Booking> {
        validate_request(&request)?;

        let query = AvailabilityQuery::new(
            request.hotel_id,
            request.check_in,
            request.check_out,
            request.guests,
        )?;
        let guests = i32::try_from(query.guests())
            .map_err(|_| ServiceError::Validation("too many guests".to_string()))?;

        let quote = self.resolver.check_availability(&query).await;
        if !quote.available {
            info!(
                "Booking refused for user {}: {} unavailable {} to {}",
                user_id,
                query.hotel_id(),
                query.check_in(),
                query.check_out()
            );
            return Err(ServiceError::Unavailable(format!(
                "hotel {} has no availability for the requested dates",
                query.hotel_id()
            )));
        }

        let total_price = quote.price.unwrap_or_else(|| {
            warn!("Quote for {} has no price, recording 0", query.hotel_id());
            0.0
        });
        let currency = quote.currency.clone().unwrap_or_else(|| {
            warn!(
                "Quote for {} has no currency, recording {}",
                query.hotel_id(),
                self.default_currency
            );
            self.default_currency.clone()
        });

        let new_booking = NewBooking {
            user_id,
            hotel_id: query.hotel_id().to_string(),
            provider_hotel_id: quote.provider_hotel_id.clone(),
            provider_booking_id: None,
            check_in: query.check_in(),
            check_out: query.check_out(),
            guests,
            room_type: request.room_type.trim().to_string(),
            total_price,
            currency,
            status: BookingStatus::Confirmed,
            booking_reference: self.references.next(user_id),
            special_requests: request.special_requests,
        };

        let id = self
            .store
            .insert(&new_booking)
            .await
            .map_err(|e| ServiceError::storage("creating booking", e))?;

        info!(
            "Booking {} ({}) confirmed for user {}",
            id, new_booking.booking_reference, user_id
        );

        self.store
            .find_by_id(id)
            .await
            .map_err(|e| ServiceError::storage("reading new booking", e))?
            .ok_or_else(|| ServiceError::NotFound(format!("booking {}", id)))
    }

    /// A user's bookings, newest first
    pub async fn get_user_bookings(&self, user_id: i64) -> ServiceResult<Vec<Booking>> {
        self.store
            .find_by_user(user_id)
            .await
            .map_err(|e| ServiceError::storage("listing bookings", e))
    }

    pub async fn get_booking_by_id(&self, id: i64) -> ServiceResult<Booking> {
        self.store
            .find_by_id(id)
            .await
            .map_err(|e| ServiceError::storage("reading booking", e))?
            .ok_or_else(|| ServiceError::NotFound(format!("booking {}", id)))
    }
}

fn validate_request(request: &CreateBooking) -> ServiceResult<()> {
    let room_type = request.room_type.trim();
    if room_type.is_empty() {
        return Err(ServiceError::Validation("room type is required".to_string()));
    }
    if room_type.chars().count() > MAX_ROOM_TYPE_LEN {
        return Err(ServiceError::Validation(format!(
            "room type must be at most {} characters",
            MAX_ROOM_TYPE_LEN
        )));
    }
    if request
        .special_requests
        .as_ref()
        .is_some_and(|s| s.chars().count() > MAX_SPECIAL_REQUESTS_LEN)
    {
        return Err(ServiceError::Validation(format!(
            "special requests must be at most {} characters",
            MAX_SPECIAL_REQUESTS_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::AvailabilityConfig;
    use crate::provider::{
        HotelOffers, InventoryProvider, Offer, OfferPrice, ProviderError, ProviderHotel,
    };
    use crate::repositories::InMemoryBookingStore;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use common::cache::MemoryCache;
    use common::error::{DatabaseError, DatabaseResult};

    struct StaticProvider(Vec<HotelOffers>);

    #[async_trait]
    impl InventoryProvider for StaticProvider {
        async fn get_offers(
            &self,
            _hotel_id: &str,
            _check_in: NaiveDate,
            _check_out: NaiveDate,
            _guests: u32,
        ) -> Result<Vec<HotelOffers>, ProviderError> {
            Ok(self.0.clone())
        }
    }

    struct Unreachable;

    #[async_trait]
    impl InventoryProvider for Unreachable {
        async fn get_offers(
            &self,
            _hotel_id: &str,
            _check_in: NaiveDate,
            _check_out: NaiveDate,
            _guests: u32,
        ) -> Result<Vec<HotelOffers>, ProviderError> {
            Err(ProviderError::Disabled)
        }
    }

    fn offer_set(available: bool, currency: &str) -> HotelOffers {
        HotelOffers {
            hotel: Some(ProviderHotel {
                hotel_id: "AMH1".to_string(),
                name: None,
            }),
            available: Some(available),
            offers: vec![Offer {
                id: Some("O1".to_string()),
                room_quantity: Some(1),
                price: Some(OfferPrice {
                    currency: Some(currency.to_string()),
                    total: Some("640.00".to_string()),
                }),
            }],
        }
    }

    fn manager_with(provider: Arc<dyn InventoryProvider>) -> (BookingManager, InMemoryBookingStore) {
        let store = InMemoryBookingStore::new();
        let resolver = AvailabilityResolver::new(
            Arc::new(MemoryCache::new()),
            provider,
            AvailabilityConfig::default(),
        );
        (
            BookingManager::new(Arc::new(resolver), Arc::new(store.clone())),
            store,
        )
    }

    fn request(hotel_id: &str) -> CreateBooking {
        CreateBooking {
            hotel_id: hotel_id.to_string(),
            check_in: "2025-06-01".parse().unwrap(),
            check_out: "2025-06-03".parse().unwrap(),
            guests: 2,
            room_type: "double".to_string(),
            special_requests: Some("late arrival".to_string()),
        }
    }

    #[tokio::test]
    async fn test_booking_with_simulated_quote() {
        let (manager, store) = manager_with(Arc::new(Unreachable));

        let booking = manager.create_booking(5, request("H1")).await.unwrap();

        assert_eq!(booking.user_id, 5);
        assert_eq!(booking.total_price, 21000.0);
        assert_eq!(booking.currency, "ARS");
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.guests, 2);
        assert_eq!(booking.provider_hotel_id, None);
        assert_eq!(booking.provider_booking_id, None);
        assert_eq!(booking.special_requests.as_deref(), Some("late arrival"));
        assert!(booking.booking_reference.starts_with("BK5"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_booking_matches_quote_from_same_call() {
        let (manager, _) = manager_with(Arc::new(StaticProvider(vec![offer_set(true, "EUR")])));

        let booking = manager.create_booking(5, request("H1")).await.unwrap();

        // Still cached, so this is the quote the booking was priced from
        let query = AvailabilityQuery::new(
            "H1",
            booking.check_in,
            booking.check_out,
            booking.guests as u32,
        )
        .unwrap();
        let quote = manager.resolver().check_availability(&query).await;

        assert_eq!(Some(booking.total_price), quote.price);
        assert_eq!(Some(booking.currency.as_str()), quote.currency.as_deref());
        assert_eq!(booking.provider_hotel_id.as_deref(), Some("AMH1"));
    }

    #[tokio::test]
    async fn test_room_type_is_stored_trimmed() {
        let (manager, store) = manager_with(Arc::new(Unreachable));
        let mut padded = request("H1");
        padded.room_type = "  double ".to_string();

        let booking = manager.create_booking(5, padded).await.unwrap();

        assert_eq!(booking.room_type, "double");
        assert_eq!(
            store.find_by_id(booking.id).await.unwrap().unwrap().room_type,
            "double"
        );
    }

    #[tokio::test]
    async fn test_unavailable_quote_refuses_booking() {
        let (manager, store) =
            manager_with(Arc::new(StaticProvider(vec![offer_set(false, "EUR")])));

        let err = manager.create_booking(5, request("H1")).await.unwrap_err();

        assert!(matches!(err, ServiceError::Unavailable(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_missing_currency_uses_default() {
        let (manager, _) = manager_with(Arc::new(StaticProvider(vec![offer_set(true, " ")])));
        let manager = manager.with_default_currency("USD");

        let booking = manager.create_booking(5, request("H1")).await.unwrap();
        assert_eq!(booking.currency, "USD");
        assert_eq!(booking.total_price, 640.0);
    }

    #[tokio::test]
    async fn test_invalid_requests_are_rejected_before_resolution() {
        let (manager, store) = manager_with(Arc::new(Unreachable));

        let mut bad_dates = request("H1");
        bad_dates.check_out = bad_dates.check_in;

        let mut no_guests = request("H1");
        no_guests.guests = 0;

        let mut no_room = request("H1");
        no_room.room_type = "  ".to_string();

        let mut long_requests = request("H1");
        long_requests.special_requests = Some("x".repeat(1001));

        for bad in [request("H 1"), bad_dates, no_guests, no_room, long_requests] {
            let err = manager.create_booking(5, bad).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)), "{:?}", err);
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_user_bookings_newest_first() {
        let (manager, _) = manager_with(Arc::new(Unreachable));

        assert!(manager.get_user_bookings(5).await.unwrap().is_empty());

        let first = manager.create_booking(5, request("H1")).await.unwrap();
        let second = manager.create_booking(5, request("H2")).await.unwrap();
        manager.create_booking(6, request("H1")).await.unwrap();

        let ids: Vec<i64> = manager
            .get_user_bookings(5)
            .await
            .unwrap()
            .iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_get_booking_by_id() {
        let (manager, _) = manager_with(Arc::new(Unreachable));
        let booking = manager.create_booking(5, request("H1")).await.unwrap();

        assert_eq!(manager.get_booking_by_id(booking.id).await.unwrap(), booking);
        assert!(matches!(
            manager.get_booking_by_id(booking.id + 1).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    struct FailingStore;

    #[async_trait]
    impl BookingStore for FailingStore {
        async fn insert(&self, _booking: &NewBooking) -> DatabaseResult<i64> {
            Err(DatabaseError::UniqueViolation(
                "bookings_booking_reference_key".to_string(),
            ))
        }

        async fn find_by_id(&self, _id: i64) -> DatabaseResult<Option<Booking>> {
            Ok(None)
        }

        async fn find_by_user(&self, _user_id: i64) -> DatabaseResult<Vec<Booking>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported_with_context() {
        let resolver = AvailabilityResolver::new(
            Arc::new(MemoryCache::new()),
            Arc::new(Unreachable),
            AvailabilityConfig::default(),
        );
        let manager = BookingManager::new(Arc::new(resolver), Arc::new(FailingStore));

        let err = manager.create_booking(5, request("H1")).await.unwrap_err();
        match err {
            ServiceError::Storage { context, source } => {
                assert_eq!(context, "creating booking");
                assert!(source.is_unique_violation());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
