//! Availability resolution
//!
//! A quote is resolved cache-aside through a fixed chain of [`QuoteSource`]s:
//! the cache first, then the live inventory provider, then a deterministic
//! simulation that always answers. Whatever the provider or the simulation
//! produced is written back to the cache with a short TTL, so repeated
//! lookups within that window return the same quote.
//!
//! Resolution never fails for a valid [`AvailabilityQuery`]. Availability is
//! advisory until booking time, so provider and cache failures are logged
//! and absorbed rather than surfaced.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::cache::Cache;
use tracing::{debug, warn};

use crate::models::{AvailabilityQuery, AvailabilityQuote};
use crate::provider::{HotelOffers, InventoryProvider};

/// Tuning for availability resolution
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityConfig {
    /// How long a resolved quote stays in the cache
    pub cache_ttl: Duration,
    pub fallback: FallbackConfig,
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(10),
            fallback: FallbackConfig::default(),
        }
    }
}

/// Parameters of the simulated quote
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackConfig {
    pub currency: String,
    pub rooms_available: u32,
    /// Flat part of the simulated stay price
    pub base_rate: f64,
    /// Added once per guest
    pub per_guest_rate: f64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            currency: "ARS".to_string(),
            rooms_available: 3,
            base_rate: 15000.0,
            per_guest_rate: 3000.0,
        }
    }
}

/// Cache key for a query. Dates are rendered as `YYYY-MM-DD` so the key
/// never depends on how the caller formatted them.
pub fn cache_key(query: &AvailabilityQuery) -> String {
    format!(
        "availability:{}:{}:{}:{}",
        query.hotel_id(),
        query.check_in().format("%Y-%m-%d"),
        query.check_out().format("%Y-%m-%d"),
        query.guests()
    )
}

/// Something that may be able to answer an availability query
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// `None` means "ask the next source"
    async fn quote(&self, query: &AvailabilityQuery) -> Option<AvailabilityQuote>;
}

/// Reads and writes quotes in the shared cache
pub struct CacheLookup {
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl CacheLookup {
    pub fn new(cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Store a quote under its query's key; failures are only logged
    pub async fn store(&self, query: &AvailabilityQuery, quote: &AvailabilityQuote) {
        let key = cache_key(query);

        let value = match serde_json::to_string(quote) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to encode quote for {}: {}", key, e);
                return;
            }
        };

        if let Err(e) = self.cache.set(&key, &value, Some(self.ttl)).await {
            warn!("Failed to cache quote for {}: {}", key, e);
        }
    }
}

#[async_trait]
impl QuoteSource for CacheLookup {
    fn name(&self) -> &'static str {
        "cache"
    }

    async fn quote(&self, query: &AvailabilityQuery) -> Option<AvailabilityQuote> {
        let key = cache_key(query);

        let cached = match self.cache.get(&key).await {
            Ok(cached) => cached?,
            Err(e) => {
                warn!("Cache read failed for {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&cached) {
            Ok(quote) => Some(quote),
            Err(e) => {
                warn!("Discarding undecodable cached quote for {}: {}", key, e);
                None
            }
        }
    }
}

/// Asks the inventory provider
pub struct LiveProvider {
    provider: Arc<dyn InventoryProvider>,
}

impl LiveProvider {
    pub fn new(provider: Arc<dyn InventoryProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl QuoteSource for LiveProvider {
    fn name(&self) -> &'static str {
        "provider"
    }

    async fn quote(&self, query: &AvailabilityQuery) -> Option<AvailabilityQuote> {
        let offers = self
            .provider
            .get_offers(
                query.hotel_id(),
                query.check_in(),
                query.check_out(),
                query.guests(),
            )
            .await;

        match offers {
            Ok(offers) => quote_from_offers(query, &offers),
            Err(e) => {
                warn!("Inventory provider failed for {}: {}", query.hotel_id(), e);
                None
            }
        }
    }
}

/// Turn a provider answer into a quote
///
/// Only the first offer set counts. It yields an unavailable quote when the
/// provider flags it `available: false`; otherwise its first priced offer
/// supplies currency, room count and price. No offer sets, or no priced
/// offer, means the provider had nothing useful to say.
fn quote_from_offers(query: &AvailabilityQuery, offers: &[HotelOffers]) -> Option<AvailabilityQuote> {
    let set = offers.first()?;
    let provider_hotel_id = set.hotel.as_ref().map(|h| h.hotel_id.clone());

    if set.available == Some(false) {
        debug!("Provider reports {} unavailable", query.hotel_id());
        let mut quote = AvailabilityQuote::for_query(query, false);
        quote.provider_hotel_id = provider_hotel_id;
        return Some(quote);
    }

    let offer = set.offers.iter().find(|offer| offer.is_priced())?;
    let price = offer.price.as_ref()?;

    let total = price.total.as_deref().unwrap_or_default();
    let amount = match total.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() => amount,
        _ => {
            warn!(
                "Malformed provider price {:?} for {}, using 0",
                total,
                query.hotel_id()
            );
            0.0
        }
    };

    let mut quote = AvailabilityQuote::for_query(query, true);
    quote.currency = price.currency.clone().filter(|c| !c.trim().is_empty());
    quote.rooms_available = offer.room_quantity;
    quote.price = Some(amount);
    quote.provider_hotel_id = provider_hotel_id;
    Some(quote)
}

/// Deterministic stand-in for the provider
#[derive(Debug, Clone, Default)]
pub struct SimulatedFallback {
    config: FallbackConfig,
}

impl SimulatedFallback {
    pub fn new(config: FallbackConfig) -> Self {
        Self { config }
    }

    /// Always available; price is the base rate plus one increment per guest
    pub fn simulate(&self, query: &AvailabilityQuery) -> AvailabilityQuote {
        let mut quote = AvailabilityQuote::for_query(query, true);
        quote.currency = Some(self.config.currency.clone());
        quote.rooms_available = Some(self.config.rooms_available);
        quote.price =
            Some(self.config.base_rate + f64::from(query.guests()) * self.config.per_guest_rate);
        quote
    }
}

#[async_trait]
impl QuoteSource for SimulatedFallback {
    fn name(&self) -> &'static str {
        "simulation"
    }

    async fn quote(&self, query: &AvailabilityQuery) -> Option<AvailabilityQuote> {
        Some(self.simulate(query))
    }
}

/// Resolves quotes: cache, then each source in order, then the simulation
pub struct AvailabilityResolver {
    cache: CacheLookup,
    sources: Vec<Arc<dyn QuoteSource>>,
    fallback: SimulatedFallback,
}

impl AvailabilityResolver {
    /// Standard chain: cache, live provider, simulation
    pub fn new(
        cache: Arc<dyn Cache>,
        provider: Arc<dyn InventoryProvider>,
        config: AvailabilityConfig,
    ) -> Self {
        Self::with_sources(
            cache,
            vec![Arc::new(LiveProvider::new(provider))],
            config,
        )
    }

    /// Chain with custom sources between the cache and the simulation
    pub fn with_sources(
        cache: Arc<dyn Cache>,
        sources: Vec<Arc<dyn QuoteSource>>,
        config: AvailabilityConfig,
    ) -> Self {
        Self {
            cache: CacheLookup::new(cache, config.cache_ttl),
            sources,
            fallback: SimulatedFallback::new(config.fallback),
        }
    }

    /// Resolve a quote for `query`. Never fails.
    pub async fn check_availability(&self, query: &AvailabilityQuery) -> AvailabilityQuote {
        if let Some(quote) = self.cache.quote(query).await {
            debug!("Availability cache hit for {}", cache_key(query));
            return quote;
        }

        let mut resolved = None;
        for source in &self.sources {
            if let Some(quote) = source.quote(query).await {
                debug!("Availability for {} from {}", query.hotel_id(), source.name());
                resolved = Some(quote);
                break;
            }
        }

        let quote = match resolved {
            Some(quote) => quote,
            None => {
                debug!(
                    "Availability for {} from {}",
                    query.hotel_id(),
                    self.fallback.name()
                );
                self.fallback.simulate(query)
            }
        };

        self.cache.store(query, &quote).await;
        quote
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Offer, OfferPrice, ProviderError, ProviderHotel};
    use chrono::NaiveDate;
    use common::cache::MemoryCache;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider returning a canned answer and counting calls
    struct FakeProvider {
        answer: Result<Vec<HotelOffers>, String>,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn ok(offers: Vec<HotelOffers>) -> Arc<Self> {
            Arc::new(Self {
                answer: Ok(offers),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                answer: Err("connection refused".to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl InventoryProvider for FakeProvider {
        async fn get_offers(
            &self,
            _hotel_id: &str,
            _check_in: NaiveDate,
            _check_out: NaiveDate,
            _guests: u32,
        ) -> Result<Vec<HotelOffers>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone().map_err(ProviderError::Configuration)
        }
    }

    fn query(guests: u32) -> AvailabilityQuery {
        AvailabilityQuery::new(
            "H1",
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
            guests,
        )
        .unwrap()
    }

    fn offer_set(currency: &str, total: &str, rooms: Option<u32>) -> HotelOffers {
        HotelOffers {
            hotel: Some(ProviderHotel {
                hotel_id: "AMH1".to_string(),
                name: None,
            }),
            available: Some(true),
            offers: vec![Offer {
                id: Some("O1".to_string()),
                room_quantity: rooms,
                price: Some(OfferPrice {
                    currency: Some(currency.to_string()),
                    total: Some(total.to_string()),
                }),
            }],
        }
    }

    fn resolver(provider: Arc<FakeProvider>, cache: MemoryCache) -> AvailabilityResolver {
        AvailabilityResolver::new(Arc::new(cache), provider, AvailabilityConfig::default())
    }

    #[test]
    fn test_cache_key_is_deterministic() {
        assert_eq!(cache_key(&query(2)), "availability:H1:2025-06-01:2025-06-03:2");
        assert_eq!(cache_key(&query(2)), cache_key(&query(2)));
        assert_ne!(cache_key(&query(2)), cache_key(&query(3)));
    }

    #[tokio::test]
    async fn test_unreachable_provider_falls_back_to_simulation() {
        let provider = FakeProvider::failing();
        let quote = resolver(provider.clone(), MemoryCache::new())
            .check_availability(&query(2))
            .await;

        assert!(quote.available);
        assert_eq!(quote.currency.as_deref(), Some("ARS"));
        assert_eq!(quote.rooms_available, Some(3));
        assert_eq!(quote.price, Some(21000.0));
        assert_eq!(quote.hotel_id, "H1");
        assert_eq!(quote.guests, 2);
        assert_eq!(quote.provider_hotel_id, None);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_or_unpriced_offers_fall_back() {
        let mut unpriced = offer_set("EUR", "100", Some(1));
        unpriced.offers[0].price = None;
        let mut no_offers = offer_set("EUR", "100", Some(1));
        no_offers.offers.clear();

        for answer in [vec![], vec![unpriced], vec![no_offers]] {
            let quote = resolver(FakeProvider::ok(answer), MemoryCache::new())
                .check_availability(&query(1))
                .await;
            assert_eq!(quote.currency.as_deref(), Some("ARS"));
            assert_eq!(quote.price, Some(18000.0));
        }
    }

    #[tokio::test]
    async fn test_provider_offer_is_used() {
        let provider = FakeProvider::ok(vec![offer_set("EUR", "512.40", Some(2))]);
        let quote = resolver(provider, MemoryCache::new())
            .check_availability(&query(2))
            .await;

        assert!(quote.available);
        assert_eq!(quote.currency.as_deref(), Some("EUR"));
        assert_eq!(quote.rooms_available, Some(2));
        assert_eq!(quote.price, Some(512.40));
        assert_eq!(quote.provider_hotel_id.as_deref(), Some("AMH1"));
    }

    #[tokio::test]
    async fn test_malformed_provider_price_becomes_zero() {
        let provider = FakeProvider::ok(vec![offer_set("EUR", "12,50 EUR", None)]);
        let quote = resolver(provider, MemoryCache::new())
            .check_availability(&query(2))
            .await;

        assert!(quote.available);
        assert_eq!(quote.price, Some(0.0));
        assert_eq!(quote.rooms_available, None);
        assert_eq!(quote.currency.as_deref(), Some("EUR"));
    }

    #[tokio::test]
    async fn test_provider_can_report_unavailable() {
        let mut set = offer_set("EUR", "100", Some(1));
        set.available = Some(false);
        set.offers.clear();

        let quote = resolver(FakeProvider::ok(vec![set]), MemoryCache::new())
            .check_availability(&query(2))
            .await;

        assert!(!quote.available);
        assert_eq!(quote.price, None);
        assert_eq!(quote.currency, None);
    }

    #[tokio::test]
    async fn test_repeated_lookups_hit_cache_and_are_identical() {
        let provider = FakeProvider::ok(vec![offer_set("EUR", "99.99", Some(4))]);
        let cache = MemoryCache::new();
        let resolver = resolver(provider.clone(), cache.clone());

        let first = resolver.check_availability(&query(2)).await;
        let second = resolver.check_availability(&query(2)).await;

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
        assert_eq!(provider.calls(), 1);
        assert!(
            cache
                .get("availability:H1:2025-06-01:2025-06-03:2")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_simulated_quotes_are_cached_too() {
        let provider = FakeProvider::failing();
        let resolver = resolver(provider.clone(), MemoryCache::new());

        resolver.check_availability(&query(2)).await;
        resolver.check_availability(&query(2)).await;

        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_goes_back_to_provider() {
        let provider = FakeProvider::failing();
        let config = AvailabilityConfig {
            cache_ttl: Duration::from_millis(20),
            ..AvailabilityConfig::default()
        };
        let resolver =
            AvailabilityResolver::new(Arc::new(MemoryCache::new()), provider.clone(), config);

        resolver.check_availability(&query(2)).await;
        tokio::time::sleep(Duration::from_millis(60)).await;
        resolver.check_availability(&query(2)).await;

        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_cached_quote_is_returned_verbatim() {
        let cache = MemoryCache::new();
        let mut planted = AvailabilityQuote::for_query(&query(2), true);
        planted.currency = Some("USD".to_string());
        planted.price = Some(1.0);
        cache
            .set(
                &cache_key(&query(2)),
                &serde_json::to_string(&planted).unwrap(),
                None,
            )
            .await
            .unwrap();

        let provider = FakeProvider::failing();
        let quote = resolver(provider.clone(), cache)
            .check_availability(&query(2))
            .await;

        assert_eq!(quote, planted);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_garbage_in_cache_is_a_miss() {
        let cache = MemoryCache::new();
        cache
            .set(&cache_key(&query(2)), "not json", None)
            .await
            .unwrap();

        let quote = resolver(FakeProvider::failing(), cache.clone())
            .check_availability(&query(2))
            .await;

        assert_eq!(quote.price, Some(21000.0));
        let rewritten = cache.get(&cache_key(&query(2))).await.unwrap().unwrap();
        assert_ne!(rewritten, "not json");
    }

    struct BrokenCache;

    #[async_trait]
    impl Cache for BrokenCache {
        async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Err(anyhow::anyhow!("connection reset"))
        }

        async fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("connection reset"))
        }
    }

    #[tokio::test]
    async fn test_cache_outage_does_not_fail_resolution() {
        let resolver = AvailabilityResolver::new(
            Arc::new(BrokenCache),
            FakeProvider::ok(vec![offer_set("EUR", "10", Some(1))]),
            AvailabilityConfig::default(),
        );

        let quote = resolver.check_availability(&query(1)).await;
        assert_eq!(quote.price, Some(10.0));
    }

    struct Declining;

    #[async_trait]
    impl QuoteSource for Declining {
        fn name(&self) -> &'static str {
            "declining"
        }

        async fn quote(&self, _query: &AvailabilityQuery) -> Option<AvailabilityQuote> {
            None
        }
    }

    #[tokio::test]
    async fn test_sources_are_tried_in_order() {
        let provider = FakeProvider::ok(vec![offer_set("EUR", "10", Some(1))]);
        let resolver = AvailabilityResolver::with_sources(
            Arc::new(MemoryCache::new()),
            vec![
                Arc::new(Declining),
                Arc::new(LiveProvider::new(provider.clone())),
                Arc::new(SimulatedFallback::default()),
            ],
            AvailabilityConfig::default(),
        );

        let quote = resolver.check_availability(&query(1)).await;
        assert_eq!(quote.currency.as_deref(), Some("EUR"));
        assert_eq!(provider.calls(), 1);
    }

    #[test]
    fn test_simulation_price_grows_with_guests() {
        let fallback = SimulatedFallback::default();
        assert_eq!(fallback.simulate(&query(1)).price, Some(18000.0));
        assert_eq!(fallback.simulate(&query(4)).price, Some(27000.0));
    }
}
