//! Hotel inventory providers
//!
//! The [`InventoryProvider`] trait is the seam to the third-party inventory
//! system. Its failures are [`ProviderError`]s, which the availability
//! resolver absorbs into a simulated quote; they never reach API callers.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub mod amadeus;

pub use amadeus::{AmadeusClient, AmadeusConfig};

/// Errors raised while talking to an inventory provider
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Token acquisition failed
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No provider is configured for this deployment
    #[error("Inventory provider disabled")]
    Disabled,
}

/// The offers one hotel has for a stay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelOffers {
    #[serde(default)]
    pub hotel: Option<ProviderHotel>,
    /// `Some(false)` when the provider explicitly reports no availability
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    pub offers: Vec<Offer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderHotel {
    pub hotel_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A single priced line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub room_quantity: Option<u32>,
    #[serde(default)]
    pub price: Option<OfferPrice>,
}

impl Offer {
    /// Whether the offer carries a total price at all
    pub fn is_priced(&self) -> bool {
        self.price.as_ref().is_some_and(|p| p.total.is_some())
    }
}

/// Price block as sent by the provider; amounts are decimal strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferPrice {
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub total: Option<String>,
}

// Room counts show up both as numbers and as numeric strings.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u32),
        Text(String),
    }

    Ok(match Option::<Count>::deserialize(deserializer)? {
        Some(Count::Number(n)) => Some(n),
        Some(Count::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// Real-time hotel inventory
#[async_trait]
pub trait InventoryProvider: Send + Sync {
    /// Fetch the offer sets for a hotel and stay. An empty vector means the
    /// provider answered but had nothing to offer.
    async fn get_offers(
        &self,
        hotel_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        guests: u32,
    ) -> Result<Vec<HotelOffers>, ProviderError>;
}

#[async_trait]
impl<P: InventoryProvider + ?Sized> InventoryProvider for Arc<P> {
    async fn get_offers(
        &self,
        hotel_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        guests: u32,
    ) -> Result<Vec<HotelOffers>, ProviderError> {
        (**self).get_offers(hotel_id, check_in, check_out, guests).await
    }
}

/// Stand-in used when no provider credentials are configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledProvider;

#[async_trait]
impl InventoryProvider for DisabledProvider {
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
