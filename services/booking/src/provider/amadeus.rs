//! Amadeus hotel-offers client
//!
//! Authenticates with the OAuth2 client-credentials grant and queries the
//! hotel offers search endpoint. Access tokens are cached until shortly
//! before they expire.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use oauth2::{
    AuthType, AuthUrl, ClientId, ClientSecret, TokenResponse, TokenUrl, basic::BasicClient,
    reqwest::async_http_client,
};
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::{HotelOffers, InventoryProvider, ProviderError};

/// Refresh tokens this long before the provider says they expire
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(30);

/// Lifetime assumed when the token response omits `expires_in`
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(1799);

/// Amadeus API configuration
#[derive(Clone)]
pub struct AmadeusConfig {
    /// API base URL (test or production environment)
    pub base_url: String,
    pub api_key: String,
    pub api_secret: String,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
}

impl AmadeusConfig {
    /// Create a new AmadeusConfig from environment variables
    ///
    /// # Environment Variables
    /// - `AMADEUS_BASE_URL`: API base URL (default: "https://test.api.amadeus.com")
    /// - `AMADEUS_API_KEY`: Client id (required)
    /// - `AMADEUS_API_SECRET`: Client secret (required)
    /// - `AMADEUS_TIMEOUT_SECONDS`: Request timeout (default: 10)
    pub fn from_env() -> anyhow::Result<Self> {
        let base_url = std::env::var("AMADEUS_BASE_URL")
            .unwrap_or_else(|_| "https://test.api.amadeus.com".to_string());

        let api_key = std::env::var("AMADEUS_API_KEY")
            .map_err(|_| anyhow::anyhow!("AMADEUS_API_KEY environment variable not set"))?;

        let api_secret = std::env::var("AMADEUS_API_SECRET")
            .map_err(|_| anyhow::anyhow!("AMADEUS_API_SECRET environment variable not set"))?;

        let timeout_seconds = std::env::var("AMADEUS_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        Ok(Self {
            base_url,
            api_key,
            api_secret,
            timeout_seconds,
        })
    }
}

impl std::fmt::Debug for AmadeusConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmadeusConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

#[derive(Debug)]
struct CachedToken {
    secret: String,
    refresh_at: Instant,
}

#[derive(Debug, Deserialize)]
struct OffersEnvelope {
    #[serde(default)]
    data: Vec<HotelOffers>,
}

/// Amadeus inventory provider
pub struct AmadeusClient {
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
    oauth: BasicClient,
    token: Mutex<Option<CachedToken>>,
}

impl AmadeusClient {
    pub fn new(config: AmadeusConfig) -> Result<Self, ProviderError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let token_url = format!("{}/v1/security/oauth2/token", base_url);

        // Client credentials never visit the authorize endpoint; the token
        // URL stands in for it.
        let oauth = BasicClient::new(
            ClientId::new(config.api_key),
            Some(ClientSecret::new(config.api_secret)),
            AuthUrl::new(token_url.clone())
                .map_err(|e| ProviderError::Configuration(e.to_string()))?,
            Some(TokenUrl::new(token_url).map_err(|e| ProviderError::Configuration(e.to_string()))?),
        )
        .set_auth_type(AuthType::RequestBody);

        let timeout = Duration::from_secs(config.timeout_seconds);
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        info!("Amadeus client initialized for {}", base_url);

        Ok(Self {
            base_url,
            timeout,
            http,
            oauth,
            token: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> Result<String, ProviderError> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.secret.clone());
            }
        }

        debug!("Requesting new Amadeus access token");
        let request = self
            .oauth
            .exchange_client_credentials()
            .request_async(async_http_client);

        let response = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| ProviderError::Auth("token request timed out".to_string()))?
            .map_err(|e| ProviderError::Auth(e.to_string()))?;

        let lifetime = response.expires_in().unwrap_or(DEFAULT_TOKEN_LIFETIME);
        let secret = response.access_token().secret().clone();

        *cached = Some(CachedToken {
            secret: secret.clone(),
            refresh_at: Instant::now() + lifetime.saturating_sub(TOKEN_REFRESH_MARGIN),
        });

        Ok(secret)
    }

    async fn forget_token(&self) {
        *self.token.lock().await = None;
    }
}

#[async_trait]
impl InventoryProvider for AmadeusClient {
    async fn get_offers(
        &self,
        hotel_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        guests: u32,
    ) -> Result<Vec<HotelOffers>, ProviderError> {
        let token = self.access_token().await?;

        let response = self
            .http
            .get(format!("{}/v3/shopping/hotel-offers", self.base_url))
            .bearer_auth(token)
            .query(&[
                ("hotelIds", hotel_id.to_string()),
                ("checkInDate", check_in.format("%Y-%m-%d").to_string()),
                ("checkOutDate", check_out.format("%Y-%m-%d").to_string()),
                ("adults", guests.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            if status == reqwest::StatusCode::UNAUTHORIZED {
                self.forget_token().await;
            }
            let body = response.text().await.unwrap_or_default();
            warn!("Amadeus hotel offers returned {} for {}", status, hotel_id);
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let envelope: OffersEnvelope = serde_json::from_str(&body)?;
        debug!(
            "Amadeus returned {} offer sets for {}",
            envelope.data.len(),
            hotel_id
        );
        Ok(envelope.data)
    }
}
