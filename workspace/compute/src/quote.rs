//! Price lookup for ticker symbols.
//!
//! A lookup either yields a [`Quote`] or nothing. Nothing covers unknown
//! symbols as well as transport failures: callers treat both as an invalid
//! symbol, and no lookup is retried or cached.

use std::collections::HashMap;
use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use common::Quote;
use reqwest::{Client, Url};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use tracing::{debug, instrument, trace, warn};

/// Default endpoint of the IEX Cloud API. The service has been shut down;
/// deployments point `base_url` at a compatible provider.
pub const DEFAULT_IEX_BASE_URL: &str = "https://cloud.iexapis.com/stable";

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Trims and upper-cases a user supplied symbol.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Source of live quotes.
#[async_trait]
pub trait QuoteProvider: Send + Sync + Debug {
    /// Looks up the latest quote for `symbol`.
    async fn lookup(&self, symbol: &str) -> Option<Quote>;
}

/// Quote endpoint payload, only the fields we use.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IexQuote {
    symbol: String,
    company_name: String,
    latest_price: Option<f64>,
}

impl IexQuote {
    fn into_quote(self) -> Option<Quote> {
        let price = Decimal::from_f64(self.latest_price?)?;
        Some(Quote {
            symbol: self.symbol.to_uppercase(),
            name: self.company_name,
            price,
        })
    }
}

/// Looks quotes up over HTTP from IEX Cloud (or an API compatible service).
#[derive(Debug, Clone)]
pub struct IexQuoteProvider {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl IexQuoteProvider {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, QuoteSetupError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| QuoteSetupError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(QuoteSetupError::InvalidBaseUrl(base_url.to_string()));
        }

        let client = Client::builder().timeout(LOOKUP_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    /// `{base_url}/stock/{symbol}/quote`, with the symbol percent-encoded.
    fn quote_url(&self, symbol: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["stock", symbol, "quote"]);
        }
        url
    }
}

/// Errors constructing an [`IexQuoteProvider`].
#[derive(Debug, thiserror::Error)]
pub enum QuoteSetupError {
    #[error("invalid quote API base url: {0}")]
    InvalidBaseUrl(String),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[async_trait]
impl QuoteProvider for IexQuoteProvider {
    #[instrument(skip(self))]
    async fn lookup(&self, symbol: &str) -> Option<Quote> {
        let url = self.quote_url(symbol);
        trace!("Requesting quote from {}", url);

        let response = match self
            .client
            .get(url)
            .query(&[("token", self.api_key.as_str())])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Quote request for {} failed: {}", symbol, e);
                return None;
            }
        };

        if !response.status().is_success() {
            debug!("Quote lookup for {} returned HTTP {}", symbol, response.status());
            return None;
        }

        match response.json::<IexQuote>().await {
            Ok(payload) => payload.into_quote(),
            Err(e) => {
                warn!("Failed to parse quote for {}: {}", symbol, e);
                None
            }
        }
    }
}

/// Serves quotes from a fixed price table.
#[derive(Debug, Clone, Default)]
pub struct StaticQuoteProvider {
    quotes: HashMap<String, Quote>,
}

impl StaticQuoteProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the quote for `symbol`.
    pub fn with_quote(mut self, symbol: &str, name: &str, price: Decimal) -> Self {
        let symbol = normalize_symbol(symbol);
        self.quotes.insert(
            symbol.clone(),
            Quote {
                symbol,
                name: name.to_string(),
                price,
            },
        );
        self
    }
}

#[async_trait]
impl QuoteProvider for StaticQuoteProvider {
    async fn lookup(&self, symbol: &str) -> Option<Quote> {
        self.quotes.get(&normalize_symbol(symbol)).cloned()
    }
}
