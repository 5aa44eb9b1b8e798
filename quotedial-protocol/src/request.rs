//! Quote request construction
//!
//! Builds the GET URL for a symbol and API key. Both are restricted to
//! characters that never need percent-encoding, so the URL can be written
//! straight into a fixed-capacity buffer.

use core::fmt::Write;

use heapless::String;

/// Alpha Vantage query endpoint
pub const QUOTE_ENDPOINT: &str = "https://www.alphavantage.co/query";

/// User-Agent header sent with every request
pub const USER_AGENT: &str = "QuoteDial/0.1";

/// Accept header sent with every request
pub const ACCEPT_JSON: &str = "application/json";

/// Maximum ticker symbol length
pub const MAX_SYMBOL_LEN: usize = 12;

/// Maximum API key length
pub const MAX_API_KEY_LEN: usize = 32;

/// Maximum length of a complete request URL
pub const MAX_URL_LEN: usize = 200;

/// Fixed-capacity request URL
pub type Url = String<MAX_URL_LEN>;

/// Errors building a quote request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestError {
    /// Symbol is empty
    EmptySymbol,
    /// Symbol contains characters outside `[A-Za-z0-9.-]`
    InvalidSymbol,
    /// Symbol exceeds [`MAX_SYMBOL_LEN`]
    SymbolTooLong,
    /// API key is empty or not alphanumeric
    InvalidApiKey,
    /// API key exceeds [`MAX_API_KEY_LEN`]
    ApiKeyTooLong,
    /// Formatted URL exceeds [`MAX_URL_LEN`]
    UrlTooLong,
}

impl core::fmt::Display for RequestError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let text = match self {
            Self::EmptySymbol => "empty symbol",
            Self::InvalidSymbol => "invalid symbol",
            Self::SymbolTooLong => "symbol too long",
            Self::InvalidApiKey => "invalid API key",
            Self::ApiKeyTooLong => "API key too long",
            Self::UrlTooLong => "URL too long",
        };
        f.write_str(text)
    }
}

/// A quote request for one symbol
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QuoteRequest {
    symbol: String<MAX_SYMBOL_LEN>,
    api_key: String<MAX_API_KEY_LEN>,
}

impl QuoteRequest {
    /// Create a request, validating symbol and key
    pub fn new(symbol: &str, api_key: &str) -> Result<Self, RequestError> {
        if symbol.is_empty() {
            return Err(RequestError::EmptySymbol);
        }
        if !symbol
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-')
        {
            return Err(RequestError::InvalidSymbol);
        }
        if api_key.is_empty() || !api_key.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(RequestError::InvalidApiKey);
        }

        let mut stored_symbol = String::new();
        stored_symbol
            .push_str(symbol)
            .map_err(|_| RequestError::SymbolTooLong)?;

        let mut stored_key = String::new();
        stored_key
            .push_str(api_key)
            .map_err(|_| RequestError::ApiKeyTooLong)?;

        Ok(Self {
            symbol: stored_symbol,
            api_key: stored_key,
        })
    }

    /// Ticker symbol
    pub fn symbol(&self) -> &str {
        self.symbol.as_str()
    }

    /// Format the full GET URL
    pub fn url(&self) -> Result<Url, RequestError> {
        let mut url = Url::new();
        write!(
            url,
            "{}?function=GLOBAL_QUOTE&symbol={}&apikey={}",
            QUOTE_ENDPOINT, self.symbol, self.api_key
        )
        .map_err(|_| RequestError::UrlTooLong)?;
        Ok(url)
    }
}
