//! Quote endpoint protocol
//!
//! This crate describes the single HTTPS exchange the dial performs: a
//! `GLOBAL_QUOTE` GET against the Alpha Vantage query endpoint, and the JSON
//! body that comes back.
//!
//! # Exchange Overview
//!
//! ```text
//! GET /query?function=GLOBAL_QUOTE&symbol=NVDA&apikey=KEY
//!
//! 200 OK
//! {"Global Quote": {"01. symbol": "NVDA", ..., "05. price": "152.3700", ...}}
//! ```
//!
//! The transport (TCP, TLS, HTTP framing) lives in the firmware. This crate
//! only builds the URL and turns a response body into a price.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod quote;
pub mod request;

pub use quote::{parse_quote, QuoteError, PRICE_FIELD, QUOTE_OBJECT};
pub use request::{
    QuoteRequest, RequestError, Url, ACCEPT_JSON, MAX_API_KEY_LEN, MAX_SYMBOL_LEN, MAX_URL_LEN,
    QUOTE_ENDPOINT, USER_AGENT,
};
