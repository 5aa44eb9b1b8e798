//! Quote response decoding
//!
//! The endpoint answers with a flat JSON object. Only one string field is
//! used; every other key is skipped. When the free-tier request budget is
//! exhausted the body carries a `Note` or `Information` message instead of a
//! quote.

use serde::Deserialize;

/// Top-level key holding the quote object
pub const QUOTE_OBJECT: &str = "Global Quote";

/// Key of the price inside the quote object
pub const PRICE_FIELD: &str = "05. price";

/// Errors decoding a quote response body
#[derive(Debug, PartialEq)]
pub enum QuoteError {
    /// Body is not valid JSON of the expected shape
    Malformed(serde_json_core::de::Error),
    /// A required key is absent
    MissingField(&'static str),
    /// The endpoint returned a rate-limit notice instead of a quote
    Throttled,
    /// The price string is not a decimal number
    InvalidNumber,
}

impl core::fmt::Display for QuoteError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Malformed(e) => write!(f, "JSON parse error: {}", e),
            Self::MissingField(field) => write!(f, "No {} in response", field),
            Self::Throttled => f.write_str("Rate limited by quote API"),
            Self::InvalidNumber => f.write_str("Price is not a number"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for QuoteError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Malformed(_) => defmt::write!(f, "Malformed"),
            Self::MissingField(field) => defmt::write!(f, "MissingField({=str})", field),
            Self::Throttled => defmt::write!(f, "Throttled"),
            Self::InvalidNumber => defmt::write!(f, "InvalidNumber"),
        }
    }
}

#[derive(Deserialize)]
struct QuoteEnvelope<'a> {
    #[serde(rename = "Global Quote", borrow, default)]
    global_quote: Option<GlobalQuote<'a>>,
    #[serde(rename = "Note", borrow, default)]
    note: Option<&'a str>,
    #[serde(rename = "Information", borrow, default)]
    information: Option<&'a str>,
}

#[derive(Deserialize)]
struct GlobalQuote<'a> {
    #[serde(rename = "05. price", borrow, default)]
    price: Option<&'a str>,
}

/// Decode a response body into the quoted price
///
/// The value is returned as-is; range checks belong to the caller.
pub fn parse_quote(body: &[u8]) -> Result<f32, QuoteError> {
    let (envelope, _) =
        serde_json_core::from_slice::<QuoteEnvelope<'_>>(body).map_err(QuoteError::Malformed)?;

    let quote = match envelope.global_quote {
        Some(quote) => quote,
        None if envelope.note.is_some() || envelope.information.is_some() => {
            return Err(QuoteError::Throttled)
        }
        None => return Err(QuoteError::MissingField(QUOTE_OBJECT)),
    };

    let literal = quote.price.ok_or(QuoteError::MissingField(PRICE_FIELD))?;
    parse_decimal(literal.trim())
}

/// Parse a plain decimal such as `152.3700` or `-1`
///
/// `f32::from_str` also takes `NaN`, `inf` and exponents, none of which the
/// endpoint sends for a price.
fn parse_decimal(literal: &str) -> Result<f32, QuoteError> {
    let digits = literal.strip_prefix('-').unwrap_or(literal);
    let plain = !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && digits.bytes().filter(|&b| b == b'.').count() <= 1;
    if !plain {
        return Err(QuoteError::InvalidNumber);
    }

    let value = literal
        .parse::<f32>()
        .map_err(|_| QuoteError::InvalidNumber)?;
    if !value.is_finite() {
        return Err(QuoteError::InvalidNumber);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FULL_RESPONSE: &str = r#"{
        "Global Quote": {
            "01. symbol": "NVDA",
            "02. open": "148.9000",
            "03. high": "152.8900",
            "04. low": "147.6000",
            "05. price": "152.3700",
            "06. volume": "211539441",
            "07. latest trading day": "2024-11-08",
            "08. previous close": "148.8800",
            "09. change": "3.4900",
            "10. change percent": "2.3441%"
        }
    }"#;

    #[test]
    fn test_parse_full_response() {
        let price = parse_quote(FULL_RESPONSE.as_bytes()).unwrap();
        assert!((price - 152.37).abs() < 0.001);
    }

    #[test]
    fn test_unknown_symbol_has_empty_quote() {
        let result = parse_quote(br#"{"Global Quote": {}}"#);
        assert_eq!(result, Err(QuoteError::MissingField(PRICE_FIELD)));
    }

    #[test]
    fn test_missing_quote_object() {
        let result = parse_quote(b"{}");
        assert_eq!(result, Err(QuoteError::MissingField(QUOTE_OBJECT)));
    }

    #[test]
    fn test_throttle_notice() {
        let note = br#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#;
        assert_eq!(parse_quote(note), Err(QuoteError::Throttled));

        let info = br#"{"Information": "We have detected your API key and our standard API rate limit is 25 requests per day."}"#;
        assert_eq!(parse_quote(info), Err(QuoteError::Throttled));
    }

    #[test]
    fn test_malformed_body() {
        assert!(matches!(
            parse_quote(b"<html>Bad Gateway</html>"),
            Err(QuoteError::Malformed(_))
        ));
        assert!(matches!(
            parse_quote(br#"{"Global Quote": {"05. price": "1"#),
            Err(QuoteError::Malformed(_))
        ));
    }

    #[test]
    fn test_price_not_a_number() {
        let result = parse_quote(br#"{"Global Quote": {"05. price": "n/a"}}"#);
        assert_eq!(result, Err(QuoteError::InvalidNumber));
    }

    #[test]
    fn test_non_decimal_literals_rejected() {
        for literal in ["NaN", "nan", "inf", "-infinity", "1.5e2", ".", "-", "1.2.3", ""] {
            let body = format!(r#"{{"Global Quote": {{"05. price": "{}"}}}}"#, literal);
            assert_eq!(
                parse_quote(body.as_bytes()),
                Err(QuoteError::InvalidNumber),
                "{:?} should be rejected",
                literal
            );
        }
    }

    #[test]
    fn test_overflowing_decimal_rejected() {
        let body = format!(r#"{{"Global Quote": {{"05. price": "{}"}}}}"#, "9".repeat(60));
        assert_eq!(parse_quote(body.as_bytes()), Err(QuoteError::InvalidNumber));
    }

    #[test]
    fn test_negative_price_passes_through() {
        // Sentinel handling belongs to the validator, not the decoder
        let price = parse_quote(br#"{"Global Quote": {"05. price": "-1"}}"#).unwrap();
        assert_eq!(price, -1.0);
    }

    #[test]
    fn test_error_messages() {
        let mut text = heapless::String::<64>::new();
        core::fmt::write(&mut text, format_args!("{}", QuoteError::MissingField(PRICE_FIELD)))
            .unwrap();
        assert_eq!(text.as_str(), "No 05. price in response");
    }

    proptest! {
        #[test]
        fn arbitrary_bodies_never_panic(body in proptest::collection::vec(any::<u8>(), 0..256)) {
            let _ = parse_quote(&body);
        }
    }
}
