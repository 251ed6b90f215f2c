//! Gift links: a bouquet packed into a `?gift=` query parameter.
//!
//! Wire format: `{"v":1,"flowers":[ids..]}` as UTF-8 JSON, base64 with the
//! URL-safe alphabet and no padding. Decoding is lenient (either alphabet,
//! padded or not, legacy `f` key) and never fails outward: anything malformed
//! becomes an empty bouquet.

use base64::{
    alphabet,
    engine::{
        general_purpose::{GeneralPurpose, GeneralPurposeConfig},
        DecodePaddingMode,
    },
    Engine as _,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use skyval_core::{Flower, DEFAULT_BOUQUET, MAX_BOUQUET};

pub const GIFT_PARAM: &str = "gift";
pub const GIFT_VERSION: u8 = 1;

const GIFT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftPayload {
    pub v: u8,
    pub flowers: Vec<Flower>,
}

#[derive(Debug, Error)]
pub enum GiftError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("payload is not utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("payload is not json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode a bouquet, keeping at most [`MAX_BOUQUET`] flowers.
pub fn encode_gift(flowers: &[Flower]) -> String {
    let payload = GiftPayload {
        v: GIFT_VERSION,
        flowers: flowers.iter().copied().take(MAX_BOUQUET).collect(),
    };
    // A struct of a number and a list of unit enums always serializes.
    let json = serde_json::to_string(&payload).unwrap_or_default();
    GIFT_ENGINE.encode(json)
}

/// Strict decode, for callers that want to know what went wrong.
pub fn try_decode_gift(raw: &str) -> Result<Vec<Flower>, GiftError> {
    let normalized: String = raw
        .trim()
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    let bytes = GIFT_ENGINE.decode(normalized.trim_end_matches('='))?;
    let json = String::from_utf8(bytes)?;
    let payload: Value = serde_json::from_str(&json)?;

    let ids = payload
        .get("flowers")
        .and_then(Value::as_array)
        .or_else(|| payload.get("f").and_then(Value::as_array));
    let Some(ids) = ids else {
        return Ok(Vec::new());
    };

    Ok(ids
        .iter()
        .filter_map(Value::as_str)
        .filter_map(Flower::parse)
        .take(MAX_BOUQUET)
        .collect())
}

/// Lenient decode: malformed input yields an empty bouquet.
pub fn decode_gift(raw: &str) -> Vec<Flower> {
    try_decode_gift(raw).unwrap_or_else(|err| {
        debug!(%err, "ignoring malformed gift payload");
        Vec::new()
    })
}

/// Shareable root of the page: no query, no fragment, no trailing `index.html`.
pub fn base_url(url: &Url) -> Url {
    let mut base = url.clone();
    base.set_query(None);
    base.set_fragment(None);
    if let Some(prefix) = base.path().strip_suffix("/index.html") {
        let path = format!("{prefix}/");
        base.set_path(&path);
    }
    base
}

pub fn gift_url(page: &Url, flowers: &[Flower]) -> Url {
    let mut url = base_url(page);
    url.query_pairs_mut()
        .append_pair(GIFT_PARAM, &encode_gift(flowers));
    url
}

/// `None` when the page was not opened from a gift link.
pub fn gift_from_url(url: &Url) -> Option<Vec<Flower>> {
    url.query_pairs()
        .find(|(k, v)| k == GIFT_PARAM && !v.is_empty())
        .map(|(_, v)| decode_gift(&v))
}

/// Bouquet to show on the landing overlay.
pub fn landing_bouquet(url: &Url) -> Vec<Flower> {
    match gift_from_url(url) {
        Some(flowers) if !flowers.is_empty() => flowers,
        _ => DEFAULT_BOUQUET.to_vec(),
    }
}

/// Link that reopens the page on the answered question.
pub fn answered_link(page: &Url) -> Url {
    let mut url = base_url(page);
    url.set_fragment(Some("yes"));
    url
}

/// The fragment with its leading `#`, as a browser's `location.hash` reports it.
pub fn location_hash(url: &Url) -> Option<String> {
    url.fragment()
        .filter(|f| !f.is_empty())
        .map(|f| format!("#{f}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;

    #[test]
    fn round_trip() {
        let encoded = encode_gift(&[Flower::Rose, Flower::Tulip]);
        assert_eq!(decode_gift(&encoded), vec![Flower::Rose, Flower::Tulip]);
    }

    #[test]
    fn encoding_is_url_safe_and_unpadded() {
        // {"v":1,"flowers":["rose"]} is 26 bytes: standard base64 would pad.
        let encoded = encode_gift(&[Flower::Rose]);
        assert!(!encoded.contains('='));
        assert!(!encoded.contains('+') && !encoded.contains('/'));
        let json = String::from_utf8(GIFT_ENGINE.decode(&encoded).unwrap()).unwrap();
        assert_eq!(json, r#"{"v":1,"flowers":["rose"]}"#);
    }

    #[test]
    fn accepts_padded_standard_and_legacy_key() {
        let raw = STANDARD.encode(r#"{"f":["lily","orchid",3,"daisy","x"]}"#);
        assert!(raw.ends_with('='));
        assert_eq!(decode_gift(&raw), vec![Flower::Lily, Flower::Daisy]);
    }

    #[test]
    fn truncates_long_bouquets() {
        let ids = vec!["rose"; 10];
        let raw = GIFT_ENGINE.encode(serde_json::json!({"v": 1, "flowers": ids}).to_string());
        assert_eq!(decode_gift(&raw).len(), MAX_BOUQUET);
    }

    #[test]
    fn garbage_is_empty() {
        assert!(decode_gift("").is_empty());
        assert!(decode_gift("!!!not base64!!!").is_empty());
        assert!(decode_gift("eyJ2IjoxLCJmbG93").is_empty());
        assert!(decode_gift(&GIFT_ENGINE.encode("[1,2,3]")).is_empty());
        assert!(decode_gift(&GIFT_ENGINE.encode(r#"{"flowers":"rose"}"#)).is_empty());
        assert!(try_decode_gift("eyJ2IjoxLCJmbG93").is_err());
    }

    #[test]
    fn base_url_strips_index_query_and_hash() {
        let url = Url::parse("https://example.com/love/index.html?gift=abc#yes").unwrap();
        assert_eq!(base_url(&url).as_str(), "https://example.com/love/");
    }

    #[test]
    fn gift_links_round_trip_through_urls() {
        let page = Url::parse("https://example.com/?old=1#x").unwrap();
        let link = gift_url(&page, &[Flower::Sakura, Flower::Peony]);
        assert!(link.as_str().starts_with("https://example.com/?gift="));
        assert_eq!(gift_from_url(&link), Some(vec![Flower::Sakura, Flower::Peony]));
        assert_eq!(landing_bouquet(&link), vec![Flower::Sakura, Flower::Peony]);
    }

    #[test]
    fn landing_falls_back_to_default() {
        let plain = Url::parse("https://example.com/").unwrap();
        assert_eq!(gift_from_url(&plain), None);
        assert_eq!(landing_bouquet(&plain), DEFAULT_BOUQUET.to_vec());
        let broken = Url::parse("https://example.com/?gift=%%%").unwrap();
        assert_eq!(gift_from_url(&broken), Some(vec![]));
        assert_eq!(landing_bouquet(&broken), DEFAULT_BOUQUET.to_vec());
    }

    #[test]
    fn answered_link_and_hash() {
        let page = Url::parse("https://example.com/index.html?gift=x").unwrap();
        let link = answered_link(&page);
        assert_eq!(link.as_str(), "https://example.com/#yes");
        assert_eq!(location_hash(&link).as_deref(), Some("#yes"));
        assert_eq!(location_hash(&page), None);
    }
}
