//! Catalog product types and defensive price parsing.
//!
//! Products come from an external ingestion job that caches the upstream
//! catalog as a JSON array. The upstream feed is not under our control:
//! prices are free text (sometimes with currency symbols or spaces, sometimes
//! garbage) and product identifiers arrive as either strings or numbers.

use serde::{Deserialize, Serialize};

/// A single product from the cached catalog snapshot.
///
/// All fields are kept as the ingestion job stored them. `price` stays
/// textual; use [`parse_price`] when arithmetic is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Upstream identifier, unique within a snapshot.
    pub id: ProductKey,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Free-text price. May be malformed; never parse without a fallback.
    #[serde(default)]
    pub price: String,
    /// Display description.
    #[serde(default)]
    pub description: String,
    /// Image references.
    #[serde(default)]
    pub pictures: Vec<String>,
}

impl Product {
    /// The product's identifier as a canonical string key.
    #[must_use]
    pub fn key(&self) -> String {
        self.id.as_key()
    }

    /// Parsed price, or `None` when the price text is malformed.
    #[must_use]
    pub fn parsed_price(&self) -> Option<f64> {
        parse_price(&self.price)
    }
}

/// A product identifier as it appears in the upstream feed.
///
/// The feed is inconsistent: some revisions emit string ids, others numeric
/// ones. Both map to the same canonical string key used by the cart table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductKey {
    /// String identifier, used as-is.
    Text(String),
    /// Numeric identifier, canonicalized via `to_string`.
    Number(i64),
}

impl ProductKey {
    /// Canonical string form of the identifier.
    #[must_use]
    pub fn as_key(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
        }
    }
}

impl std::fmt::Display for ProductKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for ProductKey {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Parse a free-text price defensively.
///
/// The ingestion job stores whatever the upstream feed had, so this accepts
/// plain numbers, comma decimal separators, and surrounding currency noise
/// ("1 200 ₽", "$19.99"). Returns `None` for anything that still doesn't
/// parse; callers treat that as a zero subtotal rather than an error.
#[must_use]
pub fn parse_price(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = trimmed.parse::<f64>() {
        return value.is_finite().then_some(value);
    }

    // Strip currency symbols and whitespace, normalize comma decimals.
    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',' || *c == '-')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    // More than one dot means thousands separators we can't disambiguate.
    if cleaned.matches('.').count() > 1 {
        return None;
    }

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_plain() {
        assert_eq!(parse_price("199"), Some(199.0));
        assert_eq!(parse_price("19.99"), Some(19.99));
        assert_eq!(parse_price("  250.5  "), Some(250.5));
    }

    #[test]
    fn test_parse_price_currency_noise() {
        assert_eq!(parse_price("$19.99"), Some(19.99));
        assert_eq!(parse_price("1 200"), Some(1200.0));
        assert_eq!(parse_price("149,90"), Some(149.9));
    }

    #[test]
    fn test_parse_price_garbage() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("call us"), None);
        assert_eq!(parse_price("1.2.3"), None);
    }

    #[test]
    fn test_product_key_canonical() {
        assert_eq!(ProductKey::Text("abc".to_string()).as_key(), "abc");
        assert_eq!(ProductKey::Number(42).as_key(), "42");
    }

    #[test]
    fn test_product_deserialize_numeric_id() {
        let json = r#"{"id": 7, "name": "Tea", "price": "120", "description": "", "pictures": []}"#;
        let product: Product = serde_json::from_str(json).expect("deserialize");
        assert_eq!(product.key(), "7");
        assert_eq!(product.parsed_price(), Some(120.0));
    }

    #[test]
    fn test_product_deserialize_missing_fields() {
        // Only the id is mandatory; the rest default so a sparse upstream
        // record never produces a partially-populated panic path.
        let json = r#"{"id": "x1"}"#;
        let product: Product = serde_json::from_str(json).expect("deserialize");
        assert_eq!(product.name, "");
        assert_eq!(product.parsed_price(), None);
    }

    #[test]
    fn test_product_roundtrip_preserves_id_shape() {
        let json = r#"{"id":"p-1","name":"Mug","price":"9.50","description":"d","pictures":["u"]}"#;
        let product: Product = serde_json::from_str(json).expect("deserialize");
        let back = serde_json::to_string(&product).expect("serialize");
        assert_eq!(back, json);
    }
}
