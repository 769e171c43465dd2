//! Wire models for catalogue responses.

use reqwest::Url;
use serde::{Deserialize, Deserializer};

/// Currency of an item price. On the wire it is the currency symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Currency {
    #[serde(rename = "$")]
    Usd,
    #[serde(rename = "€")]
    Eur,
    #[serde(rename = "£")]
    Gbp,
}

impl Currency {
    /// ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Price {
    pub value: f64,
    pub currency: Currency,
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{:.2}", self.currency.symbol(), self.value)
    }
}

/// A catalogue item. Immutable once decoded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Item {
    #[serde(rename = "item_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    #[serde(deserialize_with = "deserialize_url")]
    pub image: Url,
}

/// One decoded catalogue page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageEnvelope {
    #[serde(rename = "result")]
    pub items: Vec<Item>,
    /// Locator of the next page; absent on the last page.
    pub next: Option<String>,
    /// Locator of the previous page. Decoded but never followed.
    pub prev: Option<String>,
    /// Item count across all pages.
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryEnvelope {
    pub categories: Vec<String>,
}

fn deserialize_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Url::parse(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
        "result": [
            {
                "item_id": "a1",
                "title": "Lamp",
                "description": "Desk lamp",
                "price": {"value": 19.5, "currency": "€"},
                "category": "home",
                "image": "https://img.example.com/a1.png"
            },
            {
                "item_id": "b2",
                "title": "Mug",
                "description": "Coffee mug",
                "price": {"value": 4, "currency": "£"},
                "category": "kitchen",
                "image": "https://img.example.com/b2.jpg"
            }
        ],
        "next": "https://shop.example.com/catalog/2",
        "total": 7
    }"#;

    #[test]
    fn test_decode_page() {
        let page: PageEnvelope = serde_json::from_str(PAGE).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 7);
        assert_eq!(page.next.as_deref(), Some("https://shop.example.com/catalog/2"));
        assert!(page.prev.is_none());

        let lamp = &page.items[0];
        assert_eq!(lamp.id, "a1");
        assert_eq!(lamp.price.currency, Currency::Eur);
        assert_eq!(lamp.price.currency.code(), "EUR");
        assert_eq!(lamp.image.path(), "/a1.png");
        assert_eq!(page.items[1].price.to_string(), "£4.00");
    }

    #[test]
    fn test_unknown_currency_is_rejected() {
        let raw = PAGE.replace("€", "¥");
        assert!(serde_json::from_str::<PageEnvelope>(&raw).is_err());
    }

    #[test]
    fn test_invalid_image_url_is_rejected() {
        let raw = PAGE.replace("https://img.example.com/a1.png", "not a url");
        assert!(serde_json::from_str::<PageEnvelope>(&raw).is_err());
    }

    #[test]
    fn test_decode_categories() {
        let envelope: CategoryEnvelope =
            serde_json::from_str(r#"{"categories": ["home", "kitchen"]}"#).unwrap();
        assert_eq!(envelope.categories, vec!["home", "kitchen"]);
    }
}
