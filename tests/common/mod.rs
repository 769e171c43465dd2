//! Shared test utilities and fixtures.

#![allow(dead_code, unused_imports)]

pub mod mock_backend;

use image::{DynamicImage, ImageFormat, RgbImage};
use serde_json::json;
use shopfeed::config::ApiConfig;
use shopfeed::CatalogApi;
use std::io::Cursor;
use std::time::Duration;

use mock_backend::MockBackend;

/// API config pointing at a mock server.
pub fn api_config(mock: &MockBackend) -> ApiConfig {
    ApiConfig {
        scheme: "http".to_string(),
        host: mock.host(),
        timeout_seconds: 5,
        connect_timeout_seconds: 1,
        ..ApiConfig::default()
    }
}

pub fn api_for(mock: &MockBackend) -> CatalogApi {
    CatalogApi::from_config(&api_config(mock)).expect("Failed to build API client")
}

/// Item JSON whose image lives on the mock server at `/images/<id>.png`.
pub fn item_json(mock: &MockBackend, id: &str) -> serde_json::Value {
    json!({
        "item_id": id,
        "title": format!("Item {}", id),
        "description": format!("Description of {}", id),
        "price": {"value": 9.99, "currency": "€"},
        "category": "home",
        "image": format!("{}/images/{}.png", mock.base_url(), id),
    })
}

/// Catalogue page body with the given items and optional next locator.
pub fn page_body(mock: &MockBackend, ids: &[&str], next: Option<&str>, total: usize) -> String {
    let items: Vec<_> = ids.iter().map(|id| item_json(mock, id)).collect();
    let mut body = json!({"result": items, "total": total});
    if let Some(next) = next {
        body["next"] = json!(next);
    }
    body.to_string()
}

/// A small valid PNG.
pub fn png_bytes() -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::new(4, 3))
        .write_to(&mut buf, ImageFormat::Png)
        .expect("Failed to encode PNG");
    buf.into_inner()
}

/// Drain whatever events are already queued.
pub fn drain<T>(rx: &mut tokio::sync::mpsc::UnboundedReceiver<T>) -> Vec<T> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}

pub const SHORT_WAIT: Duration = Duration::from_millis(50);
