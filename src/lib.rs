//! Client for a paginated remote catalogue.
//!
//! Layers, leaves first: [`transport`] issues cancellable GETs, [`api`] maps
//! catalogue operations onto them, [`cache`] holds decoded images, and
//! [`datasource`] assembles pages into a position-indexed item store and
//! notifies observers of changes.

pub mod api;
pub mod cache;
pub mod config;
pub mod datasource;
pub mod error;
pub mod logging;
pub mod transport;

pub use api::{CatalogApi, DecodedImage, Item, PageEnvelope};
pub use cache::ImageCache;
pub use datasource::{CatalogueEvent, CatalogueObserver, Datasource, PageOutcome};
pub use error::FetchError;
