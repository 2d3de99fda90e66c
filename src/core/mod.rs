//! Core module - catalog data model, storage, and query layers

pub mod config;
pub mod dataset;
pub mod document;
pub mod error;
pub mod loader;
pub mod resolver;
pub mod service;
pub mod store;

pub use config::Config;
pub use dataset::{Dataset, EntityKind, IdName};
pub use error::{CatalogError, ErrorBody, ReasonCode};
pub use loader::{CatalogLoader, ImportCounts, ImportReport};
pub use resolver::Resolver;
pub use service::LookupService;
pub use store::{open_store, BackendKind, ReferenceStore, StoreError};
