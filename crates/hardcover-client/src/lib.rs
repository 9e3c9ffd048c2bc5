//! Hardcover catalog provider
//!
//! This crate is the backend the MCP gateway talks to. It exposes the catalog
//! as a small capability trait ([`CatalogProvider`]) and ships one concrete
//! implementation that speaks GraphQL to the Hardcover API ([`HardcoverClient`]).
//! Catalog records are passed through as raw JSON; the gateway never looks inside them.

pub mod client;
pub mod error;
pub mod provider;
pub mod queries;
pub mod types;

// Re-export key types
pub use client::{HardcoverClient, DEFAULT_API_URL};
pub use error::{ProviderError, ProviderResult};
pub use provider::CatalogProvider;
pub use types::{Item, Lookup, ReadingStatus, StatusUpdate};
