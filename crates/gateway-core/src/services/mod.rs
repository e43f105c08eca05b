//! Core gateway services: phone normalization, token exchange, attribute resolution

pub mod catalog;
pub mod mapper;
pub mod phone;
pub mod token;

// Re-export service entry points
pub use catalog::{resolve_catalog, AttributeCatalog};
pub use mapper::{annotate_attributes, AttributeMapper, MappedAttributes};
pub use phone::normalize_phone;
pub use token::acquire_token;
