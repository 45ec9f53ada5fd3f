//! Catalog source, normalisation and cached repository.

pub mod normalize;
pub mod repository;
pub mod source;

pub use repository::ProductRepository;
pub use source::{CatalogError, CatalogSource, HttpCatalogSource, RawProduct};
