//! Boundary (GeoJSON) loading for the market map.

pub mod boundaries;
pub mod cache;
pub mod error;

pub use boundaries::{
    load_boundaries, load_boundaries_with, BoundaryLevel, BoundarySet, GeographicFeature,
    CANONICAL_KEY_PROPERTY, SLUG_ID_PROPERTY,
};
pub use cache::{BoundaryCache, Memo};
pub use error::GeoError;
