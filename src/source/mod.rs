//! The vendor-side source model: typed structs mirroring the exported
//! project schema, plus the loader that deserializes and validates it.
//!
//! The source model is immutable once loaded; everything downstream only
//! reads from it through the [`Catalog`](crate::catalog::Catalog).

pub mod loader;
pub mod model;

pub use model::*;
