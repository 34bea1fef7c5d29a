//! Optimizer domain module.
//!
//! The mode catalog and the instruction templates used for generation.

mod mode;
pub mod templates;

pub use mode::{CatalogError, Mode, ModeCatalog, DEEP_RESEARCH};
