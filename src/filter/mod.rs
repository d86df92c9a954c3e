//! Filtering primitives for abundance matrices.

pub mod lineage;

pub use lineage::{filter_lineages, LineageFilterResult, OTHERS_LINEAGE};
