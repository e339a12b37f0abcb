//! Value objects - Immutable objects defined by their attributes

mod index_or_count;
mod query_key;

pub use index_or_count::{AugmentationRef, IndexOrCount};
pub use query_key::{DistributionFlags, QueryKey};
