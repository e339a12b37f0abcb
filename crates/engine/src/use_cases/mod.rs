//! Use cases - Distribution orchestration.
//!
//! Use cases combine the cache with the host ports to fulfil one request
//! from the host.

pub mod distribution;

// Re-export main types
pub use distribution::{DistributeLeveledNpc, DistributionOutcome, Grant};
