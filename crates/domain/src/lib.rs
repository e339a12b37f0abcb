//! Leveldist domain - identifiers and value objects shared by the
//! distribution cache and its callers.

pub mod error;
pub mod ids;
pub mod value_objects;

pub use error::DomainError;

// Re-export ID types
pub use ids::{AugmentationId, CandidateIndex, Level, NpcTemplateId, SessionId};

// Re-export value objects
pub use value_objects::{AugmentationRef, DistributionFlags, IndexOrCount, QueryKey};
