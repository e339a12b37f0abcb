//! Payload attached to a successful distribution

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{AugmentationId, CandidateIndex};

/// Either the candidate that was chosen or the quantity that was granted,
/// depending on the kind of augmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum IndexOrCount {
    /// Position in the augmentation's candidate list (perks, spells, outfits)
    Index(CandidateIndex),
    /// Granted quantity (items)
    Count(u32),
}

impl IndexOrCount {
    pub fn index(index: u32) -> Self {
        Self::Index(CandidateIndex::new(index))
    }

    pub fn count(count: u32) -> Self {
        Self::Count(count)
    }

    pub fn as_index(&self) -> Option<CandidateIndex> {
        match self {
            Self::Index(index) => Some(*index),
            Self::Count(_) => None,
        }
    }

    pub fn as_count(&self) -> Option<u32> {
        match self {
            Self::Index(_) => None,
            Self::Count(count) => Some(*count),
        }
    }
}

impl fmt::Display for IndexOrCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "index {}", index),
            Self::Count(count) => write!(f, "count {}", count),
        }
    }
}

/// A granted augmentation as stored by the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AugmentationRef {
    pub augmentation_id: AugmentationId,
    pub index_or_count: IndexOrCount,
}

impl AugmentationRef {
    pub fn new(augmentation_id: AugmentationId, index_or_count: IndexOrCount) -> Self {
        Self {
            augmentation_id,
            index_or_count,
        }
    }
}
