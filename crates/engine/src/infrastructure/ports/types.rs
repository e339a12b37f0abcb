//! Data types exchanged across the port boundary.

use std::fmt;

use leveldist_domain::{AugmentationId, CandidateIndex, IndexOrCount};

/// Kind of a distributable host entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Perk,
    Item,
    Spell,
    Outfit,
    Faction,
    Package,
    Npc,
    Other,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Perk => write!(f, "PERK"),
            Self::Item => write!(f, "ITEM"),
            Self::Spell => write!(f, "SPELL"),
            Self::Outfit => write!(f, "OUTFIT"),
            Self::Faction => write!(f, "FACTION"),
            Self::Package => write!(f, "PACKAGE"),
            Self::Npc => write!(f, "NPC"),
            Self::Other => write!(f, "OTHER"),
        }
    }
}

/// A live entity resolved from the host registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityHandle {
    /// Raw form id of the entity
    pub form_id: u32,
    /// Editor id, used for diagnostics only
    pub editor_id: String,
    pub kind: EntityKind,
}

impl EntityHandle {
    pub fn new(form_id: u32, editor_id: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            form_id,
            editor_id: editor_id.into(),
            kind,
        }
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{} 0x{:08X}]", self.editor_id, self.kind, self.form_id)
    }
}

/// One candidate slot of an augmentation offered to the distribution engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub augmentation_id: AugmentationId,
    pub candidate_index: CandidateIndex,
}

impl Candidate {
    pub fn new(augmentation_id: AugmentationId, candidate_index: CandidateIndex) -> Self {
        Self {
            augmentation_id,
            candidate_index,
        }
    }
}

/// Outcome of evaluating one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Granted(IndexOrCount),
    Rejected,
}
