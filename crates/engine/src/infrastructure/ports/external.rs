//! Host-facing port traits (entity registry, save sessions, decision engine).

use leveldist_domain::{AugmentationId, Level, NpcTemplateId};

use super::types::{Candidate, EntityHandle, Verdict};

// =============================================================================
// Entity Registry
// =============================================================================

/// Lookup-by-identifier service of the host.
///
/// Resolution fails once the content that defined an entity is unloaded.
#[cfg_attr(test, mockall::automock)]
pub trait EntityRegistry: Send + Sync {
    fn resolve(&self, id: AugmentationId) -> Option<EntityHandle>;

    /// Resolve an NPC template, used for diagnostic names only.
    fn resolve_npc(&self, id: NpcTemplateId) -> Option<EntityHandle>;
}

// =============================================================================
// Session Provider
// =============================================================================

/// Reports the id of the save currently loaded by the host.
#[cfg_attr(test, mockall::automock)]
pub trait SessionProvider: Send + Sync {
    /// Returns `0` when no save is loaded.
    fn current_session_id(&self) -> u64;
}

// =============================================================================
// Distribution Policy
// =============================================================================

/// The decision engine: rolls chances and checks conditions for a candidate.
#[cfg_attr(test, mockall::automock)]
pub trait DistributionPolicy: Send + Sync {
    fn evaluate(&self, npc: NpcTemplateId, level: Level, candidate: &Candidate) -> Verdict;
}
