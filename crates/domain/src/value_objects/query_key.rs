//! Key describing one distribution attempt

use serde::{Deserialize, Serialize};

use crate::ids::{Level, NpcTemplateId, SessionId};

/// Mode flags a distribution attempt carries alongside its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DistributionFlags {
    /// Only entries configured for level-scaled NPCs are being evaluated.
    /// Informational for the caller; the cache never branches on it.
    pub only_level_scaled_entries: bool,
    /// Opt this evaluation out of memoization entirely.
    pub suppress_level_caching: bool,
}

impl DistributionFlags {
    pub fn suppressed() -> Self {
        Self {
            suppress_level_caching: true,
            ..Self::default()
        }
    }
}

/// Session, NPC template and observed level of one distribution attempt.
///
/// Built once per attempt and passed by reference to every cache call made
/// during that attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryKey {
    pub session_id: SessionId,
    pub npc_template_id: NpcTemplateId,
    pub observed_level: Level,
    pub only_level_scaled_entries: bool,
    pub suppress_level_caching: bool,
}

impl QueryKey {
    pub fn new(session_id: SessionId, npc_template_id: NpcTemplateId, observed_level: Level) -> Self {
        Self {
            session_id,
            npc_template_id,
            observed_level,
            only_level_scaled_entries: false,
            suppress_level_caching: false,
        }
    }

    pub fn with_flags(mut self, flags: DistributionFlags) -> Self {
        self.only_level_scaled_entries = flags.only_level_scaled_entries;
        self.suppress_level_caching = flags.suppress_level_caching;
        self
    }

    pub fn suppressed(mut self) -> Self {
        self.suppress_level_caching = true;
        self
    }

    pub fn at_level(mut self, observed_level: Level) -> Self {
        self.observed_level = observed_level;
        self
    }

    pub fn flags(&self) -> DistributionFlags {
        DistributionFlags {
            only_level_scaled_entries: self.only_level_scaled_entries,
            suppress_level_caching: self.suppress_level_caching,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> QueryKey {
        QueryKey::new(
            SessionId::fallback(0),
            NpcTemplateId::from_raw(0x10),
            Level::new(4),
        )
    }

    #[test]
    fn test_new_key_caches_by_default() {
        let key = key();
        assert!(!key.suppress_level_caching);
        assert!(!key.only_level_scaled_entries);
    }

    #[test]
    fn test_with_flags_round_trips() {
        let flags = DistributionFlags {
            only_level_scaled_entries: true,
            suppress_level_caching: true,
        };
        assert_eq!(key().with_flags(flags).flags(), flags);
    }

    #[test]
    fn test_at_level_keeps_identity() {
        let moved = key().at_level(Level::new(9));
        assert_eq!(moved.observed_level, Level::new(9));
        assert_eq!(moved.npc_template_id, key().npc_template_id);
        assert_eq!(moved.session_id, key().session_id);
    }
}
