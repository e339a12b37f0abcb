//! Per-session memo of distribution verdicts for level-scaled NPCs.
//!
//! The host re-instantiates a level-scaled NPC every time it is encountered,
//! possibly at a different level. Distribution has to give every copy the same
//! augmentations, so each verdict is remembered under
//! `(session, npc template, observed level)` and reused on later evaluations.
//!
//! Entries are never evicted; the cache lives for the whole process and starts
//! empty in every new process.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;
use std::sync::Arc;

use leveldist_domain::{
    AugmentationId, AugmentationRef, CandidateIndex, IndexOrCount, Level, NpcTemplateId,
    QueryKey, SessionId,
};
use tokio::sync::RwLock;

use crate::infrastructure::ports::{EntityHandle, EntityRegistry};

type EntryKey = (SessionId, NpcTemplateId, Level);

/// Verdicts recorded for one NPC template at one observed level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheEntry {
    /// Candidate indices that were evaluated and rejected, per augmentation.
    /// Sets only ever grow.
    pub rejected: BTreeMap<AugmentationId, BTreeSet<CandidateIndex>>,
    /// Augmentations that were granted.
    pub distributed: BTreeSet<AugmentationRef>,
}

/// Counts reported at the top of a dump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub sessions: usize,
    pub templates: usize,
    pub levels: usize,
    pub rejected_indices: usize,
    pub distributed_pairs: usize,
}

fn template_range(session_id: SessionId, npc: NpcTemplateId) -> RangeInclusive<EntryKey> {
    (session_id, npc, Level::MIN)..=(session_id, npc, Level::MAX)
}

/// Unsynchronized storage. One flat map ordered by `(session, template, level)`,
/// so every "all levels of one template" query is a contiguous range in
/// ascending level order.
#[derive(Debug, Default)]
struct LevelEntries {
    map: BTreeMap<EntryKey, CacheEntry>,
}

impl LevelEntries {
    fn entry_mut(&mut self, key: &QueryKey) -> &mut CacheEntry {
        self.map
            .entry((key.session_id, key.npc_template_id, key.observed_level))
            .or_default()
    }

    fn is_rejected(&self, key: &QueryKey, aug: AugmentationId, index: CandidateIndex) -> bool {
        let eligible = (key.session_id, key.npc_template_id, Level::MIN)
            ..=(key.session_id, key.npc_template_id, key.observed_level);

        // The lowest level that mentions the augmentation decides, even when
        // a higher eligible level recorded something different.
        self.map
            .range(eligible)
            .find_map(|(_, entry)| entry.rejected.get(&aug))
            .map_or(false, |indices| indices.contains(&index))
    }

    fn insert_rejected(&mut self, key: &QueryKey, aug: AugmentationId, index: CandidateIndex) -> bool {
        self.entry_mut(key)
            .rejected
            .entry(aug)
            .or_default()
            .insert(index)
    }

    fn has_any_distributed(&self, session_id: SessionId, npc: NpcTemplateId) -> bool {
        self.map
            .range(template_range(session_id, npc))
            .any(|(_, entry)| !entry.distributed.is_empty())
    }

    fn insert_distributed(&mut self, key: &QueryKey, augmentation: AugmentationRef) -> bool {
        self.entry_mut(key).distributed.insert(augmentation)
    }

    fn distributed_by_level(
        &self,
        session_id: SessionId,
        npc: NpcTemplateId,
    ) -> Vec<(Level, AugmentationRef)> {
        self.map
            .range(template_range(session_id, npc))
            .flat_map(|((_, _, level), entry)| {
                entry.distributed.iter().map(move |aug| (*level, *aug))
            })
            .collect()
    }

    fn stats(&self) -> CacheStats {
        let sessions: BTreeSet<SessionId> = self.map.keys().map(|(s, _, _)| *s).collect();
        let templates: BTreeSet<(SessionId, NpcTemplateId)> =
            self.map.keys().map(|(s, n, _)| (*s, *n)).collect();

        CacheStats {
            sessions: sessions.len(),
            templates: templates.len(),
            levels: self.map.len(),
            rejected_indices: self
                .map
                .values()
                .flat_map(|entry| entry.rejected.values())
                .map(BTreeSet::len)
                .sum(),
            distributed_pairs: self.map.values().map(|entry| entry.distributed.len()).sum(),
        }
    }
}

/// Memo of distribution verdicts shared by every distribution attempt.
///
/// Every operation is a no-op (reads report "not found", writes report
/// "not inserted") when the key has `suppress_level_caching` set.
///
/// Operations never wait on anything but the internal lock. A synchronous
/// game-loop thread calls them through a runtime handle, e.g.
/// `handle.block_on(cache.query_rejected(&key, aug, index))`; it must not do
/// so from inside an async task.
pub struct LevelMultCache {
    entries: RwLock<LevelEntries>,
    registry: Arc<dyn EntityRegistry>,
}

impl LevelMultCache {
    pub fn new(registry: Arc<dyn EntityRegistry>) -> Self {
        Self {
            entries: RwLock::new(LevelEntries::default()),
            registry,
        }
    }

    /// Was this candidate already rejected for the NPC at this level or below?
    ///
    /// Levels are scanned upwards from the lowest one recorded; the first level
    /// with any rejection recorded for `augmentation_id` answers the query.
    pub async fn query_rejected(
        &self,
        key: &QueryKey,
        augmentation_id: AugmentationId,
        candidate_index: CandidateIndex,
    ) -> bool {
        if key.suppress_level_caching {
            return false;
        }
        self.entries
            .read()
            .await
            .is_rejected(key, augmentation_id, candidate_index)
    }

    /// Record a rejected candidate at the key's exact level.
    ///
    /// Returns `false` if it was already recorded there.
    pub async fn record_rejected(
        &self,
        key: &QueryKey,
        augmentation_id: AugmentationId,
        candidate_index: CandidateIndex,
    ) -> bool {
        if key.suppress_level_caching {
            return false;
        }
        let inserted = self
            .entries
            .write()
            .await
            .insert_rejected(key, augmentation_id, candidate_index);
        if inserted {
            tracing::trace!(
                session_id = %key.session_id,
                npc = %key.npc_template_id,
                level = %key.observed_level,
                augmentation = %augmentation_id,
                index = %candidate_index,
                "Recorded rejected candidate"
            );
        }
        inserted
    }

    /// Has anything ever been granted to this NPC template, at any level?
    pub async fn has_any_distributed(&self, key: &QueryKey) -> bool {
        if key.suppress_level_caching {
            return false;
        }
        self.entries
            .read()
            .await
            .has_any_distributed(key.session_id, key.npc_template_id)
    }

    /// Record a granted augmentation at the key's exact level.
    ///
    /// Returns `false` if the same pair was already recorded there.
    pub async fn record_distributed(
        &self,
        key: &QueryKey,
        augmentation_id: AugmentationId,
        index_or_count: IndexOrCount,
    ) -> bool {
        if key.suppress_level_caching {
            return false;
        }
        let inserted = self
            .entries
            .write()
            .await
            .insert_distributed(key, AugmentationRef::new(augmentation_id, index_or_count));
        if inserted {
            tracing::trace!(
                session_id = %key.session_id,
                npc = %key.npc_template_id,
                level = %key.observed_level,
                augmentation = %augmentation_id,
                value = %index_or_count,
                "Recorded distributed augmentation"
            );
        }
        inserted
    }

    /// Visit every augmentation granted to this NPC template at any level.
    ///
    /// Levels are visited in ascending order. The third visitor argument is
    /// `true` when the grant was recorded at a level above the key's observed
    /// level. Augmentations that no longer resolve in the registry are skipped.
    ///
    /// The cache is not locked while `visit` runs.
    pub async fn for_each_distributed<F>(&self, key: &QueryKey, mut visit: F)
    where
        F: FnMut(&EntityHandle, IndexOrCount, bool),
    {
        if key.suppress_level_caching {
            return;
        }
        let granted = self
            .entries
            .read()
            .await
            .distributed_by_level(key.session_id, key.npc_template_id);

        for (level, augmentation) in granted {
            let Some(entity) = self.registry.resolve(augmentation.augmentation_id) else {
                tracing::trace!(
                    augmentation = %augmentation.augmentation_id,
                    level = %level,
                    "Skipping distributed augmentation that no longer resolves"
                );
                continue;
            };
            visit(&entity, augmentation.index_or_count, key.observed_level < level);
        }
    }

    /// Number of `(session, template, level)` entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.map.is_empty()
    }

    pub async fn stats(&self) -> CacheStats {
        self.entries.read().await.stats()
    }

    /// Log the whole cache, one line per node, and return the lines.
    ///
    /// Identifiers are resolved to editor ids where the registry still knows them.
    pub async fn dump_all(&self) -> Vec<String> {
        let (snapshot, stats) = {
            let guard = self.entries.read().await;
            (guard.map.clone(), guard.stats())
        };

        let mut lines = vec![format!(
            "Level-scaled distribution cache: {} sessions, {} templates, {} levels, {} rejected, {} distributed",
            stats.sessions,
            stats.templates,
            stats.levels,
            stats.rejected_indices,
            stats.distributed_pairs
        )];

        let mut current_session = None;
        let mut current_template = None;
        for ((session_id, npc, level), entry) in &snapshot {
            if current_session != Some(*session_id) {
                current_session = Some(*session_id);
                current_template = None;
                lines.push(format!("session {}", session_id));
            }
            if current_template != Some(*npc) {
                current_template = Some(*npc);
                lines.push(format!("  npc {}", self.npc_name(*npc)));
            }
            lines.push(format!("    level {}", level));
            for (aug, indices) in &entry.rejected {
                let indices = indices
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                lines.push(format!(
                    "      rejected {}: {}",
                    self.augmentation_name(*aug),
                    indices
                ));
            }
            for granted in &entry.distributed {
                lines.push(format!(
                    "      distributed {} ({})",
                    self.augmentation_name(granted.augmentation_id),
                    granted.index_or_count
                ));
            }
        }

        for line in &lines {
            tracing::info!(target: "leveldist::dump", "{}", line);
        }
        lines
    }

    fn npc_name(&self, npc: NpcTemplateId) -> String {
        self.registry
            .resolve_npc(npc)
            .map_or_else(|| npc.to_string(), |entity| entity.to_string())
    }

    fn augmentation_name(&self, aug: AugmentationId) -> String {
        self.registry
            .resolve(aug)
            .map_or_else(|| aug.to_string(), |entity| entity.to_string())
    }
}
