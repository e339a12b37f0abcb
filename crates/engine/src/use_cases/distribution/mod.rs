//! Distribution use cases.
//!
//! Applies augmentations to freshly instantiated level-scaled NPCs, reusing
//! verdicts from earlier instances of the same NPC instead of rolling again.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use leveldist_domain::{
    AugmentationId, DistributionFlags, IndexOrCount, Level, NpcTemplateId, QueryKey, SessionId,
};
use tokio::sync::Mutex;

use crate::infrastructure::cache::LevelMultCache;
use crate::infrastructure::ports::{Candidate, DistributionPolicy, EntityHandle, Verdict};
use crate::infrastructure::session_resolver::SessionResolver;
use crate::infrastructure::settings::CacheSettings;

/// An augmentation the NPC ends up with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub entity: EntityHandle,
    pub index_or_count: IndexOrCount,
    /// The grant was first made when the NPC had a higher level than now.
    pub recorded_above_current_level: bool,
}

/// What one distribution attempt did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionOutcome {
    /// Grants replayed from earlier instances of this NPC.
    pub reapplied: Vec<Grant>,
    /// Augmentation ids newly granted by the policy in this attempt.
    pub granted: Vec<(AugmentationId, IndexOrCount)>,
    /// Candidates skipped because an earlier instance rejected them.
    pub skipped_rejected: usize,
}

/// Distributes augmentations to one level-scaled NPC instance.
///
/// Attempts on the same NPC template within one session are serialized, so
/// concurrent instances never roll the same candidate twice.
pub struct DistributeLeveledNpc {
    cache: Arc<LevelMultCache>,
    sessions: Arc<SessionResolver>,
    policy: Arc<dyn DistributionPolicy>,
    settings: CacheSettings,
    npc_locks: DashMap<(SessionId, NpcTemplateId), Arc<Mutex<()>>>,
}

impl DistributeLeveledNpc {
    pub fn new(
        cache: Arc<LevelMultCache>,
        sessions: Arc<SessionResolver>,
        policy: Arc<dyn DistributionPolicy>,
        settings: CacheSettings,
    ) -> Self {
        Self {
            cache,
            sessions,
            policy,
            settings,
            npc_locks: DashMap::new(),
        }
    }

    /// Key for an attempt on `npc` at `level`, with the configured default flags.
    pub fn query_key(&self, npc: NpcTemplateId, level: Level) -> QueryKey {
        self.query_key_with(npc, level, self.settings.distribution_flags())
    }

    /// Key for an attempt with explicit flags. Caching stays suppressed when
    /// it is disabled in the settings.
    pub fn query_key_with(
        &self,
        npc: NpcTemplateId,
        level: Level,
        mut flags: DistributionFlags,
    ) -> QueryKey {
        flags.suppress_level_caching |= !self.settings.level_caching;
        QueryKey::new(self.sessions.current(), npc, level).with_flags(flags)
    }

    /// Evaluate `candidates` for one NPC instance.
    ///
    /// Augmentations granted to earlier instances are replayed first and not
    /// offered to the policy again. Candidates rejected at this level or below
    /// are skipped. Every fresh verdict is recorded under `key`.
    pub async fn execute(&self, key: &QueryKey, candidates: &[Candidate]) -> DistributionOutcome {
        // Check, roll and record must not interleave with another instance
        // of the same NPC. Suppressed attempts never touch the cache.
        let npc_lock = (!key.suppress_level_caching).then(|| {
            self.npc_locks
                .entry((key.session_id, key.npc_template_id))
                .or_default()
                .clone()
        });
        let _guard = match &npc_lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        let mut outcome = DistributionOutcome::default();
        let mut replayed: HashSet<AugmentationId> = HashSet::new();

        if self.cache.has_any_distributed(key).await {
            self.cache
                .for_each_distributed(key, |entity, index_or_count, above| {
                    replayed.insert(AugmentationId::from_raw(entity.form_id));
                    outcome.reapplied.push(Grant {
                        entity: entity.clone(),
                        index_or_count,
                        recorded_above_current_level: above,
                    });
                })
                .await;
        }

        for candidate in candidates {
            if replayed.contains(&candidate.augmentation_id) {
                continue;
            }
            if self
                .cache
                .query_rejected(key, candidate.augmentation_id, candidate.candidate_index)
                .await
            {
                outcome.skipped_rejected += 1;
                continue;
            }

            match self
                .policy
                .evaluate(key.npc_template_id, key.observed_level, candidate)
            {
                Verdict::Granted(index_or_count) => {
                    self.cache
                        .record_distributed(key, candidate.augmentation_id, index_or_count)
                        .await;
                    replayed.insert(candidate.augmentation_id);
                    outcome
                        .granted
                        .push((candidate.augmentation_id, index_or_count));
                }
                Verdict::Rejected => {
                    self.cache
                        .record_rejected(key, candidate.augmentation_id, candidate.candidate_index)
                        .await;
                }
            }
        }

        tracing::debug!(
            session_id = %key.session_id,
            npc = %key.npc_template_id,
            level = %key.observed_level,
            suppressed = key.suppress_level_caching,
            reapplied = outcome.reapplied.len(),
            granted = outcome.granted.len(),
            skipped_rejected = outcome.skipped_rejected,
            "Distributed to leveled NPC"
        );

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{
        EntityKind, EntityRegistry, MockDistributionPolicy, MockEntityRegistry,
        MockSessionProvider,
    };
    use leveldist_domain::CandidateIndex;
    use mockall::predicate::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const NPC: u32 = 0x0002_0001;
    const PERK: u32 = 0x0800_0001;
    const SWORD: u32 = 0x0800_0002;

    fn registry() -> Arc<dyn EntityRegistry> {
        let mut registry = MockEntityRegistry::new();
        registry
            .expect_resolve()
            .returning(|id| Some(EntityHandle::new(id.raw(), "Granted", EntityKind::Perk)));
        Arc::new(registry)
    }

    fn sessions(raw: u64) -> Arc<SessionResolver> {
        let mut provider = MockSessionProvider::new();
        provider.expect_current_session_id().returning(move || raw);
        Arc::new(SessionResolver::new(Arc::new(provider)))
    }

    fn candidate(aug: u32, index: u32) -> Candidate {
        Candidate::new(AugmentationId::from_raw(aug), CandidateIndex::new(index))
    }

    fn use_case(
        cache: Arc<LevelMultCache>,
        policy: MockDistributionPolicy,
        settings: CacheSettings,
    ) -> DistributeLeveledNpc {
        DistributeLeveledNpc::new(cache, sessions(7), Arc::new(policy), settings)
    }

    #[tokio::test]
    async fn later_instances_reuse_earlier_verdicts() {
        let cache = Arc::new(LevelMultCache::new(registry()));
        let mut policy = MockDistributionPolicy::new();
        policy
            .expect_evaluate()
            .with(always(), eq(Level::new(10)), eq(candidate(PERK, 0)))
            .times(1)
            .returning(|_, _, _| Verdict::Granted(IndexOrCount::index(0)));
        policy
            .expect_evaluate()
            .with(always(), eq(Level::new(10)), eq(candidate(SWORD, 1)))
            .times(1)
            .returning(|_, _, _| Verdict::Rejected);

        let distribute = use_case(cache, policy, CacheSettings::default());
        let key = distribute.query_key(NpcTemplateId::from_raw(NPC), Level::new(10));
        let candidates = [candidate(PERK, 0), candidate(SWORD, 1)];

        let first = distribute.execute(&key, &candidates).await;
        assert_eq!(
            first.granted,
            vec![(AugmentationId::from_raw(PERK), IndexOrCount::index(0))]
        );
        assert!(first.reapplied.is_empty());

        // Same NPC re-instantiated later: no new rolls.
        let second = distribute.execute(&key, &candidates).await;
        assert!(second.granted.is_empty());
        assert_eq!(second.skipped_rejected, 1);
        assert_eq!(second.reapplied.len(), 1);
        assert_eq!(second.reapplied[0].entity.form_id, PERK);
        assert!(!second.reapplied[0].recorded_above_current_level);
    }

    #[tokio::test]
    async fn grants_from_higher_levels_are_flagged() {
        let cache = Arc::new(LevelMultCache::new(registry()));
        let mut policy = MockDistributionPolicy::new();
        policy
            .expect_evaluate()
            .returning(|_, _, _| Verdict::Granted(IndexOrCount::count(1)));

        let distribute = use_case(cache, policy, CacheSettings::default());
        let npc = NpcTemplateId::from_raw(NPC);

        distribute
            .execute(&distribute.query_key(npc, Level::new(20)), &[candidate(SWORD, 0)])
            .await;
        let lower = distribute
            .execute(&distribute.query_key(npc, Level::new(12)), &[candidate(SWORD, 0)])
            .await;

        assert!(lower.granted.is_empty());
        assert_eq!(lower.reapplied.len(), 1);
        assert!(lower.reapplied[0].recorded_above_current_level);
    }

    #[tokio::test]
    async fn disabled_caching_rolls_every_time() {
        let cache = Arc::new(LevelMultCache::new(registry()));
        let mut policy = MockDistributionPolicy::new();
        policy
            .expect_evaluate()
            .times(2)
            .returning(|_, _, _| Verdict::Rejected);

        let settings = CacheSettings {
            level_caching: false,
            ..CacheSettings::default()
        };
        let distribute = use_case(cache.clone(), policy, settings);
        let key = distribute.query_key_with(
            NpcTemplateId::from_raw(NPC),
            Level::new(10),
            DistributionFlags::default(),
        );
        assert!(key.suppress_level_caching);

        distribute.execute(&key, &[candidate(PERK, 0)]).await;
        let again = distribute.execute(&key, &[candidate(PERK, 0)]).await;

        assert_eq!(again.skipped_rejected, 0);
        assert!(cache.is_empty().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_instances_roll_each_candidate_once() {
        let cache = Arc::new(LevelMultCache::new(registry()));
        let calls = Arc::new(AtomicUsize::new(0));
        let mut policy = MockDistributionPolicy::new();
        let counted = calls.clone();
        policy.expect_evaluate().returning(move |_, _, _| {
            // Keep the first roll in flight while the second instance arrives.
            std::thread::sleep(Duration::from_millis(50));
            if counted.fetch_add(1, Ordering::SeqCst) == 0 {
                Verdict::Granted(IndexOrCount::index(0))
            } else {
                Verdict::Rejected
            }
        });

        let distribute = Arc::new(use_case(cache.clone(), policy, CacheSettings::default()));
        let key = distribute.query_key(NpcTemplateId::from_raw(NPC), Level::new(10));

        let spawn = move |distribute: Arc<DistributeLeveledNpc>| {
            tokio::spawn(async move { distribute.execute(&key, &[candidate(PERK, 0)]).await })
        };
        let first = spawn(distribute.clone());
        let second = spawn(distribute.clone());
        let first = first.await.unwrap();
        let second = second.await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.granted.len() + second.granted.len(), 1);
        assert_eq!(first.reapplied.len() + second.reapplied.len(), 1);
        assert!(
            !cache
                .query_rejected(&key, AugmentationId::from_raw(PERK), CandidateIndex::new(0))
                .await
        );
    }

    #[tokio::test]
    async fn key_uses_the_loaded_session() {
        let cache = Arc::new(LevelMultCache::new(registry()));
        let distribute = use_case(cache, MockDistributionPolicy::new(), CacheSettings::default());

        let key = distribute.query_key(NpcTemplateId::from_raw(NPC), Level::new(3));
        assert_eq!(key.session_id.raw(), 7);
        assert!(key.only_level_scaled_entries);
        assert!(!key.suppress_level_caching);
    }
}
