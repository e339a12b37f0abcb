//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    cache::LevelMultCache,
    ports::{DistributionPolicy, EntityRegistry, SessionProvider},
    session_resolver::SessionResolver,
    settings::CacheSettings,
};
use crate::use_cases::distribution::DistributeLeveledNpc;

/// Main application state.
///
/// Built once when the host plugin loads and kept for the lifetime of the
/// process. Holds the single cache instance shared by every distribution.
pub struct App {
    pub settings: CacheSettings,
    pub cache: Arc<LevelMultCache>,
    pub sessions: Arc<SessionResolver>,
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub distribute: DistributeLeveledNpc,
}

impl App {
    pub fn new(
        registry: Arc<dyn EntityRegistry>,
        session_provider: Arc<dyn SessionProvider>,
        policy: Arc<dyn DistributionPolicy>,
        settings: CacheSettings,
    ) -> Self {
        let cache = Arc::new(LevelMultCache::new(registry));
        let sessions = Arc::new(SessionResolver::new(session_provider));

        if !settings.level_caching {
            tracing::info!("Level caching disabled; every distribution will roll fresh");
        }

        let use_cases = UseCases {
            distribute: DistributeLeveledNpc::new(
                cache.clone(),
                sessions.clone(),
                policy,
                settings.clone(),
            ),
        };

        Self {
            settings,
            cache,
            sessions,
            use_cases,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{
        Candidate, MockDistributionPolicy, MockEntityRegistry, MockSessionProvider, Verdict,
    };
    use leveldist_domain::{AugmentationId, CandidateIndex, Level, NpcTemplateId};

    #[tokio::test]
    async fn distributions_share_the_app_cache() {
        let mut registry = MockEntityRegistry::new();
        registry.expect_resolve().returning(|_| None);
        let mut provider = MockSessionProvider::new();
        provider.expect_current_session_id().returning(|| 0);
        let mut policy = MockDistributionPolicy::new();
        policy.expect_evaluate().returning(|_, _, _| Verdict::Rejected);

        let app = App::new(
            Arc::new(registry),
            Arc::new(provider),
            Arc::new(policy),
            CacheSettings::default(),
        );

        let key = app
            .use_cases
            .distribute
            .query_key(NpcTemplateId::from_raw(0x14), Level::new(6));
        assert!(key.session_id.is_fallback());

        let candidate = Candidate::new(AugmentationId::from_raw(0x99), CandidateIndex::new(0));
        app.use_cases.distribute.execute(&key, &[candidate]).await;

        assert_eq!(app.cache.len().await, 1);
        assert!(
            app.cache
                .query_rejected(&key, candidate.augmentation_id, candidate.candidate_index)
                .await
        );
    }
}
