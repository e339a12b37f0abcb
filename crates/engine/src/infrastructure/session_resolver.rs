//! Resolves the session a distribution attempt belongs to.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use leveldist_domain::SessionId;

use crate::infrastructure::ports::SessionProvider;

/// Maps the host's save id onto a [`SessionId`].
///
/// While no save is loaded the host reports `0`. Verdicts made in that state
/// are grouped under a pseudo-session from the fallback range, which stays the
/// same until [`SessionResolver::begin_unloaded_session`] is called.
pub struct SessionResolver {
    provider: Arc<dyn SessionProvider>,
    fallback_generation: AtomicU64,
}

impl SessionResolver {
    pub fn new(provider: Arc<dyn SessionProvider>) -> Self {
        Self {
            provider,
            fallback_generation: AtomicU64::new(0),
        }
    }

    /// Session of the save currently loaded, or the current fallback pseudo-session.
    pub fn current(&self) -> SessionId {
        let raw = self.provider.current_session_id();
        if raw == 0 {
            return self.current_fallback();
        }
        match SessionId::from_save(raw) {
            Ok(session_id) => session_id,
            Err(e) => {
                tracing::warn!(
                    raw_session_id = raw,
                    error = %e,
                    "Host reported an unusable session id, using fallback session"
                );
                self.current_fallback()
            }
        }
    }

    /// Start a new stretch of play without a loaded save (main menu, new game).
    ///
    /// Returns the pseudo-session used from now on.
    pub fn begin_unloaded_session(&self) -> SessionId {
        let generation = self.fallback_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let session_id = SessionId::fallback(generation);
        tracing::debug!(session_id = %session_id, "Started fallback session");
        session_id
    }

    fn current_fallback(&self) -> SessionId {
        SessionId::fallback(self.fallback_generation.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockSessionProvider;

    fn resolver_reporting(raw: u64) -> SessionResolver {
        let mut provider = MockSessionProvider::new();
        provider.expect_current_session_id().returning(move || raw);
        SessionResolver::new(Arc::new(provider))
    }

    #[test]
    fn loaded_save_is_used_directly() {
        let resolver = resolver_reporting(42);
        assert_eq!(resolver.current().raw(), 42);
        assert!(!resolver.current().is_fallback());
    }

    #[test]
    fn no_save_uses_a_stable_fallback() {
        let resolver = resolver_reporting(0);
        let first = resolver.current();
        let second = resolver.current();

        assert!(first.is_fallback());
        assert_ne!(first.raw(), 0);
        assert_eq!(first, second);
    }

    #[test]
    fn new_unloaded_session_gets_a_new_fallback() {
        let resolver = resolver_reporting(0);
        let before = resolver.current();
        let started = resolver.begin_unloaded_session();

        assert_ne!(before, started);
        assert_eq!(resolver.current(), started);
    }

    #[test]
    fn ids_in_the_fallback_range_are_not_trusted() {
        let resolver = resolver_reporting(1 << 63);
        assert_eq!(resolver.current(), SessionId::fallback(0));
    }
}
