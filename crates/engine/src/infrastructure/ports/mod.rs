//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Entity lookup (host form registry)
//! - Save identification (host session)
//! - Distribution decisions (chance rolls and conditions live in the host plugin)

mod external;
pub mod types;

// =============================================================================
// Host Ports
// =============================================================================
pub use external::{DistributionPolicy, EntityRegistry, SessionProvider};

// =============================================================================
// Types from types module (re-export for visibility)
// =============================================================================
pub use types::{Candidate, EntityHandle, EntityKind, Verdict};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use external::{MockDistributionPolicy, MockEntityRegistry, MockSessionProvider};
