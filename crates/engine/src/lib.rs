//! Leveldist Engine library.
//!
//! Memoizes augmentation distribution for level-scaled NPCs so that every
//! instance of the same NPC receives the same augmentations within a session.
//!
//! ## Structure
//!
//! - `infrastructure/` - The verdict cache, host ports, session resolution, settings
//! - `use_cases/` - Distribution orchestration on top of the cache
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
pub use infrastructure::cache::{CacheEntry, CacheStats, LevelMultCache};
pub use infrastructure::settings::{CacheSettings, SettingsError};
