use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Parse a form identifier written as `0x0001A2B3`, `0001A2B3h` or plain decimal.
fn parse_form_id(raw: &str) -> Result<u32, DomainError> {
    let trimmed = raw.trim();
    let parsed = if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16)
    } else if let Some(hex) = trimmed
        .strip_suffix('h')
        .or_else(|| trimmed.strip_suffix('H'))
    {
        u32::from_str_radix(hex, 16)
    } else {
        trimmed.parse::<u32>()
    };
    parsed.map_err(|_| DomainError::invalid_id(format!("not a form id: {:?}", raw)))
}

macro_rules! define_form_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{:08X}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_form_id(s).map(Self)
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

// Host form identifiers
define_form_id!(NpcTemplateId);
define_form_id!(AugmentationId);

/// Bit marking a session id as a process-local fallback rather than a save id.
const FALLBACK_SESSION_BIT: u64 = 1 << 63;

/// Identifier of one loaded player save.
///
/// `0` is reserved by the host for "no save loaded" and is never a valid
/// `SessionId`. Pseudo-sessions handed out while no save is loaded live in the
/// upper half of the range (see [`SessionId::fallback`]) so they cannot collide
/// with a genuine save id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(u64);

impl SessionId {
    /// Wrap a save id reported by the host.
    ///
    /// Rejects the reserved value `0` and anything inside the fallback range.
    pub fn from_save(raw: u64) -> Result<Self, DomainError> {
        if raw == 0 {
            return Err(DomainError::validation(
                "session id 0 is reserved for \"no save loaded\"",
            ));
        }
        if raw & FALLBACK_SESSION_BIT != 0 {
            return Err(DomainError::validation(format!(
                "session id {:#x} overlaps the fallback range",
                raw
            )));
        }
        Ok(Self(raw))
    }

    /// Pseudo-session id for the `generation`-th stretch of play with no save loaded.
    pub fn fallback(generation: u64) -> Self {
        Self(FALLBACK_SESSION_BIT | (generation & !FALLBACK_SESSION_BIT))
    }

    pub fn is_fallback(self) -> bool {
        self.0 & FALLBACK_SESSION_BIT != 0
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_fallback() {
            write!(f, "fallback#{}", self.0 & !FALLBACK_SESSION_BIT)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Level of an NPC at the moment it was evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Level(u16);

impl Level {
    pub const MIN: Self = Self(u16::MIN);
    pub const MAX: Self = Self(u16::MAX);

    pub const fn new(level: u16) -> Self {
        Self(level)
    }

    pub const fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for Level {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

/// Position of one form within an augmentation's candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateIndex(u32);

impl CandidateIndex {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CandidateIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CandidateIndex {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
