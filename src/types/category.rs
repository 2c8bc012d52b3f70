//! Content categories the gateway knows how to generate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::GatewayError;

/// A kind of game content.
///
/// Serializes as the lowercase name (`"npc"`, `"quest"`, ...), which is also
/// the prefix of every cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    Npc,
    Quest,
    Monster,
    Item,
    Room,
}

impl ContentCategory {
    /// Every supported category, in declaration order.
    pub const ALL: [ContentCategory; 5] = [
        Self::Npc,
        Self::Quest,
        Self::Monster,
        Self::Item,
        Self::Room,
    ];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Npc => "npc",
            Self::Quest => "quest",
            Self::Monster => "monster",
            Self::Item => "item",
            Self::Room => "room",
        }
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentCategory {
    type Err = GatewayError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "npc" => Ok(Self::Npc),
            "quest" => Ok(Self::Quest),
            "monster" => Ok(Self::Monster),
            "item" => Ok(Self::Item),
            "room" => Ok(Self::Room),
            _ => Err(GatewayError::UnknownCategory(s.to_string())),
        }
    }
}
