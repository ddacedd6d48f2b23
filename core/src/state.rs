use core::fmt;
use serde::{Deserialize, Serialize};

/// Valid transitions:
/// - Active -> Paused
/// - Paused -> Active
/// - Active -> Archived
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardStatus {
    /// Accepting moves, play time is running
    Active,
    /// Not accepting moves, play time is frozen
    Paused,
    /// Game ended, terminal
    Archived,
}

impl BoardStatus {
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    pub const fn is_archived(self) -> bool {
        matches!(self, Self::Archived)
    }
}

impl Default for BoardStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl fmt::Display for BoardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Archived => "archived",
        })
    }
}

/// Final result, only set once the board is archived.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    None,
    Win,
    Lost,
}

impl Default for GameResult {
    fn default() -> Self {
        Self::None
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Win => "win",
            Self::Lost => "lost",
        })
    }
}
