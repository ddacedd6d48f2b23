use serde::{Deserialize, Serialize};

/// Player-visible state of a single cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellMarker {
    Hidden,
    Flagged,
    Exploded,
    // these are only used to show the result after the game ends:
    WrongFlag,
    MineUnflagged,
    Revealed(u8),
}

impl CellMarker {
    /// Hidden or flagged, the only markers a player can still change.
    pub const fn is_unrevealed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged)
    }

    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed(_))
    }

    /// Display symbol used by the rendered grid view.
    pub const fn symbol(self) -> char {
        match self {
            Self::Hidden => '#',
            Self::Flagged => 'F',
            Self::Exploded => 'X',
            Self::WrongFlag => '!',
            Self::MineUnflagged => '*',
            Self::Revealed(0) => '.',
            Self::Revealed(count) if count <= 8 => (b'0' + count) as char,
            Self::Revealed(_) => '?',
        }
    }
}

impl Default for CellMarker {
    fn default() -> Self {
        Self::Hidden
    }
}
