//! Minesweeper board engine.
//!
//! A [`Board`] owns its mine layout, the player-visible [`CellMarker`] grid, the
//! active/paused/archived lifecycle and play-time accounting. Time and randomness
//! are injected through [`Clock`] and [`rand::Rng`].

pub use board::*;
pub use cell::*;
pub use clock::*;
pub use command::*;
pub use config::*;
pub use error::*;
pub use mines::*;
pub use render::*;
pub use snapshot::*;
pub use state::*;
pub use types::*;

mod board;
mod cell;
mod clock;
mod command;
mod config;
mod error;
mod mines;
mod render;
mod snapshot;
mod state;
mod types;

/// Outcome of revealing a cell
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// One or more safe cells were opened, the game goes on
    Revealed,
    /// A mine was opened, the game is lost
    HitMine,
    /// The last safe cell was opened, the game is won
    Won,
}

impl RevealOutcome {
    pub const fn ends_game(self) -> bool {
        match self {
            Self::Revealed => false,
            Self::HitMine => true,
            Self::Won => true,
        }
    }
}

/// Outcome of toggling a flag
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagOutcome {
    Flagged,
    Unflagged,
}
