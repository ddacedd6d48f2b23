use core::fmt;
use thiserror::Error;

use crate::{BoardStatus, CellCount, Coord2, GameResult};

/// Why a board refused a play operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InactiveReason {
    Paused,
    Archived,
}

impl fmt::Display for InactiveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Paused => "board is paused, resume it first",
            Self::Archived => "board is archived, no new moves are accepted",
        })
    }
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("Inactive board: {reason}")]
    InactiveBoard { reason: InactiveReason },
    #[error("Cell is flagged, unflag it before revealing")]
    CellFlagged,
    #[error("Cell already revealed")]
    AlreadyRevealed,
    #[error("Cell already revealed, it cannot be flagged")]
    CellAlreadyRevealed,
    #[error("Board already paused")]
    AlreadyPaused,
    #[error("Cannot resume a board that is {current}")]
    CannotResume { current: BoardStatus },
    #[error("Invalid mine count {requested}, must be between 1 and {capacity}")]
    InvalidMineCount {
        requested: CellCount,
        capacity: CellCount,
    },
    #[error("Board dimensions must be positive")]
    InvalidDimensions,
    #[error("Coordinates {coords:?} outside of board {size:?}")]
    OutOfBounds { coords: Coord2, size: Coord2 },
    #[error("Mines have not been placed yet")]
    MinesNotPlaced,
    #[error("Mines were already placed")]
    MinesAlreadyPlaced,
    #[error("Board shape does not match its mine layout")]
    InvalidBoardShape,
    #[error("Board cells, counters or mine layout do not agree")]
    InconsistentBoard,
    #[error("Board status {status} cannot go with result {result}")]
    InvalidLifecycle {
        status: BoardStatus,
        result: GameResult,
    },
}

pub type Result<T> = core::result::Result<T, BoardError>;
