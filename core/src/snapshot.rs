use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::*;

/// Read-only view of a board for display or transport; never exposes hidden mines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub rows: Coord,
    pub columns: Coord,
    pub mines: CellCount,
    pub mines_left: i64,
    pub status: BoardStatus,
    pub result: GameResult,
    pub created_at: DateTime<Utc>,
    pub resumed_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub elapsed_secs: u64,
    pub grid: Vec<String>,
}

impl BoardSnapshot {
    /// Captures `board` as seen at `now`, counting the running interval of an active board.
    pub fn capture(board: &Board, now: DateTime<Utc>) -> Self {
        Self {
            rows: board.rows(),
            columns: board.columns(),
            mines: board.mine_count(),
            mines_left: board.mines_left(),
            status: board.status(),
            result: board.result(),
            created_at: board.created_at(),
            resumed_at: board.resumed_at(),
            ended_at: board.ended_at(),
            elapsed_secs: board.elapsed_at(now).as_secs(),
            grid: board.render().to_rows(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn capture_reflects_board_state() {
        let clock = ManualClock::default();
        let layout = MineLayout::from_mine_coords((2, 2), &[(1, 1)]).unwrap();
        let mut board = Board::with_mine_layout(layout, &clock).unwrap();
        board.flag((1, 1)).unwrap();
        clock.advance(Duration::from_secs(12));

        let snapshot = BoardSnapshot::capture(&board, clock.now());

        assert_eq!((snapshot.rows, snapshot.columns), (2, 2));
        assert_eq!(snapshot.mines, 1);
        assert_eq!(snapshot.mines_left, 0);
        assert_eq!(snapshot.status, BoardStatus::Active);
        assert_eq!(snapshot.result, GameResult::None);
        assert_eq!(snapshot.elapsed_secs, 12);
        assert_eq!(snapshot.grid, vec!["##", "#F"]);
    }
}
