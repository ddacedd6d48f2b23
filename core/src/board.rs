use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};
use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::clock::interval;
use crate::*;

/// A single game session: mine layout, player-visible cells, lifecycle and play time.
///
/// Every mutating operation either commits its whole transition or returns an error
/// and leaves the board untouched. Callers sharing a board across threads must
/// serialize access themselves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<CellMarker>,
    mine_layout: Option<MineLayout>,
    revealed_count: CellCount,
    flagged_count: CellCount,
    status: BoardStatus,
    result: GameResult,
    created_at: DateTime<Utc>,
    resumed_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    elapsed: Duration,
    triggered_mine: Option<Coord2>,
}

impl Board {
    /// Creates an active, all-hidden board without mines.
    ///
    /// Dimensions are clamped to at least one row and one column.
    pub fn new<C: Clock + ?Sized>((rows, columns): Coord2, clock: &C) -> Self {
        if rows == 0 || columns == 0 {
            log::warn!(
                "Board dimensions {}x{} clamped to at least 1x1",
                rows,
                columns
            );
        }
        let size = (rows.max(1), columns.max(1));
        let created_at = clock.now();
        log::debug!("New {}x{} board at {}", size.0, size.1, created_at);

        Self {
            cells: Array2::default(size.to_nd_index()),
            mine_layout: None,
            revealed_count: 0,
            flagged_count: 0,
            status: BoardStatus::Active,
            result: GameResult::None,
            created_at,
            resumed_at: None,
            ended_at: None,
            elapsed: Duration::ZERO,
            triggered_mine: None,
        }
    }

    /// Creates a board and places its mines before handing it out.
    pub fn from_config<R, C>(config: BoardConfig, rng: &mut R, clock: &C) -> Result<Self>
    where
        R: Rng + ?Sized,
        C: Clock + ?Sized,
    {
        config.validate()?;
        let mut board = Self::new(config.size(), clock);
        board.generate_mines(config.mines, rng)?;
        Ok(board)
    }

    /// Creates a board around an existing mine layout.
    pub fn with_mine_layout<C: Clock + ?Sized>(mine_layout: MineLayout, clock: &C) -> Result<Self> {
        mine_layout.validate()?;
        let mut board = Self::new(mine_layout.size(), clock);
        board.mine_layout = Some(mine_layout);
        Ok(board)
    }

    /// Places `count` mines uniformly at random. Only allowed once per board.
    pub fn generate_mines<R: Rng + ?Sized>(&mut self, count: CellCount, rng: &mut R) -> Result<()> {
        if self.mine_layout.is_some() {
            return Err(BoardError::MinesAlreadyPlaced);
        }
        self.mine_layout = Some(MineLayout::random(self.size(), count, rng)?);
        Ok(())
    }

    pub fn size(&self) -> Coord2 {
        let (rows, columns) = self.cells.dim();
        (
            rows.try_into().unwrap_or(Coord::MAX),
            columns.try_into().unwrap_or(Coord::MAX),
        )
    }

    pub fn rows(&self) -> Coord {
        self.size().0
    }

    pub fn columns(&self) -> Coord {
        self.size().1
    }

    pub fn status(&self) -> BoardStatus {
        self.status
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn is_archived(&self) -> bool {
        self.status.is_archived()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn resumed_at(&self) -> Option<DateTime<Utc>> {
        self.resumed_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Play time accumulated up to the last pause or the end of the game.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Play time including the currently running interval, if the board is active.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> Duration {
        if self.status.is_active() {
            self.elapsed + interval(self.active_since(), now)
        } else {
            self.elapsed
        }
    }

    pub fn has_mines(&self) -> bool {
        self.mine_layout.is_some()
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_layout
            .as_ref()
            .map_or(0, |layout| layout.mine_count())
    }

    /// How many mines have not been flagged yet
    pub fn mines_left(&self) -> i64 {
        i64::from(self.mine_count()) - i64::from(self.flagged_count)
    }

    pub fn flag_count(&self) -> CellCount {
        self.flagged_count
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<CellMarker> {
        let coords = self.validate_coords(coords)?;
        Ok(self.cells[coords.to_nd_index()])
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if in_bounds(coords, size) {
            Ok(coords)
        } else {
            Err(BoardError::OutOfBounds { coords, size })
        }
    }

    /// Read-only symbol grid, safe to show at any point of the game.
    pub fn render(&self) -> RenderedBoard {
        RenderedBoard::new(self.cells.map(|cell| cell.symbol()))
    }

    /// Checks that a board restored from storage is internally consistent.
    ///
    /// Anything the engine could not have produced is rejected, so later moves
    /// never index outside the grid or underflow a counter.
    pub fn validate(&self) -> Result<()> {
        if self.cells.is_empty() {
            return Err(BoardError::InvalidDimensions);
        }
        self.validate_lifecycle()?;

        let Some(layout) = &self.mine_layout else {
            // nothing can be played before the mines exist
            let untouched = self.cells.iter().all(|&cell| cell == CellMarker::Hidden);
            if !untouched || self.revealed_count != 0 || self.flagged_count != 0 {
                return Err(BoardError::InconsistentBoard);
            }
            return match self.status {
                BoardStatus::Archived => Err(BoardError::InvalidLifecycle {
                    status: self.status,
                    result: self.result,
                }),
                _ => Ok(()),
            };
        };
        layout.validate()?;
        if layout.size() != self.size() {
            return Err(BoardError::InvalidBoardShape);
        }

        let ended = self.status.is_archived();
        let lost = self.result == GameResult::Lost;
        let (mut revealed, mut flagged, mut exploded) = (0, 0, 0);
        for coords in iter_coords(self.size()) {
            let is_mine = layout.contains_mine(coords);
            let consistent = match self.cells[coords.to_nd_index()] {
                CellMarker::Hidden => true,
                CellMarker::Flagged => {
                    flagged += 1;
                    true
                }
                CellMarker::Revealed(count) => {
                    revealed += 1;
                    !is_mine && count == layout.adjacent_mine_count(coords)
                }
                CellMarker::Exploded => {
                    exploded += 1;
                    is_mine && lost && self.triggered_mine == Some(coords)
                }
                CellMarker::WrongFlag => {
                    flagged += 1;
                    !is_mine && lost
                }
                CellMarker::MineUnflagged => is_mine && ended,
            };
            if !consistent {
                return Err(BoardError::InconsistentBoard);
            }
        }

        if revealed != self.revealed_count
            || flagged != self.flagged_count
            || exploded != CellCount::from(lost)
            || self.triggered_mine.is_some() != lost
        {
            return Err(BoardError::InconsistentBoard);
        }
        if self.result == GameResult::Win && revealed != layout.safe_cell_count() {
            return Err(BoardError::InconsistentBoard);
        }
        Ok(())
    }

    /// Status, result and end time must describe a state the game can reach.
    fn validate_lifecycle(&self) -> Result<()> {
        let ended = self.status.is_archived();
        if ended == (self.result == GameResult::None) || ended != self.ended_at.is_some() {
            return Err(BoardError::InvalidLifecycle {
                status: self.status,
                result: self.result,
            });
        }
        Ok(())
    }

    pub fn reveal<C: Clock + ?Sized>(&mut self, coords: Coord2, clock: &C) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;
        self.check_active()?;
        let layout = self.mine_layout.as_ref().ok_or(BoardError::MinesNotPlaced)?;

        match self.cells[coords.to_nd_index()] {
            CellMarker::Hidden => {}
            CellMarker::Flagged => return Err(BoardError::CellFlagged),
            _ => return Err(BoardError::AlreadyRevealed),
        }

        if layout.contains_mine(coords) {
            log::debug!("Mine hit at {:?}", coords);
            self.cells[coords.to_nd_index()] = CellMarker::Exploded;
            self.triggered_mine = Some(coords);
            self.end_game(GameResult::Lost, clock.now());
            return Ok(RevealOutcome::HitMine);
        }

        let opened = flood_reveal(&mut self.cells, layout, coords);
        self.revealed_count += opened;
        log::debug!("Revealed {} cells from {:?}", opened, coords);

        if self.revealed_count == layout.safe_cell_count() {
            self.end_game(GameResult::Win, clock.now());
            Ok(RevealOutcome::Won)
        } else {
            Ok(RevealOutcome::Revealed)
        }
    }

    /// Toggles a flag on a hidden cell.
    pub fn flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        let coords = self.validate_coords(coords)?;
        self.check_active()?;
        if self.mine_layout.is_none() {
            return Err(BoardError::MinesNotPlaced);
        }

        let cell = &mut self.cells[coords.to_nd_index()];
        let outcome = match *cell {
            CellMarker::Hidden => {
                *cell = CellMarker::Flagged;
                self.flagged_count += 1;
                FlagOutcome::Flagged
            }
            CellMarker::Flagged => {
                *cell = CellMarker::Hidden;
                self.flagged_count -= 1;
                FlagOutcome::Unflagged
            }
            _ => return Err(BoardError::CellAlreadyRevealed),
        };
        log::debug!("{:?} at {:?}", outcome, coords);
        Ok(outcome)
    }

    pub fn pause<C: Clock + ?Sized>(&mut self, clock: &C) -> Result<()> {
        match self.status {
            BoardStatus::Active => {
                self.accumulate_elapsed(clock.now());
                self.status = BoardStatus::Paused;
                log::debug!("Paused after {:?} of play", self.elapsed);
                Ok(())
            }
            BoardStatus::Paused => Err(BoardError::AlreadyPaused),
            BoardStatus::Archived => Err(BoardError::InactiveBoard {
                reason: InactiveReason::Archived,
            }),
        }
    }

    pub fn resume<C: Clock + ?Sized>(&mut self, clock: &C) -> Result<()> {
        match self.status {
            BoardStatus::Paused => {
                let now = clock.now();
                self.resumed_at = Some(now);
                self.status = BoardStatus::Active;
                log::debug!("Resumed at {}", now);
                Ok(())
            }
            current => Err(BoardError::CannotResume { current }),
        }
    }

    fn check_active(&self) -> Result<()> {
        match self.status {
            BoardStatus::Active => Ok(()),
            BoardStatus::Paused => Err(BoardError::InactiveBoard {
                reason: InactiveReason::Paused,
            }),
            BoardStatus::Archived => Err(BoardError::InactiveBoard {
                reason: InactiveReason::Archived,
            }),
        }
    }

    /// Start of the active interval that is still open.
    fn active_since(&self) -> DateTime<Utc> {
        self.resumed_at.unwrap_or(self.created_at)
    }

    fn accumulate_elapsed(&mut self, now: DateTime<Utc>) {
        self.elapsed += interval(self.active_since(), now);
    }

    fn end_game(&mut self, result: GameResult, now: DateTime<Utc>) {
        self.accumulate_elapsed(now);
        self.status = BoardStatus::Archived;
        self.result = result;
        self.ended_at = Some(now);
        log::debug!("Game ended with {} at {} after {:?}", result, now, self.elapsed);
        self.reveal_mines();
    }

    /// Shows unflagged mines and wrong flags once the game has ended.
    fn reveal_mines(&mut self) {
        let Some(layout) = &self.mine_layout else {
            return;
        };

        for coords in iter_coords(layout.size()) {
            let cell = &mut self.cells[coords.to_nd_index()];
            match (*cell, layout.contains_mine(coords)) {
                (CellMarker::Hidden, true) => *cell = CellMarker::MineUnflagged,
                (CellMarker::Flagged, false) => *cell = CellMarker::WrongFlag,
                _ => {}
            }
        }
    }
}

/// Reveals `start` and, through zero-count cells, every connected hidden cell.
///
/// Flagged cells are never opened. Returns how many cells were revealed.
fn flood_reveal(cells: &mut Array2<CellMarker>, layout: &MineLayout, start: Coord2) -> CellCount {
    let mut opened = 0;
    let mut to_visit = VecDeque::from([start]);

    while let Some(coords) = to_visit.pop_front() {
        // queued more than once, or flagged
        if cells[coords.to_nd_index()] != CellMarker::Hidden {
            continue;
        }

        let count = layout.adjacent_mine_count(coords);
        cells[coords.to_nd_index()] = CellMarker::Revealed(count);
        opened += 1;
        log::trace!("Flood opened cell at {:?}, mine count: {}", coords, count);

        if count == 0 {
            to_visit.extend(
                layout
                    .iter_neighbors(coords)
                    .filter(|&pos| cells[pos.to_nd_index()] == CellMarker::Hidden),
            );
        }
    }

    opened
}
