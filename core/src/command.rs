use serde::{Deserialize, Serialize};

use crate::*;

/// A single player move, as issued by whatever layer sits in front of the engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Command {
    Reveal { row: Coord, col: Coord },
    Flag { row: Coord, col: Coord },
    Pause,
    Resume,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    Reveal(RevealOutcome),
    Flag(FlagOutcome),
    Paused,
    Resumed,
}

impl Board {
    pub fn apply<C: Clock + ?Sized>(&mut self, command: Command, clock: &C) -> Result<CommandOutcome> {
        log::debug!("Applying {:?}", command);
        Ok(match command {
            Command::Reveal { row, col } => CommandOutcome::Reveal(self.reveal((row, col), clock)?),
            Command::Flag { row, col } => CommandOutcome::Flag(self.flag((row, col))?),
            Command::Pause => {
                self.pause(clock)?;
                CommandOutcome::Paused
            }
            Command::Resume => {
                self.resume(clock)?;
                CommandOutcome::Resumed
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_to_board_operations() {
        let clock = ManualClock::default();
        let layout = MineLayout::from_mine_coords((2, 2), &[(0, 0)]).unwrap();
        let mut board = Board::with_mine_layout(layout, &clock).unwrap();

        assert_eq!(
            board.apply(Command::Flag { row: 0, col: 0 }, &clock),
            Ok(CommandOutcome::Flag(FlagOutcome::Flagged))
        );
        assert_eq!(
            board.apply(Command::Pause, &clock),
            Ok(CommandOutcome::Paused)
        );
        assert_eq!(
            board.apply(Command::Reveal { row: 1, col: 1 }, &clock),
            Err(BoardError::InactiveBoard {
                reason: InactiveReason::Paused
            })
        );
        assert_eq!(
            board.apply(Command::Resume, &clock),
            Ok(CommandOutcome::Resumed)
        );
        assert_eq!(
            board.apply(Command::Reveal { row: 1, col: 1 }, &clock),
            Ok(CommandOutcome::Reveal(RevealOutcome::Revealed))
        );
    }
}
