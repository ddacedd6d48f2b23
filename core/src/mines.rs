use core::ops::Index;

use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Immutable placement of mines on a board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Result<Self> {
        if mine_mask.is_empty() {
            return Err(BoardError::InvalidDimensions);
        }
        let mine_count = count_mines(&mine_mask);
        Ok(Self {
            mine_mask,
            mine_count,
        })
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(BoardError::InvalidDimensions);
        }
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if !in_bounds(coords, size) {
                return Err(BoardError::OutOfBounds { coords, size });
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Self::from_mine_mask(mine_mask)
    }

    /// Picks exactly `count` distinct cells uniformly at random, sampling without replacement.
    pub fn random<R: Rng + ?Sized>(size: Coord2, count: CellCount, rng: &mut R) -> Result<Self> {
        let capacity = mult(size.0, size.1);
        if size.0 == 0 || size.1 == 0 {
            return Err(BoardError::InvalidDimensions);
        }
        if count == 0 || count > capacity {
            return Err(BoardError::InvalidMineCount {
                requested: count,
                capacity,
            });
        }

        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());
        let columns = usize::from(size.1);
        for index in rand::seq::index::sample(rng, capacity as usize, count as usize) {
            mine_mask[[index / columns, index % columns]] = true;
        }

        log::debug!(
            "Generated {} mines on a {}x{} board",
            count,
            size.0,
            size.1
        );
        Ok(Self {
            mine_mask,
            mine_count: count,
        })
    }

    pub fn size(&self) -> Coord2 {
        let (rows, columns) = self.mine_mask.dim();
        (
            rows.try_into().unwrap_or(Coord::MAX),
            columns.try_into().unwrap_or(Coord::MAX),
        )
    }

    pub fn total_cells(&self) -> CellCount {
        self.mine_mask.len().try_into().unwrap_or(CellCount::MAX)
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mine_count)
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    /// All mine coordinates in row-major order.
    pub fn iter_mines(&self) -> impl Iterator<Item = Coord2> + '_ {
        iter_coords(self.size()).filter(|&coords| self[coords])
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        // at most 8 neighbors, the cast cannot truncate
        self.iter_neighbors(coords).filter(|&pos| self[pos]).count() as u8
    }

    pub(crate) fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.mine_mask.iter_neighbors(coords)
    }

    /// Checks a deserialized layout: non-empty mask and a stored count matching it.
    pub fn validate(&self) -> Result<()> {
        if self.mine_mask.is_empty() {
            return Err(BoardError::InvalidDimensions);
        }
        if count_mines(&self.mine_mask) != self.mine_count {
            return Err(BoardError::InconsistentBoard);
        }
        Ok(())
    }
}

fn count_mines(mine_mask: &Array2<bool>) -> CellCount {
    mine_mask
        .iter()
        .filter(|&&is_mine| is_mine)
        .count()
        .try_into()
        .unwrap_or(CellCount::MAX)
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.mine_mask[coords.to_nd_index()]
    }
}
