use core::fmt;
use core::ops::Index;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Grid of display symbols, one per cell, in row-major order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedBoard {
    symbols: Array2<char>,
}

impl RenderedBoard {
    pub(crate) fn new(symbols: Array2<char>) -> Self {
        Self { symbols }
    }

    pub fn size(&self) -> Coord2 {
        let (rows, columns) = self.symbols.dim();
        (
            rows.try_into().unwrap_or(Coord::MAX),
            columns.try_into().unwrap_or(Coord::MAX),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &char> {
        self.symbols.iter()
    }

    /// One string per board row.
    pub fn to_rows(&self) -> Vec<String> {
        self.symbols
            .rows()
            .into_iter()
            .map(|row| row.iter().collect())
            .collect()
    }
}

impl Index<Coord2> for RenderedBoard {
    type Output = char;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.symbols[coords.to_nd_index()]
    }
}

impl fmt::Display for RenderedBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.symbols.rows() {
            let mut first = true;
            for symbol in row {
                if !first {
                    f.write_str(" ")?;
                }
                write!(f, "{}", symbol)?;
                first = false;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
