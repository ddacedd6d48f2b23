use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::*;

/// Dimensions and mine count of a board, validated on construction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub rows: Coord,
    pub columns: Coord,
    pub mines: CellCount,
}

impl BoardConfig {
    pub const fn new_unchecked(rows: Coord, columns: Coord, mines: CellCount) -> Self {
        Self {
            rows,
            columns,
            mines,
        }
    }

    pub fn new(rows: Coord, columns: Coord, mines: CellCount) -> Result<Self> {
        let config = Self::new_unchecked(rows, columns, mines);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.columns == 0 {
            return Err(BoardError::InvalidDimensions);
        }
        let capacity = self.total_cells();
        if self.mines == 0 || self.mines > capacity {
            return Err(BoardError::InvalidMineCount {
                requested: self.mines,
                capacity,
            });
        }
        Ok(())
    }

    pub const fn size(&self) -> Coord2 {
        (self.rows, self.columns)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.rows, self.columns)
    }

    pub const fn beginner() -> Self {
        Self::new_unchecked(9, 9, 10)
    }

    pub const fn intermediate() -> Self {
        Self::new_unchecked(16, 16, 40)
    }

    pub const fn expert() -> Self {
        Self::new_unchecked(16, 30, 99)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::beginner()
    }
}

/// Named board configurations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Beginner,
    Intermediate,
    Expert,
}

impl Preset {
    pub const fn config(self) -> BoardConfig {
        match self {
            Self::Beginner => BoardConfig::beginner(),
            Self::Intermediate => BoardConfig::intermediate(),
            Self::Expert => BoardConfig::expert(),
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::Beginner
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Expert => "expert",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown preset {0:?}, expected beginner, intermediate or expert")]
pub struct UnknownPreset(pub String);

impl FromStr for Preset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "expert" => Ok(Self::Expert),
            _ => Err(UnknownPreset(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for preset in [Preset::Beginner, Preset::Intermediate, Preset::Expert] {
            assert_eq!(preset.config().validate(), Ok(()));
        }
    }

    #[test]
    fn rejects_zero_dimensions() {
        assert_eq!(BoardConfig::new(0, 3, 1), Err(BoardError::InvalidDimensions));
        assert_eq!(BoardConfig::new(3, 0, 1), Err(BoardError::InvalidDimensions));
    }

    #[test]
    fn rejects_mines_outside_capacity() {
        assert_eq!(
            BoardConfig::new(2, 3, 0),
            Err(BoardError::InvalidMineCount {
                requested: 0,
                capacity: 6
            })
        );
        assert_eq!(
            BoardConfig::new(2, 3, 7),
            Err(BoardError::InvalidMineCount {
                requested: 7,
                capacity: 6
            })
        );
        assert!(BoardConfig::new(2, 3, 6).is_ok());
    }

    #[test]
    fn parses_preset_names() {
        assert_eq!("Expert".parse(), Ok(Preset::Expert));
        assert!("nightmare".parse::<Preset>().is_err());
    }
}
