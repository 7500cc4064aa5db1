//! Dice rolling for weapon damage and percentile checks.
//!
//! Weapon damage is written in `NdM+K` notation: `N` dice of `M` sides plus a
//! flat bonus `K` (which may be negative or omitted).

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for damage notation parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiceError {
    #[error("Invalid dice notation: {0}")]
    InvalidNotation(String),
    #[error("Invalid die size: {0}")]
    InvalidDieSize(u32),
    #[error("No dice specified")]
    NoDice,
}

/// A damage formula such as `2d8+3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DamageDice {
    pub count: u32,
    pub sides: u32,
    pub bonus: i32,
}

impl DamageDice {
    pub const fn new(count: u32, sides: u32, bonus: i32) -> Self {
        Self {
            count,
            sides,
            bonus,
        }
    }

    /// Unarmed damage: a single four-sided die.
    pub const fn unarmed() -> Self {
        Self::new(1, 4, 0)
    }

    /// Parse a damage notation string.
    pub fn parse(notation: &str) -> Result<Self, DiceError> {
        let cleaned: String = notation
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if cleaned.is_empty() {
            return Err(DiceError::NoDice);
        }

        let d_pos = cleaned
            .find('d')
            .ok_or_else(|| DiceError::InvalidNotation(notation.to_string()))?;
        let count_str = &cleaned[..d_pos];
        let rest = &cleaned[d_pos + 1..];

        let count: u32 = if count_str.is_empty() {
            1
        } else {
            count_str
                .parse()
                .map_err(|_| DiceError::InvalidNotation(notation.to_string()))?
        };
        if count == 0 {
            return Err(DiceError::NoDice);
        }

        let (sides_str, bonus) = match rest.find(['+', '-']) {
            Some(pos) => {
                let bonus: i32 = rest[pos..]
                    .parse()
                    .map_err(|_| DiceError::InvalidNotation(notation.to_string()))?;
                (&rest[..pos], bonus)
            }
            None => (rest, 0),
        };

        let sides: u32 = sides_str
            .parse()
            .map_err(|_| DiceError::InvalidNotation(notation.to_string()))?;
        if sides < 2 {
            return Err(DiceError::InvalidDieSize(sides));
        }

        Ok(Self::new(count, sides, bonus))
    }

    /// Smallest possible total.
    pub fn min_total(&self) -> i32 {
        self.count as i32 + self.bonus
    }

    /// Largest possible total.
    pub fn max_total(&self) -> i32 {
        (self.count * self.sides) as i32 + self.bonus
    }

    /// Roll using the given RNG.
    pub fn roll_with_rng<R: Rng>(&self, rng: &mut R) -> DamageRoll {
        let rolls: Vec<u32> = (0..self.count)
            .map(|_| rng.gen_range(1..=self.sides))
            .collect();
        let total = rolls.iter().sum::<u32>() as i32 + self.bonus;
        DamageRoll {
            dice: *self,
            rolls,
            total,
        }
    }
}

impl fmt::Display for DamageDice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.bonus {
            0 => Ok(()),
            b if b > 0 => write!(f, "+{b}"),
            b => write!(f, "{b}"),
        }
    }
}

impl FromStr for DamageDice {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The outcome of rolling a [`DamageDice`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRoll {
    pub dice: DamageDice,
    pub rolls: Vec<u32>,
    pub total: i32,
}

/// Roll a percentile die (1-100).
pub fn roll_percentile<R: Rng>(rng: &mut R) -> i32 {
    rng.gen_range(1..=100)
}
