use serde::de::Error;
use serde::de::{Deserialize, Deserializer, Visitor};
use serde::ser::{Serialize, Serializer};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use anyhow::anyhow;

use crate::NUM_CELLS;

/// Places the mover's mark on a cell, numbered 0-8 left to right, top to bottom.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Action {
    Place(u8),
}

impl Action {
    pub fn cell(&self) -> usize {
        let Action::Place(cell) = self;
        *cell as usize
    }
}

impl FromStr for Action {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cell: u8 = s.trim().parse()?;

        if cell as usize >= NUM_CELLS {
            return Err(anyhow!("Cell number must be between 0 and 8"));
        }

        Ok(Action::Place(cell))
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let Action::Place(cell) = self;
        write!(f, "{}", cell)
    }
}

impl Serialize for Action {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let Action::Place(cell) = self;
        serializer.serialize_u8(*cell)
    }
}

struct ActionVisitor {}

impl<'de> Visitor<'de> for ActionVisitor {
    type Value = Action;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(
            "Expecting an integer from 0-8 that represents the cell that was marked.",
        )
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: Error,
    {
        if v as usize >= NUM_CELLS {
            return Err(E::custom(format!("cell {} is off the board", v)));
        }

        Ok(Action::Place(v as u8))
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_u8(ActionVisitor {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_from_str() {
        assert_eq!("4".parse::<Action>().unwrap(), Action::Place(4));
        assert_eq!(" 8 ".parse::<Action>().unwrap(), Action::Place(8));
    }

    #[test]
    fn test_action_from_str_off_board() {
        assert!("9".parse::<Action>().is_err());
        assert!("x".parse::<Action>().is_err());
    }

    #[test]
    fn test_action_display() {
        assert_eq!(Action::Place(3).to_string(), "3");
    }
}
