//! Battle choices as sent with `/choose`

use crate::ParseError;
use std::fmt;
use std::str::FromStr;

/// A decision for our active pokemon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Choice {
    /// Use the move in slot 1-4
    Move(u8),
    /// Switch to the team member at position 1-6
    Switch(u8),
}

impl Choice {
    pub fn is_move(&self) -> bool {
        matches!(self, Choice::Move(_))
    }

    pub fn is_switch(&self) -> bool {
        matches!(self, Choice::Switch(_))
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Move(slot) => write!(f, "move {slot}"),
            Choice::Switch(slot) => write!(f, "switch {slot}"),
        }
    }
}

impl FromStr for Choice {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, slot) = s
            .trim()
            .split_once(' ')
            .ok_or_else(|| ParseError::InvalidFormat(s.to_string()))?;
        let slot: u8 = slot
            .parse()
            .map_err(|_| ParseError::InvalidFormat(s.to_string()))?;

        match kind {
            "move" if (1..=4).contains(&slot) => Ok(Choice::Move(slot)),
            "switch" if (1..=6).contains(&slot) => Ok(Choice::Switch(slot)),
            _ => Err(ParseError::InvalidFormat(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_strings() {
        assert_eq!(Choice::Move(1).to_string(), "move 1");
        assert_eq!(Choice::Switch(6).to_string(), "switch 6");
        assert_eq!("switch 2".parse::<Choice>().unwrap(), Choice::Switch(2));
        assert!("move 5".parse::<Choice>().is_err());
        assert!("pass".parse::<Choice>().is_err());
    }
}
