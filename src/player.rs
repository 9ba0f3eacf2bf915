//! Players, seats and the moves they make.

use std::{
    fmt::{Debug, Display},
    ops::Deref,
    str::FromStr,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One of the two player implementations the game program understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "lowercase")
)]
pub enum PlayerKind {
    Machine,
    Random,
}

impl PlayerKind {
    /// The name the game program expects on its command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerKind::Machine => "machine",
            PlayerKind::Random => "random",
        }
    }
}

impl FromStr for PlayerKind {
    type Err = ConfigError;

    /// Parses a single-letter selector, `m` or `r`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use netbench::PlayerKind;
    ///
    /// assert_eq!("m".parse::<PlayerKind>()?, PlayerKind::Machine);
    /// assert_eq!("r".parse::<PlayerKind>()?, PlayerKind::Random);
    /// assert!("x".parse::<PlayerKind>().is_err());
    /// #
    /// # Ok::<_, netbench::ConfigError>(())
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(PlayerKind::Machine),
            "r" => Ok(PlayerKind::Random),
            other => Err(ConfigError::InvalidSelector(other.to_string())),
        }
    }
}

impl Display for PlayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which side of the board a player sits on, in command line order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub enum Seat {
    Player1,
    Player2,
}

impl Seat {
    /// The 1-based number used in reports.
    pub fn number(&self) -> usize {
        match self {
            Seat::Player1 => 1,
            Seat::Player2 => 2,
        }
    }
}

/// The two players of every game in a benchmark.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Matchup {
    pub player1: PlayerKind,
    pub player2: PlayerKind,
}

impl Matchup {
    pub fn new(player1: PlayerKind, player2: PlayerKind) -> Self {
        Matchup { player1, player2 }
    }

    /// Gets the kind of player sitting in `seat`.
    pub fn kind(&self, seat: Seat) -> PlayerKind {
        match seat {
            Seat::Player1 => self.player1,
            Seat::Player2 => self.player2,
        }
    }

    /// Gets the report label for `seat`, e.g. `*Player 1* (machine)`.
    pub fn label(&self, seat: Seat) -> String {
        format!("*Player {}* ({})", seat.number(), self.kind(seat))
    }
}

impl Display for Matchup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} vs {}", self.player1, self.player2)
    }
}

/// A single move token as printed by the game program, brackets included.
///
/// Two moves are the same move exactly when their text is identical.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct Move(String);

impl Move {
    pub fn new(token: impl Into<String>) -> Self {
        Move(token.into())
    }
}

impl Deref for Move {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Debug for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Move({})", self.0)
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
