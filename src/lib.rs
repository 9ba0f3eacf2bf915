#![doc = include_str!("../README.md")]

// Required to rename serde
#[cfg(feature = "serde")]
extern crate serde_crate as serde;

use thiserror::Error;

pub mod player;
pub use player::{Matchup, Move, PlayerKind, Seat};

pub mod transcript;
pub use transcript::{RunResult, Transcript, TranscriptFormat};

pub mod game;
pub use game::{ExternalGame, Game};

pub mod harness;
pub use harness::Harness;

pub mod perf;
pub use perf::{Stats, Summary};

#[cfg(test)]
mod mock;

/// A specialized [`Result`](std::result::Result) for `netbench` operations.
pub type Result<T, E = BenchError> = std::result::Result<T, E>;

/// The errors that `netbench` can produce.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("invalid configuration")]
    Config {
        #[from]
        kind: ConfigError,
    },

    #[error("the game program could not be run")]
    Launch {
        #[from]
        kind: LaunchError,
    },

    #[error("the game transcript could not be parsed")]
    Transcript {
        #[from]
        kind: TranscriptError,
    },

    #[error("could not build the worker pool")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("general IO error")]
    Printing(#[from] std::io::Error),

    #[cfg(feature = "serde")]
    #[error("trouble serializing the summary")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A player selector was something other than `m` or `r`.
    #[error("\"{0}\" is not a player, must supply 'm' (machine) or 'r' (random)")]
    InvalidSelector(String),

    #[error("the number of iterations must be positive")]
    NoIterations,

    #[error("the number of threads must be positive")]
    NoThreads,
}

#[derive(Debug, Error)]
pub enum LaunchError {
    /// The program is missing or could not be executed.
    #[error("could not start \"{program}\"")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not capture the output of \"{program}\"")]
    Capture {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran past the configured timeout and was killed.
    #[error("\"{program}\" did not finish within {timeout:?}")]
    TimedOut {
        program: String,
        timeout: std::time::Duration,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranscriptError {
    /// The transcript does not contain both player identification lines.
    #[error("the transcript has {0} lines, at least 2 are required")]
    TooShort(usize),

    /// Removing the identifier suffix left nothing behind.
    #[error("line {0} of the transcript does not name a player")]
    EmptyIdentifier(usize),

    #[error("no move token found in \"{0}\"")]
    MissingMove(String),

    /// The transcript ends before any line that could announce a winner.
    #[error("the transcript has no winner line")]
    MissingWinner,
}
