//! Reading the transcript the game program prints for one game.
//!
//! A transcript looks like this, with every line ending in `\r\n`:
//!
//! ```text
//! MachinePlayer is White
//! RandomPlayer is Black
//! MachinePlayer makes a move [add 1 2]
//! RandomPlayer makes a move [add 6 0]
//! ...
//! **** MachinePlayer WINS! ****
//! ```
//!
//! The first two lines name the players followed by a suffix of fixed
//! length, and the last line names the winner at a fixed offset.

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    player::{Move, Seat},
    TranscriptError,
};

/// How many characters follow the player identifier on the first two lines.
pub const IDENTIFIER_SUFFIX_LENGTH: usize = 9;

/// The character offset at which the winner line names the winner.
pub const WINNER_LINE_OFFSET: usize = 5;

/// The line terminator the game program writes.
pub const LINE_TERMINATOR: &str = "\r\n";

lazy_static! {
    static ref MOVE_TOKEN: Regex = Regex::new(r"\[[A-Za-z0-9 ]+\]").unwrap();
}

/// The fixed positions the parser relies on.
///
/// The defaults are [`IDENTIFIER_SUFFIX_LENGTH`] and [`WINNER_LINE_OFFSET`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TranscriptFormat {
    suffix_len: usize,
    winner_offset: usize,
}

impl Default for TranscriptFormat {
    fn default() -> Self {
        TranscriptFormat {
            suffix_len: IDENTIFIER_SUFFIX_LENGTH,
            winner_offset: WINNER_LINE_OFFSET,
        }
    }
}

impl TranscriptFormat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how many trailing characters to strip from the header lines.
    pub fn suffix_len(self, suffix_len: usize) -> Self {
        TranscriptFormat { suffix_len, ..self }
    }

    /// Sets where the winner line names the winner.
    pub fn winner_offset(self, winner_offset: usize) -> Self {
        TranscriptFormat {
            winner_offset,
            ..self
        }
    }
}

/// What one game produced, from the winner's point of view.
///
/// Only the winner's moves are kept; the loser's are dropped while parsing.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RunResult {
    pub winner: Seat,
    pub move_count: usize,
    pub moves: Vec<Move>,
}

/// The complete standard output of one run of the game program.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Transcript {
    lines: Vec<String>,
}

#[derive(Default)]
struct Tally {
    count: usize,
    moves: Vec<Move>,
}

impl Transcript {
    /// Splits raw program output on [`LINE_TERMINATOR`].
    ///
    /// Output ending in a terminator yields a final empty line, so the last
    /// printed line is the second to last line of the transcript.
    pub fn from_output(output: &str) -> Self {
        Transcript {
            lines: output.split(LINE_TERMINATOR).map(String::from).collect(),
        }
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Transcript {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Works out who won and which moves the winner made.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use netbench::{Seat, Transcript, TranscriptFormat};
    ///
    /// let transcript = Transcript::from_output(
    ///     "Ann is White\r\nBen is Black\r\nAnn makes a move [add 1 1]\r\n**** Ann WINS! ****\r\n",
    /// );
    /// let result = transcript.parse(&TranscriptFormat::default())?;
    ///
    /// assert_eq!(result.winner, Seat::Player1);
    /// assert_eq!(result.move_count, 1);
    /// assert_eq!(&*result.moves[0], "[add 1 1]");
    /// #
    /// # Ok::<_, netbench::TranscriptError>(())
    /// ```
    pub fn parse(&self, format: &TranscriptFormat) -> Result<RunResult, TranscriptError> {
        if self.lines.len() < 2 {
            return Err(TranscriptError::TooShort(self.lines.len()));
        }

        let player1 = self.identifier(0, format)?;
        let player2 = self.identifier(1, format)?;
        let prefix1 = format!("{} makes a move", player1);
        let prefix2 = format!("{} makes a move", player2);

        let mut tallies = [Tally::default(), Tally::default()];
        for line in &self.lines {
            let tally = if line.starts_with(&prefix1) {
                &mut tallies[0]
            } else if line.starts_with(&prefix2) {
                &mut tallies[1]
            } else {
                continue;
            };

            let token = MOVE_TOKEN
                .find(line)
                .ok_or_else(|| TranscriptError::MissingMove(line.clone()))?;
            tally.count += 1;
            tally.moves.push(Move::new(token.as_str()));
        }

        // The two header lines can never announce the winner.
        let winner_line = match self.lines.len() - 2 {
            i if i < 2 => return Err(TranscriptError::MissingWinner),
            i => &self.lines[i],
        };

        let [tally1, tally2] = tallies;
        let (winner, tally) = if announces(winner_line, player1, format.winner_offset) {
            (Seat::Player1, tally1)
        } else {
            (Seat::Player2, tally2)
        };

        Ok(RunResult {
            winner,
            move_count: tally.count,
            moves: tally.moves,
        })
    }

    fn identifier(&self, index: usize, format: &TranscriptFormat) -> Result<&str, TranscriptError> {
        let line = &self.lines[index];
        let keep = line.chars().count().saturating_sub(format.suffix_len);
        let end = line.char_indices().nth(keep).map_or(line.len(), |(i, _)| i);

        match &line[..end] {
            "" => Err(TranscriptError::EmptyIdentifier(index + 1)),
            id => Ok(id),
        }
    }
}

/// Checks that the first occurrence of `id` starts at character `offset`.
fn announces(line: &str, id: &str, offset: usize) -> bool {
    match line.char_indices().nth(offset) {
        Some((at, _)) => line.find(id) == Some(at),
        None => false,
    }
}
