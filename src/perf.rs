//! Adding up the results of many games.

use std::{collections::HashMap, fmt::Display, io::Write};

use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Median, Statistics};

use crate::{
    player::{Matchup, Move, PlayerKind, Seat},
    transcript::RunResult,
    Result,
};

/// How many of a player's most frequent moves a report lists.
pub const TOP_MOVES: usize = 5;

/// Counts how often each move was made.
///
/// Moves are remembered in the order they were first seen, which decides the
/// order of moves made equally often.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Histogram {
    counts: HashMap<Move, usize>,
    order: Vec<Move>,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mv: &Move) {
        match self.counts.get_mut(mv) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(mv.clone(), 1);
                self.order.push(mv.clone());
            }
        }
    }

    /// Gets how many times `mv` was made.
    pub fn count(&self, mv: &Move) -> usize {
        self.counts.get(mv).copied().unwrap_or(0)
    }

    /// Gets the number of distinct moves.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Gets the `n` most frequent moves, most frequent first.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use netbench::{perf::Histogram, Move};
    ///
    /// let mut histogram = Histogram::new();
    /// for token in ["[A1]", "[A1]", "[B2]", "[C3]", "[B2]", "[B2]"] {
    ///     histogram.add(&Move::new(token));
    /// }
    ///
    /// let top: Vec<_> = histogram
    ///     .most_common(5)
    ///     .into_iter()
    ///     .map(|(mv, count)| format!("{} {}", mv, count))
    ///     .collect();
    /// assert_eq!(top, ["[B2] 3", "[A1] 2", "[C3] 1"]);
    /// ```
    pub fn most_common(&self, n: usize) -> Vec<(&Move, usize)> {
        self.order
            .iter()
            .map(|mv| (mv, self.counts[mv]))
            .sorted_by(|a, b| b.1.cmp(&a.1))
            .take(n)
            .collect()
    }
}

/// Everything recorded about the games one player won.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerStats {
    wins: usize,
    move_counts: Vec<usize>,
    histogram: Histogram,
}

impl PlayerStats {
    pub fn wins(&self) -> usize {
        self.wins
    }

    /// Gets the number of moves made in each won game.
    pub fn move_counts(&self) -> &[usize] {
        &self.move_counts
    }

    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    /// Gets the mean number of moves in a won game, if any were won.
    pub fn mean_moves(&self) -> Option<f64> {
        if self.move_counts.is_empty() {
            return None;
        }
        Some(self.samples().iter().mean())
    }

    /// Gets the median number of moves in a won game, if any were won.
    pub fn median_moves(&self) -> Option<f64> {
        if self.move_counts.is_empty() {
            return None;
        }
        Some(Data::new(self.samples()).median())
    }

    fn samples(&self) -> Vec<f64> {
        self.move_counts.iter().map(|&n| n as f64).collect()
    }
}

/// Win counts and move statistics for both players across many games.
///
/// Only the winner of each game contributes moves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stats {
    matchup: Matchup,
    players: [PlayerStats; 2],
}

impl Stats {
    pub fn new(matchup: Matchup) -> Self {
        Stats {
            matchup,
            players: Default::default(),
        }
    }

    /// Folds a sequence of results into fresh statistics.
    pub fn from_results<'a>(
        matchup: Matchup,
        results: impl IntoIterator<Item = &'a RunResult>,
    ) -> Self {
        let mut stats = Self::new(matchup);
        for result in results {
            stats.add(result);
        }
        stats
    }

    /// Adds the result of one game.
    pub fn add(&mut self, result: &RunResult) {
        let player = &mut self.players[result.winner.number() - 1];
        player.wins += 1;
        player.move_counts.push(result.move_count);
        for mv in &result.moves {
            player.histogram.add(mv);
        }
    }

    pub fn matchup(&self) -> Matchup {
        self.matchup
    }

    pub fn player(&self, seat: Seat) -> &PlayerStats {
        &self.players[seat.number() - 1]
    }

    /// Gets the number of games added.
    pub fn games(&self) -> usize {
        self.players.iter().map(PlayerStats::wins).sum()
    }

    /// Converts these statistics to a pre-calculated summary.
    pub fn to_summary(&self) -> Summary {
        Summary {
            games: self.games(),
            players: [Seat::Player1, Seat::Player2]
                .iter()
                .map(|&seat| {
                    let player = self.player(seat);
                    PlayerSummary {
                        label: self.matchup.label(seat),
                        kind: self.matchup.kind(seat),
                        wins: player.wins,
                        mean_moves: player.mean_moves(),
                        median_moves: player.median_moves(),
                        top_moves: player
                            .histogram
                            .most_common(TOP_MOVES)
                            .into_iter()
                            .map(|(mv, count)| MoveCount {
                                mv: mv.clone(),
                                count,
                            })
                            .collect(),
                    }
                })
                .collect(),
        }
    }
}

/// One of a player's most frequent moves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct MoveCount {
    #[cfg_attr(feature = "serde", serde(rename = "move"))]
    pub mv: Move,
    pub count: usize,
}

/// The report lines for one player.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct PlayerSummary {
    pub label: String,
    pub kind: PlayerKind,
    pub wins: usize,
    pub mean_moves: Option<f64>,
    pub median_moves: Option<f64>,
    pub top_moves: Vec<MoveCount>,
}

impl Display for PlayerSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.mean_moves, self.median_moves) {
            (Some(mean), Some(median)) if self.wins > 0 => {
                writeln!(
                    f,
                    "{} wins: {}, mean: {:.2}, median: {:.2}",
                    self.label, self.wins, mean, median
                )?;
                for MoveCount { mv, count } in &self.top_moves {
                    writeln!(f, "{} {}", mv, count)?;
                }
            }
            _ => writeln!(f, "{} wins: 0", self.label)?,
        }

        Ok(())
    }
}

/// A summary of a benchmark, ready to print.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Summary {
    pub games: usize,
    pub players: Vec<PlayerSummary>,
}

impl Summary {
    /// Prints the text report to stdout.
    pub fn print(&self) -> Result<()> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{}", self)?;
        stdout.flush()?;
        Ok(())
    }

    /// Prints the summary to stdout as JSON.
    #[cfg(feature = "serde")]
    pub fn print_json(&self) -> Result<()> {
        let mut stdout = std::io::stdout();
        serde_json::to_writer_pretty(&mut stdout, self)?;
        writeln!(stdout)?;
        Ok(())
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for player in &self.players {
            write!(f, "{}", player)?;
        }
        Ok(())
    }
}
