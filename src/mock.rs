use std::{
    fmt::Display,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use crate::{Game, Matchup, PlayerKind, Result, Transcript};

/// A game that replays canned transcripts instead of starting a process.
///
/// Run `i` gets transcript `i % len`, so the result of a run never depends
/// on which thread plays it.
#[derive(Debug)]
pub(crate) struct Mock {
    transcripts: Vec<Transcript>,
    played: Arc<AtomicUsize>,
}

impl Mock {
    pub(crate) fn new(transcripts: Vec<Transcript>) -> Self {
        Self {
            transcripts,
            played: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Gets a counter of how many games this mock has played.
    pub(crate) fn played(&self) -> Arc<AtomicUsize> {
        self.played.clone()
    }
}

/// Builds a transcript between `Ann` and `Ben` in the default format.
///
/// Each move is `(player number, token)`.
pub(crate) fn transcript(winner: usize, moves: &[(usize, &str)]) -> Transcript {
    let mut output = String::from("Ann is White\r\nBen is Black\r\n");
    for (player, token) in moves {
        let name = if *player == 1 { "Ann" } else { "Ben" };
        output.push_str(&format!("{} makes a move {}\r\n", name, token));
    }
    let name = if winner == 1 { "Ann" } else { "Ben" };
    output.push_str(&format!("**** {} WINS! ****\r\n", name));

    Transcript::from_output(&output)
}

impl Game for Mock {
    fn matchup(&self) -> Matchup {
        Matchup::new(PlayerKind::Machine, PlayerKind::Random)
    }

    fn play(&self, run: usize) -> Result<Transcript> {
        self.played.fetch_add(1, Ordering::SeqCst);
        Ok(self.transcripts[run % self.transcripts.len()].clone())
    }
}

impl Display for Mock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Mock ({} transcripts)", self.transcripts.len())
    }
}
