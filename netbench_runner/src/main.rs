use std::{
    num::NonZeroUsize,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use netbench::{
    transcript::{IDENTIFIER_SUFFIX_LENGTH, WINNER_LINE_OFFSET},
    ExternalGame, Harness, Matchup, PlayerKind, TranscriptFormat,
};

/// Plays many games of Network between two players and reports how they did.
#[derive(Debug, Parser)]
#[command(name = "netbench", version, about)]
struct Cli {
    /// The first player: 'm' (machine) or 'r' (random)
    player1: PlayerKind,

    /// The second player: 'm' (machine) or 'r' (random)
    player2: PlayerKind,

    /// Number of games to play
    iterations: NonZeroUsize,

    /// Number of games to play at once [default: available parallelism]
    threads: Option<NonZeroUsize>,

    /// Game program to run instead of `java Network`
    #[arg(long, value_name = "CMD")]
    program: Option<String>,

    /// Argument for the game program, may be repeated. Without --program
    /// these go to java before `Network`.
    #[arg(long = "program-arg", value_name = "ARG", allow_hyphen_values = true)]
    program_args: Vec<String>,

    /// Kill games that run longer than this
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Characters after the player name on the first two lines of a game
    #[arg(long, default_value_t = IDENTIFIER_SUFFIX_LENGTH)]
    suffix_len: usize,

    /// Offset of the winner's name on the last line of a game
    #[arg(long, default_value_t = WINNER_LINE_OFFSET)]
    winner_offset: usize,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Show a progress bar
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn matchup(&self) -> Matchup {
        Matchup::new(self.player1, self.player2)
    }

    fn game(&self) -> ExternalGame {
        let game = match &self.program {
            Some(program) => ExternalGame::new(program, self.matchup()).args(&self.program_args),
            None => ExternalGame::new("java", self.matchup())
                .args(&self.program_args)
                .arg("Network"),
        };

        match self.timeout {
            Some(secs) => game.timeout(Duration::from_secs(secs)),
            None => game,
        }
    }

    fn harness(&self) -> Harness {
        let format = TranscriptFormat::new()
            .suffix_len(self.suffix_len)
            .winner_offset(self.winner_offset);
        let harness = Harness::new(Box::new(self.game()))
            .iterations(self.iterations.get())
            .format(format);
        let harness = match self.threads {
            Some(threads) => harness.threads(threads.get()),
            None => harness,
        };

        if self.verbose {
            harness.verbose()
        } else {
            harness.quiet()
        }
    }
}

fn main() -> Result<()> {
    let start = Instant::now();
    env_logger::init();

    let cli = Cli::parse();
    info!("{:?}", cli);

    let record = cli
        .harness()
        .run()
        .with_context(|| format!("benchmark of {} failed", cli.matchup()))?;
    let summary = record.to_summary();

    if cli.json {
        summary.print_json()?;
    } else {
        summary.print()?;
    }

    println!("--- {:.2} seconds ---", start.elapsed().as_secs_f64());

    Ok(())
}
