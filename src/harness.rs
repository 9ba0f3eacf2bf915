//! The test harness for benchmarking Network players.

use std::{num::NonZeroUsize, ops::Deref};

#[cfg(feature = "fancy")]
use indicatif::ParallelProgressIterator;
#[cfg(not(feature = "fancy"))]
use log::warn;
use log::{debug, info};
use rayon::{prelude::*, ThreadPoolBuilder};

use crate::{
    game::Game,
    perf::{Stats, Summary},
    player::Matchup,
    transcript::{RunResult, TranscriptFormat},
    ConfigError, Result,
};

/// A test harness that plays many games and collects their results.
///
/// Create a new harness around a [`Game`] with [`new()`](Harness::new()),
/// then configure it using various methods. Note that these configuration
/// methods consume the existing [`Harness`] and return a new one.
///
/// # Examples
///
/// ```rust,no_run
/// use netbench::{ExternalGame, Harness, Matchup, PlayerKind};
///
/// let game = ExternalGame::new("java", Matchup::new(PlayerKind::Machine, PlayerKind::Random))
///     .arg("Network");
/// let harness = Harness::new(Box::new(game))
///     .quiet()
///     .iterations(50)
///     .threads(4);
///
/// let record = harness.run()?;
/// record.to_summary().print()?;
/// #
/// # Ok::<_, netbench::BenchError>(())
/// ```
pub struct Harness {
    game: Box<dyn Game>,
    format: TranscriptFormat,
    verbose: bool,
    iterations: usize,
    threads: Option<usize>,
}

impl Harness {
    /// Creates a new test harness with default configuration.
    ///
    /// Defaults:
    /// 1. quiet mode
    /// 2. plays 100 games
    /// 3. uses one thread per available processing unit
    /// 4. reads transcripts in the default [`TranscriptFormat`]
    pub fn new(game: Box<dyn Game>) -> Self {
        Harness {
            game,
            format: TranscriptFormat::default(),
            verbose: false,
            iterations: 100,
            threads: None,
        }
    }

    /// Makes the harness verbose while testing.
    ///
    /// As of right now, this consists of a progress bar and nothing else.
    pub fn verbose(self) -> Self {
        Harness {
            verbose: true,
            ..self
        }
    }

    /// Makes the harness silent while testing.
    pub fn quiet(self) -> Self {
        Harness {
            verbose: false,
            ..self
        }
    }

    /// Sets the number of games to play.
    pub fn iterations(self, iterations: usize) -> Self {
        Harness { iterations, ..self }
    }

    /// Sets the most games to play at once.
    pub fn threads(self, threads: usize) -> Self {
        Harness {
            threads: Some(threads),
            ..self
        }
    }

    /// Sets the format used to read game transcripts.
    pub fn format(self, format: TranscriptFormat) -> Self {
        Harness { format, ..self }
    }

    pub fn matchup(&self) -> Matchup {
        self.game.matchup()
    }

    /// Runs the harness and produces the result of every game.
    ///
    /// The results are in the order the games were started, no matter the
    /// order they finished in. The first game that fails stops the run and
    /// its error is returned; no results are produced in that case.
    pub fn run(&self) -> Result<Record> {
        if self.iterations == 0 {
            return Err(ConfigError::NoIterations.into());
        }
        let threads = match self.threads {
            Some(0) => return Err(ConfigError::NoThreads.into()),
            Some(n) => n,
            None => std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
        };

        info!(
            "playing {} games of {} on {} threads",
            self.iterations, self.game, threads
        );

        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("netbench-{}", i))
            .build()?;
        let results = pool.install(|| self.dispatch())?;

        Ok(Record::new(self.matchup(), results))
    }

    #[cfg(feature = "fancy")]
    fn dispatch(&self) -> Result<Vec<RunResult>> {
        if self.verbose {
            (0..self.iterations)
                .into_par_iter()
                .progress_count(self.iterations as u64)
                .map(|run| self.run_inner(run))
                .collect()
        } else {
            (0..self.iterations)
                .into_par_iter()
                .map(|run| self.run_inner(run))
                .collect()
        }
    }

    #[cfg(not(feature = "fancy"))]
    fn dispatch(&self) -> Result<Vec<RunResult>> {
        if self.verbose {
            warn!("progress bars need the `fancy` feature");
        }
        (0..self.iterations)
            .into_par_iter()
            .map(|run| self.run_inner(run))
            .collect()
    }

    fn run_inner(&self, run: usize) -> Result<RunResult> {
        let transcript = self.game.play(run)?;
        let result = transcript.parse(&self.format)?;
        debug!(
            "run {}: player {} won after {} moves",
            run,
            result.winner.number(),
            result.move_count
        );
        Ok(result)
    }
}

/// The results of every game played by a [`Harness`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    matchup: Matchup,
    results: Vec<RunResult>,
}

impl Deref for Record {
    type Target = [RunResult];

    fn deref(&self) -> &Self::Target {
        &self.results
    }
}

impl Record {
    fn new(matchup: Matchup, results: Vec<RunResult>) -> Self {
        Self { matchup, results }
    }

    pub fn matchup(&self) -> Matchup {
        self.matchup
    }

    /// Folds the results into win counts and move statistics.
    pub fn to_stats(&self) -> Stats {
        Stats::from_results(self.matchup, &self.results)
    }

    pub fn to_summary(&self) -> Summary {
        self.to_stats().to_summary()
    }
}

#[cfg(test)]
mod test {
    use std::{
        fmt::Display,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        thread,
        time::Duration,
    };

    use proptest::prelude::*;

    use super::*;
    use crate::{
        mock::{transcript, Mock},
        player::Seat,
        BenchError, PlayerKind, Transcript, TranscriptError,
    };

    /// A game that takes a while and remembers how many were played at once.
    struct Slow {
        playing: AtomicUsize,
        most: Arc<AtomicUsize>,
    }

    impl Game for Slow {
        fn matchup(&self) -> Matchup {
            Matchup::new(PlayerKind::Random, PlayerKind::Random)
        }

        fn play(&self, run: usize) -> Result<Transcript> {
            let now = self.playing.fetch_add(1, Ordering::SeqCst) + 1;
            self.most.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(2));
            self.playing.fetch_sub(1, Ordering::SeqCst);

            Ok(transcript(run % 2 + 1, &[(1, "[add 1 1]"), (2, "[add 2 2]")]))
        }
    }

    impl Display for Slow {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "Slow")
        }
    }

    fn games() -> Vec<Transcript> {
        vec![
            transcript(1, &[(1, "[add 1 1]"), (2, "[add 2 2]"), (1, "[add 1 3]")]),
            transcript(2, &[(1, "[add 1 1]"), (2, "[add 6 0]")]),
            transcript(
                1,
                &[
                    (1, "[add 1 3]"),
                    (2, "[add 6 0]"),
                    (1, "[add 1 1]"),
                    (1, "[step 1 1 to 2 2]"),
                ],
            ),
            transcript(2, &[(2, "[add 6 0]"), (2, "[add 6 2]"), (1, "[add 0 1]")]),
            transcript(1, &[(1, "[add 1 1]")]),
        ]
    }

    #[test]
    fn plays_every_game_once() {
        let mock = Mock::new(games());
        let harness = Harness::new(Box::new(mock)).iterations(23).threads(4);
        let record = harness.run().unwrap();

        assert_eq!(record.len(), 23);
        let stats = record.to_stats();
        assert_eq!(
            stats.player(Seat::Player1).wins() + stats.player(Seat::Player2).wins(),
            23
        );
        // 23 runs over 5 transcripts: 0, 2 and 4 are player 1 wins.
        assert_eq!(stats.player(Seat::Player1).wins(), 5 + 5 + 4);
    }

    #[test]
    fn results_in_submission_order() {
        let harness = Harness::new(Box::new(Mock::new(games())))
            .iterations(10)
            .threads(8);
        let record = harness.run().unwrap();

        let expected: Vec<_> = games()
            .iter()
            .cycle()
            .take(10)
            .map(|t| t.parse(&TranscriptFormat::default()).unwrap())
            .collect();
        assert_eq!(&*record, expected.as_slice());
    }

    #[test]
    fn thread_count_does_not_change_stats() {
        let one = Harness::new(Box::new(Mock::new(games())))
            .iterations(40)
            .threads(1)
            .run()
            .unwrap();
        let eight = Harness::new(Box::new(Mock::new(games())))
            .iterations(40)
            .threads(8)
            .run()
            .unwrap();

        assert_eq!(one.to_stats(), eight.to_stats());
        assert_eq!(one.to_summary().to_string(), eight.to_summary().to_string());
    }

    #[test]
    fn bad_transcript_fails_the_run() {
        let mut transcripts = games();
        transcripts.push(Transcript::from_output("garbage"));
        let harness = Harness::new(Box::new(Mock::new(transcripts)))
            .iterations(12)
            .threads(3);

        match harness.run() {
            Err(BenchError::Transcript {
                kind: TranscriptError::TooShort(1),
            }) => {}
            other => panic!("expected a transcript error, got {:?}", other),
        }
    }

    #[test]
    fn first_failure_stops_the_run() {
        let mut transcripts = vec![Transcript::from_output("garbage")];
        transcripts.extend(games().into_iter().cycle().take(9));
        let mock = Mock::new(transcripts);
        let played = mock.played();
        let harness = Harness::new(Box::new(mock)).iterations(10_000).threads(2);

        assert!(harness.run().is_err());
        let played = played.load(Ordering::SeqCst);
        assert!(played >= 1);
        assert!(played < 1_000, "played {} games", played);
    }

    #[test]
    fn never_plays_more_than_threads_at_once() {
        let most = Arc::new(AtomicUsize::new(0));
        let game = Slow {
            playing: AtomicUsize::new(0),
            most: most.clone(),
        };
        let record = Harness::new(Box::new(game))
            .iterations(200)
            .threads(3)
            .run()
            .unwrap();

        assert_eq!(record.len(), 200);
        let most = most.load(Ordering::SeqCst);
        assert!((1..=3).contains(&most), "{} played at once", most);
    }

    #[test]
    fn rejects_empty_configuration() {
        let harness = Harness::new(Box::new(Mock::new(games()))).iterations(0);
        assert!(matches!(
            harness.run(),
            Err(BenchError::Config {
                kind: ConfigError::NoIterations
            })
        ));

        let mock = Mock::new(games());
        let harness = Harness::new(Box::new(mock)).threads(0);
        assert!(matches!(
            harness.run(),
            Err(BenchError::Config {
                kind: ConfigError::NoThreads
            })
        ));
    }

    #[test]
    fn configuration_errors_play_nothing() {
        let mock = Mock::new(games());
        let played = mock.played();
        let harness = Harness::new(Box::new(mock)).iterations(0);
        assert!(harness.run().is_err());
        assert_eq!(played.load(Ordering::SeqCst), 0);

        let mock = Mock::new(games());
        let played = mock.played();
        let harness = Harness::new(Box::new(mock)).iterations(7).threads(2);
        harness.run().unwrap();
        assert_eq!(played.load(Ordering::SeqCst), 7);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn wins_add_up(iterations in 1_usize..60, threads in 1_usize..9) {
            let record = Harness::new(Box::new(Mock::new(games())))
                .iterations(iterations)
                .threads(threads)
                .run()
                .unwrap();
            let stats = record.to_stats();

            prop_assert_eq!(stats.games(), iterations);
            prop_assert_eq!(
                stats.player(Seat::Player1).wins() + stats.player(Seat::Player2).wins(),
                iterations
            );
        }
    }
}
