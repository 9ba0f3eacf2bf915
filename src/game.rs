//! Running one game of Network.

use std::{
    fmt::Display,
    io::Read,
    process::{Child, Command, Stdio},
    sync::mpsc,
    thread,
    time::Duration,
};

use log::{debug, warn};

use crate::{player::Matchup, transcript::Transcript, LaunchError, Result};

/// Something that can play a game between the two players of a matchup.
///
/// The [test harness](crate::Harness) calls [`play()`](Game::play()) from
/// many threads at once, once for each run, and expects every call to be
/// independent of the others.
pub trait Game: Display + Sync {
    /// Gets the players this game pits against each other.
    fn matchup(&self) -> Matchup;

    /// Plays a single game and returns everything it printed.
    ///
    /// `run` counts up from zero over the runs of a benchmark.
    fn play(&self, run: usize) -> Result<Transcript>;
}

/// The game program, run as a child process once per game.
///
/// The program is started as `<program> <args...> -q <player1> <player2>`,
/// for instance `java Network -q machine random`.
///
/// # Examples
///
/// ```rust,no_run
/// use netbench::{ExternalGame, Game, Matchup, PlayerKind};
///
/// let game = ExternalGame::new("java", Matchup::new(PlayerKind::Machine, PlayerKind::Random))
///     .arg("Network");
/// let transcript = game.play(0)?;
/// #
/// # Ok::<_, netbench::BenchError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalGame {
    program: String,
    args: Vec<String>,
    matchup: Matchup,
    timeout: Option<Duration>,
}

impl ExternalGame {
    pub fn new(program: impl Into<String>, matchup: Matchup) -> Self {
        ExternalGame {
            program: program.into(),
            args: Vec::new(),
            matchup,
            timeout: None,
        }
    }

    /// Adds an argument to pass before the player flags.
    pub fn arg(self, arg: impl Into<String>) -> Self {
        let mut args = self.args;
        args.push(arg.into());
        ExternalGame { args, ..self }
    }

    /// Adds several arguments to pass before the player flags.
    pub fn args<I, S>(self, new: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = self.args;
        args.extend(new.into_iter().map(Into::into));
        ExternalGame { args, ..self }
    }

    /// Kills any game that runs longer than `timeout` and fails its run.
    pub fn timeout(self, timeout: Duration) -> Self {
        ExternalGame {
            timeout: Some(timeout),
            ..self
        }
    }

    /// Builds the command line for one game.
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("-q")
            .arg(self.matchup.player1.as_str())
            .arg(self.matchup.player2.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped());
        command
    }

    fn capture_error(&self, source: std::io::Error) -> LaunchError {
        LaunchError::Capture {
            program: self.program.clone(),
            source,
        }
    }

    fn wait(&self, mut child: Child) -> Result<String> {
        let mut stdout = child.stdout.take().ok_or_else(|| {
            self.capture_error(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "stdout was not captured",
            ))
        })?;

        let output = match self.timeout {
            None => {
                let mut output = Vec::new();
                let read = stdout.read_to_end(&mut output);
                // Reap the child even if reading failed.
                let status = child.wait().map_err(|e| self.capture_error(e))?;
                read.map_err(|e| self.capture_error(e))?;
                log_status(&self.program, status);
                output
            }
            Some(timeout) => {
                let (tx, rx) = mpsc::channel();
                let reader = thread::spawn(move || {
                    let mut output = Vec::new();
                    let read = stdout.read_to_end(&mut output).map(|_| output);
                    let _ = tx.send(read);
                });

                match rx.recv_timeout(timeout) {
                    Ok(read) => {
                        let status = child.wait().map_err(|e| self.capture_error(e))?;
                        let _ = reader.join();
                        log_status(&self.program, status);
                        read.map_err(|e| self.capture_error(e))?
                    }
                    Err(mpsc::RecvTimeoutError::Disconnected) => {
                        let _ = child.wait();
                        let stopped =
                            std::io::Error::new(std::io::ErrorKind::Other, "reader stopped");
                        return Err(self.capture_error(stopped).into());
                    }
                    Err(mpsc::RecvTimeoutError::Timeout) => {
                        warn!("{} ran past {:?}, killing it", self.program, timeout);
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(LaunchError::TimedOut {
                            program: self.program.clone(),
                            timeout,
                        }
                        .into());
                    }
                }
            }
        };

        Ok(String::from_utf8_lossy(&output).into_owned())
    }
}

fn log_status(program: &str, status: std::process::ExitStatus) {
    if !status.success() {
        warn!("{} exited with {}", program, status);
    }
}

impl Game for ExternalGame {
    fn matchup(&self) -> Matchup {
        self.matchup
    }

    fn play(&self, run: usize) -> Result<Transcript> {
        debug!("run {}: starting {}", run, self);

        let child = self
            .command()
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        let output = self.wait(child)?;

        debug!("run {}: captured {} bytes", run, output.len());
        Ok(Transcript::from_output(&output))
    }
}

impl Display for ExternalGame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        write!(
            f,
            " -q {} {}",
            self.matchup.player1.as_str(),
            self.matchup.player2.as_str()
        )
    }
}
