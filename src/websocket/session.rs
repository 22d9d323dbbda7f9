use std::{collections::VecDeque, ops::ControlFlow, sync::Arc, time::Duration};

use tokio::{
    sync::mpsc,
    time::{self, Instant},
};

use super::messages::{ClientMessage, ServerMessage};
use crate::{
    game::{
        AudioMixer, Cue, Engine, EngineError, LevelGenerator, RunSummary, BOOST_DURATION,
        RECHARGE_INTERVAL,
    },
    models::Level,
    reporter::ScoreReporter,
};

/// Survival time is counted in whole seconds
const CLOCK_INTERVAL: Duration = Duration::from_secs(1);
/// How often audio parameters are pushed while playing
const AUDIO_INTERVAL: Duration = Duration::from_millis(180);

pub const NAME_REQUIRED_NOTICE: &str = "IDENTIFICATION REQUIRED\nENTER YOUR NAME";

/// Produces the maze for each new run
pub type LevelSource = Box<dyn FnMut() -> Level + Send + Sync>;

/// What a single client command did to the run
enum Effect {
    Ended(RunSummary),
    SonarFired,
}

/// One player's game, driven by client commands and the run timers.
///
/// The engine is only ever touched from this task, one event at a time.
pub struct Session {
    engine: Engine,
    mixer: AudioMixer,
    muted: bool,
    reporter: Arc<dyn ScoreReporter>,
    tx: mpsc::Sender<ServerMessage>,
    levels: LevelSource,
}

impl Session {
    pub fn new(reporter: Arc<dyn ScoreReporter>, tx: mpsc::Sender<ServerMessage>) -> Self {
        Self {
            engine: Engine::new(),
            mixer: AudioMixer::new(),
            muted: false,
            reporter,
            tx,
            levels: Box::new(LevelGenerator::generate),
        }
    }

    /// Replace random generation with a fixed source of levels
    pub fn with_levels(mut self, levels: impl FnMut() -> Level + Send + Sync + 'static) -> Self {
        self.levels = Box::new(levels);
        self
    }

    /// Run until the command channel closes
    pub async fn run(mut self, mut commands: mpsc::Receiver<ClientMessage>) {
        self.refresh_leaderboard();

        loop {
            if self.engine.is_playing() {
                if self.play(&mut commands).await.is_break() {
                    break;
                }
                continue;
            }

            let Some(msg) = commands.recv().await else {
                break;
            };
            // Outside a run nothing can end or boost, so effects are moot
            let _ = self.handle_command(msg).await;
        }

        tracing::debug!("Session finished");
    }

    /// Drive one run until it ends. Every timer below belongs to this run and
    /// is dropped on return.
    async fn play(&mut self, commands: &mut mpsc::Receiver<ClientMessage>) -> ControlFlow<()> {
        let start = Instant::now();
        let pursuer_every = self.engine.difficulty().pursuer_interval();

        let mut pursuer_tick = time::interval_at(start + pursuer_every, pursuer_every);
        let mut clock = time::interval_at(start + CLOCK_INTERVAL, CLOCK_INTERVAL);
        let mut recharge = time::interval_at(start + RECHARGE_INTERVAL, RECHARGE_INTERVAL);
        let mut audio = time::interval(AUDIO_INTERVAL);
        let mut last_audio = start;

        // Every fire schedules its own clear; the earliest one ends the reveal
        let boost = time::sleep(BOOST_DURATION);
        tokio::pin!(boost);
        let mut boost_deadlines: VecDeque<Instant> = VecDeque::new();

        self.send_frame().await;

        while self.engine.is_playing() {
            let ended = tokio::select! {
                msg = commands.recv() => {
                    let Some(msg) = msg else {
                        return ControlFlow::Break(());
                    };
                    match self.handle_command(msg).await {
                        Some(Effect::Ended(summary)) => Some(summary),
                        Some(Effect::SonarFired) => {
                            let deadline = Instant::now() + BOOST_DURATION;
                            if boost_deadlines.is_empty() {
                                boost.as_mut().reset(deadline);
                            }
                            boost_deadlines.push_back(deadline);
                            None
                        }
                        None => None,
                    }
                }
                _ = pursuer_tick.tick() => {
                    let ended = self.engine.advance_pursuer();
                    self.send_frame().await;
                    ended
                }
                _ = clock.tick() => {
                    self.engine.tick_clock();
                    self.send_frame().await;
                    None
                }
                _ = recharge.tick() => {
                    self.engine.recharge_sonar();
                    self.send_frame().await;
                    None
                }
                _ = &mut boost, if !boost_deadlines.is_empty() => {
                    boost_deadlines.pop_front();
                    if let Some(&next) = boost_deadlines.front() {
                        boost.as_mut().reset(next);
                    }
                    self.engine.clear_sonar();
                    self.send_frame().await;
                    None
                }
                now = audio.tick() => {
                    let dt = now.saturating_duration_since(last_audio);
                    last_audio = now;
                    self.send_audio(dt).await;
                    None
                }
            };

            if let Some(summary) = ended {
                self.finish(summary).await;
            }
        }

        ControlFlow::Continue(())
    }

    async fn handle_command(&mut self, msg: ClientMessage) -> Option<Effect> {
        match msg {
            ClientMessage::StartRun { player, difficulty } => {
                let level = (self.levels)();
                match self.engine.begin(&player, difficulty, level) {
                    Ok(()) => self.mixer.reset(),
                    Err(EngineError::NameRequired) => self.notice(NAME_REQUIRED_NOTICE).await,
                    Err(e) => self.notice(&e.to_string()).await,
                }
                None
            }
            ClientMessage::Move { direction } => {
                let outcome = self.engine.move_player(direction);
                if outcome.moved {
                    self.send_cue(Cue::Step).await;
                    self.send_frame().await;
                }
                outcome.ended.map(Effect::Ended)
            }
            ClientMessage::FireSonar => {
                if !self.engine.fire_sonar() {
                    return None;
                }
                self.send_cue(Cue::Ping).await;
                self.send_frame().await;
                Some(Effect::SonarFired)
            }
            ClientMessage::SetMuted { muted } => {
                self.muted = muted;
                if muted {
                    self.mixer.reset();
                }
                None
            }
            ClientMessage::FetchLeaderboard => {
                self.refresh_leaderboard();
                None
            }
        }
    }

    /// Report the run, then tell the client it is over. The save is not
    /// awaited; a failure is only logged.
    async fn finish(&mut self, summary: RunSummary) {
        let params = self.mixer.silenced(self.muted);
        self.send(ServerMessage::Audio { params }).await;

        let (won, time, difficulty) = (summary.won, summary.elapsed_secs, summary.difficulty);
        self.report(summary);

        self.send_cue(if won { Cue::Win } else { Cue::Die }).await;
        self.send(ServerMessage::RunEnded {
            won,
            time,
            difficulty,
        })
        .await;
    }

    fn report(&self, summary: RunSummary) {
        let reporter = self.reporter.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            if let Err(e) = reporter.save_score(summary.into()).await {
                tracing::error!("Failed to save score: {}", e);
                return;
            }
            match reporter.leaderboard().await {
                Ok(scores) => {
                    let _ = tx.send(ServerMessage::Leaderboard { scores }).await;
                }
                Err(e) => tracing::error!("Failed to fetch leaderboard: {}", e),
            }
        });
    }

    fn refresh_leaderboard(&self) {
        let reporter = self.reporter.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            match reporter.leaderboard().await {
                Ok(scores) => {
                    let _ = tx.send(ServerMessage::Leaderboard { scores }).await;
                }
                Err(e) => tracing::error!("Failed to fetch leaderboard: {}", e),
            }
        });
    }

    async fn send_frame(&self) {
        let sonar = self.engine.sonar();
        self.send(ServerMessage::Frame {
            state: self.engine.state(),
            cells: self.engine.visibility(),
            sonar_charges: sonar.charges(),
            sonar_active: sonar.is_active(),
            elapsed: self.engine.elapsed_secs(),
        })
        .await;
    }

    async fn send_audio(&mut self, dt: Duration) {
        let (pursuer_distance, exit_distance) = self.engine.distances();
        let params = self
            .mixer
            .update(pursuer_distance, exit_distance, self.muted, dt);
        self.send(ServerMessage::Audio { params }).await;
    }

    async fn send_cue(&self, cue: Cue) {
        if !self.muted {
            self.send(ServerMessage::cue(cue)).await;
        }
    }

    async fn notice(&self, message: &str) {
        self.send(ServerMessage::Notice {
            message: message.to_string(),
        })
        .await;
    }

    async fn send(&self, msg: ServerMessage) {
        if self.tx.send(msg).await.is_err() {
            tracing::debug!("Client channel closed, dropping message");
        }
    }
}
