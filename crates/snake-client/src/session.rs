use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use snake_core::api::{User, UserId};
use snake_core::config::SnakeConfig;
use snake_core::error::ClientError;
use snake_core::game::{GameEvent, GameRules, GameState, RunMode, SnakeGame};
use snake_core::input::{Command, handle_key};
use snake_core::scoreboard::{
    REGISTERED_TEXT, SCORE_SAVE_ERROR_TEXT, Scoreboard, connection_error_text, score_saved_text,
    welcome_text,
};
use snake_core::toast::{MessageBoard, MessageKind};

use crate::scheduler::{Tick, TickTimer};
use crate::score_client::{AccountService, ScoreService};

/// How often expired messages are swept.
const HOUSEKEEPING_INTERVAL: Duration = Duration::from_millis(250);

/// How long `run` waits for in-flight requests after `Quit`.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// State shown next to the playfield. Background tasks write here; they
/// never touch the game itself.
#[derive(Debug, Default)]
pub struct Display {
    pub scoreboard: Scoreboard,
    pub messages: MessageBoard,
    /// Bumped on every sign-in and logout. Score results started under an
    /// older epoch are dropped.
    epoch: u64,
}

pub type SharedDisplay = Arc<Mutex<Display>>;

/// Where frames end up.
pub trait Frontend: Send {
    fn draw(&mut self, state: &GameState, user: Option<&User>, display: &Display);
}

/// Input delivered to a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    /// DOM-style key name, routed through the key map.
    Key(String),
    Command(Command),
    Register { username: String, password: String },
    Login { username: String, password: String },
    Logout,
    Quit,
}

/// Sent by background tasks back to the session loop.
#[derive(Debug)]
enum SessionEvent {
    DisplayChanged,
    SignedIn { user: User, epoch: u64 },
}

/// Handle for posting messages from outside the session loop. Each post
/// triggers a redraw.
#[derive(Clone)]
pub struct Notifier {
    display: SharedDisplay,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl Notifier {
    pub async fn push(&self, kind: MessageKind, text: impl Into<String>) {
        self.display.lock().await.messages.push(kind, text);
        self.changed();
    }

    fn changed(&self) {
        // Closed only once the session is gone
        let _ = self.events.send(SessionEvent::DisplayChanged);
    }

    fn signed_in(&self, user: User, epoch: u64) {
        let _ = self.events.send(SessionEvent::SignedIn { user, epoch });
    }
}

/// Session tunables taken from the config.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub rules: GameRules,
    pub seed: Option<u64>,
    pub tick_interval: Duration,
    pub leaderboard_limit: u32,
    pub message_duration: Duration,
}

impl SessionSettings {
    pub fn from_config(config: &SnakeConfig) -> Self {
        Self {
            rules: config.rules(),
            seed: config.game.seed,
            tick_interval: config.tick_interval(),
            leaderboard_limit: config.backend.leaderboard_limit,
            message_duration: config.message_duration(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&SnakeConfig::default())
    }
}

/// Owns the game and drives it from player input and the tick timer.
///
/// Every service call runs as a spawned task, so a slow or hung request
/// never holds up ticks or input. Tasks report back over an event channel.
pub struct GameSession<S, F> {
    game: SnakeGame,
    service: Arc<S>,
    frontend: F,
    display: SharedDisplay,
    user: Option<User>,
    timer: Option<TickTimer>,
    tick_tx: mpsc::UnboundedSender<Tick>,
    tick_rx: mpsc::UnboundedReceiver<Tick>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    tick_interval: Duration,
    leaderboard_limit: u32,
    pending: Vec<JoinHandle<()>>,
    last_prune: Instant,
}

impl<S, F> GameSession<S, F>
where
    S: ScoreService + AccountService,
    F: Frontend,
{
    pub fn new(settings: SessionSettings, service: S, frontend: F) -> Self {
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let display = Display {
            scoreboard: Scoreboard::new(),
            messages: MessageBoard::new(settings.message_duration),
            epoch: 0,
        };
        Self {
            game: SnakeGame::new(settings.rules, settings.seed),
            service: Arc::new(service),
            frontend,
            display: Arc::new(Mutex::new(display)),
            user: None,
            timer: None,
            tick_tx,
            tick_rx,
            events_tx,
            events_rx,
            tick_interval: settings.tick_interval,
            leaderboard_limit: settings.leaderboard_limit,
            pending: Vec::new(),
            last_prune: Instant::now(),
        }
    }

    pub fn state(&self) -> &GameState {
        self.game.state()
    }

    /// Direct access for setting up scenarios.
    pub fn game_mut(&mut self) -> &mut SnakeGame {
        &mut self.game
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn display(&self) -> SharedDisplay {
        Arc::clone(&self.display)
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    pub fn notifier(&self) -> Notifier {
        Notifier {
            display: Arc::clone(&self.display),
            events: self.events_tx.clone(),
        }
    }

    /// Draw the current frame.
    pub async fn redraw(&mut self) {
        let display = self.display.lock().await;
        self.frontend
            .draw(self.game.state(), self.user.as_ref(), &display);
    }

    /// Process inputs, ticks and task results until `Quit` or until every
    /// input sender is gone. Requests still in flight get a short grace
    /// period and are then abandoned.
    pub async fn run(mut self, mut inputs: mpsc::UnboundedReceiver<SessionInput>) -> Self {
        let mut housekeeping = tokio::time::interval(HOUSEKEEPING_INTERVAL);
        housekeeping.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        self.redraw().await;
        loop {
            tokio::select! {
                Some(Tick) = self.tick_rx.recv() => {
                    self.on_tick().await;
                },
                Some(event) = self.events_rx.recv() => {
                    self.apply_event(event).await;
                },
                input = inputs.recv() => match input {
                    Some(SessionInput::Quit) | None => break,
                    Some(input) => self.handle_input(input).await,
                },
                _ = housekeeping.tick() => {
                    self.housekeep().await;
                },
            }
        }

        self.stop_timer();
        self.shutdown().await;
        tracing::info!(score = self.game.score(), "Session ended");
        self
    }

    pub async fn handle_input(&mut self, input: SessionInput) {
        match input {
            SessionInput::Key(key) => {
                let outcome = handle_key(&key, self.game.mode());
                if let Some(command) = outcome.command {
                    self.handle_command(command).await;
                }
            },
            SessionInput::Command(command) => self.handle_command(command).await,
            SessionInput::Register { username, password } => self.register(username, password),
            SessionInput::Login { username, password } => {
                self.login(username, password).await;
            },
            SessionInput::Logout => self.logout().await,
            SessionInput::Quit => {},
        }
    }

    pub async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Turn(direction) => {
                self.game.turn(direction);
            },
            Command::TogglePause => {
                if self.game.toggle_pause() {
                    self.redraw().await;
                }
            },
            Command::Start => {
                if self.game.start() {
                    self.start_timer();
                    self.redraw().await;
                }
            },
            Command::Reset => {
                self.stop_timer();
                self.game.reset();
                self.redraw().await;
            },
        }
    }

    /// Advance one step and draw. A game over stops the timer and, for a
    /// signed-in player with a positive score, submits it in the background.
    pub async fn on_tick(&mut self) {
        let events = self.game.tick();
        for event in events {
            if let GameEvent::GameOver { final_score, .. } = event {
                self.stop_timer();
                self.submit_final_score(final_score).await;
            }
        }
        if self.game.mode() != RunMode::Idle {
            self.redraw().await;
        }
    }

    /// Wait for every background task and apply what they reported,
    /// including tasks spawned while doing so.
    pub async fn settle(&mut self) {
        loop {
            let handles: Vec<_> = self.pending.drain(..).collect();
            for handle in handles {
                if let Err(e) = handle.await {
                    tracing::warn!(error = %e, "Background task failed");
                }
            }
            let mut applied = false;
            while let Ok(event) = self.events_rx.try_recv() {
                self.apply_event(event).await;
                applied = true;
            }
            if !applied && self.pending.is_empty() {
                break;
            }
        }
    }

    async fn shutdown(&mut self) {
        let mut aborts: Vec<_> = self.pending.iter().map(JoinHandle::abort_handle).collect();
        if tokio::time::timeout(SHUTDOWN_GRACE, self.settle()).await.is_err() {
            aborts.extend(self.pending.drain(..).map(|h| h.abort_handle()));
            tracing::warn!(tasks = aborts.len(), "Abandoning requests still in flight");
            for abort in aborts {
                abort.abort();
            }
        }
    }

    async fn apply_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::DisplayChanged => self.redraw().await,
            SessionEvent::SignedIn { user, epoch } => self.sign_in(user, epoch).await,
        }
    }

    async fn housekeep(&mut self) {
        let now = Instant::now();
        let elapsed = now - self.last_prune;
        self.last_prune = now;
        self.pending.retain(|h| !h.is_finished());

        let changed = self.display.lock().await.messages.prune(elapsed);
        if changed {
            self.redraw().await;
        }
    }

    fn start_timer(&mut self) {
        self.stop_timer();
        self.timer = Some(TickTimer::start(self.tick_interval, self.tick_tx.clone()));
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        // Ticks already queued belong to the cancelled timer
        while self.tick_rx.try_recv().is_ok() {}
    }

    async fn current_epoch(&self) -> u64 {
        self.display.lock().await.epoch
    }

    async fn submit_final_score(&mut self, score: u32) {
        let Some(user) = self.user.clone() else {
            tracing::debug!(score, "Not signed in, score not submitted");
            return;
        };
        if score == 0 {
            return;
        }
        let epoch = self.current_epoch().await;
        let service = Arc::clone(&self.service);
        let notifier = self.notifier();
        let limit = self.leaderboard_limit;
        self.pending.push(tokio::spawn(async move {
            match service.submit_score(&user.id, &user.username, score).await {
                Ok(()) => {
                    tracing::info!(score, username = %user.username, "Score submitted");
                    refresh_scores(&*service, &notifier.display, &user.id, limit, epoch).await;
                    notifier
                        .push(MessageKind::Success, score_saved_text(score))
                        .await;
                },
                Err(e) => {
                    tracing::warn!(score, error = %e, "Failed to submit score");
                    notifier
                        .push(MessageKind::Error, SCORE_SAVE_ERROR_TEXT)
                        .await;
                },
            }
        }));
    }

    /// Attach a signed-in user if nobody signed in or out since the login
    /// started, then load their best score and the leaderboard.
    async fn sign_in(&mut self, user: User, epoch: u64) {
        let epoch = {
            let mut display = self.display.lock().await;
            if display.epoch != epoch {
                tracing::debug!(username = %user.username, "Stale login result dropped");
                return;
            }
            display.epoch += 1;
            display.scoreboard.clear();
            display.messages.success(welcome_text(&user.username));
            display.epoch
        };

        let service = Arc::clone(&self.service);
        let notifier = self.notifier();
        let limit = self.leaderboard_limit;
        let user_id = user.id.clone();
        self.pending.push(tokio::spawn(async move {
            refresh_scores(&*service, &notifier.display, &user_id, limit, epoch).await;
            notifier.changed();
        }));

        self.user = Some(user);
        self.redraw().await;
    }

    async fn login(&mut self, username: String, password: String) {
        let epoch = self.current_epoch().await;
        let service = Arc::clone(&self.service);
        let notifier = self.notifier();
        self.pending.push(tokio::spawn(async move {
            match service.login(&username, &password).await {
                Ok(user) => notifier.signed_in(user, epoch),
                Err(e) => {
                    tracing::warn!(username = %username, error = %e, "Login failed");
                    notifier
                        .push(MessageKind::Error, failure_text(&e, "Erro ao fazer login"))
                        .await;
                },
            }
        }));
    }

    fn register(&mut self, username: String, password: String) {
        let service = Arc::clone(&self.service);
        let notifier = self.notifier();
        self.pending.push(tokio::spawn(async move {
            match service.register(&username, &password).await {
                Ok(()) => notifier.push(MessageKind::Success, REGISTERED_TEXT).await,
                Err(e) => {
                    tracing::warn!(username = %username, error = %e, "Registration failed");
                    notifier
                        .push(MessageKind::Error, failure_text(&e, "Erro ao registrar"))
                        .await;
                },
            }
        }));
    }

    /// Drop the signed-in user and start over with a fresh game. Score
    /// results still in flight for the old user are discarded.
    pub async fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            tracing::info!(username = %user.username, "Logged out");
        }
        {
            let mut display = self.display.lock().await;
            display.epoch += 1;
            display.scoreboard.clear();
        }
        self.stop_timer();
        self.game.reset();
        self.redraw().await;
    }
}

/// Reload best score and leaderboard into `display`, unless the session
/// has moved past `epoch` meanwhile. Failures are logged and shown on the
/// scoreboard; they are never fatal.
async fn refresh_scores<S: ScoreService>(
    service: &S,
    display: &SharedDisplay,
    user_id: &UserId,
    limit: u32,
    epoch: u64,
) {
    let best = service.fetch_best_score(user_id).await;
    let leaderboard = service.fetch_leaderboard(limit).await;

    let mut display = display.lock().await;
    if display.epoch != epoch {
        tracing::debug!(%user_id, "Session changed, score refresh dropped");
        return;
    }
    match best {
        Ok(score) => display.scoreboard.set_best_score(score),
        Err(e) => tracing::warn!(%user_id, error = %e, "Failed to load best score"),
    }
    match leaderboard {
        Ok(entries) => display.scoreboard.set_leaderboard(entries),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load leaderboard");
            display.scoreboard.leaderboard_failed();
        },
    }
}

/// User-facing text for a failed account call.
fn failure_text(error: &ClientError, fallback: &str) -> String {
    match error {
        ClientError::Validation(m) => m.clone(),
        ClientError::Network(m) => connection_error_text(m),
        ClientError::Service { .. } => error
            .service_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string()),
    }
}
