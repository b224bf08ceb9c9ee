//! App: terminal init, main loop, tick and key handling.

use crate::Args;
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use polyfall::highscores::Leaderboard;
use polyfall::{GameConfig, Session, Update, UpdateEvent};
use ratatui::DefaultTerminal;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tachyonfx::Effect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    GameOver,
}

/// Outcome of the last finished game, for the game-over screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameOverInfo {
    /// 0-based leaderboard rank, if the score made the board.
    pub rank: Option<usize>,
    pub save_error: Option<String>,
}

pub struct App {
    args: Args,
    theme: Theme,
    session: Session,
    updates: Receiver<Update>,
    screen: Screen,
    leaderboard: Leaderboard,
    game_over: GameOverInfo,
    last_frame: Instant,
    /// Reference point for the DOT blink.
    blink_epoch: Instant,
    /// Set when a lock cleared rows; the UI turns it into a fade effect.
    flash_pending: bool,
    /// TachyonFX flash over the board after a line clear.
    line_clear_effect: Option<Effect>,
    /// Last time we processed the line-clear effect (for delta).
    line_clear_effect_process_time: Option<Instant>,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl App {
    pub fn new(args: Args, config: GameConfig, theme: Theme) -> Result<Self> {
        let mut session = match args.seed {
            Some(seed) => Session::with_seed(config, seed),
            None => Session::new(config),
        }
        .context("building game session")?;
        let (tx, updates) = mpsc::channel();
        session.subscribe(move |u: &Update| -> Result<()> {
            tx.send(*u)?;
            Ok(())
        });
        let now = Instant::now();
        Ok(Self {
            args,
            theme,
            session,
            updates,
            screen: Screen::Playing,
            leaderboard: Leaderboard::load(),
            game_over: GameOverInfo::default(),
            last_frame: now,
            blink_epoch: now,
            flash_pending: false,
            line_clear_effect: None,
            line_clear_effect_process_time: None,
        })
    }

    fn restart(&mut self) {
        self.session.start();
        self.screen = Screen::Playing;
        self.game_over = GameOverInfo::default();
        self.flash_pending = false;
        self.line_clear_effect = None;
        self.line_clear_effect_process_time = None;
        self.last_frame = Instant::now();
    }

    fn apply_action(&mut self, action: Action) {
        match action {
            Action::MoveLeft => {
                self.session.move_left();
            }
            Action::MoveRight => {
                self.session.move_right();
            }
            Action::Rotate => {
                self.session.rotate_current();
            }
            Action::SoftDrop => self.session.soft_drop(),
            Action::HardDrop => self.session.hard_drop(),
            Action::Pause => self.session.pause(),
            Action::Restart | Action::Quit | Action::None => {}
        }
    }

    /// React to session updates in emission order.
    fn drain_updates(&mut self) {
        while let Ok(update) = self.updates.try_recv() {
            let cleared = update.cleared.unwrap_or(0);
            if cleared > 0 && matches!(update.event, UpdateEvent::Locked | UpdateEvent::GameOver) {
                self.flash_pending = true;
                self.line_clear_effect = None;
                self.line_clear_effect_process_time = None;
            }
            if update.event == UpdateEvent::GameOver {
                self.finish_game(update.score);
            }
        }
    }

    fn finish_game(&mut self, score: u32) {
        self.screen = Screen::GameOver;
        let rank = self.leaderboard.record(&self.args.name, score, unix_now());
        let save_error = rank
            .and_then(|_| self.leaderboard.save().err())
            .map(|e| e.to_string());
        self.game_over = GameOverInfo { rank, save_error };
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let mut terminal = ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        self.restart();
        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / self.args.frame_rate.clamp(1.0, 240.0));
        loop {
            let now = Instant::now();
            let delta = now.duration_since(self.last_frame);
            self.last_frame = now;
            if self.screen == Screen::Playing {
                let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
                self.session.tick(delta_ms);
            }
            self.drain_updates();

            let blink_on = crate::ui::blink_visible(now.duration_since(self.blink_epoch));
            let flash = std::mem::take(&mut self.flash_pending) && !self.args.no_animation;
            terminal.draw(|f| {
                crate::ui::draw(
                    f,
                    self.screen,
                    &self.session,
                    &self.theme,
                    &self.leaderboard,
                    &self.game_over,
                    blink_on,
                    flash,
                    &mut self.line_clear_effect,
                    &mut self.line_clear_effect_process_time,
                    now,
                )
            })?;

            if self.line_clear_effect.as_ref().is_some_and(|e| e.done()) {
                self.line_clear_effect = None;
                self.line_clear_effect_process_time = None;
            }

            let timeout = frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    let Event::Key(key) = event::read()? else {
                        continue;
                    };
                    // Terminals without release reporting send Press (and Repeat when held).
                    if key.kind == KeyEventKind::Release {
                        continue;
                    }
                    let action = key_to_action(key);
                    match (self.screen, action) {
                        (_, Action::Quit) => return Ok(()),
                        (_, Action::Restart) => self.restart(),
                        (Screen::Playing, action) => self.apply_action(action),
                        (Screen::GameOver, _) => {}
                    }
                }
                self.drain_updates();
            }
        }
    }
}
