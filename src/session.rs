//! Game session: current/next piece, scoring, levels, drop timer and the command surface.

use crate::config::{ConfigError, GameConfig};
use crate::grid::Grid;
use crate::piece::Piece;
use crate::randomizer::Randomizer;
use crate::shapes::ShapeKind;

/// Points for clearing 0..=4 rows in one lock. Counts past the table award nothing.
pub const LINE_CLEAR_POINTS: [u32; 5] = [0, 100, 300, 500, 800];

/// Score per row travelled by a hard drop.
pub const HARD_DROP_BONUS_PER_ROW: u32 = 2;

/// Lines needed per level.
pub const LINES_PER_LEVEL: u32 = 10;

/// Table lookup; a miss (more than four rows) is worth 0.
pub fn line_clear_points(cleared: u32) -> u32 {
    LINE_CLEAR_POINTS
        .get(cleared as usize)
        .copied()
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Pair dealt, timer idle.
    Ready,
    Running,
    Paused,
    /// Terminal until `reset`.
    GameOver,
}

/// What triggered an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateEvent {
    Reset,
    Started,
    Paused,
    Resumed,
    Moved,
    Rotated,
    Dropped,
    /// Piece committed to the grid; sent before rows are cleared and scored.
    Placed,
    /// Lock finished: rows cleared, score updated, next piece dealt.
    Locked,
    GameOver,
}

/// State snapshot sent to observers after every state-affecting operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Update {
    pub event: UpdateEvent,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub paused: bool,
    pub game_over: bool,
    pub placed: bool,
    /// Rows cleared by the lock that produced this update.
    pub cleared: Option<u32>,
}

/// Receives session updates in emission order. An `Err` is swallowed by the session.
pub trait Observer {
    fn on_update(&mut self, update: &Update) -> anyhow::Result<()>;
}

impl<F> Observer for F
where
    F: FnMut(&Update) -> anyhow::Result<()>,
{
    fn on_update(&mut self, update: &Update) -> anyhow::Result<()> {
        self(update)
    }
}

/// Read-only state for the renderer.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    pub grid: &'a Grid,
    pub current: &'a Piece,
    pub next: &'a Piece,
}

/// One game: owns the grid, the piece pair and the randomizer.
pub struct Session {
    config: GameConfig,
    grid: Grid,
    randomizer: Randomizer,
    current: Piece,
    next: Piece,
    score: u32,
    level: u32,
    lines: u32,
    pieces: u32,
    last_cleared: u32,
    drop_interval_ms: u32,
    drop_accumulator_ms: u64,
    phase: Phase,
    observers: Vec<Box<dyn Observer>>,
    observer_faults: u64,
}

impl Session {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let randomizer = Randomizer::new(&config)?;
        Ok(Self::with_randomizer(config, randomizer))
    }

    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        let randomizer = Randomizer::with_seed(&config, seed)?;
        Ok(Self::with_randomizer(config, randomizer))
    }

    /// `randomizer` must have been built from `config` (validation happens there).
    fn with_randomizer(config: GameConfig, mut randomizer: Randomizer) -> Self {
        let current = randomizer.next_piece();
        let next = randomizer.next_piece();
        Self {
            grid: Grid::new(config.rows, config.cols),
            drop_interval_ms: config.base_drop_ms,
            config,
            randomizer,
            current,
            next,
            score: 0,
            level: 1,
            lines: 0,
            pieces: 0,
            last_cleared: 0,
            drop_accumulator_ms: 0,
            phase: Phase::Ready,
            observers: Vec::new(),
            observer_faults: 0,
        }
    }

    pub fn subscribe(&mut self, observer: impl Observer + 'static) {
        self.observers.push(Box::new(observer));
    }

    // --- Queries ---

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn view(&self) -> View<'_> {
        View {
            grid: &self.grid,
            current: &self.current,
            next: &self.next,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn current(&self) -> &Piece {
        &self.current
    }

    pub fn next(&self) -> &Piece {
        &self.next
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    /// Pieces locked since the last reset.
    pub fn pieces(&self) -> u32 {
        self.pieces
    }

    /// Rows cleared by the most recent lock.
    pub fn last_cleared(&self) -> u32 {
        self.last_cleared
    }

    pub fn drop_interval_ms(&self) -> u32 {
        self.drop_interval_ms
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Observer calls that returned an error.
    pub fn observer_faults(&self) -> u64 {
        self.observer_faults
    }

    // --- Lifecycle ---

    /// Empty grid, zeroed counters, fresh pair. Leaves the session `Ready`.
    pub fn reset(&mut self) {
        self.grid.reset();
        self.score = 0;
        self.lines = 0;
        self.level = 1;
        self.pieces = 0;
        self.last_cleared = 0;
        self.drop_interval_ms = self.config.base_drop_ms;
        self.drop_accumulator_ms = 0;
        self.current = self.randomizer.next_piece();
        self.next = self.randomizer.next_piece();
        self.phase = Phase::Ready;
        self.notify(UpdateEvent::Reset, None);
    }

    pub fn start(&mut self) {
        self.reset();
        self.phase = Phase::Running;
        self.notify(UpdateEvent::Started, None);
    }

    /// Toggle between running and paused. No effect before start or after game over.
    pub fn pause(&mut self) {
        let event = match self.phase {
            Phase::Running => {
                self.phase = Phase::Paused;
                UpdateEvent::Paused
            }
            Phase::Paused => {
                self.phase = Phase::Running;
                UpdateEvent::Resumed
            }
            Phase::Ready | Phase::GameOver => return,
        };
        self.notify(event, None);
    }

    /// Feed elapsed time. Drops once when the accumulator passes the interval; the excess is
    /// discarded rather than caught up.
    pub fn tick(&mut self, delta_ms: u32) {
        if self.phase != Phase::Running {
            return;
        }
        self.drop_accumulator_ms += u64::from(delta_ms);
        if self.drop_accumulator_ms > u64::from(self.drop_interval_ms) {
            self.drop_step();
            self.drop_accumulator_ms = 0;
        }
    }

    // --- Commands ---

    /// Shift the piece `dx` columns. Returns false (and changes nothing) if blocked.
    pub fn move_horizontal(&mut self, dx: i32) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        let nx = self.current.x + dx;
        if self.grid.collides(&self.current.matrix, nx, self.current.y) {
            return false;
        }
        self.current.x = nx;
        self.notify(UpdateEvent::Moved, None);
        true
    }

    pub fn move_left(&mut self) -> bool {
        self.move_horizontal(-1)
    }

    pub fn move_right(&mut self) -> bool {
        self.move_horizontal(1)
    }

    /// Rotate clockwise in place; rejected outright if the result collides (no kicks).
    pub fn rotate_current(&mut self) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        let rotated = self.current.matrix.rotated();
        if self.grid.collides(&rotated, self.current.x, self.current.y) {
            return false;
        }
        self.current.matrix = rotated;
        self.notify(UpdateEvent::Rotated, None);
        true
    }

    /// One row down, or lock if the piece is resting.
    pub fn soft_drop(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        self.drop_step();
    }

    /// Fall to the lowest free row (+2 per row), then lock.
    pub fn hard_drop(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        while !self.grid.collides(&self.current.matrix, self.current.x, self.current.y + 1) {
            self.current.y += 1;
            self.score = self.score.saturating_add(HARD_DROP_BONUS_PER_ROW);
        }
        self.drop_step();
    }

    // --- Internals ---

    fn drop_step(&mut self) {
        if self.grid.collides(&self.current.matrix, self.current.x, self.current.y + 1) {
            self.lock_piece();
        } else {
            self.current.y += 1;
            self.notify(UpdateEvent::Dropped, None);
        }
    }

    fn lock_piece(&mut self) {
        let piece = &self.current;
        let sunk = if piece.kind.is_special() {
            self.sink_target(piece)
        } else {
            None
        };
        match sunk {
            Some((x, y)) => self.grid.set(x, y, Some(piece.kind)),
            None => self.grid.merge(&piece.matrix, piece.x, piece.y, piece.kind),
        }
        self.pieces = self.pieces.saturating_add(1);
        self.notify(UpdateEvent::Placed, Some(0));

        let cleared = self.grid.clear_full_rows();
        self.last_cleared = cleared;
        self.score = self.score.saturating_add(line_clear_points(cleared));
        self.lines = self.lines.saturating_add(cleared);
        let level = self.lines / LINES_PER_LEVEL + 1;
        if level != self.level {
            self.level = level;
            self.drop_interval_ms = self.interval_for_level(level);
        }

        let next = self.randomizer.next_piece();
        self.current = std::mem::replace(&mut self.next, next);

        if self.grid.collides(&self.current.matrix, self.current.x, self.current.y) {
            self.phase = Phase::GameOver;
            self.notify(UpdateEvent::GameOver, Some(cleared));
        } else {
            self.notify(UpdateEvent::Locked, Some(cleared));
        }
    }

    /// DOT placement: lowest empty cell in its column, if the column has one.
    fn sink_target(&self, piece: &Piece) -> Option<(usize, usize)> {
        let (x, _) = piece.cells().next()?;
        let x = usize::try_from(x).ok()?;
        self.grid.lowest_empty_in_column(x).map(|y| (x, y))
    }

    fn interval_for_level(&self, level: u32) -> u32 {
        let step = level.saturating_sub(1).saturating_mul(self.config.drop_step_ms);
        self.config
            .base_drop_ms
            .saturating_sub(step)
            .max(self.config.min_drop_ms)
    }

    fn notify(&mut self, event: UpdateEvent, cleared: Option<u32>) {
        let update = Update {
            event,
            score: self.score,
            level: self.level,
            lines: self.lines,
            paused: self.phase == Phase::Paused,
            game_over: self.phase == Phase::GameOver,
            placed: event == UpdateEvent::Placed,
            cleared,
        };
        for observer in &mut self.observers {
            if observer.on_update(&update).is_err() {
                self.observer_faults += 1;
            }
        }
    }

    #[cfg(test)]
    fn force_current(&mut self, kind: ShapeKind, x: i32, y: i32) {
        let mut piece = self.randomizer.create_piece(kind);
        piece.x = x;
        piece.y = y;
        self.current = piece;
    }

    #[cfg(test)]
    fn force_next(&mut self, kind: ShapeKind) {
        self.next = self.randomizer.create_piece(kind);
    }
}

/// `ShapeKind` of the piece the renderer should draw at `(x, y)`, if the current piece covers it.
pub fn piece_at(piece: &Piece, x: i32, y: i32) -> Option<ShapeKind> {
    piece.cells().any(|c| c == (x, y)).then_some(piece.kind)
}
