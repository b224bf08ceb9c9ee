//! Layout and drawing: playfield, next preview, stats sidebar, pause and game-over popups.

use crate::app::{GameOverInfo, Screen};
use crate::theme::Theme;
use polyfall::highscores::Leaderboard;
use polyfall::session::piece_at;
use polyfall::{GameConfig, Piece, Session};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use std::time::{Duration, Instant};
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Each grid cell is two terminal columns wide so cells look square.
const CELL_WIDTH: u16 = 2;
const CELL_HEIGHT: u16 = 1;

const SIDEBAR_WIDTH: u16 = 26;

/// The DOT is drawn on alternate 250 ms windows while it falls.
pub const BLINK_PERIOD_MS: u128 = 250;

/// Duration of the line-clear flash (TachyonFX).
const LINE_CLEAR_FADE_MS: u32 = 300;

/// Next preview box, in cells.
const NEXT_PREVIEW_CELLS: u16 = 4;

/// True on even 250 ms windows since `elapsed` started counting.
pub fn blink_visible(elapsed: Duration) -> bool {
    (elapsed.as_millis() / BLINK_PERIOD_MS) % 2 == 0
}

/// Playfield size in terminal cells (border + grid).
fn playfield_outer_size(rows: usize, cols: usize) -> (u16, u16) {
    let cells = |n: usize, unit: u16| {
        u16::try_from(n)
            .unwrap_or(u16::MAX)
            .saturating_mul(unit)
            .saturating_add(2)
    };
    (cells(cols, CELL_WIDTH), cells(rows, CELL_HEIGHT))
}

/// Draw current screen; the game-over popup sits on top of the final board.
/// When `flash` is set, starts a fresh line-clear effect.
pub fn draw(
    frame: &mut Frame,
    screen: Screen,
    session: &Session,
    theme: &Theme,
    leaderboard: &Leaderboard,
    game_over: &GameOverInfo,
    blink_on: bool,
    flash: bool,
    line_clear_effect: &mut Option<Effect>,
    line_clear_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let area = frame.area();
    let board = draw_game(frame, session, theme, leaderboard, area, blink_on);
    if flash {
        *line_clear_effect = None;
        *line_clear_process_time = None;
    }
    if flash || line_clear_effect.is_some() {
        apply_line_clear_effect(frame, theme, board, line_clear_effect, line_clear_process_time, now);
    }
    match screen {
        Screen::Playing if session.is_paused() => draw_pause_overlay(frame, theme, area),
        Screen::Playing => {}
        Screen::GameOver => draw_game_over(frame, session, theme, leaderboard, game_over, area),
    }
}

/// Create or advance the flash effect over the board (fade from white back to the cells).
fn apply_line_clear_effect(
    frame: &mut Frame,
    theme: &Theme,
    board_rect: Rect,
    line_clear_effect: &mut Option<Effect>,
    line_clear_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let delta = line_clear_process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    let tfx_delta = TfxDuration::from_millis(delta_ms);
    *line_clear_process_time = Some(now);

    if line_clear_effect.is_none() {
        let effect = fx::fade_from(Color::White, theme.main_fg, (LINE_CLEAR_FADE_MS, Interpolation::Linear))
            .with_area(board_rect);
        *line_clear_effect = Some(effect);
    }

    if let Some(effect) = line_clear_effect {
        frame.render_effect(effect, board_rect, tfx_delta);
    }
}

/// Draw playfield + sidebar centred in `area`. Returns the inner board rect.
fn draw_game(
    frame: &mut Frame,
    session: &Session,
    theme: &Theme,
    leaderboard: &Leaderboard,
    area: Rect,
    blink_on: bool,
) -> Rect {
    let grid = session.grid();
    let (pw, ph) = playfield_outer_size(grid.rows(), grid.cols());
    let total_w = pw.saturating_add(SIDEBAR_WIDTH);

    let horiz_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(ph),
            Constraint::Fill(1),
        ])
        .split(horiz_chunks[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert_chunks[1]);

    let board = draw_playfield(frame, session, theme, inner[0], blink_on);
    draw_sidebar(frame, session, theme, leaderboard, inner[1]);
    board
}

fn draw_playfield(frame: &mut Frame, session: &Session, theme: &Theme, area: Rect, blink_on: bool) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Polyfall ", theme.title));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let view = session.view();
    let current = view.current;
    let show_current = !current.kind.is_special() || blink_on;
    let buf = frame.buffer_mut();

    for y in 0..view.grid.rows() {
        for x in 0..view.grid.cols() {
            let (Ok(cx), Ok(cy)) = (u16::try_from(x), u16::try_from(y)) else {
                continue;
            };
            let rx = inner.x.saturating_add(cx.saturating_mul(CELL_WIDTH));
            let ry = inner.y.saturating_add(cy.saturating_mul(CELL_HEIGHT));
            if rx.saturating_add(CELL_WIDTH) > inner.right() || ry >= inner.bottom() {
                continue;
            }
            let falling = show_current
                .then(|| piece_at(current, x as i32, y as i32))
                .flatten();
            let (symbol, style) = match falling.or(view.grid.get(x, y)) {
                Some(kind) => {
                    let c = theme.piece_color(kind);
                    ("██", Style::default().fg(c).bg(theme.bg))
                }
                None => (" ·", Style::default().fg(theme.div_line).bg(theme.bg)),
            };
            buf.set_string(rx, ry, symbol, style);
        }
    }
    inner
}

fn draw_sidebar(frame: &mut Frame, session: &Session, theme: &Theme, leaderboard: &Leaderboard, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(NEXT_PREVIEW_CELLS + 3), // Next (border + title + preview)
            Constraint::Length(1),                      // gap
            Constraint::Length(10),                     // Stats
            Constraint::Length(1),                      // gap
            Constraint::Min(0),                         // Controls
        ])
        .split(area);

    // --- Next ---
    let next_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let next_inner = next_block.inner(chunks[0]);
    next_block.render(chunks[0], frame.buffer_mut());
    let next_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(NEXT_PREVIEW_CELLS)])
        .split(next_inner);
    Paragraph::new(Line::from(Span::styled("Next", title_style))).render(next_layout[0], frame.buffer_mut());
    draw_next_preview(frame, theme, session.next(), next_layout[1]);

    // --- Stats ---
    let stats_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let stats_inner = stats_block.inner(chunks[2]);
    stats_block.render(chunks[2], frame.buffer_mut());
    let stat = |label: &'static str, value: String| {
        Line::from(vec![Span::styled(label, title_style), Span::styled(value, fg_style)])
    };
    let mut stats_lines = vec![
        stat("Score: ", session.score().to_string()),
        stat("Best:  ", leaderboard.best().max(session.score()).to_string()),
        stat("Level: ", session.level().to_string()),
        stat("Lines: ", session.lines().to_string()),
        stat("Pieces: ", session.pieces().to_string()),
        stat("Drop:  ", format!("{} ms", session.drop_interval_ms())),
        stat("DOT:   ", dot_label(session.config())),
    ];
    if session.observer_faults() > 0 {
        stats_lines.push(Line::from(Span::styled(
            format!("Dropped updates: {}", session.observer_faults()),
            Style::default().fg(Color::Red),
        )));
    }
    Paragraph::new(ratatui::text::Text::from(stats_lines)).render(stats_inner, frame.buffer_mut());

    // --- Controls ---
    let hint = Style::default().fg(theme.inactive_fg);
    let controls = vec![
        Line::from(Span::styled("←/→ move   ↑ rotate", hint)),
        Line::from(Span::styled("↓ soft   Space hard", hint)),
        Line::from(Span::styled("P pause  R restart", hint)),
        Line::from(Span::styled("Q quit", hint)),
    ];
    Paragraph::new(controls).render(chunks[4], frame.buffer_mut());
}

/// Next piece centred in a 4×4 box.
fn draw_next_preview(frame: &mut Frame, theme: &Theme, piece: &Piece, area: Rect) {
    let n = piece.matrix.size() as u16;
    let pad_x = NEXT_PREVIEW_CELLS.saturating_sub(n) / 2;
    let pad_y = NEXT_PREVIEW_CELLS.saturating_sub(n) / 2;
    let color = theme.piece_color(piece.kind);
    let buf = frame.buffer_mut();
    for (r, c) in piece.matrix.filled_cells() {
        let rx = area.x + (pad_x + c as u16) * CELL_WIDTH;
        let ry = area.y + (pad_y + r as u16) * CELL_HEIGHT;
        if rx + CELL_WIDTH <= area.x + area.width && ry < area.y + area.height {
            buf.set_string(rx, ry, "██", Style::default().fg(color));
        }
    }
}

fn centered_popup(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered_popup(area, 28, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(" Paused ", Style::default().fg(Color::Black).bg(Color::Yellow))),
        Line::from(""),
        Line::from(Span::styled(" P: Resume    Q: Quit ", Style::default().fg(theme.main_fg))),
    ];
    Clear.render(popup, frame.buffer_mut());
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );
    p.render(popup, frame.buffer_mut());
}

fn draw_game_over(
    frame: &mut Frame,
    session: &Session,
    theme: &Theme,
    leaderboard: &Leaderboard,
    info: &GameOverInfo,
    area: Rect,
) {
    let shown = 5;
    let popup = centered_popup(area, 34, 14 + shown as u16);
    let fg = Style::default().fg(theme.main_fg);
    let mut lines: Vec<Line> = vec![
        Line::from(""),
        Line::from(Span::styled(" Game Over ", Style::default().fg(Color::White).bg(Color::Red))),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {} ", session.score()), fg)),
        Line::from(Span::styled(format!(" Lines: {}  Level: {} ", session.lines(), session.level()), fg)),
    ];
    match info.rank {
        Some(0) => lines.push(Line::from(Span::styled(" New record! ", Style::default().fg(Color::Yellow).bold()))),
        Some(rank) => lines.push(Line::from(Span::styled(format!(" Leaderboard #{} ", rank + 1), fg))),
        None => lines.push(Line::from("")),
    }
    if let Some(err) = &info.save_error {
        lines.push(Line::from(Span::styled(
            format!(" Not saved: {err} "),
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" High scores ", Style::default().fg(theme.title))));
    if leaderboard.is_empty() {
        lines.push(Line::from(Span::styled(" none yet ", Style::default().fg(theme.inactive_fg))));
    }
    for (i, e) in leaderboard.top(shown).iter().enumerate() {
        let style = if info.rank == Some(i) {
            Style::default().fg(theme.title).bold()
        } else {
            fg
        };
        lines.push(Line::from(Span::styled(
            format!(" {:>2}. {:<14} {:>7} ", i + 1, truncate(&e.name, 14), e.score),
            style,
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" R: Restart    Q: Quit ", fg)));
    Clear.render(popup, frame.buffer_mut());
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
            .title(Span::styled(" Polyfall ", theme.title)),
    );
    p.render(popup, frame.buffer_mut());
}

/// Sidebar text for the DOT injection rate.
fn dot_label(config: &GameConfig) -> String {
    if config.special_enabled() {
        format!("{:.0}%", config.special_probability * 100.0)
    } else {
        "off".to_string()
    }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blink_alternates_every_250ms() {
        assert!(blink_visible(Duration::from_millis(0)));
        assert!(blink_visible(Duration::from_millis(249)));
        assert!(!blink_visible(Duration::from_millis(250)));
        assert!(!blink_visible(Duration::from_millis(499)));
        assert!(blink_visible(Duration::from_millis(500)));
    }

    #[test]
    fn test_playfield_size_includes_border() {
        assert_eq!(playfield_outer_size(20, 10), (22, 22));
    }

    #[test]
    fn test_playfield_size_saturates_for_huge_grids() {
        assert_eq!(playfield_outer_size(70_000, 40_000), (u16::MAX, u16::MAX));
    }

    #[test]
    fn test_dot_label_follows_shape_set() {
        assert_eq!(dot_label(&GameConfig::default()), "off");
        assert_eq!(dot_label(&GameConfig::new(true, 0.05)), "5%");
    }

    #[test]
    fn test_truncate_names() {
        assert_eq!(truncate("abcdefghijklmnopq", 14), "abcdefghijklmn");
        assert_eq!(truncate("ana", 14), "ana");
    }
}
