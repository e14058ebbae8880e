//! Layout and drawing: board, sidebar HUD, pause overlay, game over popup.

use crate::app::Screen;
use crate::game::{
    COFFEE_BOOST_TICKS, EffectKind, GHOST_TICKS, GameState, PowerupKind,
};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Each grid cell is 2 terminal cells wide, 1 tall (roughly square on screen).
const CELL_WIDTH: u16 = 2;
const CELL_HEIGHT: u16 = 1;

const SIDEBAR_WIDTH: u16 = 26;

/// Duration of the board fade when the session ends (TachyonFX), in ms.
const GAME_OVER_FADE_MS: u32 = 600;

/// Board size in terminal cells (border + grid) for given grid dimensions.
fn board_pixel_size(cols: u16, rows: u16) -> (u16, u16) {
    (cols * CELL_WIDTH + 2, rows * CELL_HEIGHT + 2)
}

/// Max grid size (cols, rows) that fits in the given terminal size, so the
/// board plus border plus sidebar always fit on screen.
pub fn max_grid_cells_for_terminal(term_cols: u16, term_rows: u16) -> (u16, u16) {
    let max_w = term_cols.saturating_sub(2).saturating_sub(SIDEBAR_WIDTH);
    let max_h = term_rows.saturating_sub(2);
    (max_w / CELL_WIDTH, max_h / CELL_HEIGHT)
}

/// Grid size that fits the terminal: requested size clamped down, never below 1.
pub fn grid_size_for_terminal_clamped(
    requested_cols: u16,
    requested_rows: u16,
    term_cols: u16,
    term_rows: u16,
) -> (u16, u16) {
    let (max_c, max_r) = max_grid_cells_for_terminal(term_cols, term_rows);
    (
        requested_cols.min(max_c).max(1),
        requested_rows.min(max_r).max(1),
    )
}

/// Board inner rect (grid only, no border) for given area and state; matches
/// the draw_game layout.
fn board_rect(area: Rect, state: &GameState) -> Rect {
    let (pw, ph) = board_pixel_size(state.grid.cols, state.grid.rows);
    let total_w = pw + SIDEBAR_WIDTH;
    let x = area.x + area.width.saturating_sub(total_w) / 2;
    let y = area.y + area.height.saturating_sub(ph) / 2;
    let outer = Rect {
        x,
        y,
        width: pw.min(area.width),
        height: ph.min(area.height),
    };
    Rect {
        x: outer.x + 1,
        y: outer.y + 1,
        width: (state.grid.cols * CELL_WIDTH).min(outer.width.saturating_sub(2)),
        height: (state.grid.rows * CELL_HEIGHT).min(outer.height.saturating_sub(2)),
    }
}

/// Create or update the game-over fade and process it (TachyonFX: fade the
/// whole board towards the background).
fn apply_game_over_effect(
    frame: &mut Frame,
    state: &GameState,
    theme: &Theme,
    area: Rect,
    effect: &mut Option<Effect>,
    process_time: &mut Option<Instant>,
    now: Instant,
) {
    let rect = board_rect(area, state);
    let delta = process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u128::from(u32::MAX)) as u32;
    let tfx_delta = TfxDuration::from_millis(delta_ms);
    *process_time = Some(now);

    if effect.is_none() {
        let bg = theme.bg;
        *effect = Some(
            fx::fade_to(bg, bg, (GAME_OVER_FADE_MS, Interpolation::Linear)).with_area(rect),
        );
    }
    if let Some(effect) = effect {
        frame.render_effect(effect, rect, tfx_delta);
    }
}

/// Draw current screen (game, game over), with pause overlay while the
/// session is paused. On game over the board fades via TachyonFX and a popup
/// shows the final score.
pub fn draw(
    frame: &mut Frame,
    screen: Screen,
    state: &GameState,
    theme: &Theme,
    area: Rect,
    game_over_effect: &mut Option<Effect>,
    game_over_process_time: &mut Option<Instant>,
    now: Instant,
    new_high_score: bool,
) {
    match screen {
        Screen::Playing => {
            draw_game(frame, state, theme, area);
            if !state.playing {
                draw_pause_overlay(frame, theme, area);
            }
        }
        Screen::GameOver => {
            draw_game(frame, state, theme, area);
            apply_game_over_effect(
                frame,
                state,
                theme,
                area,
                game_over_effect,
                game_over_process_time,
                now,
            );
            draw_game_over(frame, state, theme, area, new_high_score);
        }
    }
}

/// Draw game: board + sidebar; use full area and center both.
fn draw_game(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect) {
    let (pw, ph) = board_pixel_size(state.grid.cols, state.grid.rows);
    let total_w = pw + SIDEBAR_WIDTH;

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(ph),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let active = vert[1];

    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(active);

    draw_board(frame, state, theme, inner[0]);
    draw_sidebar(frame, state, theme, inner[1]);
}

fn draw_board(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect) {
    let ghosted = state.effects.active(EffectKind::Ghost);
    let title = if ghosted {
        format!(" Serpentui  Lv {}  GHOST ", state.level)
    } else {
        format!(" Serpentui  Lv {} ", state.level)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(title, Style::default().fg(theme.title)));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let rect = Rect {
        x: inner.x,
        y: inner.y,
        width: (state.grid.cols * CELL_WIDTH).min(inner.width),
        height: (state.grid.rows * CELL_HEIGHT).min(inner.height),
    };

    let buf = frame.buffer_mut();
    let put = |buf: &mut ratatui::buffer::Buffer, x: u16, y: u16, sym: &str, style: Style| {
        let rx = rect.x + x * CELL_WIDTH;
        let ry = rect.y + y * CELL_HEIGHT;
        if rx + CELL_WIDTH <= rect.x + rect.width && ry < rect.y + rect.height {
            buf.set_string(rx, ry, sym, style);
        }
    };

    // Background first, entities layered on top, snake last so it always wins.
    let bg_style = Style::default().fg(theme.bg).bg(theme.bg);
    for y in 0..state.grid.rows {
        for x in 0..state.grid.cols {
            put(buf, x, y, "  ", bg_style);
        }
    }

    for pad in &state.boost_pads {
        put(
            buf,
            pad.x,
            pad.y,
            "▒▒",
            Style::default().fg(theme.boost_pad).bg(theme.bg),
        );
    }
    for obstacle in &state.obstacles {
        put(
            buf,
            obstacle.x,
            obstacle.y,
            "██",
            Style::default().fg(theme.obstacle).bg(theme.bg),
        );
    }
    for p in &state.powerups {
        let label = match p.kind {
            PowerupKind::Coffee => "C ",
            PowerupKind::Turkey => "T ",
            PowerupKind::Frame => "F ",
        };
        let color = theme.powerup_color(p.kind.color_index());
        put(
            buf,
            p.cell.x,
            p.cell.y,
            label,
            Style::default().fg(color).bg(theme.bg).bold(),
        );
    }
    if let Some(food) = state.food {
        put(
            buf,
            food.x,
            food.y,
            "● ",
            Style::default().fg(theme.food).bg(theme.bg).bold(),
        );
    }

    // Ghost mode renders the body translucent so the overlap reads on screen.
    let body_sym = if ghosted { "▓▓" } else { "██" };
    for (i, segment) in state.snake.iter().enumerate() {
        let (sym, color) = if i == 0 {
            ("██", theme.snake_head)
        } else {
            (body_sym, theme.snake_body)
        };
        put(
            buf,
            segment.x,
            segment.y,
            sym,
            Style::default().fg(color).bg(theme.bg),
        );
    }
}

fn draw_sidebar(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg = Style::default().fg(theme.main_fg);
    let dim = Style::default().fg(theme.inactive_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    // Sized so the whole sidebar fits beside the default 20-row board.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Stats (border + score, best, level, length, speed)
            Constraint::Length(1), // gap
            Constraint::Length(4), // Effects (border + two gauges)
            Constraint::Length(5), // Legend (border + three rows)
            Constraint::Length(5), // Controls (border + three rows)
            Constraint::Fill(1),
        ])
        .split(area);

    // --- Stats ---
    let stats = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(" Score  ", dim),
            Span::styled(format!("{}", state.score), fg),
        ]),
        Line::from(vec![
            Span::styled(" Best   ", dim),
            Span::styled(format!("{}", state.best), fg),
        ]),
        Line::from(vec![
            Span::styled(" Level  ", dim),
            Span::styled(format!("{}", state.level), fg),
        ]),
        Line::from(vec![
            Span::styled(" Length ", dim),
            Span::styled(format!("{}", state.snake.len()), fg),
        ]),
        Line::from(vec![
            Span::styled(" Speed  ", dim),
            Span::styled(format!("{}", state.speed()), fg),
        ]),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(Span::styled(" Stats ", title_style)),
    );
    stats.render(chunks[0], frame.buffer_mut());

    // --- Effects ---
    let effects_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(" Effects ", title_style));
    let effects_inner = effects_block.inner(chunks[2]);
    effects_block.render(chunks[2], frame.buffer_mut());
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(effects_inner);
    draw_effect_gauge(
        frame,
        rows[0],
        "ghost",
        state.effects.remaining(EffectKind::Ghost),
        GHOST_TICKS,
        theme.powerup_color(PowerupKind::Frame.color_index()),
        theme,
    );
    draw_effect_gauge(
        frame,
        rows[1],
        "boost",
        state.effects.remaining(EffectKind::Boost),
        COFFEE_BOOST_TICKS,
        theme.boost_pad,
        theme,
    );

    // --- Legend ---
    let legend = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(" ● ", Style::default().fg(theme.food)),
            Span::styled("food    ", fg),
            Span::styled("██ ", Style::default().fg(theme.obstacle)),
            Span::styled("wall", fg),
        ]),
        Line::from(vec![
            Span::styled(" ▒▒ ", Style::default().fg(theme.boost_pad)),
            Span::styled("pad     ", fg),
            Span::styled("C ", Style::default().fg(theme.powerups[0]).bold()),
            Span::styled("boost", fg),
        ]),
        Line::from(vec![
            Span::styled(" T ", Style::default().fg(theme.powerups[1]).bold()),
            Span::styled("+30     ", fg),
            Span::styled("F ", Style::default().fg(theme.powerups[2]).bold()),
            Span::styled("ghost", fg),
        ]),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(Span::styled(" Legend ", title_style)),
    );
    legend.render(chunks[3], frame.buffer_mut());

    // --- Controls ---
    let controls = Paragraph::new(vec![
        Line::from(Span::styled(" arrows/wasd  steer", dim)),
        Line::from(Span::styled(" space pause   r reset", dim)),
        Line::from(Span::styled(" +/- speed     q quit", dim)),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    controls.render(chunks[4], frame.buffer_mut());
}

fn draw_effect_gauge(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    remaining: u32,
    max: u32,
    color: Color,
    theme: &Theme,
) {
    let ratio = f64::from(remaining.min(max)) / f64::from(max);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color).bg(theme.bg))
        .ratio(ratio)
        .label(Span::styled(
            format!("{} {}", label, remaining),
            Style::default().fg(theme.main_fg),
        ));
    gauge.render(area, frame.buffer_mut());
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup_w = 34u16;
    let popup_h = 5u16;
    let popup = Rect {
        x: area.x + area.width.saturating_sub(popup_w) / 2,
        y: area.y + area.height.saturating_sub(popup_h) / 2,
        width: popup_w.min(area.width),
        height: popup_h.min(area.height),
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " Space — Resume    Q — Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );
    p.render(popup, frame.buffer_mut());
}

fn draw_game_over(
    frame: &mut Frame,
    state: &GameState,
    theme: &Theme,
    area: Rect,
    new_high_score: bool,
) {
    let popup_w = 34u16;
    let popup_h = if new_high_score { 10u16 } else { 9u16 };
    let popup = Rect {
        x: area.x + area.width.saturating_sub(popup_w) / 2,
        y: area.y + area.height.saturating_sub(popup_h) / 2,
        width: popup_w.min(area.width),
        height: popup_h.min(area.height),
    };
    let mut lines: Vec<Line> = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Score: {} ", state.score),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(
            format!(" Best: {} ", state.best),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(
            format!(" Level: {} ", state.level),
            Style::default().fg(theme.main_fg),
        )),
    ];
    if new_high_score {
        lines.push(Line::from(Span::styled(
            " New record! ",
            Style::default().fg(Color::Yellow).bold(),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " R — Restart    Q — Quit ",
        Style::default().fg(theme.main_fg),
    )));
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
            .title(Span::styled(" Serpentui ", Style::default().fg(theme.title))),
    );
    p.render(popup, frame.buffer_mut());
}
