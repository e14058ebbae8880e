//! App: terminal init, main loop, fixed-rate tick driver, key handling.

use crate::game::GameState;
use crate::highscores;
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::{Args, GameConfig};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tachyonfx::Effect;

/// Render cadence: events are polled with this timeout (~60 fps drawing).
const FRAME_MS: u64 = 16;
/// Upper bound on simulation ticks replayed per frame; a longer stall drops
/// the backlog instead of fast-forwarding through it.
const MAX_TICKS_PER_FRAME: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    GameOver,
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    state: GameState,
    screen: Screen,
    tick_interval: Duration,
    last_tick: Instant,
    /// Best score when the current session started; used to detect a new record.
    best_at_reset: u32,
    game_over_effect: Option<Effect>,
    game_over_effect_time: Option<Instant>,
    new_high_score: bool,
}

impl App {
    pub fn new(args: &Args, config: GameConfig, theme: Theme) -> Result<Self> {
        let best = highscores::load_best();
        let state = GameState::new(&config, best, rand::random());
        let rate = if args.tick_rate.is_finite() && args.tick_rate > 0.0 {
            args.tick_rate
        } else {
            60.0
        };
        Ok(Self {
            config,
            theme,
            state,
            screen: Screen::Playing,
            tick_interval: Duration::from_secs_f64(1.0 / rate),
            last_tick: Instant::now(),
            best_at_reset: best,
            game_over_effect: None,
            game_over_effect_time: None,
            new_high_score: false,
        })
    }

    fn reset_game(&mut self) {
        // Only the best score survives a reset. The fresh session starts paused.
        self.best_at_reset = self.state.best;
        self.state = GameState::new(&self.config, self.state.best, rand::random());
        self.screen = Screen::Playing;
        self.game_over_effect = None;
        self.game_over_effect_time = None;
        self.new_high_score = false;
        self.last_tick = Instant::now();
    }

    fn on_game_over(&mut self) {
        self.screen = Screen::GameOver;
        self.new_high_score = self.state.score > self.best_at_reset;
        // Best-effort: a failed write must not abort the session.
        let _ = highscores::save_best(self.state.best);
    }

    fn apply_action(&mut self, action: Action) {
        match action {
            Action::Pause => self.state.toggle_playing(),
            Action::Reset => self.reset_game(),
            Action::Turn(dir) => self.state.set_direction(dir),
            Action::SpeedUp => {
                let speed = self.state.speed();
                self.state.set_speed(speed.saturating_add(1));
            }
            Action::SpeedDown => {
                let speed = self.state.speed();
                self.state.set_speed(speed.saturating_sub(1));
            }
            Action::Quit | Action::None => {}
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
                size,
            },
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        // Clamp the board to the terminal so board + sidebar fit; respect
        // --cols/--rows when they do.
        let (term_cols, term_rows) = size()?;
        let (fit_c, fit_r) = crate::ui::grid_size_for_terminal_clamped(
            self.config.cols,
            self.config.rows,
            term_cols,
            term_rows,
        );
        if fit_c != self.config.cols || fit_r != self.config.rows {
            self.config.cols = fit_c;
            self.config.rows = fit_r;
            self.state = GameState::new(&self.config, self.state.best, rand::random());
        }

        let result = self.run_loop(&mut terminal);

        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            terminal.draw(|f| {
                crate::ui::draw(
                    f,
                    self.screen,
                    &self.state,
                    &self.theme,
                    f.area(),
                    &mut self.game_over_effect,
                    &mut self.game_over_effect_time,
                    now,
                    self.new_high_score,
                )
            })?;

            if event::poll(Duration::from_millis(FRAME_MS))? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind == KeyEventKind::Release {
                            continue;
                        }
                        let action = key_to_action(key);
                        match self.screen {
                            Screen::Playing => {
                                if action == Action::Quit {
                                    return Ok(());
                                }
                                self.apply_action(action);
                            }
                            Screen::GameOver => match action {
                                Action::Quit => return Ok(()),
                                Action::Reset | Action::Pause => self.reset_game(),
                                _ => {}
                            },
                        }
                    }
                }
            }

            // Fixed-cadence simulation; rendering above runs on its own cadence
            // and never mutates game state.
            let mut ticks = 0;
            while self.last_tick.elapsed() >= self.tick_interval && ticks < MAX_TICKS_PER_FRAME {
                self.last_tick += self.tick_interval;
                self.state.tick();
                ticks += 1;
            }
            if self.last_tick.elapsed() >= self.tick_interval {
                self.last_tick = Instant::now();
            }

            if self.state.game_over && self.screen == Screen::Playing {
                self.on_game_over();
            }
        }
    }
}
