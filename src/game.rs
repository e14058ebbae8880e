//! Game state: grid, snake, board entities, timed effects, and the tick engine.

use crate::GameConfig;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::collections::VecDeque;

/// Snake length at reset.
pub const START_LENGTH: usize = 6;

/// Base movement gate: at speed 0 the snake advances once every this many ticks.
pub const BASE_FRAME_SKIP: u32 = 4;

/// Upper bound of the speed setting; higher values are clamped.
pub const MAX_SPEED: u32 = 30;

/// Segment indices 0..=NECK_GRACE are exempt from the self-collision check, so
/// a tight turn against the snake's own neck is never fatal.
pub const NECK_GRACE: usize = 3;

/// Smallest playable board; configs below this are clamped up.
const MIN_COLS: u16 = 8;
const MIN_ROWS: u16 = 8;

/// Periodic powerup spawn cadence, in ticks.
const POWERUP_SPAWN_INTERVAL: u32 = 400;
/// Cap on periodically spawned powerups. Food bonus spawns ignore it.
const POWERUP_CAP: usize = 3;
/// Powerup lifetime, in movement steps.
const POWERUP_TTL: u32 = 900;

/// Ghost mode duration (ticks).
pub const GHOST_TICKS: u32 = 180;
/// Speed boost duration from a boost pad (ticks).
pub const PAD_BOOST_TICKS: u32 = 120;
/// Speed boost duration from a coffee powerup (ticks).
pub const COFFEE_BOOST_TICKS: u32 = 240;

const FOOD_SCORE: u32 = 10;
const TURKEY_SCORE: u32 = 30;
/// Level-up whenever the score lands exactly on a multiple of this.
const LEVEL_STEP: u32 = 50;
/// Chance of a bonus powerup when food is eaten.
const BONUS_POWERUP_CHANCE: f64 = 0.25;

/// Rejection-sampling attempts before falling back to a linear scan.
const PLACEMENT_ATTEMPTS: u32 = 128;

/// Wrap a coordinate into [0, dim). Non-negative for any input (toroidal board).
pub fn wrap(v: i32, dim: u16) -> u16 {
    let d = i32::from(dim);
    (((v % d) + d) % d) as u16
}

/// Ticks between movement steps for a given speed setting, before boost:
/// floor(BASE_FRAME_SKIP - speed/10), floored at 1. The division is real
/// valued, so every speed step matters, not just multiples of 10.
pub fn effective_skip(speed: u32) -> u32 {
    ((BASE_FRAME_SKIP * 10).saturating_sub(speed) / 10).max(1)
}

/// Ticks between movement steps with the boost state applied. Never below 1.
pub fn movement_interval(speed: u32, boosted: bool) -> u32 {
    effective_skip(speed).saturating_sub(u32::from(boosted)).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: u16,
    pub y: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit step (dx, dy); y grows downward.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn is_reverse_of(self, other: Self) -> bool {
        self.reverse() == other
    }
}

/// Board dimensions. Movement is axis-aligned, one cell per step, wrapping on
/// both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub cols: u16,
    pub rows: u16,
}

impl Grid {
    pub fn area(&self) -> u32 {
        u32::from(self.cols) * u32::from(self.rows)
    }

    /// The neighbouring cell in `dir`, wrapped into bounds.
    pub fn step(&self, cell: Cell, dir: Direction) -> Cell {
        let (dx, dy) = dir.delta();
        Cell {
            x: wrap(i32::from(cell.x) + dx, self.cols),
            y: wrap(i32::from(cell.y) + dy, self.rows),
        }
    }

    /// Cell for a row-major index in [0, area).
    fn cell_at(&self, index: u32) -> Cell {
        Cell {
            x: (index % u32::from(self.cols)) as u16,
            y: (index / u32::from(self.cols)) as u16,
        }
    }
}

/// Powerup kinds (coffee = long boost, turkey = bonus score, frame = ghost).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerupKind {
    Coffee,
    Turkey,
    Frame,
}

impl PowerupKind {
    pub const ALL: [Self; 3] = [Self::Coffee, Self::Turkey, Self::Frame];

    /// Index into the theme's powerup accent colours.
    pub fn color_index(self) -> usize {
        match self {
            Self::Coffee => 0,
            Self::Turkey => 1,
            Self::Frame => 2,
        }
    }
}

/// Transient board entity; expires when `ttl` movement steps elapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Powerup {
    pub kind: PowerupKind,
    pub cell: Cell,
    pub ttl: u32,
}

/// Timed status effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// Self-collision check suppressed.
    Ghost,
    /// Movement interval reduced by one tick.
    Boost,
}

impl EffectKind {
    pub const ALL: [Self; 2] = [Self::Ghost, Self::Boost];
}

/// Countdown table for status effects. Setting overwrites (no stacking);
/// decay is uniform, one per tick, floored at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Effects {
    remaining: [u32; EffectKind::ALL.len()],
}

impl Effects {
    pub fn set(&mut self, kind: EffectKind, ticks: u32) {
        self.remaining[kind as usize] = ticks;
    }

    pub fn remaining(&self, kind: EffectKind) -> u32 {
        self.remaining[kind as usize]
    }

    pub fn active(&self, kind: EffectKind) -> bool {
        self.remaining(kind) > 0
    }

    pub fn decay(&mut self) {
        for r in &mut self.remaining {
            *r = r.saturating_sub(1);
        }
    }
}

/// One game session. Owns every board entity; a reset builds a fresh session
/// and only the best score carries over.
#[derive(Debug)]
pub struct GameState {
    pub grid: Grid,
    /// Head at the front, tail at the back. Never empty.
    pub snake: VecDeque<Cell>,
    dir: Direction,
    /// Last accepted direction intent; consumed at the next movement step.
    next_dir: Direction,
    pub food: Option<Cell>,
    pub obstacles: Vec<Cell>,
    pub boost_pads: Vec<Cell>,
    pub powerups: Vec<Powerup>,
    pub effects: Effects,
    pub score: u32,
    pub level: u32,
    pub best: u32,
    pub tick_count: u32,
    /// False while paused and after game over.
    pub playing: bool,
    pub game_over: bool,
    speed: u32,
    rng: Pcg32,
}

impl GameState {
    /// Fresh session: snake centred heading right, then obstacles, boost pads
    /// and food placed in that order so each placement respects the previous
    /// sets. Starts paused.
    pub fn new(config: &GameConfig, best: u32, seed: u64) -> Self {
        let grid = Grid {
            cols: config.cols.max(MIN_COLS),
            rows: config.rows.max(MIN_ROWS),
        };
        // Static entity counts are clamped so the board keeps free cells even
        // under a pathological config.
        let max_static = (grid.area() / 8) as usize;

        let mut state = Self {
            grid,
            snake: VecDeque::with_capacity(START_LENGTH),
            dir: Direction::Right,
            next_dir: Direction::Right,
            food: None,
            obstacles: Vec::new(),
            boost_pads: Vec::new(),
            powerups: Vec::new(),
            effects: Effects::default(),
            score: 0,
            level: 1,
            best,
            tick_count: 0,
            playing: false,
            game_over: false,
            speed: config.speed.min(MAX_SPEED),
            rng: Pcg32::seed_from_u64(seed),
        };

        let cx = state.grid.cols / 2;
        let cy = state.grid.rows / 2;
        for i in 0..START_LENGTH {
            state.snake.push_back(Cell {
                x: wrap(i32::from(cx) - i as i32, state.grid.cols),
                y: cy,
            });
        }

        for _ in 0..config.obstacles.min(max_static) {
            match state.random_free_cell() {
                Some(cell) => state.obstacles.push(cell),
                None => break,
            }
        }
        for _ in 0..config.boost_pads.min(max_static) {
            match state.random_free_cell() {
                Some(cell) => state.boost_pads.push(cell),
                None => break,
            }
        }
        state.food = state.random_free_cell();
        state
    }

    pub fn head(&self) -> Cell {
        self.snake[0]
    }

    pub fn direction(&self) -> Direction {
        self.dir
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    /// Speed setting, clamped to 0..=MAX_SPEED.
    pub fn set_speed(&mut self, speed: u32) {
        self.speed = speed.min(MAX_SPEED);
    }

    /// Latest-wins direction intent. The exact reverse of the pending intent
    /// is rejected so the snake cannot fold back into its own neck.
    pub fn set_direction(&mut self, dir: Direction) {
        if !dir.is_reverse_of(self.next_dir) {
            self.next_dir = dir;
        }
    }

    /// Pause/resume. A finished session stays finished until reset.
    pub fn toggle_playing(&mut self) {
        if !self.game_over {
            self.playing = !self.playing;
        }
    }

    fn on_snake(&self, cell: Cell) -> bool {
        self.snake.iter().any(|s| *s == cell)
    }

    fn on_obstacle(&self, cell: Cell) -> bool {
        self.obstacles.contains(&cell)
    }

    fn on_boost_pad(&self, cell: Cell) -> bool {
        self.boost_pads.contains(&cell)
    }

    /// Occupancy for placement purposes: snake, obstacles and boost pads.
    /// Food and powerups are deliberately not counted.
    fn occupied(&self, cell: Cell) -> bool {
        self.on_snake(cell) || self.on_obstacle(cell) || self.on_boost_pad(cell)
    }

    /// Uniform rejection sampling with a bounded retry budget, then a
    /// wrap-around scan from a random offset. `None` means the board is full.
    fn random_free_cell(&mut self) -> Option<Cell> {
        for _ in 0..PLACEMENT_ATTEMPTS {
            let cell = Cell {
                x: self.rng.random_range(0..self.grid.cols),
                y: self.rng.random_range(0..self.grid.rows),
            };
            if !self.occupied(cell) {
                return Some(cell);
            }
        }
        let area = self.grid.area();
        let start = self.rng.random_range(0..area);
        (0..area)
            .map(|i| self.grid.cell_at((start + i) % area))
            .find(|cell| !self.occupied(*cell))
    }

    /// Spawn one powerup of a random kind at a free cell; skipped when no free
    /// cell remains.
    fn spawn_powerup(&mut self) {
        let kind = PowerupKind::ALL[self.rng.random_range(0..PowerupKind::ALL.len())];
        if let Some(cell) = self.random_free_cell() {
            self.powerups.push(Powerup {
                kind,
                cell,
                ttl: POWERUP_TTL,
            });
        }
    }

    /// One simulation tick. No-op unless playing. Movement is gated by the
    /// effective interval; effect timers decay every tick regardless, except
    /// when a fatal collision ends the call early.
    pub fn tick(&mut self) {
        if !self.playing {
            return;
        }
        self.tick_count = self.tick_count.wrapping_add(1);

        if self.tick_count % POWERUP_SPAWN_INTERVAL == 0 && self.powerups.len() < POWERUP_CAP {
            self.spawn_powerup();
        }

        let interval = movement_interval(self.speed, self.effects.active(EffectKind::Boost));
        if self.tick_count % interval == 0 && !self.advance() {
            return;
        }

        self.effects.decay();
    }

    /// One movement step. Returns false when the step ended the session.
    fn advance(&mut self) -> bool {
        self.dir = self.next_dir;
        let head = self.grid.step(self.head(), self.dir);

        if self.on_obstacle(head) {
            self.finish();
            return false;
        }
        if !self.effects.active(EffectKind::Ghost)
            && self
                .snake
                .iter()
                .enumerate()
                .any(|(i, s)| i > NECK_GRACE && *s == head)
        {
            self.finish();
            return false;
        }

        self.snake.push_front(head);

        if self.food == Some(head) {
            self.score += FOOD_SCORE;
            if self.score % LEVEL_STEP == 0 {
                self.level += 1;
            }
            self.food = self.random_free_cell();
            if self.rng.random_bool(BONUS_POWERUP_CHANCE) {
                self.spawn_powerup();
            }
        } else {
            self.snake.pop_back();
        }

        if self.on_boost_pad(head) {
            self.effects.set(EffectKind::Boost, PAD_BOOST_TICKS);
        }

        // Every live powerup is visited: collected ones apply and vanish, the
        // rest age by one step and expire at zero.
        let mut collected = Vec::new();
        self.powerups.retain_mut(|p| {
            if p.cell == head {
                collected.push(p.kind);
                return false;
            }
            p.ttl = p.ttl.saturating_sub(1);
            p.ttl > 0
        });
        for kind in collected {
            self.apply_powerup(kind);
        }

        true
    }

    fn apply_powerup(&mut self, kind: PowerupKind) {
        match kind {
            PowerupKind::Coffee => self.effects.set(EffectKind::Boost, COFFEE_BOOST_TICKS),
            PowerupKind::Turkey => self.score += TURKEY_SCORE,
            PowerupKind::Frame => self.effects.set(EffectKind::Ghost, GHOST_TICKS),
        }
    }

    /// Fatal collision: freeze the session and capture the best score.
    fn finish(&mut self) {
        self.playing = false;
        self.game_over = true;
        self.best = self.best.max(self.score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_config(cols: u16, rows: u16) -> GameConfig {
        GameConfig {
            cols,
            rows,
            obstacles: 0,
            boost_pads: 0,
            speed: MAX_SPEED,
        }
    }

    /// Empty 10x10 board, no food, snake centred heading right, unpaused.
    /// Speed is maxed so every tick is a movement step.
    fn empty_state() -> GameState {
        let mut state = GameState::new(&test_config(10, 10), 0, 7);
        state.food = None;
        state.playing = true;
        state
    }

    #[test]
    fn test_wrap_non_negative() {
        assert_eq!(wrap(-1, 10), 9);
        assert_eq!(wrap(10, 10), 0);
        assert_eq!(wrap(-10, 10), 0);
        assert_eq!(wrap(7, 10), 7);
        assert_eq!(wrap(-21, 10), 9);
    }

    #[test]
    fn test_effective_skip_table() {
        assert_eq!(effective_skip(0), 4);
        // Non-multiples of 10 hit the floor of the real-valued expression:
        // floor(4 - 0.5) = 3, floor(4 - 0.9) = 3, floor(4 - 1.5) = 2.
        assert_eq!(effective_skip(5), 3);
        assert_eq!(effective_skip(9), 3);
        assert_eq!(effective_skip(10), 3);
        assert_eq!(effective_skip(15), 2);
        assert_eq!(effective_skip(20), 2);
        assert_eq!(effective_skip(25), 1);
        assert_eq!(effective_skip(30), 1);
        assert_eq!(effective_skip(99), 1);
        assert_eq!(movement_interval(0, true), 3);
        assert_eq!(movement_interval(30, false), 1);
        assert_eq!(movement_interval(30, true), 1);
    }

    #[test]
    fn test_paused_state_is_frozen() {
        let mut state = GameState::new(&test_config(10, 10), 0, 3);
        assert!(!state.playing);
        let snake = state.snake.clone();
        let food = state.food;
        state.effects.set(EffectKind::Ghost, 5);
        for _ in 0..50 {
            state.tick();
        }
        assert_eq!(state.snake, snake);
        assert_eq!(state.food, food);
        assert_eq!(state.score, 0);
        assert_eq!(state.tick_count, 0);
        assert_eq!(state.effects.remaining(EffectKind::Ghost), 5);
    }

    #[test]
    fn test_plain_movement_keeps_length() {
        let mut state = empty_state();
        let head = state.head();
        let tail = *state.snake.back().unwrap();
        state.tick();
        assert_eq!(state.snake.len(), START_LENGTH);
        assert_eq!(
            state.head(),
            Cell {
                x: wrap(i32::from(head.x) + 1, 10),
                y: head.y
            }
        );
        assert!(!state.snake.contains(&tail));
        assert!(state.playing);
    }

    #[test]
    fn test_eating_food_grows_and_relocates() {
        let mut state = empty_state();
        let ahead = state.grid.step(state.head(), Direction::Right);
        state.food = Some(ahead);
        state.tick();
        assert_eq!(state.snake.len(), START_LENGTH + 1);
        assert_eq!(state.score, 10);
        assert_eq!(state.head(), ahead);
        let food = state.food.expect("food must respawn");
        assert_ne!(food, ahead);
        assert!(!state.snake.contains(&food));
        assert!(!state.obstacles.contains(&food));
        assert!(!state.boost_pads.contains(&food));
    }

    #[test]
    fn test_level_up_on_multiple_of_fifty() {
        let mut state = empty_state();
        state.score = 40;
        state.food = Some(state.grid.step(state.head(), Direction::Right));
        state.tick();
        assert_eq!(state.score, 50);
        assert_eq!(state.level, 2);
    }

    #[test]
    fn test_turkey_can_skip_level_boundary() {
        let mut state = empty_state();
        state.score = 40;
        state.powerups.push(Powerup {
            kind: PowerupKind::Turkey,
            cell: state.grid.step(state.head(), Direction::Right),
            ttl: 100,
        });
        state.tick();
        // 40 + 30 jumps over 50 without a level-up.
        assert_eq!(state.score, 70);
        assert_eq!(state.level, 1);
    }

    #[test]
    fn test_obstacle_collision_is_fatal() {
        let mut state = empty_state();
        state.score = 30;
        state.best = 20;
        state.effects.set(EffectKind::Boost, 100);
        let snake = state.snake.clone();
        state
            .obstacles
            .push(state.grid.step(state.head(), Direction::Right));
        state.tick();
        assert!(!state.playing);
        assert!(state.game_over);
        assert_eq!(state.best, 30);
        // No further mutation in the same call: snake untouched, timers frozen.
        assert_eq!(state.snake, snake);
        assert_eq!(state.effects.remaining(EffectKind::Boost), 100);
        // A dead session cannot be resumed, only reset.
        state.toggle_playing();
        assert!(!state.playing);
    }

    #[test]
    fn test_neck_overlap_is_tolerated() {
        let mut state = empty_state();
        state.snake = VecDeque::from(vec![
            Cell { x: 5, y: 5 },
            Cell { x: 5, y: 6 },
            Cell { x: 4, y: 6 },
            Cell { x: 4, y: 5 },
            Cell { x: 3, y: 5 },
            Cell { x: 2, y: 5 },
        ]);
        // New head lands on segment 1, inside the tolerance window.
        state.dir = Direction::Down;
        state.next_dir = Direction::Down;
        state.tick();
        assert!(state.playing);
        assert_eq!(state.head(), Cell { x: 5, y: 6 });
    }

    #[test]
    fn test_self_collision_past_neck_is_fatal() {
        let mut state = empty_state();
        state.snake = VecDeque::from(vec![
            Cell { x: 2, y: 2 },
            Cell { x: 3, y: 2 },
            Cell { x: 3, y: 3 },
            Cell { x: 2, y: 3 },
            Cell { x: 1, y: 3 },
            Cell { x: 1, y: 2 },
        ]);
        // New head would land on segment 5.
        state.dir = Direction::Left;
        state.next_dir = Direction::Left;
        state.tick();
        assert!(state.game_over);
    }

    #[test]
    fn test_ghost_mode_suppresses_self_collision() {
        let mut state = empty_state();
        state.snake = VecDeque::from(vec![
            Cell { x: 2, y: 2 },
            Cell { x: 3, y: 2 },
            Cell { x: 3, y: 3 },
            Cell { x: 2, y: 3 },
            Cell { x: 1, y: 3 },
            Cell { x: 1, y: 2 },
        ]);
        state.dir = Direction::Left;
        state.next_dir = Direction::Left;
        state.effects.set(EffectKind::Ghost, 10);
        state.tick();
        assert!(state.playing);
        assert_eq!(state.head(), Cell { x: 1, y: 2 });
    }

    #[test]
    fn test_turkey_scores_without_timers() {
        let mut state = empty_state();
        state.powerups.push(Powerup {
            kind: PowerupKind::Turkey,
            cell: state.grid.step(state.head(), Direction::Right),
            ttl: 50,
        });
        state.tick();
        assert_eq!(state.score, 30);
        assert!(state.powerups.is_empty());
        assert_eq!(state.effects.remaining(EffectKind::Ghost), 0);
        assert_eq!(state.effects.remaining(EffectKind::Boost), 0);
    }

    #[test]
    fn test_coffee_and_frame_set_timers() {
        let mut state = empty_state();
        state.powerups.push(Powerup {
            kind: PowerupKind::Coffee,
            cell: state.grid.step(state.head(), Direction::Right),
            ttl: 50,
        });
        state.tick();
        // Set in the powerup pass, then decayed once at the end of the tick.
        assert_eq!(state.effects.remaining(EffectKind::Boost), 239);

        let mut state = empty_state();
        state.powerups.push(Powerup {
            kind: PowerupKind::Frame,
            cell: state.grid.step(state.head(), Direction::Right),
            ttl: 50,
        });
        state.tick();
        assert_eq!(state.effects.remaining(EffectKind::Ghost), 179);
    }

    #[test]
    fn test_boost_pad_overwrites_timer() {
        let mut state = empty_state();
        state
            .boost_pads
            .push(state.grid.step(state.head(), Direction::Right));
        state.effects.set(EffectKind::Boost, 5);
        state.tick();
        // Re-triggering resets to the pad duration, it does not accumulate.
        assert_eq!(state.effects.remaining(EffectKind::Boost), 119);
    }

    #[test]
    fn test_timers_decay_independently() {
        let mut state = empty_state();
        state.effects.set(EffectKind::Ghost, 3);
        state.effects.set(EffectKind::Boost, 5);
        state.tick();
        state.tick();
        assert_eq!(state.effects.remaining(EffectKind::Ghost), 1);
        assert_eq!(state.effects.remaining(EffectKind::Boost), 3);
        state.tick();
        state.tick();
        assert_eq!(state.effects.remaining(EffectKind::Ghost), 0);
        assert_eq!(state.effects.remaining(EffectKind::Boost), 1);
    }

    #[test]
    fn test_periodic_powerup_spawn_respects_cap() {
        let mut state = empty_state();
        // Speed 10 gives interval 3, which does not divide 400, so the spawn
        // tick is not a movement step and the fresh powerup cannot be
        // collected in the same call.
        state.set_speed(10);
        state.tick_count = POWERUP_SPAWN_INTERVAL - 1;
        state.tick();
        assert_eq!(state.powerups.len(), 1);
        assert_eq!(state.powerups[0].ttl, POWERUP_TTL);

        let mut state = empty_state();
        state.set_speed(10);
        state.tick_count = POWERUP_SPAWN_INTERVAL - 1;
        for _ in 0..POWERUP_CAP {
            state.powerups.push(Powerup {
                kind: PowerupKind::Turkey,
                cell: Cell { x: 0, y: 0 },
                ttl: 500,
            });
        }
        state.tick();
        assert_eq!(state.powerups.len(), POWERUP_CAP);
    }

    #[test]
    fn test_powerup_ttl_expires_on_movement_steps() {
        let mut state = empty_state();
        state.powerups.push(Powerup {
            kind: PowerupKind::Frame,
            cell: Cell { x: 0, y: 0 },
            ttl: 2,
        });
        state.tick();
        assert_eq!(state.powerups[0].ttl, 1);
        state.tick();
        assert!(state.powerups.is_empty());
    }

    #[test]
    fn test_powerup_ttl_frozen_between_movement_steps() {
        let mut state = empty_state();
        state.set_speed(0); // interval 4: ticks 1..=3 do not move
        state.powerups.push(Powerup {
            kind: PowerupKind::Frame,
            cell: Cell { x: 0, y: 0 },
            ttl: 10,
        });
        state.tick();
        assert_eq!(state.powerups[0].ttl, 10);
        state.tick();
        state.tick();
        state.tick(); // tick 4: movement step
        assert_eq!(state.powerups[0].ttl, 9);
    }

    #[test]
    fn test_direction_reversal_rejected() {
        let mut state = empty_state();
        state.set_direction(Direction::Left); // reverse of Right
        assert_eq!(state.next_dir, Direction::Right);
        state.set_direction(Direction::Up);
        assert_eq!(state.next_dir, Direction::Up);
        state.set_direction(Direction::Down); // reverse of pending Up
        assert_eq!(state.next_dir, Direction::Up);
        state.tick();
        assert_eq!(state.direction(), Direction::Up);
    }

    #[test]
    fn test_speed_setting_is_clamped() {
        let mut state = empty_state();
        state.set_speed(999);
        assert_eq!(state.speed(), MAX_SPEED);
        let config = GameConfig {
            speed: 1000,
            ..test_config(10, 10)
        };
        assert_eq!(GameState::new(&config, 0, 1).speed(), MAX_SPEED);
    }

    #[test]
    fn test_reset_yields_fresh_valid_sessions() {
        let config = GameConfig {
            cols: 30,
            rows: 20,
            obstacles: 12,
            boost_pads: 10,
            speed: 10,
        };
        for seed in [1u64, 2] {
            let state = GameState::new(&config, 99, seed);
            assert_eq!(state.score, 0);
            assert_eq!(state.level, 1);
            assert_eq!(state.best, 99);
            assert_eq!(state.snake.len(), START_LENGTH);
            assert_eq!(state.obstacles.len(), 12);
            assert_eq!(state.boost_pads.len(), 10);
            assert!(!state.playing);
            let food = state.food.expect("fresh session has food");
            for cell in state.obstacles.iter().chain(state.boost_pads.iter()) {
                assert!(!state.snake.contains(cell));
                assert_ne!(*cell, food);
            }
            for pad in &state.boost_pads {
                assert!(!state.obstacles.contains(pad));
            }
        }
    }

    #[test]
    fn test_placement_finds_last_free_cell() {
        let mut state = GameState::new(&test_config(8, 8), 0, 5);
        state.food = None;
        let target = Cell { x: 0, y: 0 };
        for y in 0..8 {
            for x in 0..8 {
                let cell = Cell { x, y };
                if cell != target && !state.on_snake(cell) {
                    state.obstacles.push(cell);
                }
            }
        }
        assert_eq!(state.random_free_cell(), Some(target));
        state.obstacles.push(target);
        assert_eq!(state.random_free_cell(), None);
    }

    proptest! {
        #[test]
        fn prop_wrap_stays_in_bounds(v in any::<i32>(), dim in 1u16..=u16::MAX) {
            prop_assert!(wrap(v, dim) < dim);
        }

        #[test]
        fn prop_head_stays_in_bounds(
            seed in any::<u64>(),
            cols in 8u16..32,
            rows in 8u16..32,
            turns in proptest::collection::vec(0u8..4, 1..120),
        ) {
            let mut state = GameState::new(&test_config(cols, rows), 0, seed);
            state.playing = true;
            for turn in turns {
                let dir = match turn {
                    0 => Direction::Up,
                    1 => Direction::Down,
                    2 => Direction::Left,
                    _ => Direction::Right,
                };
                state.set_direction(dir);
                state.tick();
                if state.game_over {
                    break;
                }
                let head = state.head();
                prop_assert!(head.x < cols && head.y < rows);
            }
        }

        #[test]
        fn prop_sampled_cells_are_free(seed in any::<u64>(), n in 0usize..40) {
            let mut state = GameState::new(&test_config(12, 12), 0, seed);
            for _ in 0..n {
                if let Some(cell) = state.random_free_cell() {
                    prop_assert!(!state.occupied(cell));
                    state.obstacles.push(cell);
                }
            }
        }
    }
}
