// The game session state store.
// The snake moves one cell per tick in its current direction, head first.
// Eating food keeps the old tail (the snake grows by one), otherwise the tail is dropped.
// Hitting a wall or any body segment ends the game and leaves the snake where it was.
use std::collections::VecDeque;

use rand::Rng;

use crate::log;

pub const GRID_SIZE: i32 = 20;

const INITIAL_HEAD: Position = Position { x: 10, y: 10 };
const INITIAL_FOOD: Position = Position { x: 15, y: 15 };
const INITIAL_DIRECTION: Direction = Direction::Right;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Position {
        Position { x, y }
    }

    // may step off the grid, callers check bounds
    pub fn step(&self, direction: Direction) -> Position {
        match direction {
            Direction::Up => Position::new(self.x, self.y - 1),
            Direction::Down => Position::new(self.x, self.y + 1),
            Direction::Left => Position::new(self.x - 1, self.y),
            Direction::Right => Position::new(self.x + 1, self.y),
        }
    }

    pub fn is_in_bounds(&self) -> bool {
        (0..GRID_SIZE).contains(&self.x) && (0..GRID_SIZE).contains(&self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_opposite(&self, other: &Direction) -> bool {
        self.opposite() == *other
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamePhase {
    NotStarted,
    Running,
    Paused,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeathReason {
    WallCollision,
    SelfCollision,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    // the session is not running, nothing changed
    Idle,
    Moved,
    Ate,
    GameOver {
        reason: DeathReason,
        new_high_score: bool,
    },
}

#[derive(Debug, Clone)]
pub struct SnakeGame {
    snake: VecDeque<Position>, // the head is the first element
    food: Position,
    direction: Direction,
    // last accepted request, applied at the next tick
    pending_direction: Option<Direction>,
    score: u32,
    high_score: u32,
    is_paused: bool,
    is_game_over: bool,
    is_game_started: bool,
    new_high_score: bool,
    death_reason: Option<DeathReason>,
}

impl SnakeGame {
    pub fn new(high_score: u32) -> Self {
        SnakeGame {
            snake: VecDeque::from([INITIAL_HEAD]),
            food: INITIAL_FOOD,
            direction: INITIAL_DIRECTION,
            pending_direction: None,
            score: 0,
            high_score,
            is_paused: false,
            is_game_over: false,
            is_game_started: false,
            new_high_score: false,
            death_reason: None,
        }
    }

    pub fn snake(&self) -> &VecDeque<Position> {
        &self.snake
    }

    pub fn head(&self) -> Position {
        // the body is never empty
        self.snake[0]
    }

    pub fn food(&self) -> Position {
        self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn is_game_over(&self) -> bool {
        self.is_game_over
    }

    pub fn is_game_started(&self) -> bool {
        self.is_game_started
    }

    // true once a finished session beat the previous record
    pub fn is_new_high_score(&self) -> bool {
        self.new_high_score
    }

    pub fn death_reason(&self) -> Option<DeathReason> {
        self.death_reason
    }

    pub fn phase(&self) -> GamePhase {
        if !self.is_game_started {
            GamePhase::NotStarted
        } else if self.is_game_over {
            GamePhase::GameOver
        } else if self.is_paused {
            GamePhase::Paused
        } else {
            GamePhase::Running
        }
    }

    // "Play Game" and "Play Again"
    pub fn start(&mut self, rng: &mut impl Rng) {
        self.is_game_started = true;
        self.reset(rng);
        log!("game started, food at ({}, {})", self.food.x, self.food.y);
    }

    // "New Game": everything but the high score goes back to the initial state
    pub fn reset(&mut self, rng: &mut impl Rng) {
        self.snake = VecDeque::from([INITIAL_HEAD]);
        self.direction = INITIAL_DIRECTION;
        self.pending_direction = None;
        self.is_game_over = false;
        self.is_paused = false;
        self.score = 0;
        self.new_high_score = false;
        self.death_reason = None;
        self.spawn_food(rng);
    }

    pub fn toggle_pause(&mut self) {
        if !self.is_game_started || self.is_game_over {
            return;
        }
        self.is_paused = !self.is_paused;
    }

    // Returns whether the request was accepted. Reversing onto the segment the
    // head just left is never allowed, nor is steering while paused.
    pub fn request_direction(&mut self, direction: Direction) -> bool {
        if self.phase() != GamePhase::Running {
            return false;
        }
        if direction.is_opposite(&self.direction) {
            return false;
        }
        self.pending_direction = Some(direction);
        true
    }

    pub fn tick(&mut self, rng: &mut impl Rng) -> TickOutcome {
        if self.phase() != GamePhase::Running {
            return TickOutcome::Idle;
        }

        if let Some(direction) = self.pending_direction.take() {
            self.direction = direction;
        }

        let new_head = self.head().step(self.direction);
        if !new_head.is_in_bounds() {
            return self.finish(DeathReason::WallCollision);
        }
        // the tail counts too: it has not moved out of the way yet
        if self.snake.contains(&new_head) {
            return self.finish(DeathReason::SelfCollision);
        }

        self.snake.push_front(new_head);
        if new_head == self.food {
            self.score += 1;
            log!(
                "ate food at ({}, {}). Score: {}",
                new_head.x,
                new_head.y,
                self.score
            );
            self.spawn_food(rng);
            TickOutcome::Ate
        } else {
            self.snake.pop_back();
            TickOutcome::Moved
        }
    }

    fn finish(&mut self, reason: DeathReason) -> TickOutcome {
        self.is_game_over = true;
        self.death_reason = Some(reason);
        if self.score > self.high_score {
            self.high_score = self.score;
            self.new_high_score = true;
        }
        log!(
            "game over ({:?}) with score {}, high score {}",
            reason,
            self.score,
            self.high_score
        );
        TickOutcome::GameOver {
            reason,
            new_high_score: self.new_high_score,
        }
    }

    // Uniform over the whole grid, snake cells included.
    fn spawn_food(&mut self, rng: &mut impl Rng) {
        self.food = Position::new(
            rng.random_range(0..GRID_SIZE),
            rng.random_range(0..GRID_SIZE),
        );
    }
}

#[cfg(test)]
impl SnakeGame {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_snake(&mut self, body: &[Position], direction: Direction) {
        self.snake = body.iter().copied().collect();
        self.direction = direction;
        self.pending_direction = None;
    }

    pub fn set_food(&mut self, food: Position) {
        self.food = food;
    }

    pub fn set_score(&mut self, score: u32) {
        self.score = score;
    }
}
