// The game session: owns the state store, runs the fixed tick and routes
// keyboard, pointer and button input into it.
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use rand::Rng;

use crate::config::GameConfig;
use crate::error::{Result, SnakeError};
use crate::high_score::{load_or_default, HighScoreStore};
use crate::input::{InputDecoder, InputEvent, Key, PointerAction};
use crate::log;
use crate::render::{Button, Screen};
use crate::snake::{SnakeGame, TickOutcome};
use crate::swipe::SwipeRecognizer;
use crate::terminal::RawTerminal;

#[derive(Debug, Clone)]
pub struct AppOptions {
    pub tick_interval: Duration,
    pub pointer_support: bool,
    pub swipe_threshold_px: i32,
    pub cell_width_px: i32,
    pub cell_height_px: i32,
}

impl AppOptions {
    pub fn from_config(config: &GameConfig, pointer_support: bool) -> Self {
        Self {
            tick_interval: Duration::from_millis(config.tick_interval_ms),
            pointer_support,
            swipe_threshold_px: config.swipe_threshold_px,
            cell_width_px: config.cell_width_px,
            cell_height_px: config.cell_height_px,
        }
    }
}

// Fixed-interval timer. Re-arming restarts the interval from `now`.
#[derive(Debug)]
pub struct Ticker {
    interval: Duration,
    next_tick: Instant,
}

impl Ticker {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_tick: now + interval,
        }
    }

    pub fn rearm(&mut self, now: Instant) {
        self.next_tick = now + self.interval;
    }

    pub fn time_until_due(&self, now: Instant) -> Duration {
        self.next_tick.saturating_duration_since(now)
    }

    // at most one tick per call; a late loop does not replay missed ticks
    pub fn is_due(&mut self, now: Instant) -> bool {
        if now < self.next_tick {
            return false;
        }
        self.next_tick += self.interval;
        if self.next_tick <= now {
            self.next_tick = now + self.interval;
        }
        true
    }
}

pub struct App<S: HighScoreStore, R: Rng> {
    game: SnakeGame,
    store: S,
    rng: R,
    options: AppOptions,
    ticker: Ticker,
    decoder: InputDecoder,
    swipe: SwipeRecognizer,
    screen: Screen,
    dirty: bool,
    quit: bool,
}

impl<S: HighScoreStore, R: Rng> App<S, R> {
    pub fn new(store: S, rng: R, options: AppOptions) -> Self {
        let high_score = load_or_default(&store);
        let game = SnakeGame::new(high_score);
        let screen = Screen::compose(&game, options.pointer_support);
        Self {
            game,
            store,
            rng,
            ticker: Ticker::new(options.tick_interval, Instant::now()),
            swipe: SwipeRecognizer::new(options.swipe_threshold_px),
            decoder: InputDecoder::new(),
            options,
            screen,
            dirty: true,
            quit: false,
        }
    }

    pub fn game(&self) -> &SnakeGame {
        &self.game
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn run(&mut self, terminal: &RawTerminal, input: Receiver<Vec<u8>>) -> Result<()> {
        log!(
            "session running, tick {}ms, pointer input {}",
            self.options.tick_interval.as_millis(),
            if self.options.pointer_support { "on" } else { "off" }
        );
        self.ticker.rearm(Instant::now());
        while !self.should_quit() {
            if self.dirty {
                terminal.draw(self.screen.lines())?;
                self.dirty = false;
            }
            match input.recv_timeout(self.ticker.time_until_due(Instant::now())) {
                Ok(bytes) => self.feed_bytes(&bytes),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return Err(SnakeError::InputClosed),
            }
            if self.ticker.is_due(Instant::now()) {
                self.on_tick();
            }
        }
        log!("session stopped with score {}", self.game.score());
        Ok(())
    }

    pub fn feed_bytes(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.decoder.push(*byte);
        }
        while let Some(event) = self.decoder.next_event() {
            self.handle_event(event);
        }
    }

    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Key(key) => self.handle_key(key),
            InputEvent::Pointer {
                action,
                column,
                row,
            } => self.handle_pointer(action, column, row),
        }
        self.refresh();
    }

    pub fn on_tick(&mut self) -> TickOutcome {
        let outcome = self.game.tick(&mut self.rng);
        match outcome {
            TickOutcome::Idle => return outcome,
            TickOutcome::GameOver {
                reason,
                new_high_score,
            } => {
                log!("session over: {:?}", reason);
                if new_high_score {
                    self.persist_high_score();
                }
            }
            _ => {}
        }
        self.refresh();
        outcome
    }

    fn handle_key(&mut self, key: Key) {
        match key {
            Key::Space => self.game.toggle_pause(),
            Key::Arrow(direction) => {
                self.game.request_direction(direction);
            }
            Key::Enter => {
                if !self.game.is_game_started() || self.game.is_game_over() {
                    self.start_game();
                }
            }
            Key::NewGame => {
                if self.game.is_game_started() {
                    self.new_game();
                }
            }
            Key::Quit => self.quit = true,
        }
    }

    fn handle_pointer(&mut self, action: PointerAction, column: u16, row: u16) {
        let x = (column as i32).saturating_mul(self.options.cell_width_px);
        let y = (row as i32).saturating_mul(self.options.cell_height_px);
        match action {
            PointerAction::Press => match self.screen.button_at(column, row) {
                Some(button) => self.press_button(button),
                None => self.swipe.touch_start(x, y),
            },
            PointerAction::Drag => {
                if self.game.is_paused() {
                    return;
                }
                if let Some(direction) = self.swipe.touch_move(x, y) {
                    self.game.request_direction(direction);
                }
            }
            PointerAction::Release => self.swipe.touch_end(),
        }
    }

    fn press_button(&mut self, button: Button) {
        match button {
            Button::PlayGame | Button::PlayAgain => self.start_game(),
            Button::Pause | Button::Resume => self.game.toggle_pause(),
            Button::NewGame => self.new_game(),
            Button::Direction(direction) => {
                self.game.request_direction(direction);
            }
        }
    }

    fn start_game(&mut self) {
        self.game.start(&mut self.rng);
        self.ticker.rearm(Instant::now());
    }

    fn new_game(&mut self) {
        self.game.reset(&mut self.rng);
        self.ticker.rearm(Instant::now());
        log!("new game, food at ({}, {})", self.game.food().x, self.game.food().y);
    }

    fn persist_high_score(&mut self) {
        let high_score = self.game.high_score();
        match self.store.save(high_score) {
            Ok(()) => log!("new high score {} saved", high_score),
            Err(err) => log!("could not save high score {}: {}", high_score, err),
        }
    }

    fn refresh(&mut self) {
        self.screen = Screen::compose(&self.game, self.options.pointer_support);
        self.dirty = true;
    }
}

#[cfg(test)]
impl<S: HighScoreStore, R: Rng> App<S, R> {
    pub fn screen(&self) -> &Screen {
        &self.screen
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::snake::{Direction, GamePhase, Position};

    #[derive(Clone, Default)]
    struct MemoryStore {
        initial: u32,
        saved: Rc<RefCell<Vec<u32>>>,
    }

    impl HighScoreStore for MemoryStore {
        fn load(&self) -> Result<u32> {
            Ok(self.initial)
        }

        fn save(&self, high_score: u32) -> Result<()> {
            self.saved.borrow_mut().push(high_score);
            Ok(())
        }
    }

    struct FailingStore;

    impl HighScoreStore for FailingStore {
        fn load(&self) -> Result<u32> {
            Err(SnakeError::InvalidConfig("broken".to_string()))
        }

        fn save(&self, _high_score: u32) -> Result<()> {
            Err(SnakeError::InputClosed)
        }
    }

    fn options(pointer_support: bool) -> AppOptions {
        AppOptions::from_config(&GameConfig::default(), pointer_support)
    }

    fn started_app(store: MemoryStore) -> App<MemoryStore, StdRng> {
        let mut app = App::new(store, StdRng::seed_from_u64(99), options(true));
        app.feed_bytes(b"\r");
        // out of the way of every test path
        app.game.set_food(Position::new(0, 19));
        app
    }

    fn button_position(app: &App<MemoryStore, StdRng>, button: Button) -> (u16, u16) {
        let region = app
            .screen()
            .buttons()
            .iter()
            .find(|region| region.button == button)
            .copied()
            .unwrap();
        (region.first_column, region.row)
    }

    fn press(app: &mut App<MemoryStore, StdRng>, column: u16, row: u16) {
        app.handle_event(InputEvent::Pointer {
            action: PointerAction::Press,
            column,
            row,
        });
    }

    fn drag(app: &mut App<MemoryStore, StdRng>, column: u16, row: u16) {
        app.handle_event(InputEvent::Pointer {
            action: PointerAction::Drag,
            column,
            row,
        });
    }

    #[test]
    fn test_high_score_is_loaded_at_startup() {
        let store = MemoryStore {
            initial: 8,
            ..MemoryStore::default()
        };
        let app = App::new(store, StdRng::seed_from_u64(1), options(false));
        assert_eq!(app.game().high_score(), 8);
        assert_eq!(app.game().phase(), GamePhase::NotStarted);
    }

    #[test]
    fn test_unreadable_high_score_starts_from_zero() {
        let app = App::new(FailingStore, StdRng::seed_from_u64(1), options(false));
        assert_eq!(app.game().high_score(), 0);
    }

    #[test]
    fn test_enter_starts_and_arrows_steer() {
        let mut app = started_app(MemoryStore::default());
        assert_eq!(app.game().phase(), GamePhase::Running);

        app.feed_bytes(b"\x1b[B");
        assert_eq!(app.on_tick(), TickOutcome::Moved);
        assert_eq!(app.game().head(), Position::new(10, 11));

        // reverse of down
        app.feed_bytes(b"\x1b[A");
        app.on_tick();
        assert_eq!(app.game().head(), Position::new(10, 12));
    }

    #[test]
    fn test_space_pauses_and_blocks_steering() {
        let mut app = started_app(MemoryStore::default());
        app.feed_bytes(b" \x1b[B");
        assert_eq!(app.game().phase(), GamePhase::Paused);
        assert_eq!(app.on_tick(), TickOutcome::Idle);

        app.feed_bytes(b" ");
        app.on_tick();
        assert_eq!(app.game().head(), Position::new(11, 10));
    }

    #[test]
    fn test_swipe_requests_direction() {
        let mut app = started_app(MemoryStore::default());
        // 20px rows: three rows down is 60px
        press(&mut app, 200, 200);
        drag(&mut app, 201, 203);
        app.on_tick();
        assert_eq!(app.game().direction(), Direction::Down);

        // the sequence is spent, a further drag does nothing
        drag(&mut app, 150, 203);
        app.on_tick();
        assert_eq!(app.game().direction(), Direction::Down);
    }

    #[test]
    fn test_huge_cell_size_does_not_overflow() {
        let options = AppOptions {
            cell_width_px: i32::MAX,
            cell_height_px: i32::MAX,
            ..options(true)
        };
        let mut app = App::new(MemoryStore::default(), StdRng::seed_from_u64(99), options);
        app.feed_bytes(b"\r\x1b[<0;200;200M\x1b[<32;200;210M\x1b[<0;200;210m");
        assert_eq!(app.game().phase(), GamePhase::Running);
    }

    #[test]
    fn test_swipe_ignored_while_paused() {
        let mut app = started_app(MemoryStore::default());
        press(&mut app, 200, 200);
        app.feed_bytes(b" ");
        drag(&mut app, 200, 204);
        app.feed_bytes(b" ");
        app.on_tick();
        assert_eq!(app.game().direction(), Direction::Right);
    }

    #[test]
    fn test_buttons_control_the_session() {
        let mut app = App::new(MemoryStore::default(), StdRng::seed_from_u64(5), options(true));
        let (column, row) = button_position(&app, Button::PlayGame);
        press(&mut app, column, row);
        assert_eq!(app.game().phase(), GamePhase::Running);

        let (column, row) = button_position(&app, Button::Pause);
        press(&mut app, column, row);
        assert_eq!(app.game().phase(), GamePhase::Paused);

        let (column, row) = button_position(&app, Button::Resume);
        press(&mut app, column, row);
        assert_eq!(app.game().phase(), GamePhase::Running);

        let (column, row) = button_position(&app, Button::Direction(Direction::Up));
        press(&mut app, column, row);
        app.on_tick();
        assert_eq!(app.game().head(), Position::new(10, 9));

        let (column, row) = button_position(&app, Button::NewGame);
        press(&mut app, column, row);
        assert_eq!(app.game().head(), Position::new(10, 10));
        assert_eq!(app.game().direction(), Direction::Right);
    }

    #[test]
    fn test_direction_buttons_hidden_without_pointer_support() {
        let mut app = App::new(MemoryStore::default(), StdRng::seed_from_u64(5), options(false));
        app.feed_bytes(b"\r");
        assert!(!app
            .screen()
            .buttons()
            .iter()
            .any(|region| matches!(region.button, Button::Direction(_))));
    }

    #[test]
    fn test_game_over_persists_new_high_score_once() {
        let store = MemoryStore {
            initial: 0,
            ..MemoryStore::default()
        };
        let saved = store.saved.clone();
        let mut app = started_app(store);
        app.game.set_score(3);
        app.game.set_snake(&[Position::new(19, 4)], Direction::Right);

        let outcome = app.on_tick();
        assert!(matches!(
            outcome,
            TickOutcome::GameOver {
                new_high_score: true,
                ..
            }
        ));
        assert_eq!(*saved.borrow(), vec![3]);
        assert_eq!(app.on_tick(), TickOutcome::Idle);
        assert_eq!(*saved.borrow(), vec![3]);

        // play again keeps the record
        let (column, row) = button_position(&app, Button::PlayAgain);
        press(&mut app, column, row);
        assert_eq!(app.game().phase(), GamePhase::Running);
        assert_eq!(app.game().high_score(), 3);
    }

    #[test]
    fn test_game_over_below_record_is_not_saved() {
        let store = MemoryStore {
            initial: 10,
            ..MemoryStore::default()
        };
        let saved = store.saved.clone();
        let mut app = started_app(store);
        app.game.set_score(2);
        app.game.set_snake(&[Position::new(0, 0)], Direction::Left);
        app.on_tick();
        assert!(saved.borrow().is_empty());
        assert_eq!(app.game().high_score(), 10);
    }

    #[test]
    fn test_failed_save_keeps_playing() {
        let mut app = App::new(FailingStore, StdRng::seed_from_u64(3), options(false));
        app.feed_bytes(b"\r");
        app.game.set_score(1);
        app.game.set_snake(&[Position::new(0, 0)], Direction::Left);
        app.on_tick();
        assert_eq!(app.game().phase(), GamePhase::GameOver);
        app.feed_bytes(b"\r");
        assert_eq!(app.game().phase(), GamePhase::Running);
    }

    #[test]
    fn test_new_game_key_only_after_start_and_quit_key() {
        let mut app = App::new(MemoryStore::default(), StdRng::seed_from_u64(3), options(false));
        app.feed_bytes(b"n");
        assert_eq!(app.game().phase(), GamePhase::NotStarted);
        app.feed_bytes(b"q");
        assert!(app.should_quit());
    }

    #[test]
    fn test_ticker_fires_once_per_interval() {
        let start = Instant::now();
        let interval = Duration::from_millis(150);
        let mut ticker = Ticker::new(interval, start);

        assert!(!ticker.is_due(start + Duration::from_millis(149)));
        assert!(ticker.is_due(start + Duration::from_millis(150)));
        assert!(!ticker.is_due(start + Duration::from_millis(200)));
        assert_eq!(
            ticker.time_until_due(start + Duration::from_millis(200)),
            Duration::from_millis(100)
        );

        // far behind: one tick, then a fresh interval
        assert!(ticker.is_due(start + Duration::from_millis(1000)));
        assert!(!ticker.is_due(start + Duration::from_millis(1001)));

        ticker.rearm(start + Duration::from_millis(2000));
        assert!(!ticker.is_due(start + Duration::from_millis(2100)));
        assert!(ticker.is_due(start + Duration::from_millis(2150)));
    }
}
