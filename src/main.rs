use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use app::{App, AppOptions};
use config::PointerMode;
use high_score::YamlHighScoreStore;
use snake::DeathReason;
use terminal::RawTerminal;

mod app;
mod config;
mod error;
mod high_score;
mod input;
mod logger;
mod render;
mod snake;
mod storage;
mod swipe;
mod terminal;

#[derive(Parser)]
#[command(name = "gridsnake", about = "Snake on a 20x20 grid in your terminal")]
struct Args {
    // YAML config file, defaults to gridsnake_config.yaml next to the executable
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    tick_ms: Option<u64>,
    #[arg(long, value_enum)]
    pointer: Option<PointerMode>,
    #[arg(long)]
    no_color: bool,
    #[arg(long)]
    log_file: Option<PathBuf>,
    #[arg(long)]
    use_log_prefix: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config_path = args.config.unwrap_or_else(config::default_config_path);
    let mut game_config = config::load_config_file(&config_path)?;
    if let Some(tick_ms) = args.tick_ms {
        game_config.tick_interval_ms = tick_ms;
    }
    if let Some(pointer) = args.pointer {
        game_config.pointer = pointer;
    }
    if args.no_color {
        game_config.color = false;
    }
    if args.log_file.is_some() {
        game_config.log_file = args.log_file;
    }
    config::Validate::validate(&game_config).map_err(error::SnakeError::InvalidConfig)?;

    let prefix = if args.use_log_prefix {
        Some("Snake".to_string())
    } else {
        None
    };
    logger::init_logger(prefix, game_config.log_file.as_deref())?;
    log!("config loaded from {}", config_path.display());

    if !game_config.color {
        colored::control::set_override(false);
    }

    let term = std::env::var("TERM").ok();
    let pointer_support = game_config.pointer.is_supported(term.as_deref());
    let options = AppOptions::from_config(&game_config, pointer_support);
    let store = YamlHighScoreStore::from_file(&game_config.high_score_file);
    let mut app = App::new(store, StdRng::from_os_rng(), options);

    let result = {
        let terminal = RawTerminal::enter(pointer_support)?;
        let input = terminal::spawn_stdin_channel();
        app.run(&terminal, input)
        // the terminal is restored here, before anything is printed
    };
    if let Err(err) = result {
        log!("session ended with error: {}", err);
        return Err(err.into());
    }

    if let Some(reason) = app.game().death_reason() {
        let reason = match reason {
            DeathReason::WallCollision => "hit the wall",
            DeathReason::SelfCollision => "ran into itself",
        };
        println!("The snake {}.", reason);
    }
    println!("Final Score: {}", app.game().score());
    println!("High Score: {}", app.game().high_score());
    Ok(())
}
