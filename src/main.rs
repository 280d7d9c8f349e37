/// Entry point and game loop.
///
/// Every action key is followed by exactly one engine turn. Nothing moves
/// while no key is pressed.

mod config;
mod domain;
mod sim;
mod ui;

use std::error::Error;
use std::fs::File;
use std::time::Duration;

use log::{error, info, warn};

use config::GameConfig;
use domain::rules;
use sim::engine::{Engine, TurnOutcome};
use ui::gamepad::GamepadState;
use ui::input::{Command, InputState};
use ui::renderer::{Hud, Renderer};
use ui::sound::SoundEngine;

/// How long one loop iteration waits for input before redrawing.
const INPUT_WAIT: Duration = Duration::from_millis(50);

type Game = Engine<Renderer>;

fn main() {
    let (config, config_err) = GameConfig::load();
    init_logging(&config);
    if let Some(e) = config_err {
        warn!("{e}; using defaults");
    }

    let sound = SoundEngine::new();
    let mut gamepad = GamepadState::new(&config.gamepad);
    let mut game: Game = Engine::from_rules(Renderer::new(), &config.rules);

    if let Err(e) = game.sink_mut().init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut game, &mut gamepad, sound.as_ref());

    if let Err(e) = game.sink_mut().cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!("game loop failed: {e}");
        eprintln!("Game error: {e}");
    }

    let w = game.world();
    println!();
    println!("Reached level {} after {} turns.", w.level_number, w.turn_number);
}

/// Logs go to stderr unless `[general] log_file` is set. `RUST_LOG`
/// overrides the default `warn` filter.
fn init_logging(config: &GameConfig) {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(path) = &config.log_file {
        match File::create(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("could not open log file {}: {e}", path.display()),
        }
    }
    builder.init();
}

fn game_loop(
    game: &mut Game,
    gamepad: &mut GamepadState,
    sound: Option<&SoundEngine>,
) -> Result<(), Box<dyn Error>> {
    let mut keyboard = InputState::new();
    let mut message = String::new();

    game.start_game();

    loop {
        let mut commands = keyboard.drain_events(INPUT_WAIT);
        commands.extend(gamepad.drain_events());

        for cmd in commands {
            match cmd {
                Command::Quit => {
                    let w = game.world();
                    info!("quit on level {} turn {}", w.level_number, w.turn_number);
                    return Ok(());
                }
                Command::Confirm if game.is_over() => {
                    game.start_game();
                    message.clear();
                }
                _ if game.is_over() || !cmd.takes_turn() => {}
                _ => {
                    if let Some(note) = play_turn(game, cmd) {
                        message = note;
                    }
                    for event in game.take_events() {
                        if let Some(s) = sound {
                            s.play_event(&event);
                        }
                    }
                }
            }
        }

        let hud = hud_for(game, &message);
        game.sink_mut().present(&hud)?;
    }
}

/// Apply one action, then advance one turn. Returns a status line, if any.
fn play_turn(game: &mut Game, cmd: Command) -> Option<String> {
    let mut note = None;
    match cmd {
        Command::MoveLeft => { game.move_left(); }
        Command::MoveRight => { game.move_right(); }
        Command::Break => {
            if !game.world().player.has_full_energy() {
                note = Some("Not enough energy to break".to_string());
            } else if game.break_boxes() == 0 {
                note = Some("Nothing to break".to_string());
            }
        }
        _ => {}
    }

    match game.do_turn() {
        TurnOutcome::Continue => note,
        TurnOutcome::LevelCleared { level } => Some(format!("Level {level} cleared!")),
        TurnOutcome::Crushed { x, y } => {
            let w = game.world();
            info!("session over: crushed at ({x}, {y}), level {} turn {}", w.level_number, w.turn_number);
            Some("Crushed!".to_string())
        }
    }
}

fn hud_for(game: &Game, message: &str) -> Hud {
    let w = game.world();
    Hud {
        level: w.level_number,
        turn: w.turn_number,
        items_required: rules::items_required(w.level_number),
        crushed_at: game.is_over().then(|| (w.player.x, w.player.y)),
        message: message.to_string(),
    }
}
