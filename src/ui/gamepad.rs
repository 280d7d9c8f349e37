/// Gamepad input using gilrs.
///
/// Button mapping comes from the `[gamepad]` section of config.toml.
/// Default mapping:
///   D-pad / Left Stick    →  Move left / right
///   A / X                 →  Break boxes
///   B / Y                 →  Wait a turn
///   Start                 →  New game after a crush
///   Select                →  Quit
///
/// Like the keyboard, every press is one command. The stick counts as a
/// press when it crosses the deadzone.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use super::input::Command;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical face/shoulder buttons.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East  => Some(Btn::B),
            Button::West  => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start  => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Command-to-button mapping.
#[derive(Clone, Debug, PartialEq, Eq)]
struct ActionMap {
    break_boxes: Vec<Btn>,
    wait: Vec<Btn>,
    confirm: Vec<Btn>,
    cancel: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            break_boxes: vec![Btn::A, Btn::X],
            wait:        vec![Btn::B, Btn::Y],
            confirm:     vec![Btn::Start],
            cancel:      vec![Btn::Select],
        }
    }
}

impl ActionMap {
    /// Build from config names. Unknown names are skipped; an entry with
    /// no usable names keeps its default.
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse_list(names: &[String], fallback: Vec<Btn>) -> Vec<Btn> {
            let parsed: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if parsed.is_empty() { fallback } else { parsed }
        }
        let d = ActionMap::default();
        ActionMap {
            break_boxes: parse_list(&cfg.break_boxes, d.break_boxes),
            wait: parse_list(&cfg.wait, d.wait),
            confirm: parse_list(&cfg.confirm, d.confirm),
            cancel: parse_list(&cfg.cancel, d.cancel),
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn command_for(&self, btn: Btn) -> Option<Command> {
        if self.break_boxes.contains(&btn) {
            Some(Command::Break)
        } else if self.wait.contains(&btn) {
            Some(Command::Wait)
        } else if self.confirm.contains(&btn) {
            Some(Command::Confirm)
        } else if self.cancel.contains(&btn) {
            Some(Command::Quit)
        } else {
            None
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_x: f32,
    action_map: ActionMap,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let gilrs_opt = match Gilrs::new() {
            Ok(g) => {
                if g.gamepads().next().is_some() {
                    log::info!("gamepad found at start-up");
                }
                Some(g)
            }
            Err(e) => {
                log::warn!("gamepad support unavailable: {e}");
                None
            }
        };

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            stick_x: 0.0,
            action_map: ActionMap::from_config(cfg),
        }
    }

    /// Drain pending gamepad events into commands.
    pub fn drain_events(&mut self) -> Vec<Command> {
        #[cfg(feature = "gamepad")]
        {
            self.poll_gilrs()
        }
        #[cfg(not(feature = "gamepad"))]
        {
            Vec::new()
        }
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) -> Vec<Command> {
        let mut out = Vec::new();
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return out,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    let cmd = match btn {
                        Button::DPadLeft => Some(Command::MoveLeft),
                        Button::DPadRight => Some(Command::MoveRight),
                        Button::DPadDown => Some(Command::Wait),
                        other => Btn::from_gilrs(other).and_then(|b| self.action_map.command_for(b)),
                    };
                    out.extend(cmd);
                }
                EventType::AxisChanged(Axis::LeftStickX, value, _) => {
                    out.extend(self.stick_edge(value));
                }
                EventType::Connected => {
                    log::info!("gamepad connected");
                }
                EventType::Disconnected => {
                    self.stick_x = 0.0;
                    log::info!("gamepad disconnected");
                }
                _ => {}
            }
        }
        out
    }

    /// A move command when the stick newly crosses the deadzone.
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn stick_edge(&mut self, value: f32) -> Option<Command> {
        let prev = self.stick_x;
        self.stick_x = value;
        if value < -STICK_DEADZONE && prev >= -STICK_DEADZONE {
            Some(Command::MoveLeft)
        } else if value > STICK_DEADZONE && prev <= STICK_DEADZONE {
            Some(Command::MoveRight)
        } else {
            None
        }
    }
}
