/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ── Public Config Struct ──

#[derive(Clone, Debug, Default)]
pub struct GameConfig {
    pub rules: RulesConfig,
    pub gamepad: GamepadConfig,
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RulesConfig {
    pub max_energy: u32,
    pub seed: Option<u64>,  // None = seed from OS entropy
    pub door_entry: bool,   // allow walking/climbing into the door cell
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub break_boxes: Vec<String>,
    pub wait: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config.toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid setting: {0}")]
    Invalid(String),
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_max_energy")]
    max_energy: u32,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    door_entry: bool,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_break_boxes")]
    break_boxes: Vec<String>,
    #[serde(default = "default_wait")]
    wait: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    #[serde(default)]
    log_file: Option<String>,
}

// ── Defaults ──

fn default_max_energy() -> u32 { 100 }

fn default_break_boxes() -> Vec<String> { vec!["A".into(), "X".into()] }
fn default_wait() -> Vec<String> { vec!["B".into(), "Y".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            max_energy: default_max_energy(),
            seed: None,
            door_entry: false,
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            break_boxes: default_break_boxes(),
            wait: default_wait(),
            confirm: default_confirm(),
            cancel: default_cancel(),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            max_energy: default_max_energy(),
            seed: None,
            door_entry: false,
        }
    }
}

impl Default for GamepadConfig {
    fn default() -> Self {
        let g = TomlGamepad::default();
        GamepadConfig {
            break_boxes: g.break_boxes,
            wait: g.wait,
            confirm: g.confirm,
            cancel: g.cancel,
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) `~/.local/share/dropgame`.
    ///
    /// Never fails: a missing file gives defaults, a broken one gives
    /// defaults plus the error so the caller can report it once logging
    /// is up.
    pub fn load() -> (Self, Option<ConfigError>) {
        match candidate_dirs().iter().map(|d| d.join("config.toml")).find(|p| p.exists()) {
            Some(path) => match Self::read(&path) {
                Ok(cfg) => (cfg, None),
                Err(e) => (GameConfig::default(), Some(e)),
            },
            None => (GameConfig::default(), None),
        }
    }

    /// Read and parse a config file.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse config text. Missing keys take their defaults.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let toml_cfg: TomlConfig = toml::from_str(text)?;

        if toml_cfg.rules.max_energy == 0 {
            return Err(ConfigError::Invalid("rules.max_energy must be at least 1".into()));
        }

        Ok(GameConfig {
            rules: RulesConfig {
                max_energy: toml_cfg.rules.max_energy,
                seed: toml_cfg.rules.seed,
                door_entry: toml_cfg.rules.door_entry,
            },
            gamepad: GamepadConfig {
                break_boxes: toml_cfg.gamepad.break_boxes,
                wait: toml_cfg.gamepad.wait,
                confirm: toml_cfg.gamepad.confirm,
                cancel: toml_cfg.gamepad.cancel,
            },
            log_file: toml_cfg.general.log_file.map(PathBuf::from),
        })
    }
}

/// Candidate directories to search: exe dir + CWD + data dir (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/dropgame)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/dropgame");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}
