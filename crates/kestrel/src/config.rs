use kestrel_common::{color_from_rgb, kestrel_config_dir, parse_color};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xkeysym::Keysym;

use crate::layer::Layer;
use crate::output::Transform;

pub const BTN_LEFT: u32 = 0x110;
pub const BTN_RIGHT: u32 = 0x111;
pub const BTN_MIDDLE: u32 = 0x112;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

fn default_gap_size() -> i32 {
    4
}
fn default_bar_height() -> i32 {
    20
}
fn default_border_width() -> i32 {
    1
}

fn default_bar_background() -> String {
    "#1A1A1A".to_string()
}
fn default_bar_selection() -> String {
    "#1A1AE6".to_string()
}
fn default_bar_text() -> String {
    "#FFFFFF".to_string()
}
fn default_view_marker() -> String {
    "#FFFFFF".to_string()
}
fn default_status_separator() -> String {
    "#4D4D4D".to_string()
}
fn default_border_active() -> String {
    "#1A1AE6".to_string()
}
fn default_border_inactive() -> String {
    "#1A1A4D".to_string()
}

fn default_status_interval() -> u64 {
    1
}
fn default_separator_thickness() -> i32 {
    1
}
fn default_status_padding() -> i32 {
    4
}
fn default_status_blocks() -> Vec<String> {
    vec!["builtin:datetime".to_string(), "builtin:memory".to_string()]
}

fn default_repeat_rate() -> i32 {
    25
}
fn default_repeat_delay() -> i32 {
    500
}
fn default_accel_speed() -> f64 {
    -0.2
}
fn default_pointers() -> Vec<PointerEntry> {
    vec![PointerEntry::default()]
}

fn default_outputs() -> Vec<OutputEntry> {
    vec![
        OutputEntry {
            name: "DP-1".to_string(),
            width: 2560,
            height: 1440,
            refresh: 144,
            transform: None,
        },
        OutputEntry {
            name: "DP-2".to_string(),
            width: 2560,
            height: 1440,
            refresh: 60,
            transform: None,
        },
    ]
}

fn default_mod_key() -> String {
    "super".to_string()
}

fn bind(key: &str, action: &str) -> KeybindEntry {
    KeybindEntry {
        key: key.to_string(),
        action: action.to_string(),
    }
}

fn default_bindings() -> Vec<KeybindEntry> {
    let mut binds = vec![
        bind("mod+shift+Escape", "exit"),
        bind("mod+Return", "spawn foot"),
        bind("mod+space", "spawn bemenu-run"),
        bind("mod+shift+q", "close"),
        bind("mod+r", "layout recursive"),
        bind("mod+f", "cycle_layer floating tiled"),
        bind("mod+shift+f", "fullscreen"),
        bind("mod+s", "toggle_layer sticky"),
        bind("mod+shift+s", "cycle_layer sticky floating"),
        bind("mod+comma", "view prev"),
        bind("mod+period", "view next"),
    ];
    for n in 1..=9 {
        binds.push(bind(&format!("mod+{}", n), &format!("view {}", n)));
    }
    let shifted = [
        "exclam",
        "at",
        "numbersign",
        "dollar",
        "percent",
        "asciicircum",
        "ampersand",
        "asterisk",
        "parenleft",
    ];
    for (i, key) in shifted.iter().enumerate() {
        binds.push(bind(&format!("mod+shift+{}", key), &format!("move_to_view {}", i + 1)));
    }
    binds
}

fn default_button_bindings() -> Vec<ButtonEntry> {
    vec![
        ButtonEntry {
            button: "mod+left".to_string(),
            action: "move".to_string(),
        },
        ButtonEntry {
            button: "mod+right".to_string(),
            action: "resize".to_string(),
        },
        ButtonEntry {
            button: "mod+middle".to_string(),
            action: "set_layer tiled".to_string(),
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusMode {
    #[default]
    Hover,
    Click,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccelProfile {
    #[default]
    Flat,
    Adaptive,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewTarget {
    /// Zero-based view index.
    Index(usize),
    Relative(i32),
}

impl ViewTarget {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "next" | "n" => Some(ViewTarget::Relative(1)),
            "prev" | "previous" | "p" => Some(ViewTarget::Relative(-1)),
            s if s.starts_with('+') || s.starts_with('-') => s.parse().ok().map(ViewTarget::Relative),
            s => s
                .parse::<usize>()
                .ok()
                .filter(|&n| n >= 1)
                .map(|n| ViewTarget::Index(n - 1)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Exit,
    Close,
    Spawn(String),
    SetLayout(String),
    CycleLayer(Vec<Layer>),
    ToggleFullscreen,
    ToggleLayer(Layer),
    SetLayer(Layer),
    View(ViewTarget),
    MoveToView(usize),
    Move,
    Resize,
}

impl Action {
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (cmd, args) = match s.find(' ') {
            Some(i) => (s[..i].trim(), s[i + 1..].trim()),
            None => (s, ""),
        };

        match cmd.to_lowercase().as_str() {
            "exit" | "quit" => Some(Action::Exit),
            "close" | "close_window" => Some(Action::Close),

            "spawn" | "exec" => {
                if args.is_empty() {
                    None
                } else {
                    Some(Action::Spawn(args.to_string()))
                }
            }

            "layout" | "set_layout" => {
                if args.is_empty() {
                    None
                } else {
                    Some(Action::SetLayout(args.to_string()))
                }
            }

            "cycle_layer" => {
                let layers: Option<Vec<Layer>> = args.split_whitespace().map(Layer::parse).collect();
                layers.filter(|l| !l.is_empty()).map(Action::CycleLayer)
            }
            "fullscreen" | "toggle_fullscreen" => Some(Action::ToggleFullscreen),
            "toggle_layer" => Layer::parse(args).map(Action::ToggleLayer),
            "set_layer" => Layer::parse(args).map(Action::SetLayer),

            "view" | "select_view" => ViewTarget::parse(args).map(Action::View),
            "move_to_view" => match ViewTarget::parse(args)? {
                ViewTarget::Index(i) => Some(Action::MoveToView(i)),
                ViewTarget::Relative(_) => None,
            },

            "move" | "move_window" => Some(Action::Move),
            "resize" | "resize_window" => Some(Action::Resize),

            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub logo: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Keybind {
    pub modifiers: Modifiers,
    pub keysym: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ButtonBind {
    pub modifiers: Modifiers,
    pub button: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KeybindEntry {
    pub key: String,
    pub action: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ButtonEntry {
    pub button: String,
    pub action: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub appearance: AppearanceConfig,
    pub status: StatusConfig,
    pub input: InputConfig,
    #[serde(default = "default_outputs")]
    pub outputs: Vec<OutputEntry>,
    pub keybinds: KeybindsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            appearance: AppearanceConfig::default(),
            status: StatusConfig::default(),
            input: InputConfig::default(),
            outputs: default_outputs(),
            keybinds: KeybindsConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppearanceConfig {
    #[serde(default = "default_gap_size")]
    pub gap_size: i32,
    #[serde(default = "default_bar_height")]
    pub bar_height: i32,
    #[serde(default = "default_border_width")]
    pub border_width: i32,
    #[serde(default = "default_bar_background")]
    pub bar_background: String,
    #[serde(default = "default_bar_selection")]
    pub bar_selection: String,
    #[serde(default = "default_bar_text")]
    pub bar_text: String,
    #[serde(default = "default_view_marker")]
    pub view_marker: String,
    #[serde(default = "default_status_separator")]
    pub status_separator: String,
    #[serde(default = "default_border_active")]
    pub border_active: String,
    #[serde(default = "default_border_inactive")]
    pub border_inactive: String,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            gap_size: default_gap_size(),
            bar_height: default_bar_height(),
            border_width: default_border_width(),
            bar_background: default_bar_background(),
            bar_selection: default_bar_selection(),
            bar_text: default_bar_text(),
            view_marker: default_view_marker(),
            status_separator: default_status_separator(),
            border_active: default_border_active(),
            border_inactive: default_border_inactive(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StatusConfig {
    #[serde(default = "default_status_interval")]
    pub interval_seconds: u64,
    #[serde(default = "default_separator_thickness")]
    pub separator_thickness: i32,
    #[serde(default = "default_status_padding")]
    pub padding: i32,
    #[serde(default = "default_status_blocks")]
    pub blocks: Vec<String>,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_status_interval(),
            separator_thickness: default_separator_thickness(),
            padding: default_status_padding(),
            blocks: default_status_blocks(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PointerEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub accel_profile: AccelProfile,
    #[serde(default = "default_accel_speed")]
    pub accel_speed: f64,
}

impl Default for PointerEntry {
    fn default() -> Self {
        Self {
            name: None,
            accel_profile: AccelProfile::Flat,
            accel_speed: default_accel_speed(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    pub focus_mode: FocusMode,
    pub cursor_movement_prevents_idle: bool,
    #[serde(default = "default_repeat_rate")]
    pub repeat_rate: i32,
    #[serde(default = "default_repeat_delay")]
    pub repeat_delay: i32,
    #[serde(default = "default_pointers")]
    pub pointer: Vec<PointerEntry>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            focus_mode: FocusMode::Hover,
            cursor_movement_prevents_idle: false,
            repeat_rate: default_repeat_rate(),
            repeat_delay: default_repeat_delay(),
            pointer: default_pointers(),
        }
    }
}

impl InputConfig {
    /// Settings for a pointer device: the entry naming it, else the unnamed
    /// default entry, else the built-in default.
    pub fn pointer_settings(&self, device: &str) -> PointerEntry {
        self.pointer
            .iter()
            .find(|entry| entry.name.as_deref() == Some(device))
            .or_else(|| self.pointer.iter().find(|entry| entry.name.is_none()))
            .cloned()
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OutputEntry {
    pub name: String,
    pub width: i32,
    pub height: i32,
    /// Hertz.
    pub refresh: i32,
    #[serde(default)]
    pub transform: Option<String>,
}

impl OutputEntry {
    pub fn transform(&self) -> Transform {
        self.transform
            .as_deref()
            .and_then(Transform::parse)
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct KeybindsConfig {
    #[serde(default = "default_mod_key")]
    pub mod_key: String,

    #[serde(default = "default_bindings")]
    pub bind: Vec<KeybindEntry>,

    #[serde(default = "default_button_bindings")]
    pub button: Vec<ButtonEntry>,
}

impl Default for KeybindsConfig {
    fn default() -> Self {
        Self {
            mod_key: default_mod_key(),
            bind: default_bindings(),
            button: default_button_bindings(),
        }
    }
}

impl KeybindsConfig {
    /// Splits `mod+shift+x` into modifiers and the trailing key name.
    fn parse_modifiers<'a>(&self, bind_str: &'a str) -> (Modifiers, &'a str) {
        let mut modifiers = Modifiers::default();
        let mut key_part = "";

        for part in bind_str.split('+') {
            let part = part.trim();
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => modifiers.ctrl = true,
                "alt" | "mod1" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                "super" | "mod4" | "logo" | "win" | "meta" => modifiers.logo = true,
                "mod" => match self.mod_key.to_lowercase().as_str() {
                    "alt" | "mod1" => modifiers.alt = true,
                    "ctrl" | "control" => modifiers.ctrl = true,
                    _ => modifiers.logo = true,
                },
                _ => key_part = part,
            }
        }

        (modifiers, key_part)
    }

    pub fn parse_keybind(&self, bind_str: &str) -> Option<Keybind> {
        let (modifiers, key) = self.parse_modifiers(bind_str);
        let keysym = keysym_from_name(key)?;
        Some(Keybind { modifiers, keysym })
    }

    pub fn parse_button(&self, bind_str: &str) -> Option<ButtonBind> {
        let (modifiers, button) = self.parse_modifiers(bind_str);
        let button = match button.to_lowercase().as_str() {
            "left" => BTN_LEFT,
            "right" => BTN_RIGHT,
            "middle" => BTN_MIDDLE,
            other => other.parse().ok()?,
        };
        Some(ButtonBind { modifiers, button })
    }

    pub fn key_bindings(&self) -> Vec<(Keybind, Action)> {
        self.bind
            .iter()
            .filter_map(|entry| {
                let parsed = self
                    .parse_keybind(&entry.key)
                    .zip(Action::parse(&entry.action));
                if parsed.is_none() {
                    log::warn!("[config] Ignoring key binding {} = {}", entry.key, entry.action);
                }
                parsed
            })
            .collect()
    }

    pub fn button_bindings(&self) -> Vec<(ButtonBind, Action)> {
        self.button
            .iter()
            .filter_map(|entry| {
                let parsed = self
                    .parse_button(&entry.button)
                    .zip(Action::parse(&entry.action));
                if parsed.is_none() {
                    log::warn!("[config] Ignoring button binding {} = {}", entry.button, entry.action);
                }
                parsed
            })
            .collect()
    }
}

/// Folds uppercase Latin letters onto their lowercase keysyms so that
/// `shift+q` bindings match the `Q` keysym a shifted keyboard reports.
pub fn normalize_keysym(keysym: u32) -> u32 {
    if (u32::from(b'A')..=u32::from(b'Z')).contains(&keysym) {
        keysym + 0x20
    } else {
        keysym
    }
}

pub fn keysym_from_name(name: &str) -> Option<u32> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_graphic() {
            return Some(normalize_keysym(c as u32));
        }
    }

    let keysym = match name.to_lowercase().as_str() {
        "return" | "enter" | "ret" => Keysym::Return,
        "escape" | "esc" => Keysym::Escape,
        "tab" => Keysym::Tab,
        "space" | "spc" => Keysym::space,
        "backspace" => Keysym::BackSpace,
        "delete" | "del" => Keysym::Delete,
        "insert" | "ins" => Keysym::Insert,
        "home" => Keysym::Home,
        "end" => Keysym::End,
        "pageup" | "page_up" | "prior" => Keysym::Page_Up,
        "pagedown" | "page_down" | "next" => Keysym::Page_Down,
        "left" => Keysym::Left,
        "right" => Keysym::Right,
        "up" => Keysym::Up,
        "down" => Keysym::Down,
        "print" | "printscreen" => Keysym::Print,
        "f1" => Keysym::F1,
        "f2" => Keysym::F2,
        "f3" => Keysym::F3,
        "f4" => Keysym::F4,
        "f5" => Keysym::F5,
        "f6" => Keysym::F6,
        "f7" => Keysym::F7,
        "f8" => Keysym::F8,
        "f9" => Keysym::F9,
        "f10" => Keysym::F10,
        "f11" => Keysym::F11,
        "f12" => Keysym::F12,
        "exclam" => Keysym::exclam,
        "at" => Keysym::at,
        "numbersign" => Keysym::numbersign,
        "dollar" => Keysym::dollar,
        "percent" => Keysym::percent,
        "asciicircum" => Keysym::asciicircum,
        "ampersand" => Keysym::ampersand,
        "asterisk" => Keysym::asterisk,
        "parenleft" => Keysym::parenleft,
        "parenright" => Keysym::parenright,
        "minus" => Keysym::minus,
        "equal" => Keysym::equal,
        "plus" => Keysym::plus,
        "comma" => Keysym::comma,
        "period" | "dot" => Keysym::period,
        "slash" => Keysym::slash,
        "backslash" => Keysym::backslash,
        "semicolon" => Keysym::semicolon,
        "apostrophe" => Keysym::apostrophe,
        "grave" => Keysym::grave,
        "bracketleft" => Keysym::bracketleft,
        "bracketright" => Keysym::bracketright,
        _ => return None,
    };
    Some(keysym.raw())
}

/// Source of one status-bar block.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusBlock {
    DateTime,
    Memory,
    Command(String),
}

impl StatusBlock {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "builtin:datetime" => StatusBlock::DateTime,
            "builtin:memory" => StatusBlock::Memory,
            command => StatusBlock::Command(command.to_string()),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let user_config = kestrel_config_dir().join("config.toml");
        let system_config = PathBuf::from("/etc/kestrel/config.toml");

        for path in [user_config, system_config] {
            if !path.exists() {
                continue;
            }
            match Self::load_from_path(&path) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    return config;
                }
                Err(e) => log::warn!("{}", e),
            }
        }

        log::info!("Using default configuration");
        Self::default()
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn output_entry(&self, name: &str) -> Option<&OutputEntry> {
        self.outputs.iter().find(|entry| entry.name == name)
    }

    pub fn status_blocks(&self) -> Vec<StatusBlock> {
        self.status.blocks.iter().map(|s| StatusBlock::parse(s)).collect()
    }

    pub fn bar_background(&self) -> u32 {
        parse_color(&self.appearance.bar_background).unwrap_or(color_from_rgb([0.1, 0.1, 0.1]))
    }

    pub fn bar_selection(&self) -> u32 {
        parse_color(&self.appearance.bar_selection).unwrap_or(color_from_rgb([0.1, 0.1, 0.9]))
    }

    pub fn bar_text(&self) -> u32 {
        parse_color(&self.appearance.bar_text).unwrap_or(0xFFFFFFFF)
    }

    pub fn view_marker(&self) -> u32 {
        parse_color(&self.appearance.view_marker).unwrap_or(0xFFFFFFFF)
    }

    pub fn status_separator(&self) -> u32 {
        parse_color(&self.appearance.status_separator).unwrap_or(color_from_rgb([0.3, 0.3, 0.3]))
    }

    pub fn border_active(&self) -> u32 {
        parse_color(&self.appearance.border_active).unwrap_or(color_from_rgb([0.1, 0.1, 0.9]))
    }

    pub fn border_inactive(&self) -> u32 {
        parse_color(&self.appearance.border_inactive).unwrap_or(color_from_rgb([0.1, 0.1, 0.3]))
    }
}
