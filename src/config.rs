use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use directories::ProjectDirs;
use anyhow::{Context, Result};
use std::fs;
use tiny_skia::Color;
use crate::filter::QueryMode;
use crate::model::CatalogEntry;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub launch: LaunchConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GeneralConfig {
    #[serde(default)]
    pub trim_query: bool,
    #[serde(default = "default_true")]
    pub close_on_launch: bool,
}

fn default_true() -> bool { true }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trim_query: false,
            close_on_launch: true,
        }
    }
}

impl GeneralConfig {
    pub fn query_mode(&self) -> QueryMode {
        if self.trim_query {
            QueryMode::Trimmed
        } else {
            QueryMode::Literal
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct LaunchConfig {
    /// Opener command and its flags; the URI or resolved path is appended.
    #[serde(default = "default_opener")]
    pub opener: Vec<String>,
    /// Command interpreter and its flag, the token is appended as one argument.
    #[serde(default = "default_shell")]
    pub shell: Vec<String>,
    /// How long to watch a shell child for "command not found" exits. 0 disables.
    #[serde(default = "default_shell_grace_ms")]
    pub shell_grace_ms: u64,
    #[serde(default)]
    pub env: HashMap<String, String>,
}

// `start` takes the first quoted argument as the window title.
#[cfg(target_os = "windows")]
fn default_opener() -> Vec<String> {
    ["cmd", "/C", "start", ""].iter().map(|s| s.to_string()).collect()
}
#[cfg(target_os = "macos")]
fn default_opener() -> Vec<String> { vec!["open".to_string()] }
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn default_opener() -> Vec<String> { vec!["xdg-open".to_string()] }

#[cfg(target_os = "windows")]
fn default_shell() -> Vec<String> { vec!["cmd".to_string(), "/C".to_string()] }
#[cfg(not(target_os = "windows"))]
fn default_shell() -> Vec<String> { vec!["sh".to_string(), "-c".to_string()] }

fn default_shell_grace_ms() -> u64 { 200 }

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            opener: default_opener(),
            shell: default_shell(),
            shell_grace_ms: default_shell_grace_ms(),
            env: HashMap::new(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct CatalogConfig {
    /// Include the table shipped for the host platform.
    #[serde(default = "default_true")]
    pub builtin: bool,
    #[serde(default)]
    pub entries: Vec<StaticEntry>,
    /// Labels dropped after builtin and custom entries are merged.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            builtin: true,
            entries: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StaticEntry {
    pub label: String,
    pub token: String,
}

impl From<StaticEntry> for CatalogEntry {
    fn from(entry: StaticEntry) -> Self {
        CatalogEntry::new(entry.label, entry.token)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ThemeConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_padding")]
    pub padding: f32,
    #[serde(default = "default_spacing")]
    pub spacing: f32,
    #[serde(default = "default_border_radius")]
    pub border_radius: f32,
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default = "default_border_color")]
    pub border_color: String,
    #[serde(default = "default_text")]
    pub text: String,
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
    #[serde(default = "default_selection_background")]
    pub selection_background: String,
    #[serde(default = "default_selection_text")]
    pub selection_text: String,
    #[serde(default = "default_number_color")]
    pub number_color: String,
    #[serde(default = "default_warning_color")]
    pub warning_color: String,
    #[serde(default = "default_error_color")]
    pub error_color: String,
}

fn default_width() -> u32 { 600 }
fn default_height() -> u32 { 650 }
fn default_padding() -> f32 { 20.0 }
fn default_spacing() -> f32 { 10.0 }
fn default_border_radius() -> f32 { 12.0 }
fn default_background() -> String { "1e1e1eff".to_string() }
fn default_border_color() -> String { "2d2d2dff".to_string() }
fn default_text() -> String { "ffffffff".to_string() }
fn default_placeholder() -> String { "aaaaaaff".to_string() }
fn default_selection_background() -> String { "0a84ffff".to_string() }
fn default_selection_text() -> String { "ffffffff".to_string() }
fn default_number_color() -> String { "646464ff".to_string() }
fn default_warning_color() -> String { "e5c07bff".to_string() }
fn default_error_color() -> String { "e06c75ff".to_string() }

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            padding: default_padding(),
            spacing: default_spacing(),
            border_radius: default_border_radius(),
            background: default_background(),
            border_color: default_border_color(),
            text: default_text(),
            placeholder: default_placeholder(),
            selection_background: default_selection_background(),
            selection_text: default_selection_text(),
            number_color: default_number_color(),
            warning_color: default_warning_color(),
            error_color: default_error_color(),
        }
    }
}

impl ThemeConfig {
    /// Parses `rrggbbaa`, with or without a leading `#`. Anything else is black;
    /// `invalid_colors` reports those at load time.
    pub fn parse_color(value: &str) -> Color {
        Self::try_parse_color(value).unwrap_or(Color::BLACK)
    }

    pub fn invalid_colors(&self) -> Vec<(&'static str, &str)> {
        [
            ("background", &self.background),
            ("border_color", &self.border_color),
            ("text", &self.text),
            ("placeholder", &self.placeholder),
            ("selection_background", &self.selection_background),
            ("selection_text", &self.selection_text),
            ("number_color", &self.number_color),
            ("warning_color", &self.warning_color),
            ("error_color", &self.error_color),
        ]
        .into_iter()
        .filter(|(_, value)| Self::try_parse_color(value).is_none())
        .map(|(field, value)| (field, value.as_str()))
        .collect()
    }

    fn try_parse_color(value: &str) -> Option<Color> {
        let hex = value.trim_start_matches('#');
        if hex.len() != 8 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Color::from_rgba8(channel(0)?, channel(2)?, channel(4)?, channel(6)?))
    }
}

pub fn default_config_path() -> PathBuf {
    match ProjectDirs::from("org", "panel-launcher", "panel-launcher") {
        Some(dirs) => dirs.config_dir().join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}

/// Loads `path`, or the per-user config file when `path` is `None`.
/// A missing default file is not an error; a missing explicit file is.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = default_config_path();
            if !p.exists() {
                log::debug!("No config at {:?}, using defaults", p);
                return Ok(Config::default());
            }
            p
        }
    };

    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("reading config {}", config_path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("parsing config {}", config_path.display()))?;
    for (field, value) in config.theme.invalid_colors() {
        log::warn!("theme.{} = '{}' is not an rrggbbaa color, using black", field, value);
    }
    log::info!("Loaded config from {:?}", config_path);
    Ok(config)
}
