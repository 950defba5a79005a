//! Recording configuration document.
//!
//! A [`ConfigDocument`] keeps both the parsed [`RecordingConfig`] and the raw
//! YAML text, so comments written by the user survive into the recording file.

use crate::normalize::{DelayPolicy, PlaybackOptions};
use crate::result::{ReelError, ReelResult};
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use serde_yaml_ng::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Commented default configuration shipped with the binary
pub const DEFAULT_CONFIG: &str = include_str!("../config.yml");

/// Name of the configuration file inside the global directory
pub const CONFIG_FILE_NAME: &str = "config.yml";

/// Fallback terminal size when the host size is unknown
pub const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// Cursor shape drawn in rendered stills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorStyle {
    #[default]
    Block,
    Underline,
    Bar,
}

/// Terminal colors as CSS hex strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Theme {
    pub background: String,
    pub foreground: String,
    pub cursor: String,
    pub black: String,
    pub red: String,
    pub green: String,
    pub yellow: String,
    pub blue: String,
    pub magenta: String,
    pub cyan: String,
    pub white: String,
    pub bright_black: String,
    pub bright_red: String,
    pub bright_green: String,
    pub bright_yellow: String,
    pub bright_blue: String,
    pub bright_magenta: String,
    pub bright_cyan: String,
    pub bright_white: String,
}

impl Default for Theme {
    fn default() -> Self {
        let hex = |s: &str| s.to_string();
        Self {
            background: hex("#1d1f21"),
            foreground: hex("#afafaf"),
            cursor: hex("#c7c7c7"),
            black: hex("#232628"),
            red: hex("#fc4384"),
            green: hex("#b3e33b"),
            yellow: hex("#ffa727"),
            blue: hex("#75dff2"),
            magenta: hex("#ae89fe"),
            cyan: hex("#708387"),
            white: hex("#d5d5d0"),
            bright_black: hex("#626566"),
            bright_red: hex("#ff7fac"),
            bright_green: hex("#c8ed71"),
            bright_yellow: hex("#ebdf86"),
            bright_blue: hex("#75dff2"),
            bright_magenta: hex("#ae89fe"),
            bright_cyan: hex("#b1c6ca"),
            bright_white: hex("#f9f9f4"),
        }
    }
}

impl Theme {
    /// The 16 ANSI colors in index order
    #[must_use]
    pub fn ansi(&self) -> [&str; 16] {
        [
            &self.black,
            &self.red,
            &self.green,
            &self.yellow,
            &self.blue,
            &self.magenta,
            &self.cyan,
            &self.white,
            &self.bright_black,
            &self.bright_red,
            &self.bright_green,
            &self.bright_yellow,
            &self.bright_blue,
            &self.bright_magenta,
            &self.bright_cyan,
            &self.bright_white,
        ]
    }
}

/// Parsed `config` section of a recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordingConfig {
    pub command: Option<String>,
    pub cwd: Option<String>,
    pub env: BTreeMap<String, Value>,
    #[serde(with = "auto_dimension")]
    pub cols: Option<u16>,
    #[serde(with = "auto_dimension")]
    pub rows: Option<u16>,
    pub repeat: i32,
    pub quality: u8,
    pub frame_delay: DelayPolicy,
    pub max_idle_time: DelayPolicy,
    pub cursor_style: CursorStyle,
    pub font_family: String,
    pub font_size: f32,
    pub line_height: f32,
    pub padding: u32,
    pub theme: Theme,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        let playback = PlaybackOptions::default();
        Self {
            command: None,
            cwd: None,
            env: BTreeMap::new(),
            cols: None,
            rows: None,
            repeat: 0,
            quality: 100,
            frame_delay: playback.frame_delay,
            max_idle_time: playback.max_idle_time,
            cursor_style: CursorStyle::Block,
            font_family: "Monaco, Lucida Console, Ubuntu Mono, DejaVu Sans Mono, monospace"
                .to_string(),
            font_size: 12.0,
            line_height: 1.2,
            padding: 10,
            theme: Theme::default(),
        }
    }
}

impl RecordingConfig {
    /// Playback options from `frameDelay` and `maxIdleTime`, unit speed
    #[must_use]
    pub fn playback_options(&self) -> PlaybackOptions {
        PlaybackOptions::new()
            .with_frame_delay(self.frame_delay)
            .with_max_idle_time(self.max_idle_time)
    }

    /// Environment entries with scalar values rendered as strings
    #[must_use]
    pub fn env_vars(&self) -> Vec<(String, String)> {
        self.env
            .iter()
            .filter_map(|(key, value)| scalar_to_string(value).map(|v| (key.clone(), v)))
            .collect()
    }

    /// Terminal size, falling back to 80x24
    #[must_use]
    pub fn size(&self) -> (u16, u16) {
        (
            self.cols.unwrap_or(FALLBACK_SIZE.0),
            self.rows.unwrap_or(FALLBACK_SIZE.1),
        )
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `auto` (or null) for "take the host terminal size", otherwise a number
mod auto_dimension {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_yaml_ng::Value;

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(value: &Option<u16>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(n) => serializer.serialize_u16(*n),
            None => serializer.serialize_str("auto"),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u16>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            Value::String(s) if s.trim().eq_ignore_ascii_case("auto") => Ok(None),
            Value::Number(n) => n
                .as_u64()
                .and_then(|n| u16::try_from(n).ok())
                .filter(|n| *n > 0)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid terminal size `{n}`"))),
            other => Err(serde::de::Error::custom(format!(
                "expected `auto` or a number, got {other:?}"
            ))),
        }
    }
}

/// Parsed configuration plus its raw text
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    config: RecordingConfig,
    raw: String,
}

impl ConfigDocument {
    /// Parse a YAML document; an empty document yields the defaults
    pub fn parse(raw: impl Into<String>) -> ReelResult<Self> {
        let raw = raw.into();
        let value: Value = serde_yaml_ng::from_str(&raw)
            .map_err(|e| ReelError::invalid_config(format!("not a valid YAML file: {e}")))?;
        let config = if value.is_null() {
            RecordingConfig::default()
        } else {
            serde_yaml_ng::from_value(value).map_err(|e| ReelError::invalid_config(e.to_string()))?
        };
        Ok(Self { config, raw })
    }

    /// The built-in commented defaults
    pub fn builtin() -> ReelResult<Self> {
        Self::parse(DEFAULT_CONFIG)
    }

    /// Load a config file, appending `.yml` when needed
    pub fn load(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = resolve_file_path(path.as_ref(), "yml")?;
        if !path.is_file() {
            return Err(ReelError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        debug!(path = %path.display(), "loading config");
        Self::parse(std::fs::read_to_string(&path)?)
    }

    /// `explicit` if given, else the global config file, else the defaults
    pub fn resolve(explicit: Option<&Path>) -> ReelResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Ok(global) = global_config_path() {
            if global.is_file() {
                return Self::load(global);
            }
        }
        Self::builtin()
    }

    /// Parsed configuration
    #[must_use]
    pub fn config(&self) -> &RecordingConfig {
        &self.config
    }

    /// Raw YAML text
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Rewrite a first-level scalar key in both the parsed value and the raw
    /// text. The raw text is left alone when the key is not present in it.
    pub fn set_value(&mut self, key: &str, value: &str) -> ReelResult<()> {
        let pattern = Regex::new(&format!(r"(?m)^{}:.+$", regex::escape(key)))
            .map_err(|e| ReelError::invalid_config(e.to_string()))?;
        let line = format!("{key}: {value}");
        self.raw = pattern.replace(&self.raw, NoExpand(&line)).into_owned();

        // Typed scalar first, then the literal text for string fields like `command: true`
        let parsed = self
            .with_value(key, parse_scalar(value))
            .or_else(|_| self.with_value(key, Value::String(value.to_string())))?;
        self.config = parsed;
        Ok(())
    }

    fn with_value(&self, key: &str, value: Value) -> ReelResult<RecordingConfig> {
        let mut tree = serde_yaml_ng::to_value(&self.config)?;
        if let Value::Mapping(map) = &mut tree {
            map.insert(Value::String(key.to_string()), value);
        }
        serde_yaml_ng::from_value(tree).map_err(|e| ReelError::invalid_config(format!("{key}: {e}")))
    }

    /// Fill recording defaults: command, absolute cwd, terminal size
    pub fn normalize_for_recording(&mut self, host_size: Option<(u16, u16)>) -> ReelResult<()> {
        if self.config.command.as_deref().map_or(true, |c| c.trim().is_empty()) {
            self.set_value("command", default_shell())?;
        }

        let cwd = std::env::current_dir()?;
        let resolved = match self.config.cwd.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(dir) => cwd.join(dir),
            None => cwd,
        };
        self.set_value("cwd", &resolved.display().to_string())?;

        let (host_cols, host_rows) = host_size.unwrap_or(FALLBACK_SIZE);
        if self.config.cols.is_none() {
            self.set_value("cols", &host_cols.to_string())?;
        }
        if self.config.rows.is_none() {
            self.set_value("rows", &host_rows.to_string())?;
        }
        Ok(())
    }
}

fn parse_scalar(value: &str) -> Value {
    match serde_yaml_ng::from_str::<Value>(value) {
        Ok(parsed @ (Value::Number(_) | Value::Bool(_) | Value::Null | Value::String(_))) => parsed,
        _ => Value::String(value.to_string()),
    }
}

/// Shell used when the config leaves `command` empty
#[must_use]
pub const fn default_shell() -> &'static str {
    if cfg!(windows) {
        "powershell.exe"
    } else {
        "bash -l"
    }
}

/// Absolute path with `.extension` appended unless already present
pub fn resolve_file_path(path: &Path, extension: &str) -> ReelResult<PathBuf> {
    let mut resolved = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    if resolved.extension().and_then(|e| e.to_str()) != Some(extension) {
        let mut name = resolved.file_name().unwrap_or_default().to_os_string();
        name.push(".");
        name.push(extension);
        resolved.set_file_name(name);
    }
    Ok(resolved)
}

/// `%APPDATA%/ttyreel` on Windows, `$HOME/.ttyreel` elsewhere
pub fn global_directory() -> ReelResult<PathBuf> {
    if let Some(appdata) = std::env::var_os("APPDATA") {
        return Ok(PathBuf::from(appdata).join("ttyreel"));
    }
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".ttyreel"))
        .ok_or_else(|| ReelError::invalid_config("neither APPDATA nor HOME is set"))
}

/// Path of the global config file
pub fn global_config_path() -> ReelResult<PathBuf> {
    Ok(global_directory()?.join(CONFIG_FILE_NAME))
}

/// Write the default config into `dir`, creating it, and return the file path
pub fn write_default_config(dir: &Path) -> ReelResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(CONFIG_FILE_NAME);
    std::fs::write(&path, DEFAULT_CONFIG)?;
    Ok(path)
}
