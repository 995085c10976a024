//! Configuration types and management
//!
//! Holds the localizable dialog labels, the colours applied to every widget
//! and the optional driver table file. Loaded from TOML.

use crate::error::{ModeSelError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// An RGB colour, written as `#rrggbb` in config files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl Rgb {
    /// Colour from its components
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Rgb {
    type Err = ModeSelError;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(ModeSelError::ParseError(format!("Invalid colour '{}'", s)));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| ModeSelError::ParseError(format!("Invalid colour '{}': {}", s, e)))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ModeSelError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Rgb> for String {
    fn from(rgb: Rgb) -> Self {
        rgb.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Foreground and background colours of the dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    /// Foreground colour
    pub fg: Rgb,
    /// Background colour
    pub bg: Rgb,
}

impl Style {
    /// Swapped colours, used for highlighted rows and focused buttons
    pub fn inverted(self) -> Self {
        Self {
            fg: self.bg,
            bg: self.fg,
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fg: Rgb::new(0, 0, 0),
            bg: Rgb::new(255, 255, 255),
        }
    }
}

/// The three localizable dialog strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    /// Dialog title
    pub title: String,
    /// Accept button label
    pub ok: String,
    /// Cancel button label
    pub cancel: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            title: "Graphics Mode".to_string(),
            ok: "OK".to_string(),
            cancel: "Cancel".to_string(),
        }
    }
}

/// Main mode selector configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dialog labels
    pub labels: Labels,

    /// Dialog colours
    pub style: Style,

    /// Driver table to use instead of the system platform
    pub platform_file: Option<PathBuf>,
}

impl Config {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| ModeSelError::config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("title", &self.labels.title),
            ("ok", &self.labels.ok),
            ("cancel", &self.labels.cancel),
        ] {
            if value.trim().is_empty() {
                return Err(ModeSelError::config(format!(
                    "Label '{}' cannot be empty",
                    name
                )));
            }
        }

        if self.style.fg == self.style.bg {
            return Err(ModeSelError::config(format!(
                "Foreground and background colours are both {}",
                self.style.fg
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.labels.title, "Graphics Mode");
    }

    #[test]
    fn test_rgb_parse() {
        assert_eq!("#ff8000".parse::<Rgb>().unwrap(), Rgb::new(255, 128, 0));
        assert_eq!("0a0b0c".parse::<Rgb>().unwrap(), Rgb::new(10, 11, 12));
        assert!("#fff".parse::<Rgb>().is_err());
        assert!("#gggggg".parse::<Rgb>().is_err());
        assert_eq!(Rgb::new(255, 128, 0).to_string(), "#ff8000");
    }

    #[test]
    fn test_config_validation_empty_label() {
        let mut config = Config::default();
        config.labels.cancel = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_same_colours() {
        let mut config = Config::default();
        config.style.bg = config.style.fg;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[labels]\ntitle = \"Grafikmodus\"\ncancel = \"Abbrechen\"\n\n[style]\nfg = \"#ffffff\"\nbg = \"#000080\"\n"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.labels.title, "Grafikmodus");
        assert_eq!(config.labels.ok, "OK");
        assert_eq!(config.style.bg, Rgb::new(0, 0, 128));
        assert_eq!(config.platform_file, None);
    }

    #[test]
    fn test_load_invalid_colour() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[style]\nfg = \"white\"\nbg = \"#000000\"\n").unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(ModeSelError::ConfigError(_))
        ));
    }
}
