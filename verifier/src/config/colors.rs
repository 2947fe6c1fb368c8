//! Console colour settings.
//!
//! Colours are named (`red`, `green`, `blue`, `yellow`, `white`, `grey`,
//! `black`) or given as `#RRGGBB`. Hex colours need 24-bit mode; asking for
//! one under 8-bit mode is a configuration error caught at load time.

use colored::Color;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{ConfigError, ConfigResult};

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})$").expect("valid hex color regex")
});

const DEFAULT_BACKGROUNDS: [&str; 2] = ["black", "grey"];

/// Terminal colour depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    /// 256-colour palette (default macOS Terminal).
    Eight,
    /// True colour.
    TwentyFour,
}

/// Colour keys as they appear in the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorSettings {
    #[serde(default)]
    pub text_color_bits: Option<u64>,
    #[serde(default)]
    pub use_text_colors: Option<bool>,
    #[serde(default)]
    pub text_colors: Option<HashMap<String, String>>,
    #[serde(default)]
    pub use_background_colors: Option<bool>,
    #[serde(default)]
    pub background_colors: Option<Vec<String>>,
}

/// Resolved colours for console output.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub pass: Option<Color>,
    pub warn: Option<Color>,
    pub fail: Option<Color>,
    /// Background colours cycled per file; empty means no background.
    pub backgrounds: Vec<Color>,
}

impl ColorSettings {
    pub fn depth(&self) -> ConfigResult<ColorDepth> {
        match self.text_color_bits {
            None | Some(24) => Ok(ColorDepth::TwentyFour),
            Some(8) => Ok(ColorDepth::Eight),
            Some(other) => Err(ConfigError::ColorBits(other)),
        }
    }

    /// Resolve every configured colour, failing on the first bad one.
    pub fn palette(&self) -> ConfigResult<Palette> {
        let depth = self.depth()?;

        let (pass, warn, fail) = if self.use_text_colors.unwrap_or(false) {
            let lookup = |key: &str, default: &str| -> ConfigResult<Option<Color>> {
                let name = self
                    .text_colors
                    .as_ref()
                    .and_then(|colors| colors.get(key))
                    .map(String::as_str)
                    .unwrap_or(default);
                resolve_color(name, depth).map(Some)
            };
            (lookup("PASS", "green")?, lookup("WARN", "yellow")?, lookup("FAIL", "red")?)
        } else {
            (None, None, None)
        };

        let backgrounds = if self.use_background_colors.unwrap_or(false) {
            match self.background_colors.as_deref() {
                Some(names) if !names.is_empty() => names
                    .iter()
                    .map(|name| resolve_color(name, depth))
                    .collect::<ConfigResult<Vec<_>>>()?,
                _ => DEFAULT_BACKGROUNDS
                    .iter()
                    .map(|name| resolve_color(name, depth))
                    .collect::<ConfigResult<Vec<_>>>()?,
            }
        } else {
            Vec::new()
        };

        Ok(Palette { pass, warn, fail, backgrounds })
    }
}

/// Translate a colour name or hex code for the given depth.
pub fn resolve_color(name: &str, depth: ColorDepth) -> ConfigResult<Color> {
    if name.starts_with('#') {
        let caps = HEX_COLOR
            .captures(name)
            .ok_or_else(|| ConfigError::UnknownColor(name.to_string()))?;
        if depth == ColorDepth::Eight {
            return Err(ConfigError::RgbUnder8Bit(name.to_string()));
        }
        let channel = |i: usize| u8::from_str_radix(&caps[i], 16).unwrap_or(0);
        return Ok(Color::TrueColor { r: channel(1), g: channel(2), b: channel(3) });
    }

    let color = match (name, depth) {
        ("red", ColorDepth::Eight) => Color::Red,
        ("green", ColorDepth::Eight) => Color::Green,
        ("blue", ColorDepth::Eight) => Color::Blue,
        ("yellow", ColorDepth::Eight) => Color::Yellow,
        ("white", ColorDepth::Eight) => Color::White,
        ("grey", ColorDepth::Eight) => Color::BrightBlack,
        ("black", ColorDepth::Eight) => Color::Black,
        ("red", ColorDepth::TwentyFour) => Color::TrueColor { r: 255, g: 0, b: 0 },
        ("green", ColorDepth::TwentyFour) => Color::TrueColor { r: 0, g: 255, b: 0 },
        ("blue", ColorDepth::TwentyFour) => Color::TrueColor { r: 0, g: 0, b: 255 },
        ("yellow", ColorDepth::TwentyFour) => Color::TrueColor { r: 255, g: 255, b: 0 },
        ("white", ColorDepth::TwentyFour) => Color::TrueColor { r: 255, g: 255, b: 255 },
        ("grey", ColorDepth::TwentyFour) => Color::TrueColor { r: 150, g: 150, b: 150 },
        ("black", ColorDepth::TwentyFour) => Color::TrueColor { r: 0, g: 0, b: 0 },
        _ => return Err(ConfigError::UnknownColor(name.to_string())),
    };
    Ok(color)
}
