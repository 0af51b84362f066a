//! RGBA colors with CSS-style parsing
//!
//! Style values arrive as CSS color strings (`"pink"`, `"#000"`,
//! `"rgb(0,0,0)"`). They are parsed once when a style is declared so the
//! paint pipeline only ever sees resolved [`Color`] values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// RGBA color with components in the 0.0-1.0 range
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Error returned when a color string cannot be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid color: {0:?}")]
pub struct ColorParseError(pub String);

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const YELLOW: Color = Color::rgb(1.0, 1.0, 0.0);
    pub const CYAN: Color = Color::rgb(0.0, 1.0, 1.0);
    pub const MAGENTA: Color = Color::rgb(1.0, 0.0, 1.0);
    pub const PURPLE: Color = Color::rgb(0.5, 0.0, 0.5);
    pub const ORANGE: Color = Color::rgb(1.0, 0.65, 0.0);
    pub const GRAY: Color = Color::rgb(0.5, 0.5, 0.5);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::rgb(r, g, b)
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha;
        self
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Parse a CSS color string (hex, `rgb()`, `rgba()` or a named color)
    pub fn parse(s: &str) -> Option<Color> {
        let s = s.trim();

        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex_color(hex);
        }

        if let Some(args) = s.strip_prefix("rgba(").and_then(|r| r.strip_suffix(')')) {
            return parse_rgba(args);
        }

        if let Some(args) = s.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
            return parse_rgb(args);
        }

        parse_named_color(s)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s).ok_or_else(|| ColorParseError(s.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        write!(
            f,
            "#{:02x}{:02x}{:02x}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )?;
        if self.a < 1.0 {
            write!(f, "{:02x}", channel(self.a))?;
        }
        Ok(())
    }
}

fn parse_hex_color(hex: &str) -> Option<Color> {
    let byte = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);

    match hex.len() {
        3 | 4 => {
            // Short form: #RGB(A) -> #RRGGBB(AA)
            let mut channels = hex.chars().map(|c| byte(&c.to_string().repeat(2)));
            let r = channels.next()??;
            let g = channels.next()??;
            let b = channels.next()??;
            let a = channels.next().unwrap_or(Some(1.0))?;
            Some(Color::rgba(r, g, b, a))
        }
        6 => Some(Color::rgb(
            byte(hex.get(0..2)?)?,
            byte(hex.get(2..4)?)?,
            byte(hex.get(4..6)?)?,
        )),
        8 => Some(Color::rgba(
            byte(hex.get(0..2)?)?,
            byte(hex.get(2..4)?)?,
            byte(hex.get(4..6)?)?,
            byte(hex.get(6..8)?)?,
        )),
        _ => None,
    }
}

fn parse_channels<const N: usize>(s: &str) -> Option<[f32; N]> {
    let parts: Vec<&str> = s.split(',').map(|p| p.trim()).collect();
    if parts.len() != N {
        return None;
    }

    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part.parse().ok()?;
    }
    Some(out)
}

// rgb()/rgba() channels are CSS 0-255 integers; alpha stays 0.0-1.0
fn parse_rgba(s: &str) -> Option<Color> {
    let [r, g, b, a] = parse_channels::<4>(s)?;
    Some(Color::rgba(r / 255.0, g / 255.0, b / 255.0, a.clamp(0.0, 1.0)))
}

fn parse_rgb(s: &str) -> Option<Color> {
    let [r, g, b] = parse_channels::<3>(s)?;
    Some(Color::rgb(r / 255.0, g / 255.0, b / 255.0))
}

fn parse_named_color(name: &str) -> Option<Color> {
    match name.to_lowercase().as_str() {
        "black" => Some(Color::BLACK),
        "white" => Some(Color::WHITE),
        "red" => Some(Color::RED),
        "green" => Some(Color::rgb(0.0, 0.5, 0.0)), // CSS green is #008000
        "blue" => Some(Color::BLUE),
        "darkblue" => Some(Color::rgb(0.0, 0.0, 0.55)),
        "yellow" => Some(Color::YELLOW),
        "cyan" | "aqua" => Some(Color::CYAN),
        "magenta" | "fuchsia" => Some(Color::MAGENTA),
        "gray" | "grey" => Some(Color::GRAY),
        "silver" => Some(Color::rgb(0.75, 0.75, 0.75)),
        "maroon" => Some(Color::rgb(0.5, 0.0, 0.0)),
        "olive" => Some(Color::rgb(0.5, 0.5, 0.0)),
        "navy" => Some(Color::rgb(0.0, 0.0, 0.5)),
        "purple" => Some(Color::PURPLE),
        "teal" => Some(Color::rgb(0.0, 0.5, 0.5)),
        "orange" => Some(Color::ORANGE),
        "pink" => Some(Color::rgb(1.0, 0.75, 0.8)),
        "brown" => Some(Color::rgb(0.65, 0.16, 0.16)),
        "lime" => Some(Color::rgb(0.0, 1.0, 0.0)),
        "coral" => Some(Color::rgb(1.0, 0.5, 0.31)),
        "gold" => Some(Color::rgb(1.0, 0.84, 0.0)),
        "indigo" => Some(Color::rgb(0.29, 0.0, 0.51)),
        "violet" => Some(Color::rgb(0.93, 0.51, 0.93)),
        "crimson" => Some(Color::rgb(0.86, 0.08, 0.24)),
        "salmon" => Some(Color::rgb(0.98, 0.5, 0.45)),
        "tomato" => Some(Color::rgb(1.0, 0.39, 0.28)),
        "skyblue" => Some(Color::rgb(0.53, 0.81, 0.92)),
        "steelblue" => Some(Color::rgb(0.27, 0.51, 0.71)),
        "transparent" => Some(Color::TRANSPARENT),
        _ => None,
    }
}
