//! Theme colors resolved for terminal cells.

use crate::config::Theme;
use crate::result::{ReelError, ReelResult};
use alacritty_terminal::vte::ansi::{Color, NamedColor, Rgb};

const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

/// 256-color table plus the special theme colors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    indexed: Vec<Rgb>,
    pub foreground: Rgb,
    pub background: Rgb,
    pub cursor: Rgb,
}

impl Palette {
    /// Build from theme hex strings
    pub fn from_theme(theme: &Theme) -> ReelResult<Self> {
        let mut indexed = Vec::with_capacity(256);
        for hex in theme.ansi() {
            indexed.push(parse_hex(hex)?);
        }
        for index in 16..=255u8 {
            indexed.push(xterm_color(index));
        }
        Ok(Self {
            indexed,
            foreground: parse_hex(&theme.foreground)?,
            background: parse_hex(&theme.background)?,
            cursor: parse_hex(&theme.cursor)?,
        })
    }

    /// Color of a 256-color index
    #[must_use]
    pub fn indexed(&self, index: u8) -> Rgb {
        self.indexed[usize::from(index)]
    }

    /// Resolve a cell color
    #[must_use]
    pub fn resolve(&self, color: Color) -> Rgb {
        match color {
            Color::Spec(rgb) => rgb,
            Color::Indexed(index) => self.indexed(index),
            Color::Named(named) => self.named(named),
        }
    }

    fn named(&self, named: NamedColor) -> Rgb {
        match named {
            NamedColor::Foreground | NamedColor::BrightForeground => self.foreground,
            NamedColor::Background => self.background,
            NamedColor::Cursor => self.cursor,
            NamedColor::DimForeground => dim(self.foreground),
            other => {
                let index = other as usize;
                if index < 16 {
                    self.indexed[index]
                } else {
                    // DimBlack..DimWhite follow the special colors in order
                    let base = index.saturating_sub(NamedColor::DimBlack as usize) % 8;
                    dim(self.indexed[base])
                }
            }
        }
    }
}

/// Bright variant of a normal ANSI color, used for bold text
#[must_use]
pub fn brighten(color: Color) -> Color {
    match color {
        Color::Named(named) if (named as usize) < 8 => Color::Indexed(named as u8 + 8),
        Color::Indexed(index) if index < 8 => Color::Indexed(index + 8),
        other => other,
    }
}

/// Two thirds brightness
#[must_use]
pub fn dim(rgb: Rgb) -> Rgb {
    let scale = |c: u8| (u16::from(c) * 2 / 3) as u8;
    Rgb {
        r: scale(rgb.r),
        g: scale(rgb.g),
        b: scale(rgb.b),
    }
}

/// xterm default for indices 16..=255
#[must_use]
pub fn xterm_color(index: u8) -> Rgb {
    match index {
        16..=231 => {
            let i = index - 16;
            Rgb {
                r: CUBE_LEVELS[usize::from(i / 36)],
                g: CUBE_LEVELS[usize::from((i / 6) % 6)],
                b: CUBE_LEVELS[usize::from(i % 6)],
            }
        }
        232..=255 => {
            let level = 8 + (index - 232) * 10;
            Rgb {
                r: level,
                g: level,
                b: level,
            }
        }
        _ => Rgb { r: 0, g: 0, b: 0 },
    }
}

/// Parse `#rgb` or `#rrggbb`; `transparent` maps to black
pub fn parse_hex(text: &str) -> ReelResult<Rgb> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("transparent") {
        return Ok(Rgb { r: 0, g: 0, b: 0 });
    }
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    let invalid = || ReelError::invalid_config(format!("invalid color `{text}`"));
    if !digits.is_ascii() {
        return Err(invalid());
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

    match digits.len() {
        6 => Ok(Rgb {
            r: channel(&digits[0..2])?,
            g: channel(&digits[2..4])?,
            b: channel(&digits[4..6])?,
        }),
        3 => {
            let short = |s: &str| channel(s).map(|v| v * 17);
            Ok(Rgb {
                r: short(&digits[0..1])?,
                g: short(&digits[1..2])?,
                b: short(&digits[2..3])?,
            })
        }
        _ => Err(invalid()),
    }
}

/// `#rrggbb`
#[must_use]
pub fn css(rgb: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb.r, rgb.g, rgb.b)
}
