//! Theme loading: btop-style `theme[key]="value"`, palettes, and hex → ratatui Color.

use polyfall::ShapeKind;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// One Dark UI colours plus per-shape piece colours.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Piece colours, indexed like `ShapeKind::ALL`.
    pub pieces: [Color; 14],
    /// Playfield background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, level).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text (hints, empty leaderboard).
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

/// Constant colours below are known-good; a typo shows up as the terminal default.
fn hex(s: &str) -> Color {
    parse_hex(s).unwrap_or(Color::Reset)
}

fn catalog_colors() -> [Color; 14] {
    ShapeKind::ALL.map(|k| hex(k.color_hex()))
}

impl Theme {
    /// One Dark UI (hex values from onedark.theme) with the catalog piece colours.
    pub fn onedark_default() -> Self {
        Self {
            pieces: catalog_colors(),
            bg: hex("#31353F"), // meter_bg from onedark.theme
            div_line: hex("#3F444F"),
            main_fg: hex("#ABB2BF"),
            title: hex("#E5C07B"),
            inactive_fg: hex("#5C6370"),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or the file is missing.
    /// `palette` selects the piece colour variant.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override piece colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        let table: [&str; 7] = match palette {
            crate::Palette::Normal => return,
            // Saturated colours on a dark bg
            crate::Palette::HighContrast => [
                "#00FFFF", "#0088FF", "#FF8800", "#FFFF00", "#00FF00", "#FF00FF", "#FF0000",
            ],
            // Okabe–Ito: distinguishable without relying on red/green
            crate::Palette::Colorblind => [
                "#56B4E9", "#0072B2", "#E69F00", "#F0E442", "#009E73", "#CC79A7", "#D55E00",
            ],
        };
        for (i, kind) in ShapeKind::ALL.iter().enumerate() {
            if kind.is_special() {
                self.pieces[i] = hex("#FFFFFF");
            } else {
                self.pieces[i] = hex(table[i % table.len()]);
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            map.get(key)
                .and_then(|v| parse_hex(v.trim_matches('"').trim_matches('\'').trim()).ok())
        };
        let defaults = Self::onedark_default();
        let mut pieces = defaults.pieces;
        for (i, kind) in ShapeKind::ALL.iter().enumerate() {
            if let Some(c) = get(&format!("piece_{}", kind.label().to_lowercase())) {
                pieces[i] = c;
            }
        }
        // Keys match onedark.theme; fallbacks are the same file's hex values.
        Self {
            pieces,
            bg: get("meter_bg").unwrap_or(defaults.bg),
            div_line: get("div_line").unwrap_or(defaults.div_line),
            main_fg: get("main_fg").unwrap_or(defaults.main_fg),
            title: get("title").unwrap_or(defaults.title),
            inactive_fg: get("inactive_fg").unwrap_or(defaults.inactive_fg),
        }
    }

    /// Colour for a locked cell or piece of this kind.
    #[inline]
    pub fn piece_color(&self, kind: ShapeKind) -> Color {
        let i = ShapeKind::ALL.iter().position(|k| *k == kind).unwrap_or(0);
        self.pieces[i]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(stripped) = line.strip_prefix("theme[") {
            if let Some(end) = stripped.find(']') {
                let key = stripped[..end].trim();
                let rest = stripped[end + 1..].trim();
                if let Some(eq) = rest.find('=') {
                    let value = rest[eq + 1..]
                        .trim()
                        .trim_matches('"')
                        .trim_matches('\'')
                        .to_string();
                    if !value.is_empty() {
                        map.insert(key.to_string(), value);
                    }
                }
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    if !s.is_ascii() {
        return Err(ThemeError::InvalidHex(s.to_string()));
    }
    let (r, g, b) = if s.len() == 6 {
        let r =
            u8::from_str_radix(&s[0..2], 16).map_err(|_| ThemeError::InvalidHex(s.to_string()))?;
        let g =
            u8::from_str_radix(&s[2..4], 16).map_err(|_| ThemeError::InvalidHex(s.to_string()))?;
        let b =
            u8::from_str_radix(&s[4..6], 16).map_err(|_| ThemeError::InvalidHex(s.to_string()))?;
        (r, g, b)
    } else if s.len() == 3 {
        let r = u8::from_str_radix(&s[0..1], 16)
            .map_err(|_| ThemeError::InvalidHex(s.to_string()))?
            * 17;
        let g = u8::from_str_radix(&s[1..2], 16)
            .map_err(|_| ThemeError::InvalidHex(s.to_string()))?
            * 17;
        let b = u8::from_str_radix(&s[2..3], 16)
            .map_err(|_| ThemeError::InvalidHex(s.to_string()))?
            * 17;
        (r, g, b)
    } else {
        return Err(ThemeError::InvalidHex(s.to_string()));
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#00E5FF").unwrap();
        assert!(matches!(c, Color::Rgb(0x00, 0xE5, 0xFF)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_non_ascii() {
        assert!(matches!(parse_hex("#aébcd"), Err(ThemeError::InvalidHex(_))));
        assert!(matches!(parse_hex("#é1"), Err(ThemeError::InvalidHex(_))));
    }

    #[test]
    fn test_piece_override_from_file() {
        let map = parse_theme_file("theme[piece_dot]=\"#123456\"\ntheme[main_fg]='#FFF'\n");
        let theme = Theme::from_map(&map);
        assert!(matches!(theme.piece_color(ShapeKind::Dot), Color::Rgb(0x12, 0x34, 0x56)));
        assert!(matches!(theme.main_fg, Color::Rgb(255, 255, 255)));
        assert!(matches!(theme.piece_color(ShapeKind::O), Color::Rgb(0xFF, 0xD5, 0x4F)));
    }

    #[test]
    fn test_palette_keeps_dot_white() {
        let mut theme = Theme::default();
        theme.apply_palette(crate::Palette::Colorblind);
        assert!(matches!(theme.piece_color(ShapeKind::Dot), Color::Rgb(255, 255, 255)));
        assert!(matches!(theme.piece_color(ShapeKind::I), Color::Rgb(0x56, 0xB4, 0xE9)));
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[meter_bg]="#31353F""##);
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
    }
}
