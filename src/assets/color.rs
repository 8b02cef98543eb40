use crate::foundation::error::{LivecompError, LivecompResult};

/// Straight-alpha color with normalized `0..1` channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ColorDef {
    pub(crate) r: f64,
    pub(crate) g: f64,
    pub(crate) b: f64,
    pub(crate) a: f64,
}

impl ColorDef {
    pub(crate) fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBB`, `#RRGGBBAA` or a CSS basic color name (case-insensitive).
    pub(crate) fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.starts_with('#') {
            return parse_hex(s);
        }
        named(s).ok_or_else(|| format!("unknown color \"{s}\""))
    }

    #[cfg(test)]
    pub(crate) fn to_rgba8_premul(self) -> crate::foundation::core::Rgba8Premul {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }

        let a = self.a.clamp(0.0, 1.0);
        let r = (self.r.clamp(0.0, 1.0) * a).clamp(0.0, 1.0);
        let g = (self.g.clamp(0.0, 1.0) * a).clamp(0.0, 1.0);
        let b = (self.b.clamp(0.0, 1.0) * a).clamp(0.0, 1.0);

        crate::foundation::core::Rgba8Premul {
            r: to_u8(r),
            g: to_u8(g),
            b: to_u8(b),
            a: to_u8(a),
        }
    }

    /// Straight-alpha RGBA8, as text brushes expect.
    pub(crate) fn to_rgba8_straight(self) -> [u8; 4] {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a)]
    }
}

/// Resolve a user-facing color string for effect rendering.
pub(crate) fn resolve_color(s: &str) -> LivecompResult<ColorDef> {
    ColorDef::parse(s).map_err(LivecompError::render_resource)
}

fn parse_hex(s: &str) -> Result<ColorDef, String> {
    let s = s.strip_prefix('#').unwrap_or(s);

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    if !s.is_ascii() {
        return Err("hex color must be ascii".to_owned());
    }

    let (r, g, b, a) = match s.len() {
        6 => {
            let r = hex_byte(&s[0..2])?;
            let g = hex_byte(&s[2..4])?;
            let b = hex_byte(&s[4..6])?;
            (r, g, b, 255)
        }
        8 => {
            let r = hex_byte(&s[0..2])?;
            let g = hex_byte(&s[2..4])?;
            let b = hex_byte(&s[4..6])?;
            let a = hex_byte(&s[6..8])?;
            (r, g, b, a)
        }
        _ => {
            return Err("hex color must be #RRGGBB or #RRGGBBAA (case-insensitive)".to_owned());
        }
    };

    Ok(ColorDef::rgba(
        (r as f64) / 255.0,
        (g as f64) / 255.0,
        (b as f64) / 255.0,
        (a as f64) / 255.0,
    ))
}

fn named(name: &str) -> Option<ColorDef> {
    // CSS basic color keywords, plus `transparent`.
    let rgb: (u8, u8, u8) = match name.to_ascii_lowercase().as_str() {
        "black" => (0, 0, 0),
        "silver" => (192, 192, 192),
        "gray" | "grey" => (128, 128, 128),
        "white" => (255, 255, 255),
        "maroon" => (128, 0, 0),
        "red" => (255, 0, 0),
        "purple" => (128, 0, 128),
        "fuchsia" | "magenta" => (255, 0, 255),
        "green" => (0, 128, 0),
        "lime" => (0, 255, 0),
        "olive" => (128, 128, 0),
        "yellow" => (255, 255, 0),
        "navy" => (0, 0, 128),
        "blue" => (0, 0, 255),
        "teal" => (0, 128, 128),
        "aqua" | "cyan" => (0, 255, 255),
        "orange" => (255, 165, 0),
        "transparent" => return Some(ColorDef::rgba(0.0, 0.0, 0.0, 0.0)),
        _ => return None,
    };
    Some(ColorDef::rgba(
        f64::from(rgb.0) / 255.0,
        f64::from(rgb.1) / 255.0,
        f64::from(rgb.2) / 255.0,
        1.0,
    ))
}
