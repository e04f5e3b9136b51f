// CSS-style color strings for line and marker overrides

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `rgb(r, g, b)`, `rgb(r, g, b, a)`, `rgba(r, g, b, a)`, `#rrggbb`
    /// or `#rrggbbaa`. Channels are 0-255, alpha is 0-1.
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex);
        }
        let body = s
            .strip_prefix("rgba(")
            .or_else(|| s.strip_prefix("rgb("))?
            .strip_suffix(')')?;
        let parts: Vec<f32> = body
            .split(',')
            .map(|p| p.trim().parse::<f32>())
            .collect::<Result<_, _>>()
            .ok()?;
        let (rgb, alpha) = match parts.as_slice() {
            [r, g, b] => ([*r, *g, *b], 1.0),
            [r, g, b, a] => ([*r, *g, *b], *a),
            _ => return None,
        };
        if rgb.iter().any(|c| !(0.0..=255.0).contains(c)) || !(0.0..=1.0).contains(&alpha) {
            return None;
        }
        Some(Self::new(rgb[0] / 255.0, rgb[1] / 255.0, rgb[2] / 255.0, alpha))
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .ok()
                .map(|v| v as f32 / 255.0)
        };
        let alpha = if hex.len() == 8 { channel(6)? } else { 1.0 };
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?, alpha))
    }

    /// Parse `input`, logging and using `fallback` when it is not a color.
    pub fn parse_or(input: &str, fallback: Rgba) -> Self {
        Self::parse(input).unwrap_or_else(|| {
            tracing::warn!("unrecognised color {input:?}, using default");
            fallback
        })
    }
}

pub const TEAL: Rgba = Rgba::new(0.0, 1.0, 192.0 / 255.0, 0.95);
pub const TEAL_OPAQUE: Rgba = Rgba::new(0.0, 1.0, 192.0 / 255.0, 1.0);
