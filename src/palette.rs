use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

lazy_static::lazy_static! {
    static ref HEX_COLOR: regex::Regex =
        regex::Regex::new(r"^#?([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})$").unwrap();
    pub static ref WHITE: Color = Color::new(255, 255, 255);
    // dark slate rather than pure black; pure black muddies the darkest shades
    pub static ref BLACK: Color = Color::new(15, 23, 42);
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Squared euclidean distance in RGB space.
    pub fn distance(&self, other: &Color) -> u32 {
        let d = |a: u8, b: u8| (a as i32 - b as i32).pow(2) as u32;
        d(self.r, other.r) + d(self.g, other.g) + d(self.b, other.b)
    }

    /// `"R G B"`, the form consumed by `rgb(var(--x) / alpha)`.
    pub fn to_channels(&self) -> String {
        format!("{} {} {}", self.r, self.g, self.b)
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::str::FromStr for Color {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex_color(s).ok_or_else(|| {
            anyhow::anyhow!("Invalid color '{}'; must be six hex digits like #0ea5e9", s)
        })
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Parses `#RRGGBB` or `RRGGBB`, case-insensitive.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let captures = HEX_COLOR.captures(hex)?;
    let channel = |i: usize| u8::from_str_radix(&captures[i], 16).ok();

    Some(Color::new(channel(1)?, channel(2)?, channel(3)?))
}

/// Per-channel linear interpolation from `base` toward `target`. Halves round
/// up; the weight and the result are both clamped.
pub fn mix(base: Color, target: Color, weight: f64) -> Color {
    let weight = weight.clamp(0.0, 1.0);
    let channel = |b: u8, t: u8| {
        (b as f64 * (1.0 - weight) + t as f64 * weight)
            .round()
            .clamp(0.0, 255.0) as u8
    };

    Color::new(
        channel(base.r, target.r),
        channel(base.g, target.g),
        channel(base.b, target.b),
    )
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Shade {
    S50,
    S100,
    S200,
    S300,
    S400,
    S500,
    S600,
    S700,
    S800,
    S900,
}

impl Shade {
    pub const ALL: [Shade; 10] = [
        Shade::S50,
        Shade::S100,
        Shade::S200,
        Shade::S300,
        Shade::S400,
        Shade::S500,
        Shade::S600,
        Shade::S700,
        Shade::S800,
        Shade::S900,
    ];

    pub fn key(&self) -> u16 {
        match self {
            Self::S50 => 50,
            Self::S100 => 100,
            Self::S200 => 200,
            Self::S300 => 300,
            Self::S400 => 400,
            Self::S500 => 500,
            Self::S600 => 600,
            Self::S700 => 700,
            Self::S800 => 800,
            Self::S900 => 900,
        }
    }

    /// The color this shade blends toward, and by how much.
    fn blend(&self) -> (Color, f64) {
        match self {
            Self::S50 => (*WHITE, 0.95),
            Self::S100 => (*WHITE, 0.90),
            Self::S200 => (*WHITE, 0.75),
            Self::S300 => (*WHITE, 0.60),
            Self::S400 => (*WHITE, 0.30),
            Self::S500 => (*WHITE, 0.0),
            Self::S600 => (*BLACK, 0.10),
            Self::S700 => (*BLACK, 0.30),
            Self::S800 => (*BLACK, 0.50),
            Self::S900 => (*BLACK, 0.70),
        }
    }
}

impl std::fmt::Display for Shade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette(BTreeMap<Shade, Color>);

impl Palette {
    pub fn get(&self, shade: Shade) -> Color {
        self.0[&shade]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Shade, Color)> + '_ {
        self.0.iter().map(|(s, c)| (*s, *c))
    }
}

/// Ten-step ramp from one seed color: tints toward white below 500, shades
/// toward [`BLACK`] above it. `None` when the seed is not a hex color.
pub fn derive_palette(seed: &str) -> Option<Palette> {
    let seed = parse_hex_color(seed)?;

    Some(Palette(
        Shade::ALL
            .iter()
            .map(|shade| {
                let color = match shade {
                    Shade::S500 => seed,
                    _ => {
                        let (target, weight) = shade.blend();
                        mix(seed, target, weight)
                    }
                };
                (*shade, color)
            })
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        let table = vec![
            ("#0ea5e9", Some(Color::new(14, 165, 233))),
            ("0ea5e9", Some(Color::new(14, 165, 233))),
            ("#FFFFFF", Some(Color::new(255, 255, 255))),
            ("#0EA5e9", Some(Color::new(14, 165, 233))),
            ("#0ea5", None),
            ("red", None),
            ("", None),
            ("##0ea5e9", None),
            ("#0ea5e9 ", None),
            ("#0ea5e90", None),
        ];

        for (input, expected) in table {
            assert_eq!(parse_hex_color(input), expected, "{:?}", input);
        }
    }

    #[test]
    fn test_mix() {
        assert_eq!(
            mix(Color::new(0, 0, 0), Color::new(255, 255, 255), 0.5),
            Color::new(128, 128, 128)
        );
        let base = Color::new(10, 20, 30);
        assert_eq!(mix(base, *WHITE, 0.0), base);
        assert_eq!(mix(base, *WHITE, 1.0), *WHITE);
        // out of range weights are clamped
        assert_eq!(mix(base, *WHITE, 3.0), *WHITE);
        assert_eq!(mix(base, *WHITE, -1.0), base);
    }

    #[test]
    fn test_derive_palette() {
        assert!(derive_palette("blue").is_none());

        let seed = Color::new(14, 165, 233);
        let palette = derive_palette("#0ea5e9").unwrap();

        assert_eq!(palette.iter().count(), 10);
        assert_eq!(palette.get(Shade::S500), seed);
        assert_eq!(palette.get(Shade::S900), Color::new(15, 66, 99));

        assert!(
            palette.get(Shade::S50).distance(&WHITE) < palette.get(Shade::S400).distance(&WHITE)
        );
        assert!(
            palette.get(Shade::S900).distance(&BLACK) < palette.get(Shade::S600).distance(&BLACK)
        );
    }

    #[test]
    fn test_ramp_is_monotonic() {
        for seed in ["#0ea5e9", "#ffffff", "#7c3aed", "#F43F5E"] {
            let palette = derive_palette(seed).unwrap();
            let shades = palette.iter().collect::<Vec<_>>();

            for pair in shades.windows(2) {
                let (a, b) = (pair[0].1, pair[1].1);
                let light = |c: Color| c.r as u32 + c.g as u32 + c.b as u32;
                assert!(
                    light(a) >= light(b),
                    "{} {} is darker than {} {}",
                    seed,
                    pair[0].0,
                    seed,
                    pair[1].0
                );
            }
        }
    }

    #[test]
    fn test_channels() {
        assert_eq!(Color::new(14, 165, 233).to_channels(), "14 165 233");
        assert_eq!(Color::new(14, 165, 233).to_string(), "#0ea5e9");
        assert!("nope".parse::<Color>().is_err());
    }
}
