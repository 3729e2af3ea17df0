//! Colors, color ramps and the built-in schemes.

use std::str::FromStr;
use terrashade_core::{Error, Result};

/// RGBA color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Fully transparent black (used for missing cells).
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    fn named(name: &str) -> Option<Self> {
        let c = match name {
            "black" => Self::opaque(0, 0, 0),
            "white" => Self::opaque(255, 255, 255),
            "red" => Self::opaque(255, 0, 0),
            "green" => Self::opaque(0, 128, 0),
            "lime" => Self::opaque(0, 255, 0),
            "limegreen" => Self::opaque(50, 205, 50),
            "darkgreen" => Self::opaque(0, 100, 0),
            "blue" => Self::opaque(0, 0, 255),
            "navy" => Self::opaque(0, 0, 128),
            "aqua" | "cyan" => Self::opaque(0, 255, 255),
            "magenta" | "fuchsia" => Self::opaque(255, 0, 255),
            "purple" => Self::opaque(128, 0, 128),
            "yellow" => Self::opaque(255, 255, 0),
            "orange" => Self::opaque(255, 165, 0),
            "brown" => Self::opaque(165, 42, 42),
            "saddlebrown" => Self::opaque(139, 69, 19),
            "sandybrown" => Self::opaque(244, 164, 96),
            "gray" | "grey" => Self::opaque(128, 128, 128),
            "transparent" => Self::TRANSPARENT,
            _ => return None,
        };
        Some(c)
    }
}

impl FromStr for Rgba {
    type Err = Error;

    /// `#rrggbb`, `#rrggbbaa` or a CSS color name.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let bad = || Error::config("color", s, "expected #rrggbb, #rrggbbaa or a color name");

        if let Some(hex) = s.strip_prefix('#') {
            if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
                return Err(bad());
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());
            let a = if hex.len() == 8 { channel(6)? } else { 255 };
            return Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, a));
        }
        Self::named(&s.to_ascii_lowercase()).ok_or_else(bad)
    }
}

/// A color stop: position in [0, 1] mapped to a color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub t: f64,
    pub color: Rgba,
}

impl ColorStop {
    pub const fn new(t: f64, r: u8, g: u8, b: u8) -> Self {
        Self {
            t,
            color: Rgba::opaque(r, g, b),
        }
    }
}

/// Ordered colors interpolated by a normalized position.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    stops: Vec<ColorStop>,
}

impl ColorRamp {
    /// Evenly spaced colors; a single color gives a constant ramp.
    pub fn from_colors(colors: impl IntoIterator<Item = Rgba>) -> Result<Self> {
        let colors: Vec<Rgba> = colors.into_iter().collect();
        let last = colors.len().saturating_sub(1).max(1) as f64;
        let stops = colors
            .into_iter()
            .enumerate()
            .map(|(i, color)| ColorStop {
                t: i as f64 / last,
                color,
            })
            .collect();
        Self::from_stops(stops)
    }

    /// Explicit stops, positions non-decreasing within [0, 1].
    pub fn from_stops(stops: Vec<ColorStop>) -> Result<Self> {
        if stops.is_empty() {
            return Err(Error::config("color_ramp", "[]", "needs at least one color"));
        }
        let in_order = stops.windows(2).all(|w| w[0].t <= w[1].t);
        let in_range = stops.iter().all(|s| (0.0..=1.0).contains(&s.t));
        if !in_order || !in_range {
            return Err(Error::config(
                "color_ramp",
                format!("{:?}", stops.iter().map(|s| s.t).collect::<Vec<_>>()),
                "stop positions must be sorted within [0, 1]",
            ));
        }
        Ok(Self { stops })
    }

    /// Parse a list of color strings, e.g. `["black", "#ffffff"]`.
    pub fn parse<S: AsRef<str>>(colors: &[S]) -> Result<Self> {
        let colors = colors
            .iter()
            .map(|c| c.as_ref().parse())
            .collect::<Result<Vec<Rgba>>>()?;
        Self::from_colors(colors)
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Color at position `t`, clamped to the ramp ends.
    pub fn evaluate(&self, t: f64) -> Rgba {
        let first = self.stops[0];
        let last = self.stops[self.stops.len() - 1];
        if t.is_nan() || t <= first.t {
            return first.color;
        }
        if t >= last.t {
            return last.color;
        }
        for pair in self.stops.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if t <= hi.t {
                let span = hi.t - lo.t;
                let ratio = if span > 0.0 { (t - lo.t) / span } else { 1.0 };
                return lerp_color(lo.color, hi.color, ratio);
            }
        }
        last.color
    }
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round() as u8
}

fn lerp_color(c1: Rgba, c2: Rgba, t: f64) -> Rgba {
    Rgba::new(
        lerp(c1.r, c2.r, t),
        lerp(c1.g, c2.g, t),
        lerp(c1.b, c2.b, t),
        lerp(c1.a, c2.a, t),
    )
}

/// Built-in ramps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorScheme {
    /// Green -> Yellow -> Brown -> White
    Terrain,
    /// Aqua shoreline, greens, browns, gray rock, white peaks
    Elevation,
    /// Black -> White (hillshade)
    Grayscale,
    /// Black -> Red -> Yellow -> White (slope)
    Hot,
    /// White -> Cyan -> Blue
    Water,
}

const TERRAIN_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 34, 139, 34),
    ColorStop::new(0.25, 144, 190, 60),
    ColorStop::new(0.50, 220, 200, 80),
    ColorStop::new(0.75, 180, 120, 60),
    ColorStop::new(1.00, 255, 255, 255),
];

const ELEVATION_STOPS: &[ColorStop] = &[
    ColorStop::new(0.000, 0, 255, 255),
    ColorStop::new(0.125, 244, 164, 96),
    ColorStop::new(0.250, 50, 205, 50),
    ColorStop::new(0.500, 0, 128, 0),
    ColorStop::new(0.625, 0, 100, 0),
    ColorStop::new(0.750, 139, 69, 19),
    ColorStop::new(0.875, 128, 128, 128),
    ColorStop::new(1.000, 255, 255, 255),
];

const GRAYSCALE_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 0, 0, 0),
    ColorStop::new(1.0, 255, 255, 255),
];

const HOT_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 0, 0, 0),
    ColorStop::new(0.4, 230, 0, 0),
    ColorStop::new(0.8, 255, 210, 0),
    ColorStop::new(1.0, 255, 255, 255),
];

const WATER_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 240, 249, 255),
    ColorStop::new(0.50, 80, 180, 230),
    ColorStop::new(1.00, 8, 48, 107),
];

impl ColorScheme {
    pub const ALL: &[ColorScheme] = &[
        Self::Terrain,
        Self::Elevation,
        Self::Grayscale,
        Self::Hot,
        Self::Water,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Terrain => "terrain",
            Self::Elevation => "elevation",
            Self::Grayscale => "grayscale",
            Self::Hot => "hot",
            Self::Water => "water",
        }
    }

    fn stops(&self) -> &'static [ColorStop] {
        match self {
            Self::Terrain => TERRAIN_STOPS,
            Self::Elevation => ELEVATION_STOPS,
            Self::Grayscale => GRAYSCALE_STOPS,
            Self::Hot => HOT_STOPS,
            Self::Water => WATER_STOPS,
        }
    }

    pub fn ramp(&self) -> ColorRamp {
        ColorRamp {
            stops: self.stops().to_vec(),
        }
    }
}

impl FromStr for ColorScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = match s.to_ascii_lowercase().as_str() {
            "greyscale" | "gray" | "grey" => "grayscale".to_string(),
            other => other.to_string(),
        };
        Self::ALL
            .iter()
            .copied()
            .find(|scheme| scheme.name() == lower)
            .ok_or_else(|| Error::config("cmap", s, "unknown color scheme"))
    }
}

impl From<ColorScheme> for ColorRamp {
    fn from(scheme: ColorScheme) -> Self {
        scheme.ramp()
    }
}
