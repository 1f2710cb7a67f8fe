use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    /// Upper-case `RRGGBB`, the form DrawingML `srgbClr` expects.
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }

    /// CSS notation used by the theme listing endpoint.
    pub fn css(&self) -> String {
        format!("rgb({}, {}, {})", self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.hex())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeSpec {
    pub name: &'static str,
    pub primary: Rgb,
    pub secondary: Rgb,
    pub accent: Rgb,
    pub background: Rgb,
    pub text: Rgb,
}

impl ThemeSpec {
    /// Fill colour for the `index`-th shape of a three-colour rotation.
    pub fn rotating(&self, index: usize) -> Rgb {
        match index % 3 {
            0 => self.primary,
            1 => self.secondary,
            _ => self.accent,
        }
    }

    /// Fill colour for the `index`-th shape of a two-colour alternation.
    pub fn alternating(&self, index: usize) -> Rgb {
        if index % 2 == 0 {
            self.primary
        } else {
            self.secondary
        }
    }
}

pub const DEFAULT_THEME: &str = "modern_blue";

static THEMES: [(&str, ThemeSpec); 10] = [
    (
        "modern_blue",
        ThemeSpec {
            name: "Modern Blue",
            primary: Rgb(33, 150, 243),
            secondary: Rgb(13, 71, 161),
            accent: Rgb(255, 193, 7),
            background: Rgb(250, 250, 250),
            text: Rgb(33, 33, 33),
        },
    ),
    (
        "corporate_gray",
        ThemeSpec {
            name: "Corporate Gray",
            primary: Rgb(66, 66, 66),
            secondary: Rgb(33, 33, 33),
            accent: Rgb(0, 188, 212),
            background: Rgb(245, 245, 245),
            text: Rgb(66, 66, 66),
        },
    ),
    (
        "creative_purple",
        ThemeSpec {
            name: "Creative Purple",
            primary: Rgb(156, 39, 176),
            secondary: Rgb(74, 20, 140),
            accent: Rgb(255, 235, 59),
            background: Rgb(252, 252, 252),
            text: Rgb(33, 33, 33),
        },
    ),
    (
        "tech_dark",
        ThemeSpec {
            name: "Tech Dark",
            primary: Rgb(0, 188, 212),
            secondary: Rgb(0, 150, 136),
            accent: Rgb(255, 64, 129),
            background: Rgb(18, 18, 18),
            text: Rgb(255, 255, 255),
        },
    ),
    (
        "elegant_gold",
        ThemeSpec {
            name: "Elegant Gold",
            primary: Rgb(139, 116, 61),
            secondary: Rgb(101, 84, 44),
            accent: Rgb(255, 215, 0),
            background: Rgb(255, 255, 255),
            text: Rgb(51, 51, 51),
        },
    ),
    (
        "nature_green",
        ThemeSpec {
            name: "Nature Green",
            primary: Rgb(76, 175, 80),
            secondary: Rgb(27, 94, 32),
            accent: Rgb(255, 193, 7),
            background: Rgb(250, 250, 250),
            text: Rgb(33, 33, 33),
        },
    ),
    (
        "vibrant_orange",
        ThemeSpec {
            name: "Vibrant Orange",
            primary: Rgb(255, 87, 34),
            secondary: Rgb(230, 74, 25),
            accent: Rgb(255, 193, 7),
            background: Rgb(255, 255, 255),
            text: Rgb(33, 33, 33),
        },
    ),
    (
        "minimal_mono",
        ThemeSpec {
            name: "Minimal Monochrome",
            primary: Rgb(0, 0, 0),
            secondary: Rgb(97, 97, 97),
            accent: Rgb(189, 189, 189),
            background: Rgb(255, 255, 255),
            text: Rgb(33, 33, 33),
        },
    ),
    (
        "sunset_gradient",
        ThemeSpec {
            name: "Sunset Gradient",
            primary: Rgb(255, 94, 77),
            secondary: Rgb(255, 145, 77),
            accent: Rgb(255, 209, 102),
            background: Rgb(255, 250, 245),
            text: Rgb(51, 51, 51),
        },
    ),
    (
        "ocean_blue",
        ThemeSpec {
            name: "Ocean Blue",
            primary: Rgb(3, 169, 244),
            secondary: Rgb(1, 87, 155),
            accent: Rgb(0, 188, 212),
            background: Rgb(240, 248, 255),
            text: Rgb(33, 33, 33),
        },
    ),
];

/// Look up a theme by its catalog key.
pub fn theme(key: &str) -> Option<&'static ThemeSpec> {
    THEMES.iter().find(|(k, _)| *k == key).map(|(_, t)| t)
}

/// All `(key, theme)` pairs in catalog order.
pub fn themes() -> impl Iterator<Item = (&'static str, &'static ThemeSpec)> {
    THEMES.iter().map(|(k, t)| (*k, t))
}

pub fn theme_keys() -> Vec<&'static str> {
    THEMES.iter().map(|(k, _)| *k).collect()
}
