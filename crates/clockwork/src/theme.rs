use crate::color::Rgb;
use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    #[strum(to_string = "dark", serialize = "inverted")]
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeColors {
    pub background: Rgb,
    pub foreground: Rgb,
    /// Wedge outlines stay near-black in both themes.
    pub outline: Rgb,
}

impl Theme {
    pub fn from_inverted(inverted: bool) -> Self {
        if inverted { Self::Dark } else { Self::Light }
    }

    pub fn is_inverted(&self) -> bool {
        matches!(self, Self::Dark)
    }

    pub fn colors(&self) -> ThemeColors {
        let outline = Rgb::new(0x11, 0x11, 0x11);
        match self {
            Self::Light => ThemeColors {
                background: Rgb::white(),
                foreground: Rgb::black(),
                outline,
            },
            Self::Dark => ThemeColors {
                background: Rgb::black(),
                foreground: Rgb::white(),
                outline,
            },
        }
    }

    /// Fill used for new dials: the theme's foreground.
    pub fn default_fill(&self) -> Rgb {
        self.colors().foreground
    }

    /// Re-maps a color that is still the *other* theme's default so it stays visible.
    /// Custom colors pass through untouched.
    pub fn adapt_default(&self, color: Rgb) -> Rgb {
        match self {
            Self::Dark if color == Rgb::black() => Rgb::white(),
            Self::Light if color == Rgb::white() => Rgb::black(),
            _ => color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_parsing() {
        let cases = [
            ("light", Theme::Light),
            ("LIGHT", Theme::Light),
            ("dark", Theme::Dark),
            ("Inverted", Theme::Dark),
        ];
        for (input, expected) in cases {
            assert_eq!(input.parse::<Theme>().unwrap(), expected);
        }
    }

    #[test]
    fn test_adapt_default_leaves_custom_colors() {
        let red = Rgb::new(255, 0, 0);
        assert_eq!(Theme::Dark.adapt_default(red), red);
        assert_eq!(Theme::Dark.adapt_default(Rgb::black()), Rgb::white());
        assert_eq!(Theme::Light.adapt_default(Rgb::white()), Rgb::black());
        assert_eq!(Theme::Light.adapt_default(Rgb::black()), Rgb::black());
    }
}
