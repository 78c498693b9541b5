// Theme Palettes: static mapping from mood theme to CSS color variables

use crate::domain::content::MoodTheme;

/// Fixed key set of the palette schema, shared by every theme
pub const PALETTE_KEYS: [&str; 8] = [
    "--background",
    "--foreground",
    "--card",
    "--primary",
    "--primary-foreground",
    "--accent",
    "--accent-foreground",
    "--border",
];

/// One HSL value per entry of [`PALETTE_KEYS`], in the same order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    pub theme: MoodTheme,
    values: [&'static str; PALETTE_KEYS.len()],
}

impl ThemePalette {
    /// Variable assignments in schema order
    pub fn variables(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        PALETTE_KEYS.iter().copied().zip(self.values.iter().copied())
    }

    pub fn get(&self, key: &str) -> Option<&'static str> {
        self.variables().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

// Pale greens and blues
const SERENITY: ThemePalette = ThemePalette {
    theme: MoodTheme::Serenity,
    values: [
        "150 40% 97%",
        "200 30% 15%",
        "150 35% 99%",
        "170 45% 40%",
        "0 0% 100%",
        "195 55% 75%",
        "200 30% 15%",
        "160 25% 85%",
    ],
};

// Muted grays and blues
const SAD: ThemePalette = ThemePalette {
    theme: MoodTheme::Sad,
    values: [
        "215 15% 92%",
        "215 20% 20%",
        "215 12% 95%",
        "215 25% 45%",
        "0 0% 98%",
        "210 10% 70%",
        "215 20% 20%",
        "215 10% 80%",
    ],
};

// Bright yellows and oranges
const JOY: ThemePalette = ThemePalette {
    theme: MoodTheme::Joy,
    values: [
        "48 100% 96%",
        "25 40% 15%",
        "45 100% 98%",
        "38 95% 50%",
        "25 40% 10%",
        "25 95% 60%",
        "25 40% 10%",
        "40 80% 80%",
    ],
};

// Soft blues and purples
const CALM: ThemePalette = ThemePalette {
    theme: MoodTheme::Calm,
    values: [
        "230 40% 97%",
        "240 25% 20%",
        "235 35% 99%",
        "255 45% 60%",
        "0 0% 100%",
        "220 60% 80%",
        "240 25% 20%",
        "240 25% 88%",
    ],
};

// Light grays
const NEUTRAL: ThemePalette = ThemePalette {
    theme: MoodTheme::Neutral,
    values: [
        "0 0% 98%",
        "0 0% 10%",
        "0 0% 100%",
        "0 0% 25%",
        "0 0% 98%",
        "0 0% 90%",
        "0 0% 10%",
        "0 0% 85%",
    ],
};

/// Look up the palette for a theme
pub fn palette_for(theme: MoodTheme) -> &'static ThemePalette {
    match theme {
        MoodTheme::Serenity => &SERENITY,
        MoodTheme::Sad => &SAD,
        MoodTheme::Joy => &JOY,
        MoodTheme::Calm => &CALM,
        MoodTheme::Neutral => &NEUTRAL,
    }
}
