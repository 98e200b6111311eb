use catppuccin::PALETTE;
use ratatui::style::Color;

/// Convert a catppuccin color to a ratatui color.
const fn catppuccin_to_color(c: &catppuccin::Color) -> Color {
    Color::Rgb(c.rgb.r, c.rgb.g, c.rgb.b)
}

/// Colors every view draws with.
///
/// Palette slots follow Catppuccin naming; the semantic accessors at the
/// bottom map UI roles onto them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    base: Color,
    surface0: Color,
    surface1: Color,
    surface2: Color,
    overlay0: Color,
    overlay1: Color,
    text: Color,
    subtext0: Color,
    subtext1: Color,
    mauve: Color,
    red: Color,
    peach: Color,
    yellow: Color,
    green: Color,
    sky: Color,
    lavender: Color,
}

impl Theme {
    const fn from_catppuccin(flavor: &catppuccin::Flavor) -> Self {
        let c = &flavor.colors;
        Self {
            base: catppuccin_to_color(&c.base),
            surface0: catppuccin_to_color(&c.surface0),
            surface1: catppuccin_to_color(&c.surface1),
            surface2: catppuccin_to_color(&c.surface2),
            overlay0: catppuccin_to_color(&c.overlay0),
            overlay1: catppuccin_to_color(&c.overlay1),
            text: catppuccin_to_color(&c.text),
            subtext0: catppuccin_to_color(&c.subtext0),
            subtext1: catppuccin_to_color(&c.subtext1),
            mauve: catppuccin_to_color(&c.mauve),
            red: catppuccin_to_color(&c.red),
            peach: catppuccin_to_color(&c.peach),
            yellow: catppuccin_to_color(&c.yellow),
            green: catppuccin_to_color(&c.green),
            sky: catppuccin_to_color(&c.sky),
            lavender: catppuccin_to_color(&c.lavender),
        }
    }

    pub fn catppuccin_mocha() -> Self {
        Self::from_catppuccin(&PALETTE.mocha)
    }

    pub fn catppuccin_macchiato() -> Self {
        Self::from_catppuccin(&PALETTE.macchiato)
    }

    pub fn catppuccin_frappe() -> Self {
        Self::from_catppuccin(&PALETTE.frappe)
    }

    pub fn catppuccin_latte() -> Self {
        Self::from_catppuccin(&PALETTE.latte)
    }

    pub const fn base(&self) -> Color {
        self.base
    }

    pub const fn surface0(&self) -> Color {
        self.surface0
    }

    pub const fn surface1(&self) -> Color {
        self.surface1
    }

    pub const fn surface2(&self) -> Color {
        self.surface2
    }

    pub const fn overlay0(&self) -> Color {
        self.overlay0
    }

    pub const fn overlay1(&self) -> Color {
        self.overlay1
    }

    pub const fn text(&self) -> Color {
        self.text
    }

    pub const fn subtext0(&self) -> Color {
        self.subtext0
    }

    pub const fn subtext1(&self) -> Color {
        self.subtext1
    }

    pub const fn mauve(&self) -> Color {
        self.mauve
    }

    pub const fn red(&self) -> Color {
        self.red
    }

    pub const fn peach(&self) -> Color {
        self.peach
    }

    pub const fn yellow(&self) -> Color {
        self.yellow
    }

    pub const fn green(&self) -> Color {
        self.green
    }

    pub const fn sky(&self) -> Color {
        self.sky
    }

    pub const fn lavender(&self) -> Color {
        self.lavender
    }

    // Semantic colors
    pub const fn error(&self) -> Color {
        self.red
    }

    pub const fn border(&self) -> Color {
        self.surface1
    }

    pub const fn border_focused(&self) -> Color {
        self.lavender
    }

    pub const fn selection_bg(&self) -> Color {
        self.surface1
    }

    pub const fn header(&self) -> Color {
        self.yellow
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::catppuccin_mocha()
    }
}

fn available_themes() -> [(&'static str, Theme); 4] {
    [
        ("Catppuccin Mocha", Theme::catppuccin_mocha()),
        ("Catppuccin Macchiato", Theme::catppuccin_macchiato()),
        ("Catppuccin Frappé", Theme::catppuccin_frappe()),
        ("Catppuccin Latte", Theme::catppuccin_latte()),
    ]
}

/// Look up a theme by name. Returns the default theme if not found.
pub fn theme_from_name(name: &str) -> Theme {
    available_themes()
        .into_iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
        .map(|(_, theme)| theme)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        assert_eq!(theme_from_name("catppuccin latte"), Theme::catppuccin_latte());
    }

    #[test]
    fn test_unknown_name_falls_back_to_mocha() {
        assert_eq!(theme_from_name("solarized"), Theme::catppuccin_mocha());
    }
}
