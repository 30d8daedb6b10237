//! Theme Module - Color presets for the board front-end
//!
//! A [`BoardTheme`] is a plain value the front-end reads when drawing
//! panels, buttons and the screen. Presets are named constructors; pick
//! one by name with [`get_preset`] or take the default.

use crate::types::Rgb;

// =============================================================================
// THEME
// =============================================================================

/// Colors of the rendered board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardTheme {
    pub name: &'static str,
    /// Accent for selected panels and highlights.
    pub accent: Rgb,
    /// Panel text.
    pub text: Rgb,
    /// De-emphasized text (labels, idle readings).
    pub text_muted: Rgb,
    /// Panel border.
    pub border: Rgb,
    /// Border of the selected panel.
    pub border_selected: Rgb,
    /// Brick face button, released.
    pub button_up: Rgb,
    /// Brick face button, held.
    pub button_down: Rgb,
    /// Outer ring of the face buttons.
    pub button_outer: Rgb,
    /// Lit screen pixel at full intensity.
    pub screen_pixel: Rgb,
    /// Screen background.
    pub screen_bg: Rgb,
}

impl BoardTheme {
    /// Screen pixel color scaled by an intensity byte.
    pub fn screen_shade(&self, intensity: u8) -> Rgb {
        let mix = |fg: u8, bg: u8| {
            let fg = fg as u16 * intensity as u16;
            let bg = bg as u16 * (255 - intensity as u16);
            ((fg + bg) / 255) as u8
        };
        Rgb::new(
            mix(self.screen_pixel.r, self.screen_bg.r),
            mix(self.screen_pixel.g, self.screen_bg.g),
            mix(self.screen_pixel.b, self.screen_bg.b),
        )
    }
}

impl Default for BoardTheme {
    fn default() -> Self {
        classic()
    }
}

// =============================================================================
// PRESETS
// =============================================================================

/// The stock EV3 look: cyan accent, gray buttons, greenish LCD.
pub fn classic() -> BoardTheme {
    BoardTheme {
        name: "classic",
        accent: Rgb::from_hex(0x3ADCFE),
        text: Rgb::from_hex(0xF4F4F4),
        text_muted: Rgb::from_hex(0x979797),
        border: Rgb::from_hex(0x4A4A4A),
        border_selected: Rgb::from_hex(0x3ADCFE),
        button_up: Rgb::from_hex(0xA8AAA8),
        button_down: Rgb::from_hex(0x000000),
        button_outer: Rgb::from_hex(0x979797),
        screen_pixel: Rgb::from_hex(0x103642),
        screen_bg: Rgb::from_hex(0x97B5A6),
    }
}

/// High-contrast variant for dark terminals.
pub fn midnight() -> BoardTheme {
    BoardTheme {
        name: "midnight",
        accent: Rgb::from_hex(0x56B6C2),
        text: Rgb::from_hex(0xDCDFE4),
        text_muted: Rgb::from_hex(0x5C6370),
        border: Rgb::from_hex(0x3E4451),
        border_selected: Rgb::from_hex(0x56B6C2),
        button_up: Rgb::from_hex(0x4B5263),
        button_down: Rgb::from_hex(0x181A1F),
        button_outer: Rgb::from_hex(0x5C6370),
        screen_pixel: Rgb::from_hex(0xD7DAE0),
        screen_bg: Rgb::from_hex(0x21252B),
    }
}

/// All preset names, in menu order.
pub fn preset_names() -> &'static [&'static str] {
    &["classic", "midnight"]
}

/// Look a preset up by name.
pub fn get_preset(name: &str) -> Option<BoardTheme> {
    match name {
        "classic" => Some(classic()),
        "midnight" => Some(midnight()),
        _ => None,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_name_resolves() {
        for name in preset_names() {
            let theme = get_preset(name).unwrap();
            assert_eq!(theme.name, *name);
        }
        assert!(get_preset("neon").is_none());
    }

    #[test]
    fn test_default_is_classic() {
        assert_eq!(BoardTheme::default(), classic());
        assert_eq!(classic().accent, Rgb::from_hex(0x3ADCFE));
    }

    #[test]
    fn test_screen_shade_endpoints() {
        let theme = classic();
        assert_eq!(theme.screen_shade(255), theme.screen_pixel);
        assert_eq!(theme.screen_shade(0), theme.screen_bg);
    }
}
