//! Color theme system for keepsake.
//!
//! A `Theme` holds named `ratatui::style::Color` fields covering every UI surface
//! keepsake renders. Two built-in themes are provided:
//!
//! - `dark` — ANSI 16 colors, works on any terminal including 256-color SSH
//!   sessions with no truecolor support.
//! - `catppuccin_mocha` — Catppuccin Mocha palette in RGB; requires truecolor.

use ratatui::style::Color;
use tracing::warn;

/// All color values used across keepsake's UI surfaces.
#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    /// Border color for the currently focused panel.
    pub border_active: Color,
    /// Border color for unfocused panels.
    pub border_inactive: Color,

    // Feed and search lists
    /// Memory and search-hit titles.
    pub title: Color,
    /// Secondary text: authors, dates, counts.
    pub muted: Color,
    /// Hashtags.
    pub tag: Color,
    /// Background of the selected row.
    pub selection_bg: Color,
    /// The "loading more" row at the bottom of a list.
    pub sentinel: Color,

    // Visibility badges
    pub badge_public: Color,
    pub badge_private: Color,
    pub badge_relationship: Color,

    // Comments
    /// Comment author names.
    pub comment_author: Color,
    /// Tree guide drawn in front of replies.
    pub reply_guide: Color,

    // Search
    /// Current page button.
    pub page_current: Color,
    /// Other page buttons.
    pub page_other: Color,
    /// Suggestion type tags (`TITLE`, `HASHTAG`).
    pub suggestion_type: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    /// Mode indicator color when in NORMAL mode.
    pub status_mode_normal: Color,
    /// Mode indicator color when in INSERT mode.
    pub status_mode_insert: Color,
    /// Informational notifications.
    pub notify_info: Color,
    /// Error notifications.
    pub notify_error: Color,
}

impl Theme {
    /// Returns the built-in dark theme using ANSI 16 colors.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            title: Color::White,
            muted: Color::DarkGray,
            tag: Color::Blue,
            selection_bg: Color::Rgb(40, 40, 40),
            sentinel: Color::DarkGray,

            badge_public: Color::Green,
            badge_private: Color::Red,
            badge_relationship: Color::Magenta,

            comment_author: Color::Cyan,
            reply_guide: Color::DarkGray,

            page_current: Color::Cyan,
            page_other: Color::Gray,
            suggestion_type: Color::Yellow,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_mode_normal: Color::Cyan,
            status_mode_insert: Color::Green,
            notify_info: Color::Green,
            notify_error: Color::Red,
        }
    }

    /// Returns the Catppuccin Mocha theme using RGB truecolor values.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161); // #a6e3a1
        let red = Color::Rgb(243, 139, 168); // #f38ba8
        let yellow = Color::Rgb(249, 226, 175); // #f9e2af
        let blue = Color::Rgb(137, 180, 250); // #89b4fa
        let teal = Color::Rgb(148, 226, 213); // #94e2d5
        let mauve = Color::Rgb(203, 166, 247); // #cba6f7
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface0 = Color::Rgb(49, 50, 68); // #313244
        let surface1 = Color::Rgb(69, 71, 90); // #45475a
        let text = Color::Rgb(205, 214, 244); // #cdd6f4
        let peach = Color::Rgb(250, 179, 135); // #fab387

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            title: text,
            muted: overlay1,
            tag: blue,
            selection_bg: surface0,
            sentinel: overlay1,

            badge_public: green,
            badge_private: red,
            badge_relationship: mauve,

            comment_author: teal,
            reply_guide: surface1,

            page_current: lavender,
            page_other: overlay1,
            suggestion_type: peach,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_mode_normal: lavender,
            status_mode_insert: green,
            notify_info: yellow,
            notify_error: red,
        }
    }

    /// Resolves a theme name to the corresponding built-in theme.
    ///
    /// Unknown names fall back to `dark()` so a typo in config never prevents
    /// startup.
    ///
    /// # Arguments
    ///
    /// * `name` — theme name from config, e.g. `"dark"` or `"catppuccin-mocha"`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                warn!(theme = other, "unknown theme, falling back to 'dark'");
                Self::dark()
            }
        }
    }
}
