//! Color theme support

use ratatui::style::{Color, Modifier, Style};

/// Color theme for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    /// Background color
    pub bg: Color,
    /// Primary text color
    pub fg: Color,
    /// Dimmed/secondary text
    pub dim: Color,
    /// Accent color (brand word, focused field, primary button)
    pub accent: Color,
    /// Second accent, used for "copied" acknowledgements
    pub accent_alt: Color,
    /// Error color
    pub error: Color,
    /// Border color
    pub border: Color,
    /// Selection/highlight background
    pub selection_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            bg: Color::Reset,
            fg: Color::White,
            dim: Color::DarkGray,
            accent: Color::Rgb(236, 112, 99),
            accent_alt: Color::Rgb(245, 176, 65),
            error: Color::Red,
            border: Color::DarkGray,
            selection_bg: Color::Rgb(48, 48, 48),
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            bg: Color::White,
            fg: Color::Black,
            dim: Color::Gray,
            accent: Color::Rgb(203, 67, 53),
            accent_alt: Color::Rgb(202, 111, 30),
            error: Color::Red,
            border: Color::Gray,
            selection_bg: Color::Rgb(235, 235, 235),
        }
    }

    /// Get base style
    pub fn base_style(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    /// Get dimmed style
    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.dim)
    }

    /// Get accent style
    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    /// Get bold accent style
    pub fn accent_bold(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for a "copied" acknowledgement
    pub fn copied_style(&self) -> Style {
        Style::default()
            .fg(self.accent_alt)
            .add_modifier(Modifier::BOLD)
    }

    /// Section headings inside generated text
    pub fn heading_style(&self) -> Style {
        Style::default().fg(self.fg).add_modifier(Modifier::BOLD)
    }

    /// Selected row or chip
    pub fn selected_style(&self) -> Style {
        Style::default()
            .fg(self.fg)
            .bg(self.selection_bg)
            .add_modifier(Modifier::BOLD)
    }

    /// Get error style
    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    /// Get border style
    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }
}
