//! Animated phase progress widget

use crate::theme::Theme;
use ratatui::{buffer::Buffer, layout::Rect, text::Span, widgets::Widget};
use std::time::{Duration, Instant};

/// Spinner animation frames
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const FRAME_DURATION: Duration = Duration::from_millis(80);

/// Spinner over a fixed list of steps.
///
/// Finished steps get a check mark, the current one spins and the rest are
/// dimmed. The first row shows `n/total`.
pub struct PhaseSpinner<'a> {
    steps: &'a [&'a str],
    current: usize,
    theme: &'a Theme,
    start_time: Instant,
}

impl<'a> PhaseSpinner<'a> {
    /// `current` is the zero-based index of the running step
    pub fn new(steps: &'a [&'a str], current: usize, theme: &'a Theme) -> Self {
        Self {
            steps,
            current,
            theme,
            start_time: Instant::now(),
        }
    }

    /// Create with a specific start time (for consistent animation)
    pub fn with_start_time(mut self, start: Instant) -> Self {
        self.start_time = start;
        self
    }

    /// Rows needed to draw the header and every step
    pub fn height(&self) -> u16 {
        self.steps.len() as u16 + 2
    }

    fn current_frame(&self) -> &'static str {
        let elapsed = self.start_time.elapsed();
        let frame_index = (elapsed.as_millis() / FRAME_DURATION.as_millis()) as usize;
        SPINNER_FRAMES[frame_index % SPINNER_FRAMES.len()]
    }
}

impl Widget for PhaseSpinner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 || area.height == 0 {
            return;
        }

        let total = self.steps.len();
        let header = format!("{}/{}", (self.current + 1).min(total), total);
        buf.set_span(
            area.x,
            area.y,
            &Span::styled(header, self.theme.dim_style()),
            area.width,
        );

        for (i, label) in self.steps.iter().enumerate() {
            let y = area.y + 2 + i as u16;
            if y >= area.y + area.height {
                break;
            }
            let (marker, style) = if i < self.current {
                ("✓", self.theme.dim_style())
            } else if i == self.current {
                (self.current_frame(), self.theme.accent_bold())
            } else {
                ("○", self.theme.dim_style())
            };
            let text = format!("{} {}", marker, label);
            buf.set_span(area.x, y, &Span::styled(text, style), area.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_marks_finished_and_pending_steps() {
        let theme = Theme::dark();
        let steps = ["read", "organize", "format"];
        let area = Rect::new(0, 0, 20, 5);
        let mut buf = Buffer::empty(area);
        PhaseSpinner::new(&steps, 1, &theme).render(area, &mut buf);

        assert!(row(&buf, 0).starts_with("2/3"));
        assert!(row(&buf, 2).starts_with("✓ read"));
        assert!(row(&buf, 4).starts_with("○ format"));
    }

    #[test]
    fn test_height() {
        let theme = Theme::dark();
        let steps = ["a", "b", "c"];
        assert_eq!(PhaseSpinner::new(&steps, 0, &theme).height(), 5);
    }
}
