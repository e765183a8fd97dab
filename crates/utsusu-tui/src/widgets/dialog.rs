//! Centered modal with a row of actions

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

const MAX_DIALOG_WIDTH: u16 = 56;

/// A modal dialog: title, body lines and a row of buttons
pub struct Dialog<'a> {
    title: &'a str,
    body: Vec<Line<'a>>,
    actions: &'a [&'a str],
    selected: usize,
    theme: &'a Theme,
}

impl<'a> Dialog<'a> {
    pub fn new(title: &'a str, body: Vec<Line<'a>>, actions: &'a [&'a str], theme: &'a Theme) -> Self {
        Self {
            title,
            body,
            actions,
            selected: 0,
            theme,
        }
    }

    /// Highlight the action at `index`
    pub fn with_selected(mut self, index: usize) -> Self {
        self.selected = index.min(self.actions.len().saturating_sub(1));
        self
    }

    fn size(&self) -> (u16, u16) {
        let body_width = self.body.iter().map(|l| l.width()).max().unwrap_or(0);
        let actions_width: usize = self.actions.iter().map(|a| a.width() + 6).sum();
        let width = (body_width.max(actions_width).max(self.title.width()) + 6) as u16;
        let height = self.body.len() as u16 + 5;
        (width.clamp(24, MAX_DIALOG_WIDTH), height)
    }

    pub fn render_centered(self, area: Rect, buf: &mut Buffer) {
        let (width, height) = self.size();
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        let popup = Rect::new(x, y, width.min(area.width), height.min(area.height));

        Clear.render(popup, buf);
        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(self.theme.accent_bold())
            .borders(Borders::ALL)
            .border_style(self.theme.accent_style());
        let inner = block.inner(popup);
        block.render(popup, buf);
        if inner.height < 2 || inner.width < 2 {
            return;
        }

        let body_area = Rect {
            x: inner.x + 1,
            width: inner.width.saturating_sub(2),
            height: inner.height.saturating_sub(2),
            ..inner
        };
        Paragraph::new(self.body)
            .wrap(Wrap { trim: false })
            .render(body_area, buf);

        let mut spans = Vec::new();
        for (i, action) in self.actions.iter().enumerate() {
            let style = if i == self.selected {
                self.theme.selected_style().fg(self.theme.accent)
            } else {
                self.theme.dim_style()
            };
            spans.push(Span::styled(format!("[ {} ]", action), style));
            spans.push(Span::raw("  "));
        }
        let actions_y = inner.y + inner.height - 1;
        buf.set_line(inner.x + 1, actions_y, &Line::from(spans), inner.width.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_actions_on_last_row() {
        let theme = Theme::dark();
        let actions = ["OK", "Later"];
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        let dialog = Dialog::new("Plan", vec![Line::from("body")], &actions, &theme).with_selected(1);
        let (w, h) = dialog.size();
        dialog.render_centered(area, &mut buf);

        let x0 = (60 - w) / 2;
        let y = (20 - h) / 2 + h - 2;
        let row: String = (x0..x0 + w).map(|x| buf[(x, y)].symbol().to_string()).collect();
        assert!(row.contains("[ OK ]"));
        assert!(row.contains("[ Later ]"));
    }
}
