//! Popup for picking one option out of a short list

use crate::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Clear, HighlightSpacing, List, ListItem, ListState, StatefulWidget, Widget,
    },
};
use unicode_width::UnicodeWidthStr;

/// Maximum width for selector popups
const MAX_POPUP_WIDTH: u16 = 60;

/// An entry in the selector
pub struct SelectorItem<'a> {
    pub label: &'a str,
    /// Optional description
    pub description: Option<&'a str>,
    /// Whether this item is the value currently in effect
    pub is_current: bool,
}

/// A popup selector for choosing from a list of options
pub struct Selector<'a> {
    title: &'a str,
    items: Vec<SelectorItem<'a>>,
    selected: usize,
    theme: &'a Theme,
}

impl<'a> Selector<'a> {
    pub fn new(title: &'a str, items: Vec<SelectorItem<'a>>, theme: &'a Theme) -> Self {
        let selected = items.iter().position(|item| item.is_current).unwrap_or(0);
        Self {
            title,
            items,
            selected,
            theme,
        }
    }

    /// Set the highlighted index
    pub fn with_selected(mut self, index: usize) -> Self {
        self.selected = index.min(self.items.len().saturating_sub(1));
        self
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Popup size for the current items
    fn popup_size(&self) -> (u16, u16) {
        let mut max_width = self.title.width() + 4;
        for item in &self.items {
            let mut w = item.label.width() + 6;
            if let Some(d) = item.description {
                w += d.width() + 3;
            }
            max_width = max_width.max(w);
        }
        let width = (max_width as u16).clamp(20, MAX_POPUP_WIDTH);
        let height = (self.items.len() as u16 + 2).min(20);
        (width, height)
    }

    fn list_item(&self, index: usize, item: &SelectorItem<'_>) -> ListItem<'static> {
        let prefix = if item.is_current { "● " } else { "  " };
        let style = if index == self.selected {
            Style::default()
                .bg(self.theme.accent)
                .fg(self.theme.bg)
                .add_modifier(Modifier::BOLD)
        } else if item.is_current {
            self.theme.accent_style()
        } else {
            self.theme.base_style()
        };
        let mut spans = vec![Span::styled(format!("{}{}", prefix, item.label), style)];
        if let Some(d) = item.description {
            spans.push(Span::styled(format!("  {}", d), self.theme.dim_style()));
        }
        ListItem::new(Line::from(spans))
    }

    /// Render the selector centered in the given area
    pub fn render_centered(&self, area: Rect, buf: &mut Buffer) {
        let (width, height) = self.popup_size();
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        let popup_area = Rect::new(x, y, width.min(area.width), height.min(area.height));

        Clear.render(popup_area, buf);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(self.theme.accent_bold())
            .borders(Borders::ALL)
            .border_style(self.theme.accent_style());

        let items: Vec<ListItem> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| self.list_item(i, item))
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_spacing(HighlightSpacing::Always);

        let mut state = ListState::default();
        state.select(Some(self.selected));
        StatefulWidget::render(list, popup_area, buf, &mut state);
    }
}

/// Visibility and highlight of a selector popup, kept by the caller
#[derive(Debug, Default)]
pub struct SelectorState {
    /// Currently highlighted index
    pub selected: usize,
    /// Whether the selector is visible
    pub visible: bool,
}

impl SelectorState {
    /// Show the selector with `index` highlighted
    pub fn show_at(&mut self, index: usize) {
        self.selected = index;
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Move selection up, wrapping to the bottom
    pub fn up(&mut self, item_count: usize) {
        if item_count == 0 {
            return;
        }
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = item_count - 1;
        }
    }

    /// Move selection down, wrapping to the top
    pub fn down(&mut self, item_count: usize) {
        if item_count == 0 {
            return;
        }
        if self.selected < item_count - 1 {
            self.selected += 1;
        } else {
            self.selected = 0;
        }
    }
}
